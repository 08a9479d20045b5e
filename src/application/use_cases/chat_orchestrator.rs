use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::{ConversationRepository, UpstreamClient};
use crate::domain::{
    DomainError, Message, MessageRequestedResponse, PendingRetrieval, RetrievalState, RetryPolicy,
};

pub const DEFAULT_MODEL: &str = "claude-v3-haiku";

/// How long a submitted reply stays retrievable if nobody polls for it.
pub const DEFAULT_PENDING_TTL: Duration = Duration::from_secs(600);

/// A failed exchange, with whatever identifiers already exist locally so the
/// caller can still show the partial thread.
#[derive(Debug, Clone, Error)]
#[error("{error}")]
pub struct RetrievalFailure {
    pub conversation_id: Option<String>,
    pub message_id: Option<String>,
    #[source]
    pub error: DomainError,
}

impl RetrievalFailure {
    pub fn new(error: DomainError) -> Self {
        Self {
            conversation_id: None,
            message_id: None,
            error,
        }
    }

    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_message(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    pub fn kind(&self) -> &'static str {
        self.error.kind()
    }
}

impl From<DomainError> for RetrievalFailure {
    fn from(error: DomainError) -> Self {
        Self::new(error)
    }
}

/// Links a locally reserved assistant message id to the upstream handle that
/// will eventually produce its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    pub conversation_id: String,
    pub message_id: String,
    pub upstream: PendingRetrieval,
    pub submitted_at: tokio::time::Instant,
}

/// Drives the submit-then-poll exchange with the upstream API.
///
/// The store is the only shared state; pending handles live here and are
/// discarded once resolved, once the retry budget is spent, or once they are
/// older than the pending TTL (checked on every submit).
pub struct ChatOrchestrator {
    store: Arc<dyn ConversationRepository>,
    upstream: Arc<dyn UpstreamClient>,
    retry_policy: RetryPolicy,
    default_model: String,
    pending_ttl: Duration,
    pending: Mutex<HashMap<String, PendingReply>>,
}

impl ChatOrchestrator {
    pub fn new(store: Arc<dyn ConversationRepository>, upstream: Arc<dyn UpstreamClient>) -> Self {
        Self {
            store,
            upstream,
            retry_policy: RetryPolicy::default(),
            default_model: DEFAULT_MODEL.to_string(),
            pending_ttl: DEFAULT_PENDING_TTL,
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_pending_ttl(mut self, ttl: Duration) -> Self {
        self.pending_ttl = ttl;
        self
    }

    pub fn upstream_name(&self) -> &str {
        self.upstream.name()
    }

    /// Records the user turn, submits it upstream and returns where the
    /// assistant reply will appear.
    ///
    /// With an inline upstream (mock mode) the reply is already stored when
    /// this returns.
    pub async fn submit(
        &self,
        prompt: &str,
        model: Option<&str>,
        conversation_id: Option<&str>,
    ) -> Result<MessageRequestedResponse, RetrievalFailure> {
        if prompt.trim().is_empty() {
            return Err(DomainError::invalid_input("Message content must not be empty").into());
        }

        debug!("Retrieval state: {}", RetrievalState::Submitting);

        let (conversation_id, model_id) = match conversation_id {
            Some(id) => {
                let appended = self
                    .store
                    .add_message(id, prompt, model)
                    .await
                    .map_err(|e| RetrievalFailure::new(e).with_conversation(id))?;
                (id.to_string(), appended.model_id)
            }
            None => {
                let model_id = model.unwrap_or(&self.default_model).to_string();
                let created = self.store.create_conversation(prompt, &model_id).await?;
                info!("Created conversation {}", created.conversation_id);
                (created.conversation_id, model_id)
            }
        };

        let fail = |e: DomainError| RetrievalFailure::new(e).with_conversation(&conversation_id);

        let upstream_conversation = self
            .store
            .get_conversation(&conversation_id)
            .await
            .map_err(fail)?
            .and_then(|c| c.upstream_conversation_id().map(str::to_string));

        let handle = match self
            .upstream
            .submit_prompt(prompt, &model_id, upstream_conversation.as_deref())
            .await
        {
            Ok(handle) => handle,
            Err(e) => {
                warn!(
                    "Submission for conversation {} failed ({}): {}",
                    conversation_id,
                    e.kind(),
                    e
                );
                debug!("Retrieval state: {}", RetrievalState::Failed);
                return Err(fail(e));
            }
        };

        if upstream_conversation.is_none() {
            self.store
                .bind_upstream(&conversation_id, &handle.conversation_id)
                .await
                .map_err(fail)?;
        }

        let message_id = self.store.allocate_message_id();
        let reply = PendingReply {
            conversation_id: conversation_id.clone(),
            message_id: message_id.clone(),
            upstream: handle,
            submitted_at: tokio::time::Instant::now(),
        };

        debug!("Retrieval state: {}", RetrievalState::AwaitingGeneration);

        if self.upstream.completes_inline() {
            match self.attempt(&reply).await {
                Ok(_) => {
                    return Ok(MessageRequestedResponse::new(conversation_id, message_id));
                }
                Err(e) if e.is_transient() => {
                    debug!("Inline upstream not ready for {}, deferring", message_id);
                }
                Err(e) => {
                    return Err(fail(e).with_message(message_id));
                }
            }
        }

        info!(
            "Submitted prompt via {} (conversation {}, reply {})",
            self.upstream.name(),
            conversation_id,
            message_id
        );
        {
            let mut pending = self.pending.lock().await;
            let ttl = self.pending_ttl;
            let before = pending.len();
            pending.retain(|_, p| p.submitted_at.elapsed() < ttl);
            if pending.len() < before {
                debug!("Expired {} unpolled replies", before - pending.len());
            }
            pending.insert(message_id.clone(), reply);
        }

        Ok(MessageRequestedResponse::new(conversation_id, message_id))
    }

    /// Returns the message if it is stored, otherwise asks the upstream once.
    ///
    /// A reply still being generated surfaces as `NotReady`.
    pub async fn fetch_once(
        &self,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<Message, RetrievalFailure> {
        let fail = |e: DomainError| {
            RetrievalFailure::new(e)
                .with_conversation(conversation_id)
                .with_message(message_id)
        };

        if let Some(message) = self
            .store
            .get_message(conversation_id, message_id)
            .await
            .map_err(fail)?
        {
            return Ok(message);
        }

        let reply = self.pending_reply(conversation_id, message_id).await.map_err(fail)?;

        match self.attempt(&reply).await {
            Ok(message) => Ok(message),
            Err(e) if e.is_transient() => Err(fail(e)),
            Err(e) => {
                self.discard(message_id).await;
                Err(fail(e))
            }
        }
    }

    /// Polls the upstream until the reply resolves or the retry budget runs out.
    pub async fn poll_for_completion(
        &self,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<Message, RetrievalFailure> {
        self.poll_for_completion_until(conversation_id, message_id, &CancellationToken::new())
            .await
    }

    /// Like [`Self::poll_for_completion`], but stops before the next attempt
    /// once `cancel` fires. Messages already stored are left untouched.
    pub async fn poll_for_completion_until(
        &self,
        conversation_id: &str,
        message_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Message, RetrievalFailure> {
        let fail = |e: DomainError| {
            RetrievalFailure::new(e)
                .with_conversation(conversation_id)
                .with_message(message_id)
        };

        let reply = match self
            .store
            .get_message(conversation_id, message_id)
            .await
            .map_err(fail)?
        {
            Some(message) => return Ok(message),
            None => self.pending_reply(conversation_id, message_id).await.map_err(fail)?,
        };

        let max_attempts = self.retry_policy.max_attempts();
        let start_time = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                info!("Polling for {} cancelled after {} attempts", message_id, attempt);
                return Err(fail(DomainError::Cancelled));
            }

            // Another request may have resolved it while we slept.
            if attempt > 0 {
                if let Some(message) = self
                    .store
                    .get_message(conversation_id, message_id)
                    .await
                    .map_err(fail)?
                {
                    return Ok(message);
                }
            }

            attempt += 1;
            match self.attempt(&reply).await {
                Ok(message) => {
                    info!(
                        "Resolved {} after {} attempts in {:.2}s",
                        message_id,
                        attempt,
                        start_time.elapsed().as_secs_f64()
                    );
                    return Ok(message);
                }
                Err(e) if e.is_transient() => {
                    if attempt >= max_attempts {
                        warn!(
                            "Giving up on {} after {} attempts",
                            message_id, attempt
                        );
                        self.discard(message_id).await;
                        debug!("Retrieval state: {}", RetrievalState::Failed);
                        return Err(fail(DomainError::RetriesExhausted { attempts: attempt }));
                    }

                    let delay = self.retry_policy.delay_for(attempt - 1);
                    debug!(
                        "{} not ready (attempt {}/{}), retrying in {}ms",
                        message_id,
                        attempt,
                        max_attempts,
                        delay.as_millis()
                    );

                    tokio::select! {
                        _ = cancel.cancelled() => {
                            info!("Polling for {} cancelled during backoff", message_id);
                            return Err(fail(DomainError::Cancelled));
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                Err(e) => {
                    warn!("Retrieval of {} failed ({}): {}", message_id, e.kind(), e);
                    self.discard(message_id).await;
                    debug!("Retrieval state: {}", RetrievalState::Failed);
                    return Err(fail(e));
                }
            }
        }
    }

    /// Submits a prompt and waits for the reply.
    pub async fn submit_and_wait(
        &self,
        prompt: &str,
        model: Option<&str>,
        conversation_id: Option<&str>,
    ) -> Result<Message, RetrievalFailure> {
        let requested = self.submit(prompt, model, conversation_id).await?;
        self.poll_for_completion(&requested.conversation_id, &requested.message.id)
            .await
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    async fn pending_reply(
        &self,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<PendingReply, DomainError> {
        self.pending
            .lock()
            .await
            .get(message_id)
            .filter(|reply| reply.conversation_id == conversation_id)
            .cloned()
            .ok_or_else(|| {
                DomainError::not_found(format!(
                    "Message {} in conversation {}",
                    message_id, conversation_id
                ))
            })
    }

    /// One fetch; on success the reply is stored and the handle released.
    async fn attempt(&self, reply: &PendingReply) -> Result<Message, DomainError> {
        let fetched = self
            .upstream
            .fetch_message(&reply.upstream.conversation_id, &reply.upstream.message_id)
            .await
            .map_err(|e| match e {
                DomainError::NotReady { .. } => {
                    DomainError::not_ready(&reply.conversation_id, &reply.message_id)
                }
                other => other,
            })?;

        if fetched.is_raw() {
            warn!(
                "No text content in upstream reply for {}, storing raw payload",
                reply.message_id
            );
        }

        let message = self
            .store
            .append_assistant_message(&reply.conversation_id, &reply.message_id, &fetched.into_text())
            .await?;

        self.discard(&reply.message_id).await;
        debug!("Retrieval state: {}", RetrievalState::Resolved);

        Ok(message)
    }

    async fn discard(&self, message_id: &str) {
        self.pending.lock().await.remove(message_id);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::connector::{InMemoryConversationRepository, MockUpstreamClient};
    use crate::domain::FetchedMessage;

    /// Upstream that replays queued fetch results; an empty queue means "not ready".
    #[derive(Default)]
    struct ScriptedUpstream {
        fetch_results: std::sync::Mutex<VecDeque<Result<FetchedMessage, DomainError>>>,
        submissions: std::sync::Mutex<Vec<(String, Option<String>)>>,
        submit_error: Option<DomainError>,
        fetches: AtomicU32,
        counter: AtomicU32,
    }

    impl ScriptedUpstream {
        fn with_results(results: Vec<Result<FetchedMessage, DomainError>>) -> Self {
            Self {
                fetch_results: std::sync::Mutex::new(results.into()),
                ..Self::default()
            }
        }

        fn failing_submit(error: DomainError) -> Self {
            Self {
                submit_error: Some(error),
                ..Self::default()
            }
        }

        fn fetches(&self) -> u32 {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl UpstreamClient for ScriptedUpstream {
        async fn submit_prompt(
            &self,
            _prompt: &str,
            model_id: &str,
            conversation_id: Option<&str>,
        ) -> Result<PendingRetrieval, DomainError> {
            if let Some(error) = &self.submit_error {
                return Err(error.clone());
            }
            self.submissions
                .lock()
                .unwrap()
                .push((model_id.to_string(), conversation_id.map(str::to_string)));

            let n = self.counter.fetch_add(1, Ordering::SeqCst);
            Ok(PendingRetrieval::new("up_conv", format!("up_msg_{}", n)))
        }

        async fn fetch_message(
            &self,
            conversation_id: &str,
            message_id: &str,
        ) -> Result<FetchedMessage, DomainError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.fetch_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(DomainError::not_ready(conversation_id, message_id)))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn not_ready() -> Result<FetchedMessage, DomainError> {
        Err(DomainError::not_ready("up_conv", "up_msg_0"))
    }

    fn orchestrator(upstream: Arc<ScriptedUpstream>) -> (ChatOrchestrator, Arc<InMemoryConversationRepository>) {
        let store = Arc::new(InMemoryConversationRepository::new());
        let orchestrator = ChatOrchestrator::new(store.clone(), upstream)
            .with_retry_policy(RetryPolicy::default().with_max_retries(3));
        (orchestrator, store)
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let upstream = Arc::new(ScriptedUpstream::default());
        let (orchestrator, _) = orchestrator(upstream.clone());

        let requested = orchestrator.submit("Explain recursion", None, None).await.unwrap();
        let failure = orchestrator
            .poll_for_completion(&requested.conversation_id, &requested.message.id)
            .await
            .unwrap_err();

        assert!(matches!(failure.error, DomainError::RetriesExhausted { attempts: 4 }));
        assert_eq!(upstream.fetches(), 4);
        assert_eq!(failure.conversation_id.as_deref(), Some(requested.conversation_id.as_str()));
        assert_eq!(orchestrator.pending_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn resolves_once_upstream_is_ready() {
        let upstream = Arc::new(ScriptedUpstream::with_results(vec![
            not_ready(),
            not_ready(),
            Ok(FetchedMessage::Text("Recursion is...".to_string())),
        ]));
        let (orchestrator, store) = orchestrator(upstream.clone());

        let requested = orchestrator.submit("Explain recursion", None, None).await.unwrap();
        let message = orchestrator
            .poll_for_completion(&requested.conversation_id, &requested.message.id)
            .await
            .unwrap();

        assert_eq!(message.content(), "Recursion is...");
        assert_eq!(message.id(), requested.message.id);
        assert!(message.is_assistant());
        assert_eq!(upstream.fetches(), 3);

        let conversation = store
            .get_conversation(&requested.conversation_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(conversation.message_count(), 2);
        assert_eq!(conversation.last_message_id(), Some(requested.message.id.as_str()));
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_follows_policy() {
        let upstream = Arc::new(ScriptedUpstream::default());
        let (orchestrator, _) = orchestrator(upstream);

        let requested = orchestrator.submit("Explain recursion", None, None).await.unwrap();
        let started = tokio::time::Instant::now();
        let _ = orchestrator
            .poll_for_completion(&requested.conversation_id, &requested.message.id)
            .await;

        // 1000 + 1500 + 2250
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(4750));
        assert!(elapsed < Duration::from_millis(4800));
    }

    #[tokio::test]
    async fn upstream_rejection_fails_without_retry() {
        let upstream = Arc::new(ScriptedUpstream::with_results(vec![Err(
            DomainError::upstream_http(500, "boom"),
        )]));
        let (orchestrator, _) = orchestrator(upstream.clone());

        let requested = orchestrator.submit("Explain recursion", None, None).await.unwrap();
        let failure = orchestrator
            .poll_for_completion(&requested.conversation_id, &requested.message.id)
            .await
            .unwrap_err();

        assert_eq!(failure.kind(), "upstream_http");
        assert_eq!(upstream.fetches(), 1);

        let again = orchestrator
            .fetch_once(&requested.conversation_id, &requested.message.id)
            .await
            .unwrap_err();
        assert!(again.error.is_not_found());
    }

    #[tokio::test]
    async fn raw_payload_is_stored_verbatim() {
        let upstream = Arc::new(ScriptedUpstream::with_results(vec![Ok(FetchedMessage::Raw(
            serde_json::json!({"id": "up_msg_0"}),
        ))]));
        let (orchestrator, _) = orchestrator(upstream);

        let requested = orchestrator.submit("Explain recursion", None, None).await.unwrap();
        let message = orchestrator
            .fetch_once(&requested.conversation_id, &requested.message.id)
            .await
            .unwrap();

        assert_eq!(message.content(), r#"{"id":"up_msg_0"}"#);
    }

    #[tokio::test]
    async fn fetch_once_reports_not_ready_with_local_ids() {
        let upstream = Arc::new(ScriptedUpstream::default());
        let (orchestrator, _) = orchestrator(upstream);

        let requested = orchestrator.submit("Explain recursion", None, None).await.unwrap();
        let failure = orchestrator
            .fetch_once(&requested.conversation_id, &requested.message.id)
            .await
            .unwrap_err();

        match failure.error {
            DomainError::NotReady {
                conversation_id,
                message_id,
            } => {
                assert_eq!(conversation_id, requested.conversation_id);
                assert_eq!(message_id, requested.message.id);
            }
            other => panic!("expected NotReady, got {:?}", other),
        }
        assert_eq!(orchestrator.pending_count().await, 1);
    }

    #[tokio::test]
    async fn submit_failure_keeps_user_turn() {
        let upstream = Arc::new(ScriptedUpstream::failing_submit(
            DomainError::upstream_unavailable("no credential"),
        ));
        let (orchestrator, store) = orchestrator(upstream);

        let failure = orchestrator.submit("Explain recursion", None, None).await.unwrap_err();
        assert_eq!(failure.kind(), "upstream_unavailable");

        let conversation_id = failure.conversation_id.unwrap();
        let conversation = store.get_conversation(&conversation_id).await.unwrap().unwrap();
        assert_eq!(conversation.message_count(), 1);
        assert_eq!(orchestrator.pending_count().await, 0);
    }

    #[tokio::test]
    async fn cancelled_poll_stops_before_fetching() {
        let upstream = Arc::new(ScriptedUpstream::default());
        let (orchestrator, _) = orchestrator(upstream.clone());

        let requested = orchestrator.submit("Explain recursion", None, None).await.unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let failure = orchestrator
            .poll_for_completion_until(&requested.conversation_id, &requested.message.id, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(failure.error, DomainError::Cancelled));
        assert_eq!(upstream.fetches(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_during_backoff_stops_polling() {
        let upstream = Arc::new(ScriptedUpstream::default());
        let (orchestrator, store) = orchestrator(upstream.clone());

        let requested = orchestrator.submit("Explain recursion", None, None).await.unwrap();
        let cancel = CancellationToken::new();

        // First retry sleeps 1000ms; cancel halfway through it.
        let (result, _) = tokio::join!(
            orchestrator.poll_for_completion_until(
                &requested.conversation_id,
                &requested.message.id,
                &cancel
            ),
            async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                cancel.cancel();
            }
        );

        let failure = result.unwrap_err();
        assert!(matches!(failure.error, DomainError::Cancelled));
        assert_eq!(failure.message_id.as_deref(), Some(requested.message.id.as_str()));
        assert_eq!(upstream.fetches(), 1);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(upstream.fetches(), 1);

        let conversation = store
            .get_conversation(&requested.conversation_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(conversation.message_count(), 1);
        assert_eq!(conversation.ordered_messages()[0].content(), "Explain recursion");
    }

    #[tokio::test(start_paused = true)]
    async fn unpolled_replies_expire() {
        let upstream = Arc::new(ScriptedUpstream::default());
        let (orchestrator, _) = orchestrator(upstream);
        let orchestrator = orchestrator.with_pending_ttl(Duration::from_secs(60));

        let stale = orchestrator.submit("first question", None, None).await.unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;
        let fresh = orchestrator.submit("second question", None, None).await.unwrap();

        assert_eq!(orchestrator.pending_count().await, 1);
        let expired = orchestrator
            .fetch_once(&stale.conversation_id, &stale.message.id)
            .await
            .unwrap_err();
        assert!(expired.error.is_not_found());

        let live = orchestrator
            .fetch_once(&fresh.conversation_id, &fresh.message.id)
            .await
            .unwrap_err();
        assert!(live.error.is_not_ready());
    }

    #[tokio::test]
    async fn message_from_other_conversation_is_not_found() {
        let upstream = Arc::new(ScriptedUpstream::default());
        let (orchestrator, _) = orchestrator(upstream);

        let requested = orchestrator.submit("Explain recursion", None, None).await.unwrap();
        let failure = orchestrator
            .fetch_once("conv_other", &requested.message.id)
            .await
            .unwrap_err();

        assert!(failure.error.is_not_found());
    }

    #[tokio::test]
    async fn empty_prompt_is_rejected() {
        let upstream = Arc::new(ScriptedUpstream::default());
        let (orchestrator, _) = orchestrator(upstream.clone());

        let failure = orchestrator.submit("   ", None, None).await.unwrap_err();
        assert_eq!(failure.kind(), "invalid_input");
        assert!(upstream.submissions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn default_model_and_upstream_thread_are_forwarded() {
        let upstream = Arc::new(ScriptedUpstream::default());
        let (orchestrator, store) = orchestrator(upstream.clone());

        let first = orchestrator.submit("Explain recursion", None, None).await.unwrap();
        orchestrator
            .submit("And iteration?", None, Some(&first.conversation_id))
            .await
            .unwrap();

        let submissions = upstream.submissions.lock().unwrap().clone();
        assert_eq!(
            submissions,
            vec![
                (DEFAULT_MODEL.to_string(), None),
                (DEFAULT_MODEL.to_string(), Some("up_conv".to_string())),
            ]
        );

        let conversation = store
            .get_conversation(&first.conversation_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(conversation.upstream_conversation_id(), Some("up_conv"));
    }

    #[tokio::test]
    async fn unknown_conversation_fails_before_upstream() {
        let upstream = Arc::new(ScriptedUpstream::default());
        let (orchestrator, _) = orchestrator(upstream.clone());

        let failure = orchestrator
            .submit("hello", Some("claude-v3-sonnet"), Some("conv_missing"))
            .await
            .unwrap_err();

        assert!(failure.error.is_not_found());
        assert!(upstream.submissions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn inline_upstream_stores_reply_during_submit() {
        let store = Arc::new(InMemoryConversationRepository::new());
        let orchestrator = ChatOrchestrator::new(store.clone(), Arc::new(MockUpstreamClient::new()));

        let requested = orchestrator.submit("hello there", None, None).await.unwrap();
        let stored = store
            .get_message(&requested.conversation_id, &requested.message.id)
            .await
            .unwrap()
            .unwrap();

        assert!(stored.is_assistant());
        assert!(!stored.content().is_empty());
        assert_eq!(orchestrator.pending_count().await, 0);

        let fetched = orchestrator
            .fetch_once(&requested.conversation_id, &requested.message.id)
            .await
            .unwrap();
        assert_eq!(fetched, stored);
    }
}
