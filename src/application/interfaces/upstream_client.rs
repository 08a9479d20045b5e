use async_trait::async_trait;

use crate::domain::{DomainError, FetchedMessage, PendingRetrieval};

/// Transport to the remote LLM API.
///
/// Submission is asynchronous on the remote side: it only hands back the ids
/// under which the reply will eventually appear.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Fails with `UpstreamUnavailable` when no credential is configured and
    /// with `UpstreamHttp` on any non-2xx response.
    async fn submit_prompt(
        &self,
        prompt: &str,
        model_id: &str,
        conversation_id: Option<&str>,
    ) -> Result<PendingRetrieval, DomainError>;

    /// Fails with `NotReady` while the reply is still being generated.
    async fn fetch_message(
        &self,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<FetchedMessage, DomainError>;

    /// Replies are available on the first fetch, so callers may resolve inline.
    fn completes_inline(&self) -> bool {
        false
    }

    fn name(&self) -> &str;
}
