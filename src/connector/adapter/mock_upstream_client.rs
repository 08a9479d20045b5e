use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::UpstreamClient;
use crate::domain::{next_token, token_id, DomainError, FetchedMessage, PendingRetrieval};

use super::MockResponseGenerator;

/// Stand-in for the remote API: replies come from [`MockResponseGenerator`]
/// and are ready on the first fetch, which also releases them.
pub struct MockUpstreamClient {
    generator: MockResponseGenerator,
    replies: Mutex<HashMap<String, String>>,
}

impl MockUpstreamClient {
    pub fn new() -> Self {
        Self {
            generator: MockResponseGenerator::new(),
            replies: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MockUpstreamClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UpstreamClient for MockUpstreamClient {
    async fn submit_prompt(
        &self,
        prompt: &str,
        _model_id: &str,
        conversation_id: Option<&str>,
    ) -> Result<PendingRetrieval, DomainError> {
        let token = next_token();
        let conversation_id = conversation_id
            .map(str::to_string)
            .unwrap_or_else(|| token_id("mock_conv", token));
        let message_id = token_id("mock_msg", token);

        let rule = self.generator.matching_rule(prompt);
        debug!("Mock reply for {} uses rule '{}'", message_id, rule.name);

        self.replies
            .lock()
            .await
            .insert(message_id.clone(), self.generator.generate(prompt));

        Ok(PendingRetrieval::new(conversation_id, message_id))
    }

    async fn fetch_message(
        &self,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<FetchedMessage, DomainError> {
        self.replies
            .lock()
            .await
            .remove(message_id)
            .map(FetchedMessage::Text)
            .ok_or_else(|| DomainError::not_ready(conversation_id, message_id))
    }

    fn completes_inline(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "mock"
    }
}
