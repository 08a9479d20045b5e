use crate::domain::Message;

use super::super::error::ApiError;
use super::super::Container;

pub struct MessageController<'a> {
    container: &'a Container,
}

impl<'a> MessageController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Single lookup: a reply still being generated answers 404.
    pub async fn get(&self, conversation_id: &str, message_id: &str) -> Result<Message, ApiError> {
        let orchestrator = self.container.orchestrator();
        Ok(orchestrator.fetch_once(conversation_id, message_id).await?)
    }

    /// Polls server-side until the reply resolves or retries run out.
    pub async fn wait(&self, conversation_id: &str, message_id: &str) -> Result<Message, ApiError> {
        let orchestrator = self.container.orchestrator();
        Ok(orchestrator
            .poll_for_completion(conversation_id, message_id)
            .await?)
    }
}
