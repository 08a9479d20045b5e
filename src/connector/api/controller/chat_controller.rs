use tracing::debug;

use crate::domain::{ChatInput, MessageRequestedResponse};

use super::super::error::ApiError;
use super::super::Container;

pub struct ChatController<'a> {
    container: &'a Container,
}

impl<'a> ChatController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn submit(&self, input: ChatInput) -> Result<MessageRequestedResponse, ApiError> {
        let prompt = input
            .prompt()
            .ok_or_else(|| ApiError::invalid_input("Message must contain a text content item"))?;

        debug!(
            "Chat submission (conversation: {})",
            input.conversation_id.as_deref().unwrap_or("new")
        );

        let orchestrator = self.container.orchestrator();
        let requested = orchestrator
            .submit(
                prompt,
                input.message.model.as_deref(),
                input.conversation_id.as_deref(),
            )
            .await?;

        Ok(requested)
    }
}
