use std::sync::Arc;

use crate::application::ConversationRepository;
use crate::domain::{Conversation, ConversationSummary, DomainError};

pub struct ListConversationsUseCase {
    store: Arc<dyn ConversationRepository>,
}

impl ListConversationsUseCase {
    pub fn new(store: Arc<dyn ConversationRepository>) -> Self {
        Self { store }
    }

    pub async fn execute(&self) -> Result<Vec<ConversationSummary>, DomainError> {
        self.store.list_conversations().await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Conversation, DomainError> {
        self.store
            .get_conversation(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Conversation not found: {}", id)))
    }
}
