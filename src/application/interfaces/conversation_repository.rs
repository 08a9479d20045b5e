use async_trait::async_trait;

use crate::domain::{Conversation, ConversationSummary, DomainError, Message};

/// Identifiers produced when a new thread is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConversation {
    pub conversation_id: String,
    pub user_message_id: String,
}

/// Result of appending a user turn to an existing thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendedMessage {
    pub user_message_id: String,
    /// Model in effect for this turn, after falling back to the recorded one.
    pub model_id: String,
}

/// Storage for conversations and their messages.
///
/// Implementations serialize writes per conversation: concurrent appends to the
/// same thread must all persist, while different threads do not contend.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn create_conversation(
        &self,
        user_input: &str,
        model_id: &str,
    ) -> Result<NewConversation, DomainError>;

    /// Fails with `NotFound` when the conversation does not exist.
    async fn add_message(
        &self,
        conversation_id: &str,
        user_input: &str,
        model_id: Option<&str>,
    ) -> Result<AppendedMessage, DomainError>;

    /// Stores an assistant reply under a previously allocated id.
    ///
    /// Appending an id that is already stored returns the existing message.
    async fn append_assistant_message(
        &self,
        conversation_id: &str,
        message_id: &str,
        content: &str,
    ) -> Result<Message, DomainError>;

    /// Reserves an id for a message that does not exist yet.
    fn allocate_message_id(&self) -> String;

    async fn bind_upstream(
        &self,
        conversation_id: &str,
        upstream_conversation_id: &str,
    ) -> Result<(), DomainError>;

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, DomainError>;

    /// Returns `None` when the message is unknown or belongs to another conversation.
    async fn get_message(
        &self,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<Option<Message>, DomainError>;

    /// Summaries, newest first.
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, DomainError>;
}
