use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::application::{AppendedMessage, ConversationRepository, NewConversation};
use crate::domain::{
    next_token, title_from_input, token_id, Conversation, ConversationSummary, DomainError,
    Message, Role,
};

const CONVERSATION_PREFIX: &str = "conv";
const MESSAGE_PREFIX: &str = "msg";

/// Process-local conversation store.
///
/// Each conversation sits behind its own mutex, so writers to one thread are
/// serialized without blocking writers to another. The outer map lock is only
/// held long enough to look up or insert a cell.
///
/// A conversation's message map is the only copy of its messages, and every
/// write completes without an await point once the cell is locked.
pub struct InMemoryConversationRepository {
    conversations: RwLock<HashMap<String, Arc<Mutex<Conversation>>>>,
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
        }
    }

    async fn cell(&self, conversation_id: &str) -> Result<Arc<Mutex<Conversation>>, DomainError> {
        self.conversations
            .read()
            .await
            .get(conversation_id)
            .cloned()
            .ok_or_else(|| {
                DomainError::not_found(format!("Conversation not found: {}", conversation_id))
            })
    }

    fn new_message(conversation_id: &str, role: Role, content: &str) -> Message {
        let token = next_token();
        Message::new(
            token_id(MESSAGE_PREFIX, token),
            conversation_id.to_string(),
            role,
            content.to_string(),
            token,
        )
    }
}

impl Default for InMemoryConversationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn create_conversation(
        &self,
        user_input: &str,
        model_id: &str,
    ) -> Result<NewConversation, DomainError> {
        let token = next_token();
        let conversation_id = token_id(CONVERSATION_PREFIX, token);

        let mut conversation = Conversation::new(
            conversation_id.clone(),
            title_from_input(user_input),
            model_id.to_string(),
            token,
        );

        let message = Self::new_message(&conversation_id, Role::User, user_input);
        let user_message_id = message.id().to_string();
        conversation.push_message(message);

        self.conversations
            .write()
            .await
            .insert(conversation_id.clone(), Arc::new(Mutex::new(conversation)));

        debug!(
            "Stored conversation {} with first message {}",
            conversation_id, user_message_id
        );

        Ok(NewConversation {
            conversation_id,
            user_message_id,
        })
    }

    async fn add_message(
        &self,
        conversation_id: &str,
        user_input: &str,
        model_id: Option<&str>,
    ) -> Result<AppendedMessage, DomainError> {
        let cell = self.cell(conversation_id).await?;

        let mut conversation = cell.lock().await;

        if let Some(model) = model_id {
            conversation.set_model_id(model);
        }
        if conversation.has_default_title() {
            conversation.set_title(title_from_input(user_input));
        }

        let message = Self::new_message(conversation_id, Role::User, user_input);
        let user_message_id = message.id().to_string();
        conversation.push_message(message);

        Ok(AppendedMessage {
            user_message_id,
            model_id: conversation.model_id().to_string(),
        })
    }

    async fn append_assistant_message(
        &self,
        conversation_id: &str,
        message_id: &str,
        content: &str,
    ) -> Result<Message, DomainError> {
        let cell = self.cell(conversation_id).await?;

        let mut conversation = cell.lock().await;

        if let Some(existing) = conversation.message(message_id) {
            return Ok(existing.clone());
        }

        let message = Message::new(
            message_id.to_string(),
            conversation_id.to_string(),
            Role::Assistant,
            content.to_string(),
            next_token(),
        );
        conversation.push_message(message.clone());
        debug!("Stored assistant message {} in {}", message_id, conversation_id);

        Ok(message)
    }

    fn allocate_message_id(&self) -> String {
        token_id(MESSAGE_PREFIX, next_token())
    }

    async fn bind_upstream(
        &self,
        conversation_id: &str,
        upstream_conversation_id: &str,
    ) -> Result<(), DomainError> {
        let cell = self.cell(conversation_id).await?;
        cell.lock().await.bind_upstream(upstream_conversation_id);
        Ok(())
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, DomainError> {
        let cell = match self.conversations.read().await.get(id).cloned() {
            Some(cell) => cell,
            None => return Ok(None),
        };

        let conversation = cell.lock().await.clone();
        Ok(Some(conversation))
    }

    async fn get_message(
        &self,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<Option<Message>, DomainError> {
        let cell = match self.conversations.read().await.get(conversation_id).cloned() {
            Some(cell) => cell,
            None => return Ok(None),
        };

        let message = cell.lock().await.message(message_id).cloned();
        Ok(message)
    }

    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, DomainError> {
        let cells: Vec<Arc<Mutex<Conversation>>> =
            self.conversations.read().await.values().cloned().collect();

        let mut summaries = Vec::with_capacity(cells.len());
        for cell in cells {
            summaries.push(cell.lock().await.summary());
        }

        summaries.sort_by(|a, b| b.create_time.cmp(&a.create_time));
        Ok(summaries)
    }
}
