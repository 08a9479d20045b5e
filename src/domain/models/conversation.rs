use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Message;

pub const DEFAULT_TITLE: &str = "New Conversation";
pub const TITLE_MAX_CHARS: usize = 30;

/// Derives a conversation title from the first user message.
///
/// Long input is cut at `TITLE_MAX_CHARS` characters and suffixed with `...`.
pub fn title_from_input(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return DEFAULT_TITLE.to_string();
    }

    if trimmed.chars().count() > TITLE_MAX_CHARS {
        let head: String = trimmed.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}...", head)
    } else {
        trimmed.to_string()
    }
}

/// A chat thread and every message exchanged in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    id: String,
    title: String,
    create_time: i64,
    /// Empty until the first message is stored.
    last_message_id: String,
    model_id: String,
    /// Id the upstream assigned to this thread, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    upstream_conversation_id: Option<String>,
    message_map: HashMap<String, Message>,
}

impl Conversation {
    pub fn new(id: String, title: String, model_id: String, create_time: i64) -> Self {
        Self {
            id,
            title,
            create_time,
            last_message_id: String::new(),
            model_id,
            upstream_conversation_id: None,
            message_map: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn create_time(&self) -> i64 {
        self.create_time
    }

    pub fn last_message_id(&self) -> Option<&str> {
        if self.last_message_id.is_empty() {
            None
        } else {
            Some(&self.last_message_id)
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn upstream_conversation_id(&self) -> Option<&str> {
        self.upstream_conversation_id.as_deref()
    }

    pub fn message_map(&self) -> &HashMap<String, Message> {
        &self.message_map
    }

    pub fn message(&self, id: &str) -> Option<&Message> {
        self.message_map.get(id)
    }

    pub fn message_count(&self) -> usize {
        self.message_map.len()
    }

    /// Messages ordered by creation time.
    pub fn ordered_messages(&self) -> Vec<&Message> {
        let mut messages: Vec<&Message> = self.message_map.values().collect();
        messages.sort_by(|a, b| {
            a.create_time()
                .cmp(&b.create_time())
                .then_with(|| a.id().cmp(b.id()))
        });
        messages
    }

    /// Stores a message and points `last_message_id` at it.
    pub fn push_message(&mut self, message: Message) {
        self.last_message_id = message.id().to_string();
        self.message_map.insert(message.id().to_string(), message);
    }

    pub fn set_model_id(&mut self, model_id: impl Into<String>) {
        self.model_id = model_id.into();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn has_default_title(&self) -> bool {
        self.title == DEFAULT_TITLE
    }

    pub fn bind_upstream(&mut self, upstream_conversation_id: impl Into<String>) {
        self.upstream_conversation_id = Some(upstream_conversation_id.into());
    }

    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            create_time: self.create_time,
            last_message_id: self.last_message_id.clone(),
            model_id: self.model_id.clone(),
            message_count: self.message_map.len(),
        }
    }
}

/// Lightweight listing entry, without the message bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub create_time: i64,
    pub last_message_id: String,
    pub model_id: String,
    pub message_count: usize,
}
