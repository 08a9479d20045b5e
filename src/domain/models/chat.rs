use serde::{Deserialize, Serialize};

use super::{first_text, ContentItem};

/// Body of a prompt submission, both as accepted from the UI and as sent upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatInput {
    #[serde(default)]
    pub conversation_id: Option<String>,
    pub message: MessageInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageInput {
    pub content: Vec<ContentItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ChatInput {
    pub fn text(
        conversation_id: Option<String>,
        body: impl Into<String>,
        model: Option<String>,
    ) -> Self {
        Self {
            conversation_id,
            message: MessageInput {
                content: vec![ContentItem::text(body)],
                model,
            },
        }
    }

    pub fn prompt(&self) -> Option<&str> {
        first_text(&self.message.content)
    }
}

/// Acknowledgement of a submission: where the reply will appear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequestedResponse {
    pub conversation_id: String,
    pub message: MessageRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub id: String,
}

impl MessageRequestedResponse {
    pub fn new(conversation_id: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            message: MessageRef {
                id: message_id.into(),
            },
        }
    }
}
