use serde::{Deserialize, Serialize};

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One piece of message content as it travels on the wire, tagged by `contentType`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "contentType", rename_all = "lowercase")]
pub enum ContentItem {
    Text {
        body: String,
    },
    #[serde(rename_all = "camelCase")]
    Image {
        media_type: String,
        body: String,
    },
    #[serde(rename_all = "camelCase")]
    Attachment {
        file_name: String,
        body: String,
    },
}

impl ContentItem {
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text { body: body.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentItem::Text { body } => Some(body),
            ContentItem::Image { .. } | ContentItem::Attachment { .. } => None,
        }
    }
}

/// Returns the body of the first text item, if any.
pub fn first_text(items: &[ContentItem]) -> Option<&str> {
    items.iter().find_map(ContentItem::as_text)
}

/// A single immutable turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    id: String,
    conversation_id: String,
    role: Role,
    content: String,
    /// Milliseconds since the Unix epoch.
    create_time: i64,
}

impl Message {
    pub fn new(
        id: String,
        conversation_id: String,
        role: Role,
        content: String,
        create_time: i64,
    ) -> Self {
        Self {
            id,
            conversation_id,
            role,
            content,
            create_time,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn create_time(&self) -> i64 {
        self.create_time
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}
