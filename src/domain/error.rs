use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// The upstream is still generating the requested message.
    #[error("Message {message_id} in conversation {conversation_id} is not ready yet")]
    NotReady {
        conversation_id: String,
        message_id: String,
    },

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Upstream returned {status}: {body}")]
    UpstreamHttp { status: u16, body: String },

    #[error("Message was not ready after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    #[error("Retrieval cancelled")]
    Cancelled,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn not_ready(conversation_id: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self::NotReady {
            conversation_id: conversation_id.into(),
            message_id: message_id.into(),
        }
    }

    pub fn upstream_unavailable(msg: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(msg.into())
    }

    pub fn upstream_http(status: u16, body: impl Into<String>) -> Self {
        Self::UpstreamHttp {
            status,
            body: body.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable machine-readable identifier surfaced at the HTTP boundary.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::NotReady { .. } => "not_ready",
            Self::UpstreamUnavailable(_) => "upstream_unavailable",
            Self::UpstreamHttp { .. } => "upstream_http",
            Self::RetriesExhausted { .. } => "retries_exhausted",
            Self::Cancelled => "cancelled",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::NotReady { .. })
    }

    /// Transient states are absorbed by the orchestrator and retried.
    pub fn is_transient(&self) -> bool {
        self.is_not_ready()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinct() {
        let errors = [
            DomainError::not_found("conv"),
            DomainError::not_ready("c", "m"),
            DomainError::upstream_unavailable("no key"),
            DomainError::upstream_http(500, "boom"),
            DomainError::RetriesExhausted { attempts: 5 },
            DomainError::Cancelled,
            DomainError::invalid_input("empty"),
            DomainError::internal("bug"),
        ];

        let kinds: std::collections::HashSet<&str> = errors.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn only_not_ready_is_transient() {
        assert!(DomainError::not_ready("c", "m").is_transient());
        assert!(!DomainError::upstream_http(404, "").is_transient());
        assert!(!DomainError::RetriesExhausted { attempts: 1 }.is_transient());
    }

    #[test]
    fn upstream_http_message_carries_status_and_body() {
        let err = DomainError::upstream_http(429, "slow down");
        assert_eq!(err.to_string(), "Upstream returned 429: slow down");
    }
}
