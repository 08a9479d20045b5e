use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::application::UpstreamClient;
use crate::domain::{
    ChatInput, ContentItem, DomainError, FetchedMessage, MessageRequestedResponse,
    PendingRetrieval,
};

/// Default target: an upstream conversation API on the local machine.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_CREDENTIAL_HEADER: &str = "x-api-key";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const CONVERSATION_PATH: &str = "/conversation";

/// Static header forwarded with every upstream request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    header: String,
    value: String,
}

impl Credential {
    pub fn new(header: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            value: value.into(),
        }
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("header", &self.header)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// Error envelope shapes seen from the upstream.
#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Nested { error: ErrorDetail },
    Flat { message: String },
    Plain { error: String },
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// HTTP client for the remote conversation API.
///
/// Submission is `POST {base}/conversation`; retrieval is
/// `GET {base}/conversation/{conversationId}/{messageId}`, which answers 404
/// until the reply has been generated.
///
/// Upstream ids are percent-encoded as single path segments.
pub struct HttpUpstreamClient {
    client: reqwest::Client,
    base_url: String,
    credential: Option<Credential>,
}

impl HttpUpstreamClient {
    pub fn new(base_url: impl Into<String>, credential: Option<Credential>, timeout: Duration) -> Self {
        let base: String = base_url.into();
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base.trim_end_matches('/').to_string(),
            credential,
        }
    }

    /// `{base}/conversation/{conversationId}/{messageId}`, each id one segment.
    fn message_url(&self, conversation_id: &str, message_id: &str) -> Result<Url, DomainError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, CONVERSATION_PATH)).map_err(|e| {
            DomainError::upstream_unavailable(format!("invalid upstream URL {}: {}", self.base_url, e))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                DomainError::upstream_unavailable(format!(
                    "upstream URL {} cannot take a path",
                    self.base_url
                ))
            })?
            .push(conversation_id)
            .push(message_id);

        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credential {
            Some(credential) => request.header(credential.header.as_str(), credential.value.as_str()),
            None => request,
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> DomainError {
        DomainError::upstream_unavailable(format!(
            "request to {} failed: {}",
            self.base_url, e
        ))
    }
}

/// Reads `CHATRELAY_API_KEY` and `CHATRELAY_CREDENTIAL_HEADER`; an empty key counts as absent.
///
/// The upstream URL itself comes from `CHATRELAY_UPSTREAM_URL`, default [`DEFAULT_BASE_URL`].
pub fn credential_from_env() -> Option<Credential> {
    let value = std::env::var("CHATRELAY_API_KEY").ok().filter(|v| !v.is_empty())?;
    let header = std::env::var("CHATRELAY_CREDENTIAL_HEADER")
        .unwrap_or_else(|_| DEFAULT_CREDENTIAL_HEADER.to_string());
    Some(Credential::new(header, value))
}

/// Pulls the first text item out of a message payload.
///
/// Accepts the bare message (`{content: [...]}`), the wrapped form
/// (`{message: {content: [...]}}`) and plain string content.
pub fn extract_text(payload: &Value) -> Option<String> {
    let candidates = [payload.get("message").and_then(|m| m.get("content")), payload.get("content")];

    for content in candidates.into_iter().flatten() {
        match content {
            Value::String(text) => return Some(text.clone()),
            Value::Array(items) => {
                let text = items.iter().find_map(|item| {
                    match serde_json::from_value::<ContentItem>(item.clone()) {
                        Ok(ContentItem::Text { body }) => Some(body),
                        _ => None,
                    }
                });
                if text.is_some() {
                    return text;
                }
            }
            _ => {}
        }
    }

    None
}

/// Reduces an error body to its human-readable message.
fn normalize_error_body(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody::Nested { error }) => error.message,
        Ok(ErrorBody::Flat { message }) => message,
        Ok(ErrorBody::Plain { error }) => error,
        Err(_) => body.trim().to_string(),
    }
}

async fn http_error(response: reqwest::Response) -> DomainError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = normalize_error_body(&body);
    warn!("Upstream returned {status}: {message}");
    DomainError::upstream_http(status.as_u16(), message)
}

#[async_trait]
impl UpstreamClient for HttpUpstreamClient {
    async fn submit_prompt(
        &self,
        prompt: &str,
        model_id: &str,
        conversation_id: Option<&str>,
    ) -> Result<PendingRetrieval, DomainError> {
        if self.credential.is_none() {
            return Err(DomainError::upstream_unavailable(
                "no upstream credential configured",
            ));
        }

        let payload = ChatInput::text(
            conversation_id.map(str::to_string),
            prompt,
            Some(model_id.to_string()),
        );
        let url = format!("{}{}", self.base_url, CONVERSATION_PATH);

        let response = self
            .authorize(self.client.post(&url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(http_error(response).await);
        }

        let requested: MessageRequestedResponse = response.json().await.map_err(|e| {
            DomainError::internal(format!("failed to parse upstream submission response: {e}"))
        })?;

        debug!(
            "Upstream accepted prompt: conversation {}, message {}",
            requested.conversation_id, requested.message.id
        );

        Ok(PendingRetrieval::new(
            requested.conversation_id,
            requested.message.id,
        ))
    }

    async fn fetch_message(
        &self,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<FetchedMessage, DomainError> {
        let url = self.message_url(conversation_id, message_id)?;

        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DomainError::not_ready(conversation_id, message_id));
        }
        if !status.is_success() {
            return Err(http_error(response).await);
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        let payload = match serde_json::from_str::<Value>(&body) {
            Ok(payload) => payload,
            Err(_) => return Ok(FetchedMessage::Raw(Value::String(body))),
        };

        Ok(match extract_text(&payload) {
            Some(text) => FetchedMessage::Text(text),
            None => FetchedMessage::Raw(payload),
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}
