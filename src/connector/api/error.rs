use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::application::RetrievalFailure;
use crate::domain::DomainError;

/// Uniform error body returned by every route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
    /// Status the upstream answered with, for upstream rejections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::from(DomainError::invalid_input(msg))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &ErrorBody {
        &self.body
    }
}

pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::NotFound(_) | DomainError::NotReady { .. } => StatusCode::NOT_FOUND,
        DomainError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        DomainError::UpstreamUnavailable(_) | DomainError::Cancelled => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        DomainError::UpstreamHttp { .. } => StatusCode::BAD_GATEWAY,
        DomainError::RetriesExhausted { .. } => StatusCode::GATEWAY_TIMEOUT,
        DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        RetrievalFailure::new(error).into()
    }
}

impl From<RetrievalFailure> for ApiError {
    fn from(failure: RetrievalFailure) -> Self {
        let upstream_status = match &failure.error {
            DomainError::UpstreamHttp { status, .. } => Some(*status),
            _ => None,
        };

        Self {
            status: status_for(&failure.error),
            body: ErrorBody {
                kind: failure.kind().to_string(),
                message: failure.error.to_string(),
                upstream_status,
                conversation_id: failure.conversation_id,
                message_id: failure.message_id,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
