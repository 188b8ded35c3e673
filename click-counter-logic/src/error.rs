use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::types::ServerFrame;

/// Error taxonomy from `spec.md §7`. Kinds, not wrapped types — callers match
/// on the variant to decide retry behavior, not on the inner cause.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Malformed envelope, bad base64, bad JSON, or missing `country`. Never
    /// retry — the bus must not redeliver this message.
    #[error("bad input: {0}")]
    PermanentBadInput(String),

    /// Store read/write failed; the caller's deadline may have expired.
    /// Retriable.
    #[error("store error: {0}")]
    TransientStore(#[from] sea_orm::DbErr),

    /// Geolocation or internal-broadcast call failed. Degrade, don't fail.
    #[error("upstream error: {0}")]
    TransientUpstream(String),

    /// Bus publish failed. Surfaced to the session as a non-fatal error, not
    /// an HTTP failure.
    #[error("bus publish error: {0}")]
    TransientPublish(String),

    /// Per-session click cap exceeded.
    #[error("rate limit exceeded")]
    RateLimited,

    /// Idempotent replay: the message was already applied.
    #[error("already applied")]
    AlreadyApplied,

    /// Misconfiguration. Abort startup.
    #[error("fatal: {0}")]
    Fatal(String),
}

impl ServiceError {
    /// Whether a caller delivering this message over the bus should retry.
    pub fn is_retriable(&self) -> bool {
        matches!(self, ServiceError::TransientStore(_))
    }
}

/// Processor's `POST /process` maps errors onto HTTP status so the bus
/// applies correct retry semantics (§7): 200 for success/`AlreadyApplied`,
/// 400 for `PermanentBadInput`, 500 for anything retriable.
impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::PermanentBadInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::AlreadyApplied => StatusCode::OK,
            ServiceError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ServiceError::TransientStore(_)
            | ServiceError::TransientUpstream(_)
            | ServiceError::TransientPublish(_)
            | ServiceError::Fatal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string(),
        }))
    }
}

/// Renders an error as the `click_error` frame the hub pushes back to a
/// session on a non-fatal click failure (§7, §4.G).
impl From<&ServiceError> for ServerFrame {
    fn from(err: &ServiceError) -> Self {
        ServerFrame::click_error(err.to_string())
    }
}
