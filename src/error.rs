//! Error taxonomy for the memory engine and its HTTP surface.
//!
//! Every failure a request can hit maps to exactly one [`MnemoError`] kind, so
//! callers can distinguish bad input, embedding outages, missing records, and
//! storage faults without parsing messages.

use crate::embedding::EmbedError;
use crate::memory::vector::SimilarityError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MnemoError {
    /// A required request field is missing or malformed. Reported before any
    /// store or embedder access is attempted.
    #[error("{0}")]
    Validation(String),

    /// The embedding service was unreachable, timed out, or returned malformed
    /// data. The whole operation fails; nothing is partially applied.
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbedError),

    /// A referenced learning id does not exist.
    #[error("learning not found: {0}")]
    NotFound(i64),

    /// A learning cannot supersede itself.
    #[error("learning {0} cannot supersede itself")]
    SelfSupersession(i64),

    /// Similarity computation over stored vectors failed (dimension mismatch
    /// or zero-magnitude vector in the store).
    #[error(transparent)]
    Similarity(#[from] SimilarityError),

    /// Underlying persistence failure.
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// Runtime plumbing failure (blocking task panicked, lock poisoned).
    #[error("internal error: {0}")]
    Internal(String),
}

impl MnemoError {
    /// Stable machine-readable kind, used in error response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Embedding(_) => "embedding",
            Self::NotFound(_) => "not_found",
            Self::SelfSupersession(_) => "self_supersession",
            Self::Similarity(_) => "similarity",
            Self::Store(_) => "store",
            Self::Internal(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Embedding(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::SelfSupersession(_) => StatusCode::CONFLICT,
            Self::Similarity(_) | Self::Store(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for MnemoError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error = %self, "request failed");
        } else {
            tracing::debug!(kind = self.kind(), error = %self, "request rejected");
        }
        let body = json!({
            "error": {
                "kind": self.kind(),
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinct() {
        let errors = [
            MnemoError::Validation("missing field".into()),
            MnemoError::NotFound(7),
            MnemoError::SelfSupersession(7),
        ];
        let kinds: Vec<_> = errors.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec!["validation", "not_found", "self_supersession"]);
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            MnemoError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(MnemoError::NotFound(1).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            MnemoError::SelfSupersession(1).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            MnemoError::Similarity(SimilarityError::DegenerateVector).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
