//! Error types for the REST layer.
//!
//! Store errors are mapped to HTTP status codes at the request boundary and
//! rendered as a JSON body of the shape `{ "message": ..., "error"?: ... }`.
//!
//! | Store error | HTTP status |
//! |-------------|-------------|
//! | Validation / InvalidValue | 400 |
//! | DuplicateKey (hardware) | 400, offending code in the message |
//! | DuplicateKey (other kinds) | 409 |
//! | NotFound | 404 |
//! | Backend / Serialization | 500 |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use assetdesk_store::{EntityKind, StoreError};

/// The primary error type for REST handlers.
#[derive(Error, Debug)]
pub enum RestError {
    /// Malformed or invalid request (HTTP 400).
    #[error("{message}")]
    BadRequest {
        /// What was wrong with the request.
        message: String,
    },

    /// The addressed document does not exist (HTTP 404).
    #[error("{message}")]
    NotFound {
        /// Which document was missing.
        message: String,
    },

    /// A uniqueness violation (HTTP 409).
    #[error("{message}")]
    Conflict {
        /// Which key collided.
        message: String,
    },

    /// Anything unexpected (HTTP 500).
    #[error("internal server error: {detail}")]
    Internal {
        /// The underlying error message.
        detail: String,
    },
}

/// Result type alias for REST handlers.
pub type RestResult<T> = Result<T, RestError>;

impl RestError {
    /// A 400 with the given message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        RestError::BadRequest {
            message: message.into(),
        }
    }

    /// Maps a store error raised for the given entity kind.
    ///
    /// Duplicate hardware codes come back as 400 rather than 409; the legacy
    /// clients of this API branch on that.
    pub fn from_store(kind: EntityKind, err: StoreError) -> Self {
        match err {
            StoreError::Validation { .. } | StoreError::InvalidValue { .. } => {
                RestError::BadRequest {
                    message: err.to_string(),
                }
            }
            StoreError::DuplicateKey { .. } if kind == EntityKind::Hardware => {
                RestError::BadRequest {
                    message: err.to_string(),
                }
            }
            StoreError::DuplicateKey { .. } => RestError::Conflict {
                message: err.to_string(),
            },
            StoreError::NotFound { .. } => RestError::NotFound {
                message: err.to_string(),
            },
            StoreError::Unavailable { .. }
            | StoreError::Backend { .. }
            | StoreError::Serialization { .. } => RestError::Internal {
                detail: err.to_string(),
            },
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            RestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            RestError::NotFound { .. } => StatusCode::NOT_FOUND,
            RestError::Conflict { .. } => StatusCode::CONFLICT,
            RestError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            RestError::Internal { detail } => {
                error!(%detail, "request failed");
                json!({ "message": "internal server error", "error": detail })
            }
            other => json!({ "message": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_mapping_differs_by_kind() {
        let err = StoreError::DuplicateKey {
            entity: EntityKind::Hardware,
            key: "HW240315-0001".to_string(),
        };
        let mapped = RestError::from_store(EntityKind::Hardware, err);
        assert!(matches!(mapped, RestError::BadRequest { ref message }
            if message.contains("HW240315-0001")));

        let err = StoreError::DuplicateKey {
            entity: EntityKind::Software,
            key: "SWM-2403-001".to_string(),
        };
        let mapped = RestError::from_store(EntityKind::Software, err);
        assert!(matches!(mapped, RestError::Conflict { .. }));
    }

    #[test]
    fn test_statuses() {
        assert_eq!(
            RestError::bad_request("x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RestError::NotFound {
                message: "x".into()
            }
            .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RestError::Internal { detail: "x".into() }.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
