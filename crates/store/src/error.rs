//! Error types for the store.

use thiserror::Error;

use crate::entity::EntityKind;

/// The primary error type for all store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Required fields were missing or empty on insert.
    #[error("missing required fields: {}", fields.join(", "))]
    Validation {
        /// The offending field names.
        fields: Vec<String>,
    },

    /// A field carried a value outside its allowed set.
    #[error("invalid value for {field}: {value}")]
    InvalidValue {
        /// The offending field.
        field: String,
        /// The rejected value.
        value: String,
    },

    /// An insert would violate code or sequence uniqueness.
    #[error("duplicate {} key: {key}", entity.label())]
    DuplicateKey {
        /// The entity kind of the rejected document.
        entity: EntityKind,
        /// The offending code or sequence value.
        key: String,
    },

    /// A keyed lookup found no matching document.
    #[error("{} not found: {key}", entity.label())]
    NotFound {
        /// The entity kind that was searched.
        entity: EntityKind,
        /// The key value that failed to match.
        key: String,
    },

    /// The primary store could not be reached during startup.
    #[error("primary store unavailable after {attempts} attempt(s): {message}")]
    Unavailable {
        /// How many connection attempts were made.
        attempts: u32,
        /// The last underlying error.
        message: String,
    },

    /// Any other backend failure.
    #[error("backend error: {message}")]
    Backend {
        /// The underlying error message.
        message: String,
    },

    /// Document (de)serialization failed.
    #[error("serialization error: {message}")]
    Serialization {
        /// The underlying error message.
        message: String,
    },
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Backend {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Backend {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_key_display() {
        let err = StoreError::DuplicateKey {
            entity: EntityKind::Software,
            key: "SWM-2403-007".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate software key: SWM-2403-007");
    }

    #[test]
    fn test_not_found_display() {
        let err = StoreError::NotFound {
            entity: EntityKind::SystemUpdate,
            key: "UPD2403001".to_string(),
        };
        assert_eq!(err.to_string(), "system update not found: UPD2403001");
    }

    #[test]
    fn test_validation_display() {
        let err = StoreError::Validation {
            fields: vec!["vocCategory".to_string(), "status".to_string()],
        };
        assert_eq!(err.to_string(), "missing required fields: vocCategory, status");
    }
}
