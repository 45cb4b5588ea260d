//! Error types for store operations

use thiserror::Error;
use uuid::Uuid;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while mutating or querying the store.
///
/// Fetching an annotation that does not exist is not an error; those
/// queries return `Option::None`. These variants cover malformed input,
/// addresses that do not resolve, and missing parent scopes on writes.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("{what} does not resolve at {address}")]
    Referential { what: &'static str, address: String },

    #[error("article {0} not found")]
    ArticleNotFound(Uuid),

    #[error("sentence {sentence_id} not found in article {article_id}")]
    SentenceNotFound { article_id: Uuid, sentence_id: u32 },

    #[error("vocabulary entry {0} not found")]
    EntryNotFound(Uuid),

    #[error("grammar rule {0} not found")]
    RuleNotFound(Uuid),

    #[error("snapshot serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl StoreError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        StoreError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn referential(what: &'static str, address: impl ToString) -> Self {
        StoreError::Referential {
            what,
            address: address.to_string(),
        }
    }
}
