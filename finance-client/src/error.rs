use thiserror::Error;

use crate::domain::CategoryId;

/// The single failure channel of every store operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The server rejected a write with field-level messages (HTTP 422).
    #[error("ValidationError: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("NotFound: {0}")]
    NotFound(String),
    #[error("TransportError: {0}")]
    Transport(String),
    #[error("ParsingError: {0}")]
    Parsing(String),
    /// The category an entry points at could not be looked up, so no write was sent.
    #[error("category {category_id} could not be resolved: {source}")]
    CategoryResolution {
        category_id: CategoryId,
        #[source]
        source: Box<StoreError>,
    },
    #[error("record has no id")]
    MissingId,
}

impl StoreError {
    /// Server-provided validation messages, if this is a validation failure.
    pub fn validation_messages(&self) -> Option<&[String]> {
        match self {
            StoreError::Validation(messages) => Some(messages),
            _ => None,
        }
    }
}
