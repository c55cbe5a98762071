use shared_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CartError {
    #[error("Cart reconciliation requires a signed-in employee")]
    NotAuthenticated,

    #[error("Missing or invalid cart session id")]
    MissingCartSession,

    #[error("Cart fetch failed: {0}")]
    FetchFailed(String),

    #[error("Unrecognized cart response envelope: {0}")]
    UnrecognizedEnvelope(String),

    #[error("Cart entry not found: {0}")]
    EntryNotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}
