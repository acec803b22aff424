use std::time::Duration;

use thiserror::Error;

/// Failure of one model invocation. Every variant counts as transient for slot
/// generation.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Model request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Model API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Invalid model response: {0}")]
    InvalidResponse(String),
    #[error("Model is not configured: {0}")]
    Unconfigured(&'static str),
}

#[derive(Debug, Error)]
pub enum SanitizeError {
    #[error("no JSON object in model output")]
    NoJsonObject,
    #[error("model output is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("model output lacks `{0}`")]
    MissingOption(&'static str),
}

/// Why a single generation attempt was rejected.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Sanitize(#[from] SanitizeError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("stored menu is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("menu store lock poisoned")]
    Poisoned,
}

/// Errors visible to callers of the inbound menu operations.
#[derive(Debug, Error)]
pub enum MenuError {
    #[error("menu store unavailable: {0}")]
    Store(#[from] StoreError),
    #[error("invalid manual menu: {0}")]
    InvalidManualMenu(String),
}
