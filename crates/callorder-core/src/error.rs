use thiserror::Error;

/// Top-level error type for the ordering line.
///
/// Subsystem crates define their own error types and implement
/// `From<CallOrderError>` so that `?` works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CallOrderError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Matcher error: {0}")]
    Matcher(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for CallOrderError {
    fn from(err: toml::de::Error) -> Self {
        CallOrderError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for CallOrderError {
    fn from(err: toml::ser::Error) -> Self {
        CallOrderError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for CallOrderError {
    fn from(err: serde_json::Error) -> Self {
        CallOrderError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for ordering-line operations.
pub type Result<T> = std::result::Result<T, CallOrderError>;
