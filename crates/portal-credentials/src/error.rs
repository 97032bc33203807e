//! Error types for credential storage.

use thiserror::Error;

/// Errors that can occur while loading or reading team credentials.
#[derive(Debug, Error)]
pub enum CredentialsError {
    /// The credential source variable is not set.
    #[error("credential source not found: {0}")]
    SourceNotFound(String),

    /// The credential document could not be parsed.
    #[error("failed to parse credentials: {0}")]
    Parse(#[from] serde_json::Error),

    /// The credential document parsed but is semantically invalid.
    #[error("invalid credentials: {0}")]
    Invalid(String),
}
