//! Error types for portal-aicore.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Result type alias using [`AiCoreError`].
pub type AiCoreResult<T> = Result<T, AiCoreError>;

/// Message returned whenever a team has no AI Core service key.
///
/// Kept identical for every operation so clients can tell it apart from
/// other authorisation failures.
pub const CREDENTIALS_NOT_CONFIGURED: &str = "AI Core credentials are not configured for your team";

/// Errors produced while serving AI Core requests.
#[derive(Debug, thiserror::Error)]
pub enum AiCoreError {
    /// Malformed or contradictory client input.
    #[error("{0}")]
    InvalidRequest(String),

    /// A required field is missing or empty.
    #[error("{field} is required")]
    Validation {
        /// Name of the first failing field.
        field: String,
    },

    /// No verified caller identity.
    #[error("{0}")]
    Authentication(String),

    /// Caller is known but not allowed (e.g. not assigned to a team).
    #[error("{0}")]
    Authorization(String),

    /// The caller's team has no upstream credentials.
    #[error("{}", CREDENTIALS_NOT_CONFIGURED)]
    CredentialsNotConfigured {
        /// Team that was looked up.
        team: String,
    },

    /// Referenced resource does not exist upstream.
    #[error("{0}")]
    NotFound(String),

    /// Upstream platform answered with a non-success status.
    #[error("{operation} failed: upstream returned {status}: {message}")]
    Upstream {
        /// Upstream operation that failed.
        operation: &'static str,
        /// HTTP status returned by the platform.
        status: u16,
        /// Raw response body or reason.
        message: String,
    },

    /// HTTP transport error talking to the platform.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Credential store failure.
    #[error("credential store error: {0}")]
    Credentials(#[from] portal_credentials::CredentialsError),

    /// The request did not produce a response in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AiCoreError {
    /// Create an invalid-request error.
    #[must_use]
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create a validation error for a missing field.
    #[must_use]
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
        }
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Short machine-readable kind, used in logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::Validation { .. } => "validation",
            Self::Authentication(_) => "authentication",
            Self::Authorization(_) => "authorization",
            Self::CredentialsNotConfigured { .. } => "configuration",
            Self::NotFound(_) => "not_found",
            Self::Upstream { .. } => "upstream",
            Self::Http(_) => "http",
            Self::Credentials(_) => "credentials",
            Self::Timeout(_) => "timeout",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }

    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::Authorization(_) | Self::CredentialsNotConfigured { .. } => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream { .. }
            | Self::Http(_)
            | Self::Credentials(_)
            | Self::Timeout(_)
            | Self::Config(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

impl IntoResponse for AiCoreError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, kind = self.kind(), "request failed");
        } else {
            tracing::debug!(error = %self, kind = self.kind(), "request rejected");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_codes() {
        assert_eq!(
            AiCoreError::invalid_request("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AiCoreError::missing_field("name").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AiCoreError::Authentication("no token".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AiCoreError::Authorization("no team".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AiCoreError::CredentialsNotConfigured {
                team: "alpha".into()
            }
            .status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AiCoreError::NotFound("gone".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AiCoreError::Upstream {
                operation: "create deployment",
                status: 502,
                message: "bad gateway".into(),
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AiCoreError::Timeout(Duration::from_secs(30)).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages() {
        assert_eq!(
            AiCoreError::missing_field("executableId").to_string(),
            "executableId is required"
        );
        assert_eq!(
            AiCoreError::CredentialsNotConfigured {
                team: "alpha".into()
            }
            .to_string(),
            CREDENTIALS_NOT_CONFIGURED
        );
        assert_eq!(
            AiCoreError::Upstream {
                operation: "create configuration",
                status: 400,
                message: "scenario unknown".into(),
            }
            .to_string(),
            "create configuration failed: upstream returned 400: scenario unknown"
        );
    }
}
