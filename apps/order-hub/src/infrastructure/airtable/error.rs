//! Airtable-specific error types.

use thiserror::Error;

use crate::application::ports::SourceError;

/// Errors from the Airtable adapter.
#[derive(Debug, Error, Clone)]
pub enum AirtableError {
    /// Network or HTTP-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The token was rejected by the provider.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The provider returned an error response.
    #[error("provider error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Provider-supplied error message.
        message: String,
    },

    /// No base with the configured name is visible to the token.
    #[error("base `{name}` not found")]
    BaseNotFound {
        /// The base name that failed to resolve.
        name: String,
    },
}

impl From<AirtableError> for SourceError {
    fn from(err: AirtableError) -> Self {
        match err {
            AirtableError::Transport(msg) => Self::Transport(msg),
            AirtableError::Decode(msg) => Self::Decode(msg),
            AirtableError::AuthenticationFailed => Self::Api {
                status: 401,
                message: "authentication failed".to_string(),
            },
            AirtableError::Api { status, message } => Self::Api { status, message },
            AirtableError::BaseNotFound { name } => Self::Api {
                status: 404,
                message: format!("base `{name}` not found"),
            },
        }
    }
}
