//! Error taxonomy for the ApiPort client.

use std::sync::Arc;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by the credential manager, the dispatcher and the client
/// facade.
///
/// The type is `Clone` so that one login outcome can be handed to every
/// caller waiting on it.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Missing or unusable identity. Fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The token endpoint rejected the identity or answered with a body
    /// that carries no access token.
    #[error("Authentication failed: {message}")]
    Authentication {
        status: Option<StatusCode>,
        message: String,
    },

    /// A domain call returned a non-2xx status.
    #[error("Request failed with status {status}: {body}")]
    Remote { status: StatusCode, body: String },

    /// The request never completed: DNS, connect, TLS or timeout.
    #[error("Transport failure: {0}")]
    Transport(#[source] Arc<reqwest::Error>),

    /// A 2xx response whose body is not JSON.
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// Rejected locally before any request was sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(Arc::new(e))
    }
}

impl ClientError {
    /// HTTP status attached to the failure, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Authentication { status, .. } => *status,
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
