//! Client error taxonomy

use thiserror::Error;

/// Every way a client operation can fail
#[derive(Error, Debug)]
pub enum ClientError {
    /// Rejected locally; nothing was sent
    #[error("{0}")]
    Validation(String),

    /// The server answered with a non-success status
    #[error("Request failed ({status}): {message}")]
    Request { status: u16, message: String },

    /// The request never got an answer
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A view model fetch failed
    #[error("Could not load {view}: {message}")]
    Refresh { view: &'static str, message: String },

    /// The user answered no to a confirmation
    #[error("Cancelled")]
    Declined,

    #[error("Admin panel is locked")]
    Locked,

    #[error("Log in first")]
    Anonymous,

    #[error("Could not read photo: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// HTTP status of a server-side failure, if that is what this is
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
