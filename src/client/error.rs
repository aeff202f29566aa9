use reqwest::StatusCode;
use thiserror::Error;

/// Why a call to the identity service failed.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never produced a usable response.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("request failed with status {status}")]
    Api {
        status: StatusCode,
        /// The `error` field of the response body, when there was one.
        message: Option<String>,
    },

    /// The request was never sent, there being no stored token.
    #[error("not signed in")]
    NotSignedIn,
}

impl ClientError {
    /// Whether the service rejected the caller's identity.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            ClientError::Api { status, .. } => *status == StatusCode::UNAUTHORIZED,
            ClientError::NotSignedIn => true,
            ClientError::Transport(_) => false,
        }
    }

    /// The message to show a user: the server's own text when it sent one,
    /// otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Api {
                message: Some(message),
                ..
            } => message.clone(),
            ClientError::Transport(e) => e.to_string(),
            _ => fallback.to_string(),
        }
    }
}
