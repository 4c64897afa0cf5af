use thiserror::Error;

pub const GENERIC_FEED_FAILURE: &'static str = "Failed to load posts";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a comment!")]
    EmptyComment,

    #[error("Please login to comment!")]
    NoSession,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Format(String),

    #[error("Request failed with status code {status}")]
    Auth {
        status: u16,
        message: Option<String>,
    },

    #[error("Request failed with status code 404")]
    NotFound { message: Option<String> },

    #[error("Request failed with status code {status}")]
    Status {
        status: u16,
        message: Option<String>,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// Message the server attached to a failed response, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Status { message, .. }
            | ClientError::Auth { message, .. }
            | ClientError::NotFound { message } => message.as_deref(),
            _ => None,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ClientError::Auth { .. })
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Format(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedErrorKind {
    Transport,
    Format,
}

/// Failure of a whole feed load. Carries the best message available for
/// the error view.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FeedError {
    pub kind: FeedErrorKind,
    pub message: String,
}

impl From<ClientError> for FeedError {
    fn from(err: ClientError) -> Self {
        let kind = match err {
            ClientError::Format(_) => FeedErrorKind::Format,
            _ => FeedErrorKind::Transport,
        };

        let message = match err.server_message() {
            Some(message) if !message.is_empty() => message.to_owned(),
            _ => {
                let text = err.to_string();
                if text.trim().is_empty() {
                    GENERIC_FEED_FAILURE.to_owned()
                } else {
                    text
                }
            }
        };

        FeedError { kind, message }
    }
}
