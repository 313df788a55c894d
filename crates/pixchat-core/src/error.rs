use thiserror::Error;

/// Shown when the assistant service can't be reached at all
pub const CONNECTIVITY_MESSAGE: &str =
    "Cannot connect to server. Please check if the backend is running.";

/// Shown for every other failed ask
pub const GENERIC_FAILURE_MESSAGE: &str = "Sorry, there was an issue getting a response.";

/// Why a call to the assistant or user directory failed
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("cannot reach server: {0}")]
    Connectivity(String),

    #[error("server responded with status {status}")]
    Service { status: u16 },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("request task ended unexpectedly: {0}")]
    Task(String),
}

impl ChatError {
    pub fn is_connectivity(&self) -> bool {
        matches!(self, ChatError::Connectivity(_))
    }

    /// Text appended to the conversation in place of a reply
    pub fn user_message(&self) -> &'static str {
        if self.is_connectivity() {
            CONNECTIVITY_MESSAGE
        } else {
            GENERIC_FAILURE_MESSAGE
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            ChatError::Service {
                status: status.as_u16(),
            }
        } else if err.is_connect() || err.is_timeout() {
            ChatError::Connectivity(err.to_string())
        } else if err.is_decode() || err.is_body() {
            ChatError::Malformed(err.to_string())
        } else {
            // Request never got a response; treat like an unreachable host
            ChatError::Connectivity(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::Malformed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
