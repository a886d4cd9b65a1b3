use thiserror::Error;

/// Failures reaching a chat endpoint
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{endpoint} returned {status}: {message}")]
    Remote {
        endpoint: String,
        status: u16,
        message: String,
    },
}

impl ChatError {
    pub fn remote(endpoint: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        ChatError::Remote {
            endpoint: endpoint.into(),
            status,
            message: message.into(),
        }
    }
}
