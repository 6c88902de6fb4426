use thiserror::Error;

/// Failure modes of an API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status code. The body text is
    /// carried along for callers that want to show the server's message.
    #[error("Request failed with status code {status}")]
    Status { status: u16, body: String },

    /// The request never completed: connect, timeout, proxy or decode errors.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// Status code for [`ApiError::Status`] responses.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(_) => None,
        }
    }
}
