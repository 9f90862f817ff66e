use thiserror::Error;

/// Failure of a single HTTP round trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The request never produced a response (DNS, refused, TLS, ...).
    #[error("Network request failed: {0}")]
    Transport(String),
    /// Non-2xx response. `message` is the server's `error` field when it sent one.
    #[error("{message}")]
    Status { status: u16, message: String },
    /// The request body could not be serialized; nothing was sent.
    #[error("Failed to encode request: {0}")]
    Encode(String),
    /// 2xx response whose body did not match the expected envelope.
    #[error("Unexpected response from server: {0}")]
    Decode(String),
}

impl RequestError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// Everything a screen can surface to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error(transparent)]
    Request(#[from] RequestError),
    /// HTTP success but `success: false` in the envelope.
    #[error("{0}")]
    Logical(String),
    /// Local form check failed; nothing was sent.
    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
