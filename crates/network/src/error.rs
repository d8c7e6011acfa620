use thiserror::Error;

pub type Result<T> = std::result::Result<T, NetworkError>;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(String),
}

impl NetworkError {
    /// Transient failures worth retrying with the same request
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::Connection(_) | NetworkError::Timeout(_) => true,
            NetworkError::Http { status, .. } => *status >= 500,
            NetworkError::Config(_) | NetworkError::Decode(_) => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            NetworkError::Timeout(e.to_string())
        } else if e.is_connect() || e.is_request() {
            NetworkError::Connection(e.to_string())
        } else if e.is_decode() || e.is_body() {
            NetworkError::Decode(e.to_string())
        } else {
            NetworkError::Connection(e.to_string())
        }
    }
}
