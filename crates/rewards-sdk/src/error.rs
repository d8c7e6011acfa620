use thiserror::Error;

pub type Result<T> = std::result::Result<T, SdkError>;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Network error: {0}")]
    Network(#[from] rewards_network::NetworkError),

    /// The ledger refused the request. Terminal: never retried
    #[error("Rejected by relayer ({kind}): {message}")]
    Rejected { kind: String, message: String },

    #[error("Gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SdkError {
    pub fn is_retryable(&self) -> bool {
        match self {
            SdkError::Network(e) => e.is_retryable(),
            _ => false,
        }
    }

    pub fn rejection_kind(&self) -> Option<&str> {
        match self {
            SdkError::Rejected { kind, .. } => Some(kind),
            _ => None,
        }
    }
}
