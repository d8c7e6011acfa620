use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rewards_ledger::LedgerError;
use rewards_sdk::api::ErrorBody;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RelayerError>;

#[derive(Error, Debug)]
pub enum RelayerError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No authorization signer configured")]
    SignerUnavailable,

    #[error("Missing or invalid operator API key")]
    Unauthenticated,

    #[error("Operator API disabled: no RELAYER_API_KEY configured")]
    OperatorApiDisabled,

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelayerError {
    pub fn kind(&self) -> &'static str {
        match self {
            RelayerError::Ledger(e) => e.kind(),
            RelayerError::InvalidRequest(_) => "InvalidRequest",
            RelayerError::NotFound(_) => "NotFound",
            RelayerError::SignerUnavailable => "SignerUnavailable",
            RelayerError::Unauthenticated => "Unauthenticated",
            RelayerError::OperatorApiDisabled => "OperatorApiDisabled",
            RelayerError::Persistence(_) => "Persistence",
            RelayerError::Internal(_) => "Internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RelayerError::Ledger(e) => match e {
                LedgerError::InvalidSignature => StatusCode::UNAUTHORIZED,
                LedgerError::Unauthorized { .. } => StatusCode::FORBIDDEN,
                LedgerError::AuthorizationReplayed(_) => StatusCode::CONFLICT,
                LedgerError::AuthorizationExpired { .. } => StatusCode::GONE,
                LedgerError::Paused => StatusCode::LOCKED,
                LedgerError::ReentrancyDetected | LedgerError::Hook(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                _ => StatusCode::BAD_REQUEST,
            },
            RelayerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RelayerError::NotFound(_) => StatusCode::NOT_FOUND,
            RelayerError::SignerUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            RelayerError::Unauthenticated => StatusCode::UNAUTHORIZED,
            RelayerError::OperatorApiDisabled => StatusCode::FORBIDDEN,
            RelayerError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RelayerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayerError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            success: false,
            error: self.to_string(),
            kind: self.kind().to_string(),
        });

        (self.status(), body).into_response()
    }
}
