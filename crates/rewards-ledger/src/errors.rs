use thiserror::Error;

use crate::types::{ActionId, Address, Amount, BadgeId, Role};

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Every failure aborts the operation with no state change
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Account {account} is not authorized: requires {required}")]
    Unauthorized { account: Address, required: String },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient allowance: have {have}, need {need}")]
    InsufficientAllowance { have: Amount, need: Amount },

    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: Amount, need: Amount },

    #[error("Array length mismatch: {left} vs {right}")]
    ArrayLengthMismatch { left: usize, right: usize },

    #[error("Batch is empty")]
    EmptyBatch,

    #[error("Batch too large: {len} entries (max {max})")]
    BatchTooLarge { len: usize, max: usize },

    #[error("Authorization expired at {deadline} (now {now})")]
    AuthorizationExpired { deadline: u64, now: u64 },

    #[error("Authorization {0} already used")]
    AuthorizationReplayed(ActionId),

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Badge {0} is soulbound and cannot be transferred")]
    SoulboundTransferNotAllowed(BadgeId),

    #[error("Reentrant call detected")]
    ReentrancyDetected,

    #[error("Ledger is paused")]
    Paused,

    #[error("Ledger is not paused")]
    NotPaused,

    #[error("Zero address not allowed")]
    ZeroAddress,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Redemption hook failed: {0}")]
    Hook(String),
}

impl LedgerError {
    pub fn missing_role(account: Address, role: Role) -> Self {
        LedgerError::Unauthorized {
            account,
            required: role.to_string(),
        }
    }

    /// Stable machine-readable name, used on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::Unauthorized { .. } => "Unauthorized",
            LedgerError::InvalidAmount(_) => "InvalidAmount",
            LedgerError::InsufficientAllowance { .. } => "InsufficientAllowance",
            LedgerError::InsufficientBalance { .. } => "InsufficientBalance",
            LedgerError::ArrayLengthMismatch { .. } => "ArrayLengthMismatch",
            LedgerError::EmptyBatch => "EmptyBatch",
            LedgerError::BatchTooLarge { .. } => "BatchTooLarge",
            LedgerError::AuthorizationExpired { .. } => "AuthorizationExpired",
            LedgerError::AuthorizationReplayed(_) => "AuthorizationReplayed",
            LedgerError::InvalidSignature => "InvalidSignature",
            LedgerError::SoulboundTransferNotAllowed(_) => "SoulboundTransferNotAllowed",
            LedgerError::ReentrancyDetected => "ReentrancyDetected",
            LedgerError::Paused => "Paused",
            LedgerError::NotPaused => "NotPaused",
            LedgerError::ZeroAddress => "ZeroAddress",
            LedgerError::ArithmeticOverflow => "ArithmeticOverflow",
            LedgerError::Hook(_) => "Hook",
        }
    }
}
