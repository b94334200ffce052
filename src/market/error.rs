use thiserror::Error as ThisError;

/// Failure kinds returned by ledger operations. The numeric codes are part of the
/// external call interface and must stay stable.
#[derive(ThisError, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketError {
    #[error("record not found")]
    NotFound,
    #[error("insufficient storage")]
    InsufficientStorage,
    /// Reserved. Repeat registration reports `Unauthorized`.
    #[error("provider already registered")]
    AlreadyRegistered,
    #[error("invalid amount")]
    InvalidAmount,
    #[error("unauthorized")]
    Unauthorized,
    /// The record is finished: a completed contract or a resolved dispute.
    #[error("already completed")]
    AlreadyCompleted,
    #[error("already disputed")]
    AlreadyDisputed,
    #[error("not active")]
    NotActive,
    #[error("arithmetic overflow")]
    Overflow,
}

impl MarketError {
    pub fn code(&self) -> u32 {
        match self {
            MarketError::NotFound => 100,
            MarketError::InsufficientStorage => 101,
            MarketError::AlreadyRegistered => 102,
            MarketError::InvalidAmount => 103,
            MarketError::Unauthorized => 104,
            MarketError::AlreadyCompleted => 105,
            MarketError::AlreadyDisputed => 106,
            MarketError::NotActive => 107,
            MarketError::Overflow => 108,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            100 => MarketError::NotFound,
            101 => MarketError::InsufficientStorage,
            102 => MarketError::AlreadyRegistered,
            103 => MarketError::InvalidAmount,
            104 => MarketError::Unauthorized,
            105 => MarketError::AlreadyCompleted,
            106 => MarketError::AlreadyDisputed,
            107 => MarketError::NotActive,
            108 => MarketError::Overflow,
            _ => return None,
        })
    }
}

pub type Result<T> = std::result::Result<T, MarketError>;
