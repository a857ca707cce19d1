//! Error Types for the ETHPool Ledger
//!
//! Every error is non-transient: repeating the same call with the same
//! caller and arguments fails the same way. Each precondition is checked
//! before any state is touched, so an `Err` never leaves a partial update.

use core::fmt;

use thiserror::Error;

use crate::types::Address;

/// Result type alias for ledger operations
pub type PoolResult<T> = Result<T, PoolError>;

/// Main error enum for all ledger errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    // ============ Amount Errors ============
    /// Deposit or reward amount is zero (or negative when parsed from text)
    #[error("invalid amount {amount}: {reason}")]
    InvalidAmount { amount: u128, reason: AmountErrorReason },

    // ============ Authorization Errors ============
    /// Caller identity is not allowed to perform the operation
    #[error("{operation}")]
    Unauthorized { operation: RestrictedOp, caller: Address },

    /// Invalid address (e.g., zero address configured as team)
    #[error("invalid address: {reason}")]
    InvalidAddress { reason: &'static str },

    // ============ Pool Errors ============
    /// Reward injected while no principal is deposited
    #[error("cannot add rewards to an empty pool: nobody would be able to withdraw them")]
    EmptyPool,

    /// Withdraw requested by an address holding no principal
    #[error("nothing to withdraw")]
    NothingToWithdraw { depositor: Address },

    // ============ Math Errors ============
    /// Arithmetic overflow occurred
    #[error("arithmetic overflow")]
    Overflow,

    /// Arithmetic underflow occurred
    #[error("arithmetic underflow")]
    Underflow,

    /// Division by zero
    #[error("division by zero")]
    DivisionByZero,

    // ============ Input Errors ============
    /// Invalid input parameter
    #[error("invalid {param}: {reason}")]
    InvalidInput { param: &'static str, reason: &'static str },

    /// Snapshot bytes or contents rejected on restore
    #[error("invalid snapshot: {reason}")]
    InvalidSnapshot { reason: &'static str },

    /// Subscriber limit reached on a shared ledger
    #[error("too many subscribers (maximum {maximum})")]
    TooManySubscribers { maximum: usize },
}

/// Reasons for amount-related errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountErrorReason {
    /// Amount is zero when non-zero required
    Zero,
    /// Negative amount (only reachable from text input)
    Negative,
}

impl fmt::Display for AmountErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zero => f.write_str("amount must be greater than zero"),
            Self::Negative => f.write_str("amount cannot be negative"),
        }
    }
}

/// Operations guarded by caller identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestrictedOp {
    /// Team tried to deposit as a participant
    Deposit,
    /// Team tried to withdraw as a participant
    Withdraw,
    /// Non-team caller tried to inject a reward
    InjectReward,
}

impl fmt::Display for RestrictedOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deposit => f.write_str("ETHPool team cannot deposit"),
            Self::Withdraw => f.write_str("ETHPool team cannot withdraw"),
            Self::InjectReward => f.write_str("sender not authorized"),
        }
    }
}

impl PoolError {
    /// Returns a stable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidAmount { .. } => "E010_INVALID_AMOUNT",
            Self::Unauthorized { .. } => "E020_UNAUTHORIZED",
            Self::InvalidAddress { .. } => "E021_INVALID_ADDRESS",
            Self::EmptyPool => "E030_EMPTY_POOL",
            Self::NothingToWithdraw { .. } => "E031_NOTHING_TO_WITHDRAW",
            Self::Overflow => "E080_OVERFLOW",
            Self::Underflow => "E081_UNDERFLOW",
            Self::DivisionByZero => "E082_DIV_ZERO",
            Self::InvalidInput { .. } => "E090_INVALID_INPUT",
            Self::InvalidSnapshot { .. } => "E091_INVALID_SNAPSHOT",
            Self::TooManySubscribers { .. } => "E100_TOO_MANY_SUBSCRIBERS",
        }
    }

    /// Returns true if the error came from a caller precondition rather
    /// than from arithmetic or decoding
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount { .. }
                | Self::Unauthorized { .. }
                | Self::EmptyPool
                | Self::NothingToWithdraw { .. }
        )
    }
}
