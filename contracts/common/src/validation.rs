//! Validation Helpers for the ETHPool Ledger
//!
//! Precondition checks shared by every ledger operation. Each returns the
//! error the caller should see; none of them touch state.
//!
//! ```rust,ignore
//! use ethpool_common::validation::{check, require_positive};
//!
//! check!(amount > 0, PoolError::InvalidAmount { amount, reason: AmountErrorReason::Zero });
//! require_positive(amount)?;
//! ```

use crate::{
    constants::addresses,
    errors::{AmountErrorReason, PoolError, PoolResult, RestrictedOp},
    types::{Address, PoolConfig},
};

// ============ Validation Macro ============

/// Check a condition and return an error if it fails.
#[macro_export]
macro_rules! check {
    ($condition:expr, $error:expr) => {
        if !($condition) {
            return Err($error);
        }
    };
}

pub use check;

// ============ Amount Checks ============

/// Validates that a deposit or reward amount is non-zero
pub fn require_positive(amount: u128) -> PoolResult<()> {
    check!(
        amount > 0,
        PoolError::InvalidAmount {
            amount,
            reason: AmountErrorReason::Zero,
        }
    );
    Ok(())
}

// ============ Identity Checks ============

/// Validates that `caller` is the configured team
pub fn require_team(config: &PoolConfig, caller: &Address) -> PoolResult<()> {
    check!(
        config.is_team(caller),
        PoolError::Unauthorized {
            operation: RestrictedOp::InjectReward,
            caller: *caller,
        }
    );
    Ok(())
}

/// Validates that `caller` is an ordinary depositor for `operation`
pub fn require_depositor(
    config: &PoolConfig,
    caller: &Address,
    operation: RestrictedOp,
) -> PoolResult<()> {
    check!(
        *caller != addresses::ZERO,
        PoolError::InvalidAddress {
            reason: "depositor cannot be the zero address",
        }
    );
    check!(
        !config.is_team(caller),
        PoolError::Unauthorized {
            operation,
            caller: *caller,
        }
    );
    Ok(())
}

/// Validates a configuration before a ledger is built on it
pub fn validate_config(config: &PoolConfig) -> PoolResult<()> {
    check!(
        config.has_valid_team(),
        PoolError::InvalidAddress {
            reason: "team cannot be the zero address",
        }
    );
    Ok(())
}
