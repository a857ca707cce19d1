//! Fixed-Point Math for the ETHPool Ledger
//!
//! Accumulator arithmetic with floor division. Products of two `u128`
//! values are formed in `U256` so they cannot overflow before the divide.

use primitive_types::U256;

use crate::constants::pool::SCALE_FACTOR;
use crate::errors::{PoolError, PoolResult};

/// Computes `a * b / denominator`, rounding down
pub fn mul_div(a: u128, b: u128, denominator: u128) -> PoolResult<u128> {
    if denominator == 0 {
        return Err(PoolError::DivisionByZero);
    }

    // u128 * u128 always fits in 256 bits
    let quotient = U256::from(a) * U256::from(b) / U256::from(denominator);
    narrow(quotient)
}

fn narrow(value: U256) -> PoolResult<u128> {
    if value > U256::from(u128::MAX) {
        return Err(PoolError::Overflow);
    }
    Ok(value.low_u128())
}

/// Accumulator increment for a reward spread over `total_principal`
///
/// increment = amount * SCALE_FACTOR / total_principal
///
/// The remainder of the division is dust: at most `total_principal - 1`
/// scaled units per injection stay in the pool unattributed.
pub fn reward_per_unit(amount: u128, total_principal: u128) -> PoolResult<u128> {
    mul_div(amount, SCALE_FACTOR, total_principal)
}

/// Reward accrued by `principal` since its checkpoint
///
/// reward = principal * (acc - reward_debt) / SCALE_FACTOR
///
/// # Arguments
/// * `principal` - Entry principal
/// * `acc_reward_per_unit` - Current accumulator
/// * `reward_debt` - Entry's accumulator checkpoint
pub fn accrued_reward(
    principal: u128,
    acc_reward_per_unit: u128,
    reward_debt: u128,
) -> PoolResult<u128> {
    // The accumulator never decreases, so a checkpoint above it means
    // nothing has accrued.
    let delta = acc_reward_per_unit.saturating_sub(reward_debt);
    if principal == 0 || delta == 0 {
        return Ok(0);
    }
    mul_div(principal, delta, SCALE_FACTOR)
}

/// Principal plus accrued reward, saturating at `u128::MAX`
///
/// Used by read paths, which never fail.
pub fn claimable_total(principal: u128, acc_reward_per_unit: u128, reward_debt: u128) -> u128 {
    let reward = accrued_reward(principal, acc_reward_per_unit, reward_debt)
        .unwrap_or(u128::MAX);
    principal.saturating_add(reward)
}

/// Safe addition with overflow check
pub fn safe_add(a: u128, b: u128) -> PoolResult<u128> {
    a.checked_add(b).ok_or(PoolError::Overflow)
}

/// Safe subtraction with underflow check
pub fn safe_sub(a: u128, b: u128) -> PoolResult<u128> {
    a.checked_sub(b).ok_or(PoolError::Underflow)
}
