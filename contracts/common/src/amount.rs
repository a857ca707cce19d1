//! Display Amount Conversion
//!
//! Callers hold amounts as decimal text ("1.5" ETH); the ledger only takes
//! smallest-unit integers. These helpers convert in both directions without
//! going through floating point.

use core::fmt::Write;

use crate::constants::token::MAX_DECIMALS;
use crate::errors::{AmountErrorReason, PoolError, PoolResult};
use crate::String;

fn unit(decimals: u8) -> PoolResult<u128> {
    if decimals > MAX_DECIMALS {
        return Err(PoolError::InvalidInput {
            param: "decimals",
            reason: "precision exceeds 38 decimal places",
        });
    }
    Ok(10u128.pow(decimals as u32))
}

fn digits(text: &str) -> PoolResult<u128> {
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PoolError::InvalidInput {
            param: "amount",
            reason: "not a decimal number",
        });
    }
    text.bytes().try_fold(0u128, |acc, b| {
        acc.checked_mul(10)
            .and_then(|v| v.checked_add((b - b'0') as u128))
            .ok_or(PoolError::Overflow)
    })
}

/// Parse decimal text into smallest units
///
/// `parse_amount("1.5", 18)` is `1_500_000_000_000_000_000`.
///
/// # Errors
/// * `InvalidInput` - empty or malformed text, or more fractional digits
///   than `decimals`
/// * `InvalidAmount` - a leading minus sign
/// * `Overflow` - value does not fit in `u128`
pub fn parse_amount(text: &str, decimals: u8) -> PoolResult<u128> {
    let scale = unit(decimals)?;
    let text = text.trim();

    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let (whole, fraction) = match body.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (body, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(PoolError::InvalidInput {
            param: "amount",
            reason: "empty",
        });
    }
    if fraction.len() > decimals as usize {
        return Err(PoolError::InvalidInput {
            param: "amount",
            reason: "too many decimal places",
        });
    }

    let whole_units = digits(whole)?
        .checked_mul(scale)
        .ok_or(PoolError::Overflow)?;
    let padding = unit(decimals - fraction.len() as u8)?;
    let fraction_units = digits(fraction)?
        .checked_mul(padding)
        .ok_or(PoolError::Overflow)?;
    let amount = whole_units
        .checked_add(fraction_units)
        .ok_or(PoolError::Overflow)?;

    if negative && amount > 0 {
        return Err(PoolError::InvalidAmount {
            amount,
            reason: AmountErrorReason::Negative,
        });
    }
    Ok(amount)
}

/// Render smallest units as decimal text, trimming trailing zeros
///
/// `format_amount(1_500_000_000_000_000_000, 18)` is `"1.5"`.
pub fn format_amount(value: u128, decimals: u8) -> PoolResult<String> {
    let scale = unit(decimals)?;
    let whole = value / scale;
    let fraction = value % scale;

    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write!(out, "{}", whole);
    if fraction > 0 {
        let mut padded = String::new();
        let _ = write!(padded, "{:0width$}", fraction, width = decimals as usize);
        out.push('.');
        out.push_str(padded.trim_end_matches('0'));
    }
    Ok(out)
}
