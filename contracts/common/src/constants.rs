//! Ledger Constants
//!
//! All magic numbers for the ETHPool ledger live here.

/// Asset metadata
pub mod token {
    /// Decimal places of the smallest unit (wei)
    pub const DECIMALS: u8 = 18;
    /// One whole unit expressed in the smallest unit (1 ETH = 1e18 wei)
    pub const ONE: u128 = 1_000_000_000_000_000_000;
    /// Largest decimal precision `parse_amount` accepts
    pub const MAX_DECIMALS: u8 = 38;
}

/// Reward pool parameters
pub mod pool {
    /// Fixed-point scale for the reward-per-unit accumulator (1e18)
    pub const SCALE_FACTOR: u128 = 1_000_000_000_000_000_000;

    /// Upper bound on event subscribers attached to one shared ledger
    pub const MAX_SUBSCRIBERS: usize = 64;
}

/// Addresses with special meaning
pub mod addresses {
    use crate::types::Address;

    /// The all-zero address; never a valid team or depositor
    pub const ZERO: Address = [0u8; 32];
}
