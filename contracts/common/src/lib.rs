//! ETHPool Common Library
//!
//! Shared types, constants, and utilities for the ETHPool reward ledger.
//!
//! ## Model
//!
//! - **Depositors** add principal to a single pool and later withdraw it
//!   together with their share of every reward injected while they were in.
//! - **Team** is the one identity allowed to inject rewards. It never holds
//!   a deposit entry.
//! - **Accumulator**: a fixed-point "reward per unit of principal" counter.
//!   Each entry keeps a checkpoint of it (reward debt), so every operation is
//!   O(1) regardless of how many depositors exist.
//!
//! All amounts are unsigned integers in the smallest indivisible unit
//! (wei for an 18-decimal asset). Nothing in this crate uses floating point.
//!
//! This crate is `no_std` compatible when built without the default `std`
//! feature.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Re-export collections for submodules based on feature
#[cfg(not(feature = "std"))]
pub use alloc::{string::String, vec::Vec};
#[cfg(feature = "std")]
pub use std::{string::String, vec::Vec};

pub mod amount;
pub mod constants;
pub mod errors;
pub mod events;
pub mod math;
pub mod types;
pub mod validation;

// Re-exports for convenience
pub use amount::{format_amount, parse_amount};
pub use errors::*;
pub use events::*;
pub use math::*;
pub use types::*;
