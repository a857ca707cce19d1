//! Core Types for the ETHPool Ledger
//!
//! Data structures shared by the ledger, its snapshots and its callers.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::constants::addresses;

/// Type alias for addresses (32-byte identity hash)
pub type Address = [u8; 32];

/// Position of an operation in the ledger's serialized history
pub type Sequence = u64;

// ============ Config ============

/// Ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolConfig {
    /// The only identity allowed to inject rewards
    pub team: Address,
}

impl PoolConfig {
    /// Creates a config with the given team identity
    pub fn new(team: Address) -> Self {
        Self { team }
    }

    /// Whether `address` is the configured team
    pub fn is_team(&self, address: &Address) -> bool {
        self.team == *address
    }

    /// Whether the team identity is usable (not the zero address)
    pub fn has_valid_team(&self) -> bool {
        self.team != addresses::ZERO
    }
}

// ============ Entry Types ============

/// Lifecycle of a depositor's entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum EntryStatus {
    /// Address has never deposited
    NonExistent,
    /// Entry holds principal
    Active,
    /// Entry was emptied by a withdraw; a new deposit reactivates it
    Withdrawn,
}

/// Per-depositor accounting record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct DepositEntry {
    /// Depositor's address
    pub owner: Address,
    /// Principal currently deposited, including settled rewards
    pub principal: u128,
    /// Accumulator value when the principal was last synchronized
    pub reward_debt: u128,
    /// Sequence of the operation that created the entry
    pub created_at: Sequence,
    /// Sequence of the last operation that touched the entry
    pub last_updated: Sequence,
}

impl DepositEntry {
    /// Creates an empty entry checkpointed at the current accumulator,
    /// so rewards injected before it existed are excluded
    pub fn new(owner: Address, acc_reward_per_unit: u128, sequence: Sequence) -> Self {
        Self {
            owner,
            principal: 0,
            reward_debt: acc_reward_per_unit,
            created_at: sequence,
            last_updated: sequence,
        }
    }

    /// Whether the entry currently holds principal
    pub fn is_active(&self) -> bool {
        self.principal > 0
    }

    /// Lifecycle state of an existing entry
    pub fn status(&self) -> EntryStatus {
        if self.is_active() {
            EntryStatus::Active
        } else {
            EntryStatus::Withdrawn
        }
    }
}

// ============ Pool State ============

/// Global pool state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolState {
    /// Sum of every entry's principal; denominator for reward splitting
    pub total_principal: u128,
    /// Reward per unit of principal, scaled by `SCALE_FACTOR`
    pub acc_reward_per_unit: u128,
    /// Principal plus undistributed rewards held by the pool
    pub total_pool_value: u128,
    /// All rewards ever injected
    pub total_rewards: u128,
    /// All amounts ever paid out by withdrawals
    pub total_paid_out: u128,
    /// Entries currently holding principal
    pub active_depositors: u64,
    /// Number of successful mutating operations
    pub sequence: Sequence,
}

impl PoolState {
    /// Creates initial pool state
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no principal is deposited
    pub fn is_empty(&self) -> bool {
        self.total_principal == 0
    }
}

// ============ Action Types ============

/// Mutating operations accepted by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum PoolAction {
    /// Add principal for the caller
    Deposit { amount: u128 },
    /// Pay out the caller's principal plus accrued reward
    Withdraw,
    /// Spread a reward over current depositors (team only)
    InjectReward { amount: u128 },
}

/// Result of applying a `PoolAction`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Depositor's new principal
    Deposited { new_balance: u128 },
    /// Amount paid to the depositor
    Withdrawn { amount_paid: u128 },
    /// Reward accepted
    RewardInjected,
}
