//! Ledger Events
//!
//! Events are a notification side-channel: they describe what a successful
//! operation did, but the ledger state, not the event stream, is
//! authoritative.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::types::{Address, Sequence};
use crate::Vec;

/// Event types for indexing and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    Deposited = 0x20,
    Withdrawal = 0x21,
    RewardInjected = 0x22,
}

/// Main event enum containing all ledger events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum PoolEvent {
    /// Emitted when principal is added
    Deposited {
        depositor: Address,
        amount: u128,
        /// Reward folded into principal before the deposit was added
        settled_reward: u128,
        new_balance: u128,
        pool_total: u128,
        sequence: Sequence,
    },

    /// Emitted when a depositor is paid out
    Withdrawal {
        depositor: Address,
        amount: u128,
        sequence: Sequence,
    },

    /// Emitted when the team injects a reward
    RewardInjected {
        team: Address,
        amount: u128,
        acc_reward_per_unit: u128,
        pool_total: u128,
        sequence: Sequence,
    },
}

impl PoolEvent {
    /// Get the event type for filtering
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Deposited { .. } => EventType::Deposited,
            Self::Withdrawal { .. } => EventType::Withdrawal,
            Self::RewardInjected { .. } => EventType::RewardInjected,
        }
    }

    /// Sequence of the operation that emitted the event
    pub fn sequence(&self) -> Sequence {
        match self {
            Self::Deposited { sequence, .. } => *sequence,
            Self::Withdrawal { sequence, .. } => *sequence,
            Self::RewardInjected { sequence, .. } => *sequence,
        }
    }

    /// Serialize event to bytes for storage/transmission
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Event log for collecting events between drains
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<PoolEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: PoolEvent) {
        self.events.push(event);
    }

    /// Get all events
    pub fn events(&self) -> &[PoolEvent] {
        &self.events
    }

    /// Remove and return all events, oldest first
    pub fn drain(&mut self) -> Vec<PoolEvent> {
        core::mem::take(&mut self.events)
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&PoolEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Check if any events were emitted
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
