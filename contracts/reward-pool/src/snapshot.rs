//! Ledger Snapshots
//!
//! A snapshot is a complete, self-consistent copy of the ledger taken
//! between operations. It serves reads without holding the ledger lock,
//! and it is the persistence format: borsh for compact storage, CBOR for
//! interchange, with a SHA-256 commitment over the borsh bytes.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use ethpool_common::{
    check,
    constants::addresses,
    errors::{PoolError, PoolResult},
    events::EventLog,
    math::{accrued_reward, claimable_total},
    types::{Address, DepositEntry, EntryStatus, PoolConfig, PoolState},
    validation::validate_config,
};

use crate::RewardLedger;

/// Point-in-time copy of a ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct LedgerSnapshot {
    /// Ledger configuration
    pub config: PoolConfig,
    /// Pool totals and accumulator
    pub state: PoolState,
    /// Every entry ever created, ordered by owner
    pub entries: Vec<DepositEntry>,
}

impl LedgerSnapshot {
    /// Claimable total for `depositor` as of the snapshot
    pub fn balance_of(&self, depositor: &Address) -> u128 {
        self.find(depositor)
            .map(|e| claimable_total(e.principal, self.state.acc_reward_per_unit, e.reward_debt))
            .unwrap_or(0)
    }

    /// Lifecycle state of `depositor` as of the snapshot
    pub fn entry_status(&self, depositor: &Address) -> EntryStatus {
        self.find(depositor)
            .map(DepositEntry::status)
            .unwrap_or(EntryStatus::NonExistent)
    }

    /// Pool value as of the snapshot
    pub fn pool_balance(&self) -> u128 {
        self.state.total_pool_value
    }

    fn find(&self, depositor: &Address) -> Option<&DepositEntry> {
        self.entries
            .binary_search_by(|e| e.owner.cmp(depositor))
            .ok()
            .map(|i| &self.entries[i])
    }

    /// Check every ledger invariant the snapshot must satisfy
    pub fn validate(&self) -> PoolResult<()> {
        validate_config(&self.config)?;

        check!(
            self.entries.windows(2).all(|w| w[0].owner < w[1].owner),
            PoolError::InvalidSnapshot { reason: "entries not sorted by unique owner" }
        );
        check!(
            self.entries.iter().all(|e| !self.config.is_team(&e.owner)),
            PoolError::InvalidSnapshot { reason: "team holds a deposit entry" }
        );
        check!(
            self.entries.iter().all(|e| e.owner != addresses::ZERO),
            PoolError::InvalidSnapshot { reason: "zero address holds a deposit entry" }
        );
        check!(
            self.entries
                .iter()
                .all(|e| e.created_at <= e.last_updated && e.last_updated <= self.state.sequence),
            PoolError::InvalidSnapshot { reason: "entry sequence ahead of ledger sequence" }
        );
        check!(
            self.entries
                .iter()
                .all(|e| e.reward_debt <= self.state.acc_reward_per_unit),
            PoolError::InvalidSnapshot { reason: "entry checkpoint ahead of accumulator" }
        );

        let mut principal_sum: u128 = 0;
        let mut claimable_sum: u128 = 0;
        let mut active: u64 = 0;
        for entry in &self.entries {
            let reward = accrued_reward(
                entry.principal,
                self.state.acc_reward_per_unit,
                entry.reward_debt,
            )?;
            principal_sum = principal_sum.checked_add(entry.principal).ok_or(PoolError::Overflow)?;
            claimable_sum = claimable_sum
                .checked_add(entry.principal)
                .and_then(|v| v.checked_add(reward))
                .ok_or(PoolError::Overflow)?;
            if entry.is_active() {
                active += 1;
            }
        }

        check!(
            principal_sum == self.state.total_principal,
            PoolError::InvalidSnapshot { reason: "total principal does not match entries" }
        );
        check!(
            active == self.state.active_depositors,
            PoolError::InvalidSnapshot { reason: "active depositor count does not match entries" }
        );
        check!(
            claimable_sum <= self.state.total_pool_value,
            PoolError::InvalidSnapshot { reason: "claims exceed pool value" }
        );
        Ok(())
    }

    /// Serialize snapshot to borsh bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize snapshot from borsh bytes
    pub fn from_bytes(bytes: &[u8]) -> PoolResult<Self> {
        borsh::from_slice(bytes).map_err(|_| PoolError::InvalidSnapshot {
            reason: "malformed borsh encoding",
        })
    }

    /// Serialize snapshot to CBOR
    pub fn to_cbor(&self) -> PoolResult<Vec<u8>> {
        let mut out = Vec::new();
        ciborium::into_writer(self, &mut out).map_err(|_| PoolError::InvalidSnapshot {
            reason: "cbor encoding failed",
        })?;
        Ok(out)
    }

    /// Deserialize snapshot from CBOR
    pub fn from_cbor(bytes: &[u8]) -> PoolResult<Self> {
        ciborium::from_reader(bytes).map_err(|_| PoolError::InvalidSnapshot {
            reason: "malformed cbor encoding",
        })
    }

    /// SHA-256 commitment over the borsh encoding
    pub fn commitment(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.to_bytes());
        let result = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&result);
        out
    }
}

impl RewardLedger {
    /// Copy the full ledger state
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            config: self.config.clone(),
            state: self.state.clone(),
            entries: self.entries.values().cloned().collect(),
        }
    }

    /// Rebuild a ledger from a snapshot after validating it
    ///
    /// The restored ledger has an empty event log.
    pub fn restore(snapshot: LedgerSnapshot) -> PoolResult<Self> {
        snapshot.validate()?;
        let entries: BTreeMap<Address, DepositEntry> = snapshot
            .entries
            .into_iter()
            .map(|e| (e.owner, e))
            .collect();
        Ok(Self {
            config: snapshot.config,
            state: snapshot.state,
            entries,
            events: EventLog::new(),
        })
    }
}
