//! ETHPool Reward Ledger
//!
//! Depositors add principal to one shared pool; the team injects rewards
//! that are split pro rata over whoever holds principal at that moment.
//!
//! ## Accounting
//!
//! The ledger never iterates over depositors. It keeps one fixed-point
//! accumulator, "reward per unit of principal", and each entry keeps the
//! accumulator value it was last synchronized at (its reward debt):
//!
//! ```text
//! inject_reward(R):  acc += R * SCALE / total_principal
//! accrued(entry):    entry.principal * (acc - entry.reward_debt) / SCALE
//! ```
//!
//! A new entry is checkpointed at the current accumulator, so rewards
//! injected before it existed never reach it. An existing entry is settled
//! (accrued reward folded into principal) before a deposit is added and
//! before its checkpoint moves.
//!
//! Every operation validates all of its preconditions before it mutates
//! anything; an `Err` leaves the ledger untouched.
//!
//! `RewardLedger` is single-threaded; `SharedLedger` wraps it in one lock
//! for concurrent callers.

use std::collections::BTreeMap;

pub mod shared;
pub mod snapshot;

#[cfg(test)]
mod scenario_tests;

pub use shared::{EventSubscriber, SharedLedger};
pub use snapshot::LedgerSnapshot;

use ethpool_common::{
    check,
    errors::{PoolError, PoolResult, RestrictedOp},
    events::{EventLog, PoolEvent},
    math::{accrued_reward, claimable_total, reward_per_unit, safe_add, safe_sub},
    types::{
        ActionOutcome, Address, DepositEntry, EntryStatus, PoolAction, PoolConfig, PoolState,
        Sequence,
    },
    validation::{require_depositor, require_positive, require_team, validate_config},
};

// ============ Ledger ============

/// The reward-accounting ledger
///
/// Every successful operation appends to an internal event log that is only
/// emptied by `drain_events`. Callers using the ledger directly must drain it
/// periodically; `SharedLedger` drains after every operation.
#[derive(Debug, Clone)]
pub struct RewardLedger {
    config: PoolConfig,
    state: PoolState,
    entries: BTreeMap<Address, DepositEntry>,
    events: EventLog,
}

/// Pool statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStats {
    /// Sum of all principal
    pub total_principal: u128,
    /// Principal plus undistributed rewards
    pub pool_value: u128,
    /// All rewards ever injected
    pub rewards_total: u128,
    /// All amounts ever paid out
    pub paid_out: u128,
    /// Entries holding principal
    pub active_depositors: u64,
    /// Entries ever created (active or withdrawn)
    pub known_depositors: usize,
    /// Current accumulator
    pub acc_reward_per_unit: u128,
    /// Successful mutating operations so far
    pub sequence: Sequence,
}

impl RewardLedger {
    /// Create an empty ledger
    ///
    /// Fails with `InvalidAddress` when the team is the zero address.
    pub fn new(config: PoolConfig) -> PoolResult<Self> {
        validate_config(&config)?;
        Ok(Self {
            config,
            state: PoolState::new(),
            entries: BTreeMap::new(),
            events: EventLog::new(),
        })
    }

    /// Ledger configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Current pool state
    pub fn state(&self) -> &PoolState {
        &self.state
    }

    fn next_sequence(&self) -> PoolResult<Sequence> {
        self.state.sequence.checked_add(1).ok_or(PoolError::Overflow)
    }

    // ============ Mutating Operations ============

    /// Add `amount` to the depositor's principal
    ///
    /// Existing accrued reward is settled into principal first, then the
    /// deposit is added and the entry is checkpointed at the current
    /// accumulator.
    ///
    /// # Returns
    /// The depositor's new principal
    pub fn deposit(&mut self, depositor: Address, amount: u128) -> PoolResult<u128> {
        require_depositor(&self.config, &depositor, RestrictedOp::Deposit)?;
        require_positive(amount)?;

        let acc = self.state.acc_reward_per_unit;
        let sequence = self.next_sequence()?;

        let (principal, reward_debt) = self
            .entries
            .get(&depositor)
            .map(|e| (e.principal, e.reward_debt))
            .unwrap_or((0, acc));

        let settled = accrued_reward(principal, acc, reward_debt)?;
        let new_balance = safe_add(safe_add(principal, settled)?, amount)?;
        let total_principal = safe_add(safe_add(self.state.total_principal, settled)?, amount)?;
        let pool_value = safe_add(self.state.total_pool_value, amount)?;

        let entry = self
            .entries
            .entry(depositor)
            .or_insert_with(|| DepositEntry::new(depositor, acc, sequence));
        if !entry.is_active() {
            self.state.active_depositors += 1;
        }
        entry.principal = new_balance;
        entry.reward_debt = acc;
        entry.last_updated = sequence;

        self.state.total_principal = total_principal;
        self.state.total_pool_value = pool_value;
        self.state.sequence = sequence;

        self.events.emit(PoolEvent::Deposited {
            depositor,
            amount,
            settled_reward: settled,
            new_balance,
            pool_total: pool_value,
            sequence,
        });

        Ok(new_balance)
    }

    /// Pay out the depositor's principal plus accrued reward
    ///
    /// The entry is kept with zero principal and a fresh checkpoint.
    ///
    /// # Returns
    /// The amount paid out
    pub fn withdraw(&mut self, depositor: Address) -> PoolResult<u128> {
        require_depositor(&self.config, &depositor, RestrictedOp::Withdraw)?;

        let acc = self.state.acc_reward_per_unit;
        let sequence = self.next_sequence()?;

        let (principal, reward_debt) = self
            .entries
            .get(&depositor)
            .filter(|e| e.is_active())
            .map(|e| (e.principal, e.reward_debt))
            .ok_or(PoolError::NothingToWithdraw { depositor })?;

        let reward = accrued_reward(principal, acc, reward_debt)?;
        let payout = safe_add(principal, reward)?;
        let total_principal = safe_sub(self.state.total_principal, principal)?;
        let pool_value = safe_sub(self.state.total_pool_value, payout)?;
        let paid_out = safe_add(self.state.total_paid_out, payout)?;

        if let Some(entry) = self.entries.get_mut(&depositor) {
            entry.principal = 0;
            entry.reward_debt = acc;
            entry.last_updated = sequence;
        }

        self.state.total_principal = total_principal;
        self.state.total_pool_value = pool_value;
        self.state.total_paid_out = paid_out;
        self.state.active_depositors = self.state.active_depositors.saturating_sub(1);
        self.state.sequence = sequence;

        self.events.emit(PoolEvent::Withdrawal {
            depositor,
            amount: payout,
            sequence,
        });

        Ok(payout)
    }

    /// Spread `amount` over everyone currently holding principal
    ///
    /// Only the team may call this, and only while the pool holds
    /// principal; otherwise the reward could never be withdrawn.
    pub fn inject_reward(&mut self, caller: Address, amount: u128) -> PoolResult<()> {
        require_team(&self.config, &caller)?;
        require_positive(amount)?;
        check!(!self.state.is_empty(), PoolError::EmptyPool);

        let sequence = self.next_sequence()?;
        let increment = reward_per_unit(amount, self.state.total_principal)?;
        let acc = safe_add(self.state.acc_reward_per_unit, increment)?;
        let pool_value = safe_add(self.state.total_pool_value, amount)?;
        let rewards_total = safe_add(self.state.total_rewards, amount)?;

        self.state.acc_reward_per_unit = acc;
        self.state.total_pool_value = pool_value;
        self.state.total_rewards = rewards_total;
        self.state.sequence = sequence;

        self.events.emit(PoolEvent::RewardInjected {
            team: caller,
            amount,
            acc_reward_per_unit: acc,
            pool_total: pool_value,
            sequence,
        });

        Ok(())
    }

    /// Apply a `PoolAction` on behalf of `caller`
    pub fn apply(&mut self, caller: Address, action: PoolAction) -> PoolResult<ActionOutcome> {
        match action {
            PoolAction::Deposit { amount } => self
                .deposit(caller, amount)
                .map(|new_balance| ActionOutcome::Deposited { new_balance }),
            PoolAction::Withdraw => self
                .withdraw(caller)
                .map(|amount_paid| ActionOutcome::Withdrawn { amount_paid }),
            PoolAction::InjectReward { amount } => self
                .inject_reward(caller, amount)
                .map(|()| ActionOutcome::RewardInjected),
        }
    }

    // ============ Reads ============

    /// Principal plus accrued reward for `depositor`, 0 if unknown
    pub fn balance_of(&self, depositor: &Address) -> u128 {
        self.entries
            .get(depositor)
            .map(|e| claimable_total(e.principal, self.state.acc_reward_per_unit, e.reward_debt))
            .unwrap_or(0)
    }

    /// Reward accrued by `depositor` since its last settlement
    pub fn pending_reward(&self, depositor: &Address) -> u128 {
        self.entries
            .get(depositor)
            .map(|e| {
                accrued_reward(e.principal, self.state.acc_reward_per_unit, e.reward_debt)
                    .unwrap_or(u128::MAX)
            })
            .unwrap_or(0)
    }

    /// Everything the pool holds: principal plus undistributed reward
    pub fn pool_balance(&self) -> u128 {
        self.state.total_pool_value
    }

    /// All rewards ever injected
    pub fn rewards_total(&self) -> u128 {
        self.state.total_rewards
    }

    /// Sum of all principal
    pub fn total_principal(&self) -> u128 {
        self.state.total_principal
    }

    /// The depositor's entry, if it ever deposited
    pub fn entry(&self, depositor: &Address) -> Option<&DepositEntry> {
        self.entries.get(depositor)
    }

    /// Lifecycle state of the depositor's entry
    pub fn entry_status(&self, depositor: &Address) -> EntryStatus {
        self.entries
            .get(depositor)
            .map(DepositEntry::status)
            .unwrap_or(EntryStatus::NonExistent)
    }

    /// Pool statistics
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            total_principal: self.state.total_principal,
            pool_value: self.state.total_pool_value,
            rewards_total: self.state.total_rewards,
            paid_out: self.state.total_paid_out,
            active_depositors: self.state.active_depositors,
            known_depositors: self.entries.len(),
            acc_reward_per_unit: self.state.acc_reward_per_unit,
            sequence: self.state.sequence,
        }
    }

    // ============ Events ============

    /// Events emitted since the last drain
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Remove and return pending events, oldest first
    pub fn drain_events(&mut self) -> Vec<PoolEvent> {
        self.events.drain()
    }
}

// ============ Tests ============
