//! Shared Ledger Handle
//!
//! Concurrent access to one `RewardLedger`. Every operation runs under a
//! single mutex covering pool totals, accumulator and all entries, so two
//! mutations never interleave and readers never observe a half-applied
//! operation.
//!
//! Events produced by an operation are queued under the ledger lock and
//! handed to subscribers after it is released, in ledger order. A subscriber
//! may call back into the handle.

use std::cell::Cell;
use std::collections::VecDeque;
use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::{Mutex, ReentrantMutex, RwLock};

use ethpool_common::{
    constants::pool::MAX_SUBSCRIBERS,
    errors::{PoolError, PoolResult},
    events::PoolEvent,
    types::{ActionOutcome, Address, EntryStatus, PoolAction, PoolConfig},
};

use crate::{LedgerSnapshot, PoolStats, RewardLedger};

/// Receives ledger events
pub trait EventSubscriber: Send + Sync {
    /// Called once per event, oldest first
    fn on_event(&self, event: &PoolEvent);
}

impl<F> EventSubscriber for F
where
    F: Fn(&PoolEvent) + Send + Sync,
{
    fn on_event(&self, event: &PoolEvent) {
        self(event)
    }
}

struct Inner {
    ledger: Mutex<RewardLedger>,
    /// Events not yet delivered, in ledger order
    pending: Mutex<VecDeque<PoolEvent>>,
    /// Held by whichever thread is delivering; set while its loop runs
    dispatch: ReentrantMutex<Cell<bool>>,
    subscribers: RwLock<Vec<Arc<dyn EventSubscriber>>>,
}

/// Cloneable handle to a ledger guarded by one lock
#[derive(Clone)]
pub struct SharedLedger {
    inner: Arc<Inner>,
}

/// Clears the dispatching flag even if a subscriber panics
struct Dispatching<'a>(&'a Cell<bool>);

impl Drop for Dispatching<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

fn short(address: &Address) -> String {
    hex::encode(&address[..4])
}

impl SharedLedger {
    /// Wrap an existing ledger
    pub fn new(ledger: RewardLedger) -> Self {
        Self {
            inner: Arc::new(Inner {
                ledger: Mutex::new(ledger),
                pending: Mutex::new(VecDeque::new()),
                dispatch: ReentrantMutex::new(Cell::new(false)),
                subscribers: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Create an empty ledger for `config`
    pub fn with_config(config: PoolConfig) -> PoolResult<Self> {
        RewardLedger::new(config).map(Self::new)
    }

    /// Rebuild from a validated snapshot
    pub fn restore(snapshot: LedgerSnapshot) -> PoolResult<Self> {
        let ledger = RewardLedger::restore(snapshot)?;
        info!(
            "restored ledger at sequence {} with {} entries",
            ledger.state().sequence,
            ledger.stats().known_depositors
        );
        Ok(Self::new(ledger))
    }

    /// Register a subscriber for every future event
    pub fn subscribe(&self, subscriber: Arc<dyn EventSubscriber>) -> PoolResult<()> {
        let mut subscribers = self.inner.subscribers.write();
        if subscribers.len() >= MAX_SUBSCRIBERS {
            return Err(PoolError::TooManySubscribers {
                maximum: MAX_SUBSCRIBERS,
            });
        }
        subscribers.push(subscriber);
        Ok(())
    }

    /// Run one mutation, then deliver its events outside the ledger lock
    fn mutate<T>(
        &self,
        operation: &'static str,
        caller: &Address,
        apply: impl FnOnce(&mut RewardLedger) -> PoolResult<T>,
    ) -> PoolResult<T> {
        let mut ledger = self.inner.ledger.lock();
        let result = apply(&mut *ledger);
        let events = ledger.drain_events();
        let sequence = ledger.state().sequence;
        if !events.is_empty() {
            self.inner.pending.lock().extend(events);
        }
        drop(ledger);

        match &result {
            Ok(_) => debug!("{} by {} applied at sequence {}", operation, short(caller), sequence),
            Err(e) => warn!("{} by {} rejected: {} ({})", operation, short(caller), e.code(), e),
        }

        self.deliver_pending();
        result
    }

    fn deliver_pending(&self) {
        let dispatch = self.inner.dispatch.lock();
        // A subscriber mutating from inside `on_event` only enqueues; the
        // outermost loop on this thread delivers it after the current event.
        if dispatch.get() {
            return;
        }
        dispatch.set(true);
        let _dispatching = Dispatching(&*dispatch);
        loop {
            // Queue guard must not outlive the pop; subscribers may mutate.
            let next = self.inner.pending.lock().pop_front();
            let Some(event) = next else {
                break;
            };
            let subscribers = self.inner.subscribers.read().clone();
            for subscriber in &subscribers {
                subscriber.on_event(&event);
            }
        }
    }

    // ============ Operations ============

    /// See `RewardLedger::deposit`
    pub fn deposit(&self, depositor: Address, amount: u128) -> PoolResult<u128> {
        self.mutate("deposit", &depositor, |l| l.deposit(depositor, amount))
    }

    /// See `RewardLedger::withdraw`
    pub fn withdraw(&self, depositor: Address) -> PoolResult<u128> {
        self.mutate("withdraw", &depositor, |l| l.withdraw(depositor))
    }

    /// See `RewardLedger::inject_reward`
    pub fn inject_reward(&self, caller: Address, amount: u128) -> PoolResult<()> {
        self.mutate("inject_reward", &caller, |l| l.inject_reward(caller, amount))
    }

    /// See `RewardLedger::apply`
    pub fn apply(&self, caller: Address, action: PoolAction) -> PoolResult<ActionOutcome> {
        self.mutate("apply", &caller, |l| l.apply(caller, action))
    }

    // ============ Reads ============

    /// Claimable total for `depositor`, 0 if unknown
    pub fn balance_of(&self, depositor: &Address) -> u128 {
        self.inner.ledger.lock().balance_of(depositor)
    }

    /// Reward accrued by `depositor` since its last settlement
    pub fn pending_reward(&self, depositor: &Address) -> u128 {
        self.inner.ledger.lock().pending_reward(depositor)
    }

    /// Principal plus undistributed reward
    pub fn pool_balance(&self) -> u128 {
        self.inner.ledger.lock().pool_balance()
    }

    /// All rewards ever injected
    pub fn rewards_total(&self) -> u128 {
        self.inner.ledger.lock().rewards_total()
    }

    /// Lifecycle state of the depositor's entry
    pub fn entry_status(&self, depositor: &Address) -> EntryStatus {
        self.inner.ledger.lock().entry_status(depositor)
    }

    /// Pool statistics
    pub fn stats(&self) -> PoolStats {
        self.inner.ledger.lock().stats()
    }

    /// Consistent copy taken under the lock; later reads on it need no lock
    pub fn snapshot(&self) -> LedgerSnapshot {
        self.inner.ledger.lock().snapshot()
    }
}
