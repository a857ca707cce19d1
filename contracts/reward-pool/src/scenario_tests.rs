//! End-to-end ledger scenarios
//!
//! Multi-step flows across depositors and reward rounds, checked against
//! hand-computed balances.

use ethpool_common::{
    constants::{pool::SCALE_FACTOR, token::{DECIMALS, ONE}},
    errors::{PoolError, RestrictedOp},
    format_amount, parse_amount,
    types::{ActionOutcome, Address, EntryStatus, PoolAction, PoolConfig},
};

use crate::{LedgerSnapshot, RewardLedger, SharedLedger};

const TEAM: Address = [0xee; 32];
const ALICE: Address = [0xa1; 32];
const BOB: Address = [0xb0; 32];
const CAROL: Address = [0xc0; 32];

fn ledger() -> RewardLedger {
    RewardLedger::new(PoolConfig::new(TEAM)).unwrap()
}

fn eth(text: &str) -> u128 {
    parse_amount(text, DECIMALS).unwrap()
}

fn principal_sum(ledger: &RewardLedger, depositors: &[Address]) -> u128 {
    depositors
        .iter()
        .filter_map(|d| ledger.entry(d))
        .map(|e| e.principal)
        .sum()
}

// ============ Reward Splitting ============

#[test]
fn test_reward_split_by_share() {
    let mut ledger = ledger();
    ledger.deposit(ALICE, 100).unwrap();
    ledger.deposit(BOB, 300).unwrap();
    ledger.inject_reward(TEAM, 100).unwrap();

    assert_eq!(ledger.balance_of(&ALICE), 125);
    assert_eq!(ledger.balance_of(&BOB), 375);
    assert_eq!(ledger.pool_balance(), 500);

    assert_eq!(ledger.withdraw(ALICE).unwrap(), 125);
    assert_eq!(ledger.total_principal(), 300);
    assert_eq!(ledger.pool_balance(), 375);

    assert_eq!(ledger.withdraw(BOB).unwrap(), 375);
    assert_eq!(ledger.total_principal(), 0);
    assert_eq!(ledger.pool_balance(), 0);
}

#[test]
fn test_late_depositor_excluded_from_earlier_reward() {
    let mut ledger = ledger();
    ledger.deposit(ALICE, 100).unwrap();
    ledger.inject_reward(TEAM, 100).unwrap();
    ledger.deposit(BOB, 300).unwrap();

    assert_eq!(ledger.balance_of(&ALICE), 200);
    assert_eq!(ledger.balance_of(&BOB), 300);
    // 100 + 100 + 300: everything in, nothing out
    assert_eq!(ledger.pool_balance(), 500);
}

#[test]
fn test_sole_depositor_takes_whole_reward() {
    let mut ledger = ledger();
    ledger.deposit(ALICE, 100).unwrap();
    ledger.inject_reward(TEAM, 200).unwrap();
    ledger.deposit(BOB, 300).unwrap();

    assert_eq!(ledger.balance_of(&ALICE), 300);
    assert_eq!(ledger.balance_of(&BOB), 300);
    assert_eq!(ledger.pool_balance(), 600);
}

#[test]
fn test_settled_reward_compounds_on_next_round() {
    let mut ledger = ledger();
    ledger.deposit(ALICE, 100).unwrap();
    ledger.inject_reward(TEAM, 100).unwrap();

    // 100 principal + 100 settled + 100 new
    assert_eq!(ledger.deposit(ALICE, 100).unwrap(), 300);
    ledger.deposit(BOB, 300).unwrap();
    ledger.inject_reward(TEAM, 600).unwrap();

    assert_eq!(ledger.balance_of(&ALICE), 600);
    assert_eq!(ledger.balance_of(&BOB), 600);
    assert_eq!(ledger.pool_balance(), 1_200);
}

/// Deposit A 10, reward 10, deposit B 20, reward 10.
///
/// The second reward is split 1:2 over A's 10 and B's 20, so A ends at
/// 23.33.. and B at 26.66.., not an even 25/25. Integer flooring leaves 10
/// wei of dust in the pool.
#[test]
fn test_second_round_splits_over_both_depositors() {
    let mut ledger = ledger();
    ledger.deposit(ALICE, eth("10")).unwrap();
    ledger.inject_reward(TEAM, eth("10")).unwrap();
    ledger.deposit(BOB, eth("20")).unwrap();
    ledger.inject_reward(TEAM, eth("10")).unwrap();

    assert_eq!(ledger.state().acc_reward_per_unit, 1_333_333_333_333_333_333);
    assert_eq!(ledger.balance_of(&ALICE), 23_333_333_333_333_333_330);
    assert_eq!(ledger.balance_of(&BOB), 26_666_666_666_666_666_660);
    assert_eq!(ledger.pool_balance(), eth("50"));

    let paid = ledger.withdraw(ALICE).unwrap() + ledger.withdraw(BOB).unwrap();
    assert_eq!(paid, eth("50") - 10);
    assert_eq!(ledger.pool_balance(), 10);
    assert_eq!(format_amount(ledger.pool_balance(), DECIMALS).unwrap(), "0.00000000000000001");
}

#[test]
fn test_depositor_leaving_stops_accruing() {
    let mut ledger = ledger();
    ledger.deposit(ALICE, 100).unwrap();
    ledger.inject_reward(TEAM, 100).unwrap();
    ledger.deposit(BOB, 100).unwrap();
    ledger.inject_reward(TEAM, 100).unwrap();

    assert_eq!(ledger.withdraw(ALICE).unwrap(), 250);

    ledger.inject_reward(TEAM, 100).unwrap();

    assert_eq!(ledger.balance_of(&ALICE), 0);
    assert_eq!(ledger.balance_of(&BOB), 250);
    assert_eq!(ledger.pool_balance(), 250);
    assert_eq!(ledger.withdraw(BOB).unwrap(), 250);
    assert_eq!(ledger.pool_balance(), 0);
}

// ============ Lifecycle ============

#[test]
fn test_reward_rejected_until_pool_has_principal() {
    let mut ledger = ledger();
    assert_eq!(ledger.inject_reward(TEAM, 100), Err(PoolError::EmptyPool));

    ledger.deposit(ALICE, 100).unwrap();
    ledger.withdraw(ALICE).unwrap();

    assert_eq!(ledger.inject_reward(TEAM, 100), Err(PoolError::EmptyPool));
    assert_eq!(ledger.pool_balance(), 0);
    assert_eq!(ledger.rewards_total(), 0);
}

#[test]
fn test_second_withdrawal_rejected() {
    let mut ledger = ledger();
    ledger.deposit(ALICE, 100).unwrap();
    ledger.deposit(BOB, 100).unwrap();
    ledger.inject_reward(TEAM, 100).unwrap();

    assert_eq!(ledger.withdraw(ALICE).unwrap(), 150);
    assert_eq!(
        ledger.withdraw(ALICE),
        Err(PoolError::NothingToWithdraw { depositor: ALICE })
    );
    assert_eq!(ledger.pool_balance(), 150);
    assert_eq!(ledger.balance_of(&BOB), 150);
}

#[test]
fn test_redeposit_after_withdraw_starts_fresh() {
    let mut ledger = ledger();
    ledger.deposit(ALICE, 100).unwrap();
    ledger.deposit(BOB, 100).unwrap();
    ledger.inject_reward(TEAM, 200).unwrap();
    assert_eq!(ledger.withdraw(ALICE).unwrap(), 200);
    assert_eq!(ledger.entry_status(&ALICE), EntryStatus::Withdrawn);

    // Rewards from before the withdrawal are not claimed a second time
    assert_eq!(ledger.deposit(ALICE, 50).unwrap(), 50);
    assert_eq!(ledger.entry_status(&ALICE), EntryStatus::Active);

    ledger.inject_reward(TEAM, 150).unwrap();

    assert_eq!(ledger.balance_of(&ALICE), 100);
    assert_eq!(ledger.balance_of(&BOB), 300);
    assert_eq!(ledger.pool_balance(), 400);
    assert_eq!(ledger.stats().known_depositors, 2);
}

#[test]
fn test_team_never_holds_a_share() {
    let mut ledger = ledger();
    ledger.deposit(ALICE, 100).unwrap();
    ledger.inject_reward(TEAM, 100).unwrap();

    assert_eq!(
        ledger.deposit(TEAM, 100),
        Err(PoolError::Unauthorized { operation: RestrictedOp::Deposit, caller: TEAM })
    );
    assert_eq!(
        ledger.withdraw(TEAM),
        Err(PoolError::Unauthorized { operation: RestrictedOp::Withdraw, caller: TEAM })
    );
    assert_eq!(
        ledger.inject_reward(BOB, 100),
        Err(PoolError::Unauthorized { operation: RestrictedOp::InjectReward, caller: BOB })
    );

    assert_eq!(ledger.balance_of(&TEAM), 0);
    assert_eq!(ledger.entry_status(&TEAM), EntryStatus::NonExistent);
    assert_eq!(ledger.balance_of(&ALICE), 200);
}

// ============ Rounding ============

#[test]
fn test_reward_below_resolution_stays_as_dust() {
    let mut ledger = ledger();
    for depositor in [ALICE, BOB, CAROL] {
        ledger.deposit(depositor, 3).unwrap();
    }
    ledger.inject_reward(TEAM, 1).unwrap();

    assert_eq!(ledger.state().acc_reward_per_unit, SCALE_FACTOR / 9);
    for depositor in [ALICE, BOB, CAROL] {
        assert_eq!(ledger.balance_of(&depositor), 3);
    }
    assert_eq!(ledger.pool_balance(), 10);

    let paid: u128 = [ALICE, BOB, CAROL]
        .into_iter()
        .map(|d| ledger.withdraw(d).unwrap())
        .sum();
    assert_eq!(paid, 9);
    assert_eq!(ledger.pool_balance(), 1);
}

#[test]
fn test_value_conserved_over_mixed_operations() {
    let depositors: Vec<Address> = (1..=5u8).map(|i| [i; 32]).collect();
    let mut ledger = ledger();
    let mut seed: u64 = 0x5eed;
    let mut next = || {
        seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        seed >> 33
    };

    let mut deposited: u128 = 0;
    let mut rewarded: u128 = 0;
    let mut paid: u128 = 0;
    let mut operations: u128 = 0;

    for _ in 0..500 {
        let roll = next();
        let depositor = depositors[(roll % 5) as usize];
        match (roll >> 8) % 4 {
            0 | 1 => {
                let amount = (next() % 1_000 + 1) as u128;
                ledger.deposit(depositor, amount).unwrap();
                deposited += amount;
            }
            2 => {
                if ledger.entry_status(&depositor) == EntryStatus::Active {
                    paid += ledger.withdraw(depositor).unwrap();
                } else {
                    assert_eq!(
                        ledger.withdraw(depositor),
                        Err(PoolError::NothingToWithdraw { depositor })
                    );
                }
            }
            _ => {
                let amount = (next() % 500 + 1) as u128;
                if ledger.total_principal() == 0 {
                    assert_eq!(ledger.inject_reward(TEAM, amount), Err(PoolError::EmptyPool));
                } else {
                    ledger.inject_reward(TEAM, amount).unwrap();
                    rewarded += amount;
                }
            }
        }
        operations += 1;

        let claimable: u128 = depositors.iter().map(|d| ledger.balance_of(d)).sum();
        assert_eq!(ledger.pool_balance(), deposited + rewarded - paid);
        assert_eq!(ledger.total_principal(), principal_sum(&ledger, &depositors));
        assert!(claimable <= ledger.pool_balance());
        assert!(ledger.pool_balance() - claimable <= operations * 6);
    }

    for depositor in &depositors {
        if ledger.entry_status(depositor) == EntryStatus::Active {
            paid += ledger.withdraw(*depositor).unwrap();
        }
    }

    let dust = ledger.pool_balance();
    assert_eq!(paid + dust, deposited + rewarded);
    assert_eq!(ledger.total_principal(), 0);
    assert_eq!(ledger.stats().active_depositors, 0);
    assert_eq!(ledger.stats().paid_out, paid);
}

// ============ Surfaces ============

#[test]
fn test_actions_through_shared_handle() {
    let shared = SharedLedger::with_config(PoolConfig::new(TEAM)).unwrap();

    let actions = [
        (ALICE, PoolAction::Deposit { amount: eth("1") }),
        (BOB, PoolAction::Deposit { amount: eth("3") }),
        (TEAM, PoolAction::InjectReward { amount: eth("0.4") }),
    ];
    for (caller, action) in actions {
        shared.apply(caller, action).unwrap();
    }

    assert_eq!(format_amount(shared.balance_of(&ALICE), DECIMALS).unwrap(), "1.1");
    assert_eq!(shared.pending_reward(&BOB), eth("0.3"));

    let bytes = shared.snapshot().to_bytes();
    let restored = SharedLedger::restore(LedgerSnapshot::from_bytes(&bytes).unwrap()).unwrap();

    assert_eq!(
        restored.apply(BOB, PoolAction::Withdraw),
        Ok(ActionOutcome::Withdrawn { amount_paid: eth("3.3") })
    );
    assert_eq!(restored.pool_balance(), eth("1.1"));
    // The source handle is unaffected
    assert_eq!(shared.pool_balance(), eth("4.4"));
    assert_eq!(shared.rewards_total(), ONE * 4 / 10);
}
