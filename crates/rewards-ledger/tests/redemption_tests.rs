mod common;

use common::*;
use rewards_ledger::{Address, LedgerError, LedgerEvent, RedemptionRecord, RewardsLedger};

#[test]
fn test_redeem_boundaries() {
    let mut fx = Fixture::funded(&[(ALICE, 100)]);
    fx.ledger.approve(&ctx(ALICE), ENGINE, 60).unwrap();

    assert!(matches!(
        fx.ledger.redeem(&ctx(ALICE), "v-0", 0),
        Err(LedgerError::InvalidAmount(_))
    ));
    // Balance shortfall is reported before allowance shortfall
    assert_eq!(
        fx.ledger.redeem(&ctx(ALICE), "v-1", 101),
        Err(LedgerError::InsufficientBalance { have: 100, need: 101 })
    );
    assert_eq!(
        fx.ledger.redeem(&ctx(ALICE), "v-2", 61),
        Err(LedgerError::InsufficientAllowance { have: 60, need: 61 })
    );
    assert_eq!(fx.ledger.balance_of(&ALICE), 100);
    assert_eq!(fx.ledger.allowance(&ALICE, &ENGINE), 60);
}

#[test]
fn test_allowance_draw_down() {
    let mut fx = Fixture::funded(&[(ALICE, 500)]);
    fx.ledger.approve(&ctx(ALICE), ENGINE, 100).unwrap();

    let record = fx.ledger.redeem(&ctx(ALICE), "voucher-a", 50).unwrap();
    assert_eq!(
        record,
        RedemptionRecord {
            user: ALICE,
            amount: 50,
            voucher_id: "voucher-a".to_string(),
            timestamp: NOW,
        }
    );
    fx.ledger.redeem(&ctx(ALICE), "voucher-b", 50).unwrap();

    assert_eq!(fx.ledger.allowance(&ALICE, &ENGINE), 0);
    assert_eq!(fx.ledger.balance_of(&ALICE), 400);
    assert_eq!(fx.ledger.total_supply(), 400);
    assert_eq!(
        fx.ledger.redeem(&ctx(ALICE), "voucher-c", 1),
        Err(LedgerError::InsufficientAllowance { have: 0, need: 1 })
    );
    fx.assert_conserved();
}

#[test]
fn test_redeem_emits_burn_and_redeemed() {
    let mut fx = Fixture::funded(&[(ALICE, 10)]);
    fx.ledger.approve(&ctx(ALICE), ENGINE, 10).unwrap();
    let seq = fx.ledger.last_event_seq();

    fx.ledger.redeem(&ctx(ALICE), "coffee", 4).unwrap();

    let events: Vec<_> = fx.ledger.events_since(seq).iter().map(|r| r.event.clone()).collect();
    assert_eq!(
        events,
        vec![
            LedgerEvent::Transfer {
                from: ALICE,
                to: Address::ZERO,
                value: 4
            },
            LedgerEvent::Redeemed {
                user: ALICE,
                amount: 4,
                voucher_id: "coffee".to_string()
            },
        ]
    );
}

#[test]
fn test_can_user_redeem_agrees_with_redeem() {
    let mut fx = Fixture::funded(&[(ALICE, 100)]);
    fx.ledger.approve(&ctx(ALICE), ENGINE, 60).unwrap();

    for amount in [0u128, 1, 60, 61, 100, 101] {
        let predicted = fx.ledger.can_user_redeem(&ALICE, amount);
        let mut trial = fx.ledger.clone();
        let actual = trial.redeem(&ctx(ALICE), "trial", amount).is_ok();
        assert_eq!(predicted, actual, "disagreement at amount {}", amount);
    }
}

#[test]
fn test_hook_failure_rolls_back() {
    let mut fx = Fixture::funded(&[(ALICE, 100)]);
    fx.ledger.approve(&ctx(ALICE), ENGINE, 100).unwrap();
    let before = fx.ledger.state().clone();

    let mut hook = |_: &mut RewardsLedger, _: &RedemptionRecord| -> rewards_ledger::Result<()> {
        Err(LedgerError::Hook("voucher service unavailable".to_string()))
    };
    let err = fx
        .ledger
        .redeem_with_hook(&ctx(ALICE), "v-1", 40, &mut hook)
        .unwrap_err();

    assert_eq!(err, LedgerError::Hook("voucher service unavailable".to_string()));
    assert_eq!(fx.ledger.state(), &before);
}

#[test]
fn test_hook_sees_effects_and_commits() {
    let mut fx = Fixture::funded(&[(ALICE, 100)]);
    fx.ledger.approve(&ctx(ALICE), ENGINE, 100).unwrap();

    let mut seen_balance = None;
    let mut hook = |ledger: &mut RewardsLedger, record: &RedemptionRecord| -> rewards_ledger::Result<()> {
        seen_balance = Some(ledger.balance_of(&record.user));
        Ok(())
    };
    fx.ledger
        .redeem_with_hook(&ctx(ALICE), "v-1", 40, &mut hook)
        .unwrap();

    assert_eq!(seen_balance, Some(60));
    assert_eq!(fx.ledger.balance_of(&ALICE), 60);
}

#[test]
fn test_nested_redeem_is_reentrancy() {
    let mut fx = Fixture::funded(&[(ALICE, 100)]);
    fx.ledger.approve(&ctx(ALICE), ENGINE, 100).unwrap();
    let before = fx.ledger.state().clone();

    let mut nested_error = None;
    let mut hook = |ledger: &mut RewardsLedger, record: &RedemptionRecord| -> rewards_ledger::Result<()> {
        // Even a zero amount must fail on the guard, not on validation
        let result = ledger.redeem(&ctx(record.user), "nested", 0);
        nested_error = result.as_ref().err().cloned();
        result.map(|_| ())
    };
    let err = fx
        .ledger
        .redeem_with_hook(&ctx(ALICE), "outer", 10, &mut hook)
        .unwrap_err();

    assert_eq!(nested_error, Some(LedgerError::ReentrancyDetected));
    assert_eq!(err, LedgerError::ReentrancyDetected);
    assert_eq!(fx.ledger.state(), &before, "outer redemption must be rolled back");

    // Guard is released after the failed call
    fx.ledger.redeem(&ctx(ALICE), "after", 10).unwrap();
    assert_eq!(fx.ledger.balance_of(&ALICE), 90);
}

#[test]
fn test_panicking_hook_releases_guard_and_rolls_back() {
    let mut fx = Fixture::funded(&[(ALICE, 100)]);
    fx.ledger.approve(&ctx(ALICE), ENGINE, 100).unwrap();
    let before = fx.ledger.state().clone();

    let ledger = &mut fx.ledger;
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let mut hook = |_: &mut RewardsLedger, _: &RedemptionRecord| -> rewards_ledger::Result<()> {
            panic!("voucher service crashed")
        };
        ledger.redeem_with_hook(&ctx(ALICE), "v-1", 40, &mut hook)
    }));

    assert!(result.is_err());
    assert_eq!(fx.ledger.state(), &before);

    fx.ledger.redeem(&ctx(ALICE), "v-2", 40).unwrap();
    assert_eq!(fx.ledger.balance_of(&ALICE), 60);
}

#[test]
fn test_hook_rollback_keeps_earlier_events() {
    let mut fx = Fixture::funded(&[(ALICE, 100)]);
    fx.ledger.approve(&ctx(ALICE), ENGINE, 100).unwrap();
    let seq = fx.ledger.last_event_seq();

    let mut hook = |ledger: &mut RewardsLedger, record: &RedemptionRecord| -> rewards_ledger::Result<()> {
        ledger.approve(&ctx(record.user), BOB, 1)?;
        Err(LedgerError::Hook("rejected".to_string()))
    };
    fx.ledger
        .redeem_with_hook(&ctx(ALICE), "v-1", 40, &mut hook)
        .unwrap_err();

    assert_eq!(fx.ledger.last_event_seq(), seq);
    assert_eq!(fx.ledger.allowance(&ALICE, &BOB), 0);
    assert_eq!(fx.ledger.events_since(0).len() as u64, seq);
}

#[test]
fn test_set_rate() {
    let mut fx = Fixture::new();

    assert!(matches!(
        fx.ledger.set_rate(&ctx(ADMIN), 0),
        Err(LedgerError::InvalidAmount(_))
    ));
    assert_eq!(fx.ledger.get_rate(), 100);

    assert!(fx.ledger.set_rate(&ctx(BACKEND), 50).is_err());

    let seq = fx.ledger.last_event_seq();
    fx.ledger.set_rate(&ctx(ADMIN), 50).unwrap();
    assert_eq!(fx.ledger.get_rate(), 50);
    assert_eq!(
        fx.ledger.events_since(seq)[0].event,
        LedgerEvent::RateUpdated {
            old_rate: 100,
            new_rate: 50
        }
    );
}

#[test]
fn test_batch_reconcile_example() {
    let mut fx = Fixture::new();
    let supply_before = fx.ledger.total_supply();

    let summary = fx
        .ledger
        .batch_reconcile(&ctx(BACKEND), &[ALICE, BOB], &[250, 50])
        .unwrap();

    assert_eq!(fx.ledger.balance_of(&ALICE), 2);
    assert_eq!(fx.ledger.balance_of(&BOB), 0);
    assert_eq!(fx.ledger.total_supply(), supply_before + 2);
    assert_eq!(summary.users_reconciled, 2);
    assert_eq!(summary.total_points, 300);
    assert_eq!(summary.total_tokens, 2);

    let reconciled: Vec<_> = fx
        .ledger
        .events_since(0)
        .iter()
        .filter_map(|r| match &r.event {
            LedgerEvent::PointsReconciled { user, tokens, .. } => Some((*user, *tokens)),
            _ => None,
        })
        .collect();
    assert_eq!(reconciled, vec![(ALICE, 2), (BOB, 0)]);
}

#[test]
fn test_batch_reconcile_validation() {
    let mut fx = Fixture::new();

    assert!(fx.ledger.batch_reconcile(&ctx(ADMIN), &[ALICE], &[100]).is_err());
    assert_eq!(
        fx.ledger.batch_reconcile(&ctx(BACKEND), &[ALICE, BOB], &[100]),
        Err(LedgerError::ArrayLengthMismatch { left: 2, right: 1 })
    );
    assert_eq!(
        fx.ledger.batch_reconcile(&ctx(BACKEND), &[], &[]),
        Err(LedgerError::EmptyBatch)
    );

    let users = vec![ALICE; 201];
    let points = vec![100u128; 201];
    assert_eq!(
        fx.ledger.batch_reconcile(&ctx(BACKEND), &users, &points),
        Err(LedgerError::BatchTooLarge { len: 201, max: 200 })
    );
    fx.ledger
        .batch_reconcile(&ctx(BACKEND), &users[..200], &points[..200])
        .unwrap();
    assert_eq!(fx.ledger.balance_of(&ALICE), 200);
}

#[test]
fn test_batch_reconcile_is_atomic() {
    let mut fx = Fixture::funded(&[(CAROL, 7)]);
    let before = fx.ledger.state().clone();

    let err = fx
        .ledger
        .batch_reconcile(&ctx(BACKEND), &[ALICE, BOB, Address::ZERO], &[500, 900, 100])
        .unwrap_err();
    assert_eq!(err, LedgerError::ZeroAddress);
    assert_eq!(fx.ledger.state(), &before);

    fx.ledger.set_rate(&ctx(ADMIN), 1).unwrap();
    let before = fx.ledger.state().clone();
    let err = fx
        .ledger
        .batch_reconcile(&ctx(BACKEND), &[ALICE, BOB], &[10, u128::MAX])
        .unwrap_err();
    assert_eq!(err, LedgerError::ArithmeticOverflow);
    assert_eq!(fx.ledger.state(), &before, "no entry of a failed batch may land");
}
