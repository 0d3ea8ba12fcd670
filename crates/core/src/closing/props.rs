//! Property-based tests for the closing service.
//!
//! - Balance chain: after any sequence of closings, reopenings and movement
//!   additions, each closed record starts where the previous closed record
//!   of the same account ended (or at the opening balance).
//! - Ordering law: closing a date succeeds exactly when no later date is closed.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use treasury_shared::types::{AccountId, UserId};

use super::error::{ClosingError, ClosingValidationError};
use super::policy::ClosingPolicy;
use super::service::ClosingService;
use super::store::ClosingStore;
use crate::ledger::MovementKind;
use crate::testing::{MockStore, date};

#[derive(Debug, Clone)]
enum Op {
    Close(u64),
    Reopen(u64),
    Move {
        account: usize,
        day: u64,
        inflow: bool,
        cents: i64,
    },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u64..6).prop_map(Op::Close),
        (0u64..6).prop_map(Op::Reopen),
        (0usize..3, 0u64..6, any::<bool>(), 1i64..1_000_000).prop_map(
            |(account, day, inflow, cents)| Op::Move {
                account,
                day,
                inflow,
                cents,
            }
        ),
    ]
}

fn base() -> NaiveDate {
    date(2024, 6, 1)
}

fn day(offset: u64) -> NaiveDate {
    base().checked_add_days(Days::new(offset)).unwrap()
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

fn assert_chain(store: &MockStore, account: AccountId) -> Result<(), TestCaseError> {
    let chain = store.closed_chain(account);
    let mut expected_previous = store.opening_balance(account);
    for record in chain {
        prop_assert_eq!(record.previous_balance, expected_previous);
        prop_assert_eq!(
            record.final_balance,
            record.previous_balance + record.total_in - record.total_out
        );
        expected_previous = record.final_balance;
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The balance chain holds after every successful operation.
    #[test]
    fn prop_balance_chain_invariant(
        openings in prop::collection::vec(-1_000_000i64..1_000_000, 3),
        ops in prop::collection::vec(op_strategy(), 1..40),
    ) {
        runtime().block_on(async {
            let store = Arc::new(MockStore::default());
            // A wide window so only the chronological rules are exercised.
            let policy = ClosingPolicy { max_backdays: 30, stop_on_error: false };
            let svc = ClosingService::new(Arc::clone(&store), policy);
            let today = day(10);
            let accounts: Vec<AccountId> = openings
                .iter()
                .map(|cents| store.add_account(Decimal::new(*cents, 2)))
                .collect();

            for op in ops {
                match op {
                    Op::Close(offset) => {
                        let _ = svc.perform_closing(day(offset), UserId::new(), today).await;
                    }
                    Op::Reopen(offset) => {
                        let report = svc.reopen(day(offset)).await;
                        if let Ok(result) = report {
                            prop_assert!(result.recalculation.is_complete());
                        }
                    }
                    Op::Move { account, day: offset, inflow, cents } => {
                        // Only dates whose covering record is open accept movements.
                        let on = day(offset);
                        let covering = store
                            .list_closings(Some(on), None)
                            .await
                            .unwrap()
                            .into_iter()
                            .find(|r| r.account_id == accounts[account]);
                        if covering.is_none_or(|r| !r.is_closed) {
                            let kind = if inflow { MovementKind::Inflow } else { MovementKind::Outflow };
                            store.add_movement(accounts[account], on, kind, Decimal::new(cents, 2));
                        }
                    }
                }

                for account in &accounts {
                    assert_chain(&store, *account)?;
                }
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    /// `perform_closing(d)` fails with `OutOfOrder` iff a later date is closed,
    /// with `DuplicateDate` iff `d` itself is the latest closed date.
    #[test]
    fn prop_ordering_law(
        closed in prop::collection::btree_set(0u64..8, 0..5),
        target in 0u64..8,
    ) {
        runtime().block_on(async {
            let store = Arc::new(MockStore::default());
            let policy = ClosingPolicy { max_backdays: 30, stop_on_error: false };
            let svc = ClosingService::new(Arc::clone(&store), policy);
            let today = day(10);
            store.add_account(Decimal::ONE_HUNDRED);

            for offset in &closed {
                svc.perform_closing(day(*offset), UserId::new(), today).await.unwrap();
            }

            let later_closed = closed.iter().any(|c| *c > target);
            let result = svc.perform_closing(day(target), UserId::new(), today).await;

            match result {
                Ok(_) => {
                    prop_assert!(!later_closed && !closed.contains(&target));
                }
                Err(ClosingError::Validation(ClosingValidationError::OutOfOrder(_))) => {
                    prop_assert!(later_closed);
                }
                Err(ClosingError::Validation(ClosingValidationError::DuplicateDate(_))) => {
                    prop_assert!(!later_closed && closed.contains(&target));
                }
                Err(other) => {
                    prop_assert!(false, "unexpected error: {}", other);
                }
            }
            Ok::<(), TestCaseError>(())
        })?;
    }
}
