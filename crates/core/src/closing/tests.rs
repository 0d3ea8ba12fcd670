//! Closing service tests against an in-memory store.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use treasury_shared::types::UserId;

use super::error::{ClosingError, ClosingValidationError};
use super::policy::ClosingPolicy;
use super::service::ClosingService;
use super::types::ClosingRecord;
use crate::ledger::MovementKind;
use crate::testing::{MockStore, date};

fn service(store: &Arc<MockStore>) -> ClosingService<MockStore> {
    ClosingService::new(Arc::clone(store), ClosingPolicy::default())
}

fn validation(result: Result<impl std::fmt::Debug, ClosingError>) -> ClosingValidationError {
    match result {
        Err(ClosingError::Validation(e)) => e,
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_daily_closing_scenario() {
    let store = Arc::new(MockStore::default());
    let svc = service(&store);
    let actor = UserId::new();
    let today = date(2024, 6, 3);
    let account = store.add_account(dec!(1000.00));

    store.add_movement(account, date(2024, 6, 1), MovementKind::Inflow, dec!(500.00));
    store.add_movement(account, date(2024, 6, 1), MovementKind::Outflow, dec!(200.00));

    let first = svc.perform_closing(date(2024, 6, 1), actor, today).await.unwrap();
    assert_eq!(first.accounts_closed, 1);
    assert!(!first.reclosed);
    let day1 = store.record(account, date(2024, 6, 1)).unwrap();
    assert_eq!(day1.previous_balance, dec!(1000.00));
    assert_eq!(day1.total_in, dec!(500.00));
    assert_eq!(day1.total_out, dec!(200.00));
    assert_eq!(day1.final_balance, dec!(1300.00));
    assert!(day1.is_closed);
    assert_eq!(day1.closed_by, actor);

    svc.perform_closing(date(2024, 6, 2), actor, today).await.unwrap();
    let day2 = store.record(account, date(2024, 6, 2)).unwrap();
    assert_eq!(day2.previous_balance, dec!(1300.00));
    assert_eq!(day2.total_in, Decimal::ZERO);
    assert_eq!(day2.total_out, Decimal::ZERO);
    assert_eq!(day2.final_balance, dec!(1300.00));

    let reopened = svc.reopen(date(2024, 6, 1)).await.unwrap();
    assert_eq!(reopened.records_reopened, 1);
    assert_eq!(reopened.recalculation.recalculated_dates, vec![date(2024, 6, 2)]);
    assert!(!store.record(account, date(2024, 6, 1)).unwrap().is_closed);

    store.add_movement(account, date(2024, 6, 1), MovementKind::Outflow, dec!(100.00));

    let reclosed = svc.perform_closing(date(2024, 6, 1), actor, today).await.unwrap();
    assert!(reclosed.reclosed);
    assert_eq!(
        reclosed.recalculation.unwrap().recalculated_dates,
        vec![date(2024, 6, 2)]
    );

    let day1 = store.record(account, date(2024, 6, 1)).unwrap();
    assert_eq!(day1.id, first.records[0].id);
    assert_eq!(day1.final_balance, dec!(1200.00));
    let day2 = store.record(account, date(2024, 6, 2)).unwrap();
    assert_eq!(day2.previous_balance, dec!(1200.00));
    assert_eq!(day2.final_balance, dec!(1200.00));
}

#[tokio::test]
async fn test_window_boundary() {
    let store = Arc::new(MockStore::default());
    let svc = service(&store);
    let today = date(2024, 6, 10);
    store.add_account(dec!(0));

    let tomorrow = validation(svc.perform_closing(date(2024, 6, 11), UserId::new(), today).await);
    assert!(matches!(tomorrow, ClosingValidationError::FutureDate { .. }));

    let too_old = validation(svc.perform_closing(date(2024, 6, 6), UserId::new(), today).await);
    assert!(matches!(too_old, ClosingValidationError::OutsideWindow { .. }));
    assert_eq!(store.closing_count(), 0);

    svc.perform_closing(date(2024, 6, 7), UserId::new(), today)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_ordering_and_duplicate_rules() {
    let store = Arc::new(MockStore::default());
    let svc = service(&store);
    let today = date(2024, 6, 10);
    store.add_account(dec!(50.00));

    svc.perform_closing(date(2024, 6, 9), UserId::new(), today)
        .await
        .unwrap();

    let earlier = validation(svc.perform_closing(date(2024, 6, 8), UserId::new(), today).await);
    assert_eq!(earlier, ClosingValidationError::OutOfOrder(date(2024, 6, 8)));

    let duplicate = validation(svc.perform_closing(date(2024, 6, 9), UserId::new(), today).await);
    assert_eq!(duplicate, ClosingValidationError::DuplicateDate(date(2024, 6, 9)));

    // Skipping days forward is allowed.
    svc.perform_closing(date(2024, 6, 10), UserId::new(), today)
        .await
        .unwrap();
    assert_eq!(store.closing_count(), 2);
}

#[tokio::test]
async fn test_no_active_accounts() {
    let store = Arc::new(MockStore::default());
    let svc = service(&store);
    let account = store.add_account(dec!(10.00));
    store.deactivate(account);

    let err = validation(svc.perform_closing(date(2024, 6, 1), UserId::new(), date(2024, 6, 1)).await);
    assert_eq!(err, ClosingValidationError::NoActiveAccounts);
}

#[tokio::test]
async fn test_inactive_accounts_are_skipped() {
    let store = Arc::new(MockStore::default());
    let svc = service(&store);
    let active = store.add_account(dec!(10.00));
    let inactive = store.add_account(dec!(20.00));
    store.deactivate(inactive);

    let result = svc
        .perform_closing(date(2024, 6, 1), UserId::new(), date(2024, 6, 1))
        .await
        .unwrap();
    assert_eq!(result.accounts_closed, 1);
    assert!(store.record(active, date(2024, 6, 1)).is_some());
    assert!(store.record(inactive, date(2024, 6, 1)).is_none());
}

#[tokio::test]
async fn test_failed_batch_insert_closes_nothing() {
    let store = Arc::new(MockStore::default());
    let svc = service(&store);
    store.add_account(dec!(10.00));
    store.fail_batch_insert();

    let result = svc
        .perform_closing(date(2024, 6, 1), UserId::new(), date(2024, 6, 1))
        .await;
    assert!(matches!(result, Err(ClosingError::DataAccess(_))));
    assert_eq!(store.closing_count(), 0);
}

#[tokio::test]
async fn test_reopen_requires_closed_date() {
    let store = Arc::new(MockStore::default());
    let svc = service(&store);
    store.add_account(dec!(10.00));

    let err = validation(svc.reopen(date(2024, 6, 1)).await);
    assert_eq!(err, ClosingValidationError::NotClosed(date(2024, 6, 1)));

    svc.perform_closing(date(2024, 6, 1), UserId::new(), date(2024, 6, 1))
        .await
        .unwrap();
    svc.reopen(date(2024, 6, 1)).await.unwrap();

    // Already reopened.
    let err = validation(svc.reopen(date(2024, 6, 1)).await);
    assert_eq!(err, ClosingValidationError::NotClosed(date(2024, 6, 1)));
}

#[tokio::test]
async fn test_reopen_absorbs_gap_into_next_closed_date() {
    let store = Arc::new(MockStore::default());
    let svc = service(&store);
    let today = date(2024, 6, 3);
    let account = store.add_account(dec!(100.00));
    store.add_movement(account, date(2024, 6, 1), MovementKind::Inflow, dec!(40.00));
    store.add_movement(account, date(2024, 6, 2), MovementKind::Outflow, dec!(15.00));

    svc.perform_closing(date(2024, 6, 1), UserId::new(), today).await.unwrap();
    svc.perform_closing(date(2024, 6, 2), UserId::new(), today).await.unwrap();

    svc.reopen(date(2024, 6, 1)).await.unwrap();

    let day2 = store.record(account, date(2024, 6, 2)).unwrap();
    assert_eq!(day2.previous_balance, dec!(100.00));
    assert_eq!(day2.total_in, dec!(40.00));
    assert_eq!(day2.total_out, dec!(15.00));
    assert_eq!(day2.final_balance, dec!(125.00));
}

#[tokio::test]
async fn test_reopen_reclose_round_trip_restores_later_dates() {
    let store = Arc::new(MockStore::default());
    let svc = service(&store);
    let today = date(2024, 6, 4);
    let a = store.add_account(dec!(1000.00));
    let b = store.add_account(dec!(-50.00));

    for (day, kind, amount) in [
        (1, MovementKind::Inflow, dec!(10.00)),
        (2, MovementKind::Outflow, dec!(3.25)),
        (3, MovementKind::TransferIn, dec!(7.00)),
        (4, MovementKind::TransferOut, dec!(1.00)),
    ] {
        store.add_movement(a, date(2024, 6, day), kind, amount);
        store.add_movement(b, date(2024, 6, day), kind, amount * dec!(2));
    }

    for day in 1..=4 {
        svc.perform_closing(date(2024, 6, day), UserId::new(), today)
            .await
            .unwrap();
    }
    let before_a = store.closed_chain(a);
    let before_b = store.closed_chain(b);

    svc.reopen(date(2024, 6, 2)).await.unwrap();
    svc.perform_closing(date(2024, 6, 2), UserId::new(), today)
        .await
        .unwrap();

    let figures = |chain: Vec<ClosingRecord>| {
        chain
            .iter()
            .map(|r| (r.previous_balance, r.total_in, r.total_out, r.final_balance))
            .collect::<Vec<_>>()
    };
    assert_eq!(figures(store.closed_chain(a)), figures(before_a));
    assert_eq!(figures(store.closed_chain(b)), figures(before_b));
}

#[tokio::test]
async fn test_cascade_continues_past_failures_by_default() {
    let store = Arc::new(MockStore::default());
    let svc = service(&store);
    let today = date(2024, 6, 4);
    let account = store.add_account(dec!(0));
    for day in 1..=4 {
        svc.perform_closing(date(2024, 6, day), UserId::new(), today)
            .await
            .unwrap();
    }
    store.add_movement(account, date(2024, 6, 1), MovementKind::Inflow, dec!(5.00));
    store.fail_update_on(date(2024, 6, 3));

    let result = svc.reopen(date(2024, 6, 1)).await.unwrap();
    assert_eq!(
        result.recalculation.recalculated_dates,
        vec![date(2024, 6, 2), date(2024, 6, 4)]
    );
    assert_eq!(result.recalculation.failures.len(), 1);
    assert_eq!(result.recalculation.failures[0].date, date(2024, 6, 3));
    assert_eq!(result.recalculation.failures[0].account_id, Some(account));
    assert!(!result.recalculation.is_complete());
}

#[tokio::test]
async fn test_cascade_stops_on_error_when_configured() {
    let store = Arc::new(MockStore::default());
    let policy = ClosingPolicy {
        stop_on_error: true,
        ..ClosingPolicy::default()
    };
    let svc = ClosingService::new(Arc::clone(&store), policy);
    let today = date(2024, 6, 4);
    let account = store.add_account(dec!(0));
    for day in 1..=4 {
        svc.perform_closing(date(2024, 6, day), UserId::new(), today)
            .await
            .unwrap();
    }
    store.add_movement(account, date(2024, 6, 1), MovementKind::Inflow, dec!(5.00));
    store.fail_update_on(date(2024, 6, 3));

    match svc.reopen(date(2024, 6, 1)).await {
        Err(ClosingError::CascadeRecalculation {
            date: failed,
            account_id,
            recalculated,
            ..
        }) => {
            assert_eq!(failed, date(2024, 6, 3));
            assert_eq!(account_id, Some(account));
            assert_eq!(recalculated, vec![date(2024, 6, 2)]);
        }
        other => panic!("expected cascade error, got {other:?}"),
    }

    // The date before the failure keeps its recalculated figures.
    let day2 = store.record(account, date(2024, 6, 2)).unwrap();
    assert_eq!(day2.final_balance, dec!(5.00));
    let day4 = store.record(account, date(2024, 6, 4)).unwrap();
    assert_eq!(day4.final_balance, Decimal::ZERO);
}

#[tokio::test]
async fn test_preview_does_not_persist() {
    let store = Arc::new(MockStore::default());
    let svc = service(&store);
    let account = store.add_account(dec!(1000.00));
    store.add_movement(account, date(2024, 6, 1), MovementKind::Inflow, dec!(500.00));

    let previews = svc.preview(date(2024, 6, 1)).await.unwrap();
    assert_eq!(previews.len(), 1);
    assert_eq!(previews[0].account_id, account);
    assert_eq!(previews[0].computation.anchor_date, None);
    assert_eq!(previews[0].computation.figures.final_balance, dec!(1500.00));
    assert_eq!(store.closing_count(), 0);
}

#[tokio::test]
async fn test_list_closings_range() {
    let store = Arc::new(MockStore::default());
    let svc = service(&store);
    let today = date(2024, 6, 3);
    store.add_account(dec!(0));
    for day in 1..=3 {
        svc.perform_closing(date(2024, 6, day), UserId::new(), today)
            .await
            .unwrap();
    }
    svc.reopen(date(2024, 6, 3)).await.unwrap();

    let all = svc.list_closings(None, None).await.unwrap();
    assert_eq!(all.len(), 3);
    assert!(!all[2].is_closed);

    let middle = svc
        .list_closings(Some(date(2024, 6, 2)), Some(date(2024, 6, 2)))
        .await
        .unwrap();
    assert_eq!(middle.len(), 1);
    assert_eq!(middle[0].closing_date, date(2024, 6, 2));
}
