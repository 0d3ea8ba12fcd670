//! Balance computation for a single account and date.
//!
//! The anchor is the account's most recent closed record before the target
//! date, or the opening balance when there is none. Every movement dated after
//! the anchor and up to the target date is accumulated, so a gap left by a
//! reopened date is absorbed by the next computation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use treasury_shared::types::AccountId;

use super::store::ClosingStore;
use super::types::{ClosingComputation, ClosingFigures};
use crate::ledger::Movement;
use crate::store::StoreError;

/// Sums a movement window on top of a previous balance.
///
/// Pure function: identical inputs always produce identical figures.
#[must_use]
pub fn accumulate(previous_balance: Decimal, movements: &[Movement]) -> ClosingFigures {
    let (total_in, total_out) =
        movements
            .iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(inflow, outflow), m| {
                if m.kind.is_inflow() {
                    (inflow + m.amount, outflow)
                } else {
                    (inflow, outflow + m.amount)
                }
            });

    ClosingFigures {
        previous_balance,
        total_in,
        total_out,
        final_balance: previous_balance + total_in - total_out,
    }
}

/// Computes the closing figures of `account_id` as of `date`.
///
/// # Errors
///
/// Returns `StoreError` if any read fails or the account does not exist.
pub async fn compute_closing<S: ClosingStore>(
    store: &S,
    account_id: AccountId,
    date: NaiveDate,
) -> Result<ClosingComputation, StoreError> {
    let (previous_balance, anchor_date) =
        match store.find_latest_closed_before(account_id, date).await? {
            Some(anchor) => (anchor.final_balance, Some(anchor.closing_date)),
            None => {
                let opening = store
                    .get_opening_balance(account_id)
                    .await?
                    .ok_or_else(|| StoreError::new(format!("bank account {account_id} not found")))?;
                (opening, None)
            }
        };

    let movements = store.find_movements(account_id, anchor_date, date).await?;

    Ok(ClosingComputation {
        anchor_date,
        figures: accumulate(previous_balance, &movements),
    })
}
