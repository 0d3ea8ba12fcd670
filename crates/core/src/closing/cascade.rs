//! Cascade recalculation of closed dates after an earlier date changed.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use treasury_shared::types::AccountId;

use super::balance::compute_closing;
use super::error::ClosingError;
use super::store::ClosingStore;
use super::types::{CascadeFailure, CascadeReport};
use crate::store::StoreError;

/// Recomputes every closed record dated after `changed`, date by date in
/// ascending order, overwriting figures in place.
///
/// Each date anchors on the nearest earlier closed record, which may itself
/// have been rewritten a step earlier. Dates already processed stay updated
/// when a later one fails.
///
/// # Errors
///
/// With `stop_on_error`, the first failure is returned as
/// `ClosingError::CascadeRecalculation`. Otherwise failures are collected in
/// the report and only a failure to list the work returns an error.
pub async fn recalculate_after<S: ClosingStore>(
    store: &S,
    changed: NaiveDate,
    stop_on_error: bool,
) -> Result<CascadeReport, ClosingError> {
    let dates = store.list_closed_dates_after(changed).await?;
    if dates.is_empty() {
        debug!(changed_date = %changed, "No later closed dates to recalculate");
        return Ok(CascadeReport::default());
    }

    let active: HashSet<AccountId> = store
        .list_active_accounts()
        .await?
        .into_iter()
        .map(|a| a.id)
        .collect();

    let mut report = CascadeReport::default();

    for date in dates {
        match recalculate_date(store, date, &active).await {
            Ok(accounts) => {
                debug!(date = %date, accounts, "Closing date recalculated");
                report.recalculated_dates.push(date);
            }
            Err((account_id, e)) => {
                warn!(
                    date = %date,
                    account_id = ?account_id,
                    error = %e,
                    "Cascade recalculation failed"
                );
                if stop_on_error {
                    return Err(ClosingError::CascadeRecalculation {
                        date,
                        account_id,
                        reason: e.to_string(),
                        recalculated: report.recalculated_dates,
                    });
                }
                report.failures.push(CascadeFailure {
                    date,
                    account_id,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        changed_date = %changed,
        recalculated = report.recalculated_dates.len(),
        failed = report.failures.len(),
        "Cascade recalculation finished"
    );

    Ok(report)
}

/// Recomputes the closed records of a single account dated after `changed`,
/// in ascending order.
///
/// Called after a movement is written under a reopened date while later
/// dates of the same account are still closed. Returns the dates rewritten.
///
/// # Errors
///
/// Returns the first store failure. Dates rewritten before it keep their
/// new figures.
pub async fn recalculate_account_after<S: ClosingStore>(
    store: &S,
    account_id: AccountId,
    changed: NaiveDate,
) -> Result<Vec<NaiveDate>, StoreError> {
    let mut dates: Vec<NaiveDate> = store
        .list_closings(Some(changed), None)
        .await?
        .into_iter()
        .filter(|r| r.account_id == account_id && r.is_closed && r.closing_date > changed)
        .map(|r| r.closing_date)
        .collect();
    dates.sort();
    dates.dedup();

    for date in &dates {
        let computation = compute_closing(store, account_id, *date).await?;
        store
            .update_closing_figures(account_id, *date, computation.figures)
            .await?;
    }

    if !dates.is_empty() {
        debug!(
            account_id = %account_id,
            changed_date = %changed,
            recalculated = dates.len(),
            "Account closings recalculated"
        );
    }

    Ok(dates)
}

/// Recomputes the closed records of one date for active accounts.
async fn recalculate_date<S: ClosingStore>(
    store: &S,
    date: NaiveDate,
    active: &HashSet<AccountId>,
) -> Result<usize, (Option<AccountId>, StoreError)> {
    let records = store
        .list_closings(Some(date), Some(date))
        .await
        .map_err(|e| (None, e))?;

    let mut count = 0;
    for record in records
        .into_iter()
        .filter(|r| r.is_closed && active.contains(&r.account_id))
    {
        let account_id = record.account_id;
        let computation = compute_closing(store, account_id, date)
            .await
            .map_err(|e| (Some(account_id), e))?;
        store
            .update_closing_figures(account_id, date, computation.figures)
            .await
            .map_err(|e| (Some(account_id), e))?;
        count += 1;
    }

    Ok(count)
}
