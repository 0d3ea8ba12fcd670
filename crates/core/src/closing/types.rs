//! Daily closing data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use treasury_shared::types::{AccountId, ClosingId, UserId};

/// A daily balance snapshot for one account.
///
/// One row exists per `(account, date)`. Reopening keeps the row and clears
/// `is_closed`; cascade recalculation overwrites the figures in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosingRecord {
    /// Unique identifier.
    pub id: ClosingId,
    /// Account the snapshot belongs to.
    pub account_id: AccountId,
    /// Day being closed.
    pub closing_date: NaiveDate,
    /// Final balance of the previous closing, or the opening balance.
    pub previous_balance: Decimal,
    /// Sum of inflows and incoming transfers since the anchor.
    pub total_in: Decimal,
    /// Sum of outflows and outgoing transfers since the anchor.
    pub total_out: Decimal,
    /// `previous_balance + total_in - total_out`.
    pub final_balance: Decimal,
    /// Whether the day is currently closed for this account.
    pub is_closed: bool,
    /// User who performed the closing.
    pub closed_by: UserId,
}

impl ClosingRecord {
    /// Builds a closed record from computed figures.
    #[must_use]
    pub fn closed(
        account_id: AccountId,
        closing_date: NaiveDate,
        figures: &ClosingFigures,
        closed_by: UserId,
    ) -> Self {
        Self {
            id: ClosingId::new(),
            account_id,
            closing_date,
            previous_balance: figures.previous_balance,
            total_in: figures.total_in,
            total_out: figures.total_out,
            final_balance: figures.final_balance,
            is_closed: true,
            closed_by,
        }
    }
}

/// The four balance figures of a closing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosingFigures {
    /// Balance carried in from the anchor.
    pub previous_balance: Decimal,
    /// Total inflows in the movement window.
    pub total_in: Decimal,
    /// Total outflows in the movement window.
    pub total_out: Decimal,
    /// Resulting balance.
    pub final_balance: Decimal,
}

/// Result of the balance computation for one account and date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClosingComputation {
    /// Date of the closing used as anchor, `None` when the opening balance was used.
    pub anchor_date: Option<NaiveDate>,
    /// Computed figures.
    pub figures: ClosingFigures,
}

/// Per-account figures returned by a closing preview.
#[derive(Debug, Clone, Serialize)]
pub struct ClosingPreview {
    /// Account.
    pub account_id: AccountId,
    /// Account display name.
    pub account_name: String,
    /// What a closing would persist.
    pub computation: ClosingComputation,
}

/// Outcome of a successful `perform_closing`.
#[derive(Debug, Clone, Serialize)]
pub struct ClosingBatchResult {
    /// Day that was closed.
    pub closing_date: NaiveDate,
    /// Number of accounts closed.
    pub accounts_closed: usize,
    /// Persisted records.
    pub records: Vec<ClosingRecord>,
    /// True when the date had been reopened before and later dates were recalculated.
    pub reclosed: bool,
    /// Cascade report for later dates, present for re-closings.
    pub recalculation: Option<CascadeReport>,
}

/// Outcome of a successful `reopen`.
#[derive(Debug, Clone, Serialize)]
pub struct ReopenResult {
    /// Day that was reopened.
    pub reopened_date: NaiveDate,
    /// Number of records flipped back to open.
    pub records_reopened: u64,
    /// Cascade report for later dates.
    pub recalculation: CascadeReport,
}

/// What the cascade recalculation did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    /// Dates whose records were all recalculated, ascending.
    pub recalculated_dates: Vec<NaiveDate>,
    /// Failures encountered when the cascade continues past errors.
    pub failures: Vec<CascadeFailure>,
}

impl CascadeReport {
    /// Returns true when every later date was recalculated.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A single failed recalculation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeFailure {
    /// Date whose recalculation failed.
    pub date: NaiveDate,
    /// Account being recalculated when the failure occurred.
    pub account_id: Option<AccountId>,
    /// Underlying reason.
    pub reason: String,
}
