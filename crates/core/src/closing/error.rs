//! Closing error types.

use chrono::NaiveDate;
use thiserror::Error;
use treasury_shared::types::AccountId;

use crate::store::StoreError;

/// A closing or reopening request was rejected before anything was written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClosingValidationError {
    /// The target date lies after today.
    #[error("Cannot close future date {date} (today is {today})")]
    FutureDate {
        /// Requested date.
        date: NaiveDate,
        /// Business date the request was evaluated against.
        today: NaiveDate,
    },

    /// The target date lies before the allowed backdating window.
    #[error("Date {date} is outside the closing window; earliest allowed is {earliest_allowed}")]
    OutsideWindow {
        /// Requested date.
        date: NaiveDate,
        /// Oldest date that may still be closed.
        earliest_allowed: NaiveDate,
    },

    /// A later date is already closed.
    #[error("Cannot close {0}: a later date is already closed")]
    OutOfOrder(NaiveDate),

    /// The target date is already closed.
    #[error("Date {0} is already closed")]
    DuplicateDate(NaiveDate),

    /// There are no active accounts to close.
    #[error("No active bank accounts to close")]
    NoActiveAccounts,

    /// Reopen target has no closed records.
    #[error("Date {0} is not closed")]
    NotClosed(NaiveDate),
}

impl ClosingValidationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::FutureDate { .. } => "CLOSING_FUTURE_DATE",
            Self::OutsideWindow { .. } => "CLOSING_OUTSIDE_WINDOW",
            Self::OutOfOrder(_) => "CLOSING_OUT_OF_ORDER",
            Self::DuplicateDate(_) => "CLOSING_DUPLICATE_DATE",
            Self::NoActiveAccounts => "NO_ACTIVE_ACCOUNTS",
            Self::NotClosed(_) => "CLOSING_NOT_CLOSED",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::FutureDate { .. } | Self::OutsideWindow { .. } => 400,
            Self::OutOfOrder(_) | Self::DuplicateDate(_) | Self::NotClosed(_) => 409,
            Self::NoActiveAccounts => 422,
        }
    }
}

/// Errors that can occur during closing, reopening or recalculation.
#[derive(Debug, Error)]
pub enum ClosingError {
    /// Request rejected before any mutation.
    #[error(transparent)]
    Validation(#[from] ClosingValidationError),

    /// Store read or write failed. Writes issued before the failure may persist.
    #[error("Data access error: {0}")]
    DataAccess(#[from] StoreError),

    /// Cascade recalculation stopped at a date.
    ///
    /// Every date in `recalculated` was fully updated before the failure.
    #[error("Cascade recalculation failed at {date}: {reason}")]
    CascadeRecalculation {
        /// Date that failed.
        date: NaiveDate,
        /// Account being recalculated, when known.
        account_id: Option<AccountId>,
        /// Underlying reason.
        reason: String,
        /// Dates recalculated before the failure, ascending.
        recalculated: Vec<NaiveDate>,
    },
}

impl ClosingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.error_code(),
            Self::DataAccess(_) => "DATABASE_ERROR",
            Self::CascadeRecalculation { .. } => "CASCADE_RECALCULATION_FAILED",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation(e) => e.http_status_code(),
            Self::DataAccess(_) | Self::CascadeRecalculation { .. } => 500,
        }
    }
}
