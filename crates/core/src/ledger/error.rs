//! Movement error types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use treasury_shared::types::{AccountId, MovementId};

use crate::store::StoreError;

/// Errors that can occur while recording or editing movements.
#[derive(Debug, Error)]
pub enum MovementError {
    // ========== Validation Errors ==========
    /// Amount must be strictly positive.
    #[error("Movement amount must be greater than zero")]
    NonPositiveAmount,

    /// Amount has more decimal places than a currency value holds.
    #[error("Movement amount {0} has more than 2 decimal places")]
    InvalidAmountScale(Decimal),

    /// Transfer legs can only be created through a transfer.
    #[error("Movement kind {0} can only be recorded through a transfer")]
    TransferKindNotAllowed(String),

    /// Source and destination of a transfer are the same account.
    #[error("Transfer source and destination must be different accounts")]
    SameAccountTransfer,

    /// Transfer legs are edited by deleting and recreating the transfer.
    #[error("Movement {0} is a transfer leg and cannot be edited")]
    TransferLegImmutable(MovementId),

    // ========== Account Errors ==========
    /// Account not found.
    #[error("Bank account not found: {0}")]
    AccountNotFound(AccountId),

    /// Account is inactive and accepts no new movements.
    #[error("Bank account {0} is inactive")]
    AccountInactive(AccountId),

    // ========== State Errors ==========
    /// Movement not found.
    #[error("Movement not found: {0}")]
    MovementNotFound(MovementId),

    /// The date is covered by a closed day for this account.
    #[error("Movements dated {date} on account {account_id} are locked by the closing of {closed_on}")]
    PeriodClosed {
        /// Account whose period is closed.
        account_id: AccountId,
        /// Date the write targeted.
        date: NaiveDate,
        /// Closed date covering the movement date.
        closed_on: NaiveDate,
    },

    // ========== System Errors ==========
    /// Repository operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] StoreError),

    /// The movement was saved but later closed balances could not be refreshed.
    #[error("Movement saved but closings of account {account_id} after {date} could not be recalculated: {reason}")]
    Recalculation {
        /// Account whose closings are stale.
        account_id: AccountId,
        /// Movement date the recalculation started from.
        date: NaiveDate,
        /// Underlying store failure.
        reason: String,
    },
}

impl MovementError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::InvalidAmountScale(_) => "INVALID_AMOUNT_SCALE",
            Self::TransferKindNotAllowed(_) => "TRANSFER_KIND_NOT_ALLOWED",
            Self::SameAccountTransfer => "SAME_ACCOUNT_TRANSFER",
            Self::TransferLegImmutable(_) => "TRANSFER_LEG_IMMUTABLE",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::MovementNotFound(_) => "MOVEMENT_NOT_FOUND",
            Self::PeriodClosed { .. } => "PERIOD_CLOSED",
            Self::Repository(_) => "DATABASE_ERROR",
            Self::Recalculation { .. } => "CASCADE_RECALCULATION_FAILED",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::NonPositiveAmount
            | Self::InvalidAmountScale(_)
            | Self::TransferKindNotAllowed(_)
            | Self::SameAccountTransfer
            | Self::AccountInactive(_) => 400,

            // 404 Not Found
            Self::AccountNotFound(_) | Self::MovementNotFound(_) => 404,

            // 409 Conflict - state errors
            Self::TransferLegImmutable(_) | Self::PeriodClosed { .. } => 409,

            // 500 Internal Server Error
            Self::Repository(_) | Self::Recalculation { .. } => 500,
        }
    }
}
