//! Persistence contract for the closing engine.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use treasury_shared::types::AccountId;

use super::types::{ClosingFigures, ClosingRecord};
use crate::ledger::{BankAccount, Movement};
use crate::store::StoreError;

/// Repository trait for closing persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
/// "Closed" below always means a record whose closed flag is set; reopened
/// records keep their row with the flag cleared.
pub trait ClosingStore: Send + Sync {
    /// All active bank accounts.
    fn list_active_accounts(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<BankAccount>, StoreError>> + Send;

    /// Opening balance of an account, `None` if the account does not exist.
    fn get_opening_balance(
        &self,
        account_id: AccountId,
    ) -> impl std::future::Future<Output = Result<Option<Decimal>, StoreError>> + Send;

    /// Most recent closed record of the account dated strictly before `date`.
    fn find_latest_closed_before(
        &self,
        account_id: AccountId,
        date: NaiveDate,
    ) -> impl std::future::Future<Output = Result<Option<ClosingRecord>, StoreError>> + Send;

    /// Movements of the account dated in `(after, through]`.
    ///
    /// `after = None` means no lower bound.
    fn find_movements(
        &self,
        account_id: AccountId,
        after: Option<NaiveDate>,
        through: NaiveDate,
    ) -> impl std::future::Future<Output = Result<Vec<Movement>, StoreError>> + Send;

    /// Persist a batch of closed records in one atomic write.
    ///
    /// A row that already exists for the same `(account, date)` is overwritten
    /// in place, keeping its identifier. Returns the stored rows.
    fn insert_closing_batch(
        &self,
        records: Vec<ClosingRecord>,
    ) -> impl std::future::Future<Output = Result<Vec<ClosingRecord>, StoreError>> + Send;

    /// Overwrite the figures of an existing record.
    fn update_closing_figures(
        &self,
        account_id: AccountId,
        date: NaiveDate,
        figures: ClosingFigures,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Set the closed flag on every record of `date`, returning the number of rows changed.
    fn set_closed_flag(
        &self,
        date: NaiveDate,
        closed: bool,
    ) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;

    /// Whether any account has a closed record dated strictly after `date`.
    fn exists_closed_after(
        &self,
        date: NaiveDate,
    ) -> impl std::future::Future<Output = Result<bool, StoreError>> + Send;

    /// Whether any account has a closed record on `date`.
    fn exists_closed_on(
        &self,
        date: NaiveDate,
    ) -> impl std::future::Future<Output = Result<bool, StoreError>> + Send;

    /// Whether any account has a reopened (not closed) record on `date`.
    fn exists_reopened_on(
        &self,
        date: NaiveDate,
    ) -> impl std::future::Future<Output = Result<bool, StoreError>> + Send;

    /// Distinct dates after `date` that have at least one closed record, ascending.
    fn list_closed_dates_after(
        &self,
        date: NaiveDate,
    ) -> impl std::future::Future<Output = Result<Vec<NaiveDate>, StoreError>> + Send;

    /// Records (open and closed) in an inclusive, optionally open-ended range,
    /// ordered by date.
    fn list_closings(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> impl std::future::Future<Output = Result<Vec<ClosingRecord>, StoreError>> + Send;
}
