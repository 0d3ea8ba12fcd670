//! Persistence contract for accounts and movements.

use chrono::NaiveDate;
use treasury_shared::types::{AccountId, MovementId, TransferId};

use super::types::{BankAccount, Movement};
use crate::store::StoreError;

/// Closing record that governs whether a movement date is still editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoveringClosing {
    /// Date of the earliest closing on or after the movement date.
    pub closing_date: NaiveDate,
    /// Whether that closing is currently closed.
    pub is_closed: bool,
}

/// Repository trait for movement persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait MovementStore: Send + Sync {
    /// Find a bank account by ID.
    fn find_account(
        &self,
        id: AccountId,
    ) -> impl std::future::Future<Output = Result<Option<BankAccount>, StoreError>> + Send;

    /// Find a movement by ID.
    fn find_movement(
        &self,
        id: MovementId,
    ) -> impl std::future::Future<Output = Result<Option<Movement>, StoreError>> + Send;

    /// Insert a single movement.
    fn insert_movement(
        &self,
        movement: Movement,
    ) -> impl std::future::Future<Output = Result<Movement, StoreError>> + Send;

    /// Insert both legs of a transfer. Either both rows are written or neither is.
    fn insert_transfer(
        &self,
        outgoing: Movement,
        incoming: Movement,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Overwrite date, amount and description of an existing movement.
    fn update_movement(
        &self,
        movement: Movement,
    ) -> impl std::future::Future<Output = Result<Movement, StoreError>> + Send;

    /// Delete a movement. Returns false when it did not exist.
    fn delete_movement(
        &self,
        id: MovementId,
    ) -> impl std::future::Future<Output = Result<bool, StoreError>> + Send;

    /// Both legs of a transfer.
    fn find_transfer_legs(
        &self,
        transfer_id: TransferId,
    ) -> impl std::future::Future<Output = Result<Vec<Movement>, StoreError>> + Send;

    /// Delete every leg of a transfer, returning how many rows were removed.
    fn delete_transfer(
        &self,
        transfer_id: TransferId,
    ) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;

    /// Earliest closing record (open or closed) for the account dated on or after `date`.
    fn find_covering_closing(
        &self,
        account_id: AccountId,
        date: NaiveDate,
    ) -> impl std::future::Future<Output = Result<Option<CoveringClosing>, StoreError>> + Send;

    /// Movements of an account within an inclusive, optionally open-ended date range.
    fn list_movements(
        &self,
        account_id: AccountId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> impl std::future::Future<Output = Result<Vec<Movement>, StoreError>> + Send;
}
