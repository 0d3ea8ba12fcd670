//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod closing;
pub mod movement;

pub use account::{AccountError, AccountFilter, AccountRepository, CreateAccountInput};
pub use closing::ClosingRepository;
pub use movement::MovementRepository;

use sea_orm::DbErr;
use treasury_core::StoreError;

/// Wraps a driver error for the core store traits.
pub(crate) fn store_err(e: DbErr) -> StoreError {
    StoreError::new(e.to_string())
}
