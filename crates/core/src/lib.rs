//! Core business logic for Treasury.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence is reached through store traits implemented by the db crate.
//!
//! # Modules
//!
//! - `closing` - Daily bank closing, reopening and cascade recalculation
//! - `ledger` - Bank accounts, movements and transfers
//! - `store` - Store failure shared by every persistence trait

pub mod closing;
pub mod ledger;
pub mod store;

pub use store::StoreError;

#[cfg(test)]
pub(crate) mod testing;
