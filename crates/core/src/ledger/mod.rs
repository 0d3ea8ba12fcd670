//! Bank accounts, movements and transfers.
//!
//! This module implements:
//! - Account and movement domain types
//! - The movement store contract implemented by the db crate
//! - The movement service with the closed-period lock

pub mod error;
pub mod service;
pub mod store;
pub mod types;


pub use error::MovementError;
pub use service::MovementService;
pub use store::{CoveringClosing, MovementStore};
pub use types::{
    BankAccount, Movement, MovementKind, MovementUpdate, NewMovement, NewTransfer, Transfer,
};
