//! Daily bank closing engine.
//!
//! This module implements:
//! - Balance computation anchored on the latest closed day
//! - The closing orchestrator with its chronological rules
//! - Reopening with cascade recalculation of later days
//! - The closing store contract implemented by the db crate

pub mod balance;
pub mod cascade;
pub mod error;
pub mod policy;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
mod props;
#[cfg(test)]
mod tests;

pub use balance::{accumulate, compute_closing};
pub use error::{ClosingError, ClosingValidationError};
pub use policy::ClosingPolicy;
pub use service::ClosingService;
pub use store::ClosingStore;
pub use types::{
    CascadeFailure, CascadeReport, ClosingBatchResult, ClosingComputation, ClosingFigures,
    ClosingPreview, ClosingRecord, ReopenResult,
};
