//! Shared types, errors, and configuration for Treasury.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Request-level error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, ClosingConfig, DatabaseConfig, ServerConfig};
pub use error::AppError;
