//! HTTP API layer with Axum routes and extractors.
//!
//! This crate provides:
//! - REST API routes for bank accounts, movements and daily closings
//! - The acting-user extractor
//! - Mapping of domain errors to JSON responses

pub mod error;
pub mod middleware;
pub mod routes;

use axum::{Router, http::Uri};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use treasury_core::closing::{ClosingPolicy, ClosingService};
use treasury_core::ledger::MovementService;
use treasury_db::{AccountRepository, ClosingRepository, MovementRepository};
use treasury_shared::AppError;

use crate::error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Bank account repository.
    pub accounts: Arc<AccountRepository>,
    /// Movement and transfer bookkeeping.
    pub movements: Arc<MovementService<MovementRepository, ClosingRepository>>,
    /// Daily closing engine.
    pub closings: Arc<ClosingService<ClosingRepository>>,
    /// Time zone in which "today" is evaluated.
    pub timezone: Tz,
}

impl AppState {
    /// Wires repositories and services over one connection pool.
    ///
    /// The movement service shares the closing service's store and operation lock.
    #[must_use]
    pub fn new(db: DatabaseConnection, policy: ClosingPolicy, timezone: Tz) -> Self {
        let closing_store = Arc::new(ClosingRepository::new(db.clone()));
        let closings = ClosingService::new(Arc::clone(&closing_store), policy);
        let movements = MovementService::new(
            Arc::new(MovementRepository::new(db.clone())),
            closing_store,
            closings.lock_handle(),
        );

        Self {
            accounts: Arc::new(AccountRepository::new(db)),
            movements: Arc::new(movements),
            closings: Arc::new(closings),
            timezone,
        }
    }

    /// Current calendar date in the configured time zone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .fallback(unknown_route)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn unknown_route(uri: Uri) -> ApiError {
    AppError::NotFound(format!("no route for {uri}")).into()
}
