//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod accounts;
pub mod closings;
pub mod health;
pub mod movements;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(accounts::routes())
        .merge(movements::routes())
        .merge(closings::routes())
}
