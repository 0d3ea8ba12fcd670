//! Movement and transfer routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{post, put},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use treasury_core::ledger::{MovementKind, MovementUpdate, NewMovement, NewTransfer};
use treasury_shared::types::{AccountId, MovementId};

use crate::{AppState, error::ApiError, middleware::ActorId};

/// Creates the movement routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/movements", post(record_movement))
        .route("/movements/{movement_id}", put(update_movement).delete(delete_movement))
        .route("/transfers", post(record_transfer))
}

/// Request body for recording a movement.
#[derive(Debug, Deserialize)]
pub struct RecordMovementRequest {
    /// Target account.
    pub account_id: AccountId,
    /// Movement date (YYYY-MM-DD).
    pub movement_date: NaiveDate,
    /// `inflow` or `outflow`.
    pub kind: MovementKind,
    /// Positive amount.
    pub amount: Decimal,
    /// Optional description.
    pub description: Option<String>,
}

/// Request body for editing a movement.
#[derive(Debug, Deserialize)]
pub struct UpdateMovementRequest {
    /// New movement date.
    pub movement_date: NaiveDate,
    /// New positive amount.
    pub amount: Decimal,
    /// New description.
    pub description: Option<String>,
}

/// Request body for a transfer between accounts.
#[derive(Debug, Deserialize)]
pub struct RecordTransferRequest {
    /// Source account.
    pub from_account_id: AccountId,
    /// Destination account.
    pub to_account_id: AccountId,
    /// Transfer date.
    pub transfer_date: NaiveDate,
    /// Positive amount.
    pub amount: Decimal,
    /// Optional description copied to both legs.
    pub description: Option<String>,
}

/// POST `/movements` - Record an inflow or outflow.
async fn record_movement(
    State(state): State<AppState>,
    actor: ActorId,
    Json(payload): Json<RecordMovementRequest>,
) -> impl IntoResponse {
    let input = NewMovement {
        account_id: payload.account_id,
        movement_date: payload.movement_date,
        kind: payload.kind,
        amount: payload.amount,
        description: payload.description,
    };

    match state.movements.record_movement(input).await {
        Ok(movement) => {
            info!(movement_id = %movement.id, actor = %actor.user_id(), "Movement recorded via API");
            (StatusCode::CREATED, Json(json!(movement))).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// PUT `/movements/{movement_id}` - Edit a plain movement.
async fn update_movement(
    State(state): State<AppState>,
    actor: ActorId,
    Path(movement_id): Path<MovementId>,
    Json(payload): Json<UpdateMovementRequest>,
) -> impl IntoResponse {
    let update = MovementUpdate {
        movement_date: payload.movement_date,
        amount: payload.amount,
        description: payload.description,
    };

    match state.movements.update_movement(movement_id, update).await {
        Ok(movement) => {
            info!(movement_id = %movement.id, actor = %actor.user_id(), "Movement updated via API");
            (StatusCode::OK, Json(json!(movement))).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// DELETE `/movements/{movement_id}` - Delete a movement, or both legs of a transfer.
async fn delete_movement(
    State(state): State<AppState>,
    actor: ActorId,
    Path(movement_id): Path<MovementId>,
) -> impl IntoResponse {
    match state.movements.delete_movement(movement_id).await {
        Ok(()) => {
            info!(movement_id = %movement_id, actor = %actor.user_id(), "Movement deleted via API");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// POST `/transfers` - Move money between two accounts.
async fn record_transfer(
    State(state): State<AppState>,
    actor: ActorId,
    Json(payload): Json<RecordTransferRequest>,
) -> impl IntoResponse {
    let input = NewTransfer {
        from_account_id: payload.from_account_id,
        to_account_id: payload.to_account_id,
        transfer_date: payload.transfer_date,
        amount: payload.amount,
        description: payload.description,
    };

    match state.movements.record_transfer(input).await {
        Ok(transfer) => {
            info!(transfer_id = %transfer.id, actor = %actor.user_id(), "Transfer recorded via API");
            (StatusCode::CREATED, Json(json!(transfer))).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}
