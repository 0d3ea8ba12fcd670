//! Daily closing routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{AppState, error::ApiError, middleware::ActorId};

/// Creates the closing routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/closings", get(list_closings).post(perform_closing))
        .route("/closings/preview", get(preview_closing))
        .route("/closings/{date}/reopen", post(reopen_closing))
}

/// Date range for closing history.
#[derive(Debug, Deserialize)]
pub struct ListClosingsQuery {
    /// First date included.
    pub from: Option<NaiveDate>,
    /// Last date included.
    pub to: Option<NaiveDate>,
}

/// Query parameters for a closing preview.
#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    /// Date to preview (default: today).
    pub date: Option<NaiveDate>,
}

/// Request body for performing a closing.
#[derive(Debug, Deserialize)]
pub struct PerformClosingRequest {
    /// Day to close (YYYY-MM-DD).
    pub closing_date: NaiveDate,
}

/// GET `/closings` - Closing records in a date range.
async fn list_closings(
    State(state): State<AppState>,
    Query(query): Query<ListClosingsQuery>,
) -> impl IntoResponse {
    match state.closings.list_closings(query.from, query.to).await {
        Ok(records) => (StatusCode::OK, Json(json!({ "closings": records }))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// GET `/closings/preview?date=` - Figures a closing would persist, per active account.
async fn preview_closing(
    State(state): State<AppState>,
    Query(query): Query<PreviewQuery>,
) -> impl IntoResponse {
    let today = state.today();
    let date = query.date.unwrap_or(today);

    match state.closings.preview(date).await {
        Ok(previews) => (
            StatusCode::OK,
            Json(json!({
                "closing_date": date,
                "today": today,
                "earliest_allowed": state.closings.policy().earliest_allowed(today),
                "accounts": previews,
            })),
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// POST `/closings` - Close a day for every active account.
async fn perform_closing(
    State(state): State<AppState>,
    actor: ActorId,
    Json(payload): Json<PerformClosingRequest>,
) -> impl IntoResponse {
    let today = state.today();

    match state
        .closings
        .perform_closing(payload.closing_date, actor.user_id(), today)
        .await
    {
        Ok(result) => {
            info!(
                closing_date = %result.closing_date,
                accounts = result.accounts_closed,
                reclosed = result.reclosed,
                actor = %actor.user_id(),
                "Closing performed via API"
            );
            (StatusCode::CREATED, Json(json!(result))).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// POST `/closings/{date}/reopen` - Reopen a day and recalculate later closings.
async fn reopen_closing(
    State(state): State<AppState>,
    actor: ActorId,
    Path(date): Path<NaiveDate>,
) -> impl IntoResponse {
    match state.closings.reopen(date).await {
        Ok(result) => {
            info!(
                reopened_date = %result.reopened_date,
                records = result.records_reopened,
                recalculated = result.recalculation.recalculated_dates.len(),
                actor = %actor.user_id(),
                "Closing reopened via API"
            );
            (StatusCode::OK, Json(json!(result))).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}
