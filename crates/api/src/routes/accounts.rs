//! Bank account routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use treasury_db::{AccountFilter, CreateAccountInput};
use treasury_shared::types::{AccountId, CompanyId};

use crate::{AppState, error::ApiError, middleware::ActorId};

/// Creates the bank account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bank-accounts", get(list_accounts).post(create_account))
        .route("/bank-accounts/{account_id}/status", patch(update_account_status))
        .route("/bank-accounts/{account_id}/movements", get(list_account_movements))
}

/// Query parameters for listing accounts.
#[derive(Debug, Deserialize)]
pub struct ListAccountsQuery {
    /// Filter by owning company.
    pub company_id: Option<CompanyId>,
    /// Filter by active status.
    pub active: Option<bool>,
}

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Owning company.
    pub company_id: CompanyId,
    /// Display name.
    pub name: String,
    /// Balance before the first movement (default: zero).
    #[serde(default)]
    pub opening_balance: Decimal,
}

/// Request body for activating or deactivating an account.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// New active flag.
    pub is_active: bool,
}

/// Date range for movement listings.
#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    /// First date included.
    pub from: Option<NaiveDate>,
    /// Last date included.
    pub to: Option<NaiveDate>,
}

/// GET `/bank-accounts` - List bank accounts.
async fn list_accounts(
    State(state): State<AppState>,
    Query(query): Query<ListAccountsQuery>,
) -> impl IntoResponse {
    let filter = AccountFilter {
        company_id: query.company_id,
        is_active: query.active,
    };

    match state.accounts.list_accounts(filter).await {
        Ok(accounts) => (StatusCode::OK, Json(json!({ "accounts": accounts }))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// POST `/bank-accounts` - Create an active bank account.
async fn create_account(
    State(state): State<AppState>,
    actor: ActorId,
    Json(payload): Json<CreateAccountRequest>,
) -> impl IntoResponse {
    let input = CreateAccountInput {
        company_id: payload.company_id,
        name: payload.name,
        opening_balance: payload.opening_balance,
    };

    match state.accounts.create_account(input).await {
        Ok(account) => {
            info!(account_id = %account.id, actor = %actor.user_id(), "Account created via API");
            (StatusCode::CREATED, Json(json!(account))).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// PATCH `/bank-accounts/{account_id}/status` - Activate or deactivate an account.
async fn update_account_status(
    State(state): State<AppState>,
    actor: ActorId,
    Path(account_id): Path<AccountId>,
    Json(payload): Json<UpdateStatusRequest>,
) -> impl IntoResponse {
    match state
        .accounts
        .set_account_active(account_id, payload.is_active)
        .await
    {
        Ok(account) => {
            info!(
                account_id = %account.id,
                is_active = account.is_active,
                actor = %actor.user_id(),
                "Account status updated via API"
            );
            (StatusCode::OK, Json(json!(account))).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// GET `/bank-accounts/{account_id}/movements` - List an account's movements.
async fn list_account_movements(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
    Query(range): Query<DateRangeQuery>,
) -> impl IntoResponse {
    match state
        .movements
        .list_movements(account_id, range.from, range.to)
        .await
    {
        Ok(movements) => (
            StatusCode::OK,
            Json(json!({
                "account_id": account_id,
                "movements": movements,
            })),
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
