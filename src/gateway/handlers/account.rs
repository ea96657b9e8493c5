//! Account endpoints

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::account::{Account, AccountError, AccountRepository, AccountType};
use crate::gateway::RequesterId;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, error_codes};

use super::{HandlerError, bad_request, internal, not_found};

#[derive(Debug, serde::Serialize)]
pub struct AccountsResponse {
    pub accounts: Vec<Account>,
}

/// GET /api/v1/accounts
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<RequesterId>,
) -> Result<Json<ApiResponse<AccountsResponse>>, HandlerError> {
    let accounts = AccountRepository::list_for_user(state.db.pool(), requester.0)
        .await
        .map_err(internal)?;

    Ok(Json(ApiResponse::success(AccountsResponse { accounts })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAccountRequest {
    #[serde(default)]
    pub account_type: AccountType,
    #[serde(default)]
    pub initial_deposit: Option<Decimal>,
}

/// POST /api/v1/accounts
pub async fn open_account(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<RequesterId>,
    Json(req): Json<OpenAccountRequest>,
) -> Result<Json<ApiResponse<Account>>, HandlerError> {
    let initial = req.initial_deposit.unwrap_or(Decimal::ZERO);

    match AccountRepository::create(state.db.pool(), requester.0, req.account_type, initial).await
    {
        Ok(account) => Ok(Json(ApiResponse::success(account))),
        Err(AccountError::UserNotFound(_)) => Err(not_found("User not found")),
        Err(AccountError::UserDisabled(_)) => Err(bad_request(
            error_codes::INVALID_PARAMETER,
            "User is disabled",
        )),
        Err(AccountError::InvalidInitialDeposit) => Err(bad_request(
            error_codes::INVALID_PARAMETER,
            "Initial deposit must not be negative",
        )),
        Err(AccountError::Database(e)) => Err(internal(e)),
    }
}
