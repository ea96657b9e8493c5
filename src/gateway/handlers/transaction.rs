//! Transaction history and settlement endpoints

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::HeaderMap,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::account::AccountRepository;
use crate::gateway::RequesterId;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, error_codes};
use crate::ledger::query::DEFAULT_PAGE_SIZE;
use crate::ledger::repository::LedgerError;
use crate::ledger::{
    LedgerQuery, TransactionFilters, TransactionPage, TransactionRepository, TransactionStatus,
    TransactionType, TransactionWithDetails,
};

use super::{HandlerError, bad_request, forbidden, internal, not_found};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryParams {
    pub account_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub r#type: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
}

/// GET /api/v1/transactions
///
/// With `accountId`, the account must belong to the requester; without it,
/// the query is scoped to every account the requester owns.
pub async fn transaction_history(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<RequesterId>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<ApiResponse<TransactionPage>>, HandlerError> {
    let tx_type = params
        .r#type
        .as_deref()
        .map(|s| s.parse::<TransactionType>())
        .transpose()
        .map_err(|e| bad_request(error_codes::INVALID_PARAMETER, e))?;
    let status = params
        .status
        .as_deref()
        .map(|s| s.parse::<TransactionStatus>())
        .transpose()
        .map_err(|e| bad_request(error_codes::INVALID_PARAMETER, e))?;

    let account_ids = match params.account_id {
        Some(account_id) => {
            let owned = AccountRepository::belongs_to(state.db.pool(), account_id, requester.0)
                .await
                .map_err(internal)?;
            if !owned {
                return Err(forbidden("Account not found or not accessible"));
            }
            vec![account_id]
        }
        None => AccountRepository::ids_for_user(state.db.pool(), requester.0)
            .await
            .map_err(internal)?,
    };

    let filters = TransactionFilters {
        tx_type,
        status,
        start_date: params.start_date,
        end_date: params.end_date,
        min_amount: params.min_amount,
        max_amount: params.max_amount,
    };

    let page = LedgerQuery::history(
        state.db.pool(),
        account_ids,
        params.page.unwrap_or(1),
        params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        &filters,
    )
    .await
    .map_err(internal)?;

    Ok(Json(ApiResponse::success(page)))
}

/// GET /api/v1/transactions/{reference}
///
/// An entry is visible only when one of the requester's accounts is its
/// sender or receiver; anything else looks like not-found.
pub async fn transaction_by_reference(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<RequesterId>,
    Path(reference): Path<String>,
) -> Result<Json<ApiResponse<TransactionWithDetails>>, HandlerError> {
    let Some(details) = LedgerQuery::find_by_reference(state.db.pool(), &reference)
        .await
        .map_err(internal)?
    else {
        return Err(not_found("Transaction not found"));
    };

    let owned_ids = AccountRepository::ids_for_user(state.db.pool(), requester.0)
        .await
        .map_err(internal)?;

    let visible = details
        .transaction
        .sender_account_id
        .is_some_and(|id| owned_ids.contains(&id))
        || details
            .transaction
            .receiver_account_id
            .is_some_and(|id| owned_ids.contains(&id));

    if !visible {
        return Err(not_found("Transaction not found"));
    }

    Ok(Json(ApiResponse::success(details)))
}

#[derive(Debug, Deserialize)]
pub struct SettlementUpdateRequest {
    pub reference: String,
    pub status: String,
}

/// POST /internal/settlement
///
/// Status-update contract for the out-of-band settlement collaborator.
/// Protected by the X-Internal-Secret header, not by user identity.
pub async fn settlement_update(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<SettlementUpdateRequest>,
) -> Result<Json<ApiResponse<&'static str>>, HandlerError> {
    let secret = headers
        .get("X-Internal-Secret")
        .and_then(|v| v.to_str().ok());
    if secret != Some(state.internal_secret.as_str()) {
        return Err((
            axum::http::StatusCode::FORBIDDEN,
            Json(ApiResponse::<()>::error(
                error_codes::AUTH_FAILED,
                "Access Denied: Missing or Invalid X-Internal-Secret",
            )),
        ));
    }

    let status: TransactionStatus = req
        .status
        .parse()
        .map_err(|e| bad_request(error_codes::INVALID_PARAMETER, e))?;

    match TransactionRepository::transition_status(state.db.pool(), &req.reference, status).await {
        Ok(()) => Ok(Json(ApiResponse::success("updated"))),
        Err(LedgerError::NotFound(_)) => Err(not_found("Transaction not found")),
        Err(e @ LedgerError::InvalidTransition { .. }) => Err(bad_request(
            error_codes::INVALID_TRANSITION,
            e.to_string(),
        )),
        Err(LedgerError::Database(e)) => Err(internal(e)),
    }
}
