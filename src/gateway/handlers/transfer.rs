//! Transfer endpoints

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, State},
};
use uuid::Uuid;

use crate::account::AccountRepository;
use crate::gateway::RequesterId;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, error_codes};
use crate::transfer::{
    ExternalTransferRequest, InternalTransferRequest, TransferError, TransferReceipt,
};

use super::{HandlerError, bad_request, forbidden, internal};

/// The sender account must belong to the requester. An unparseable id falls
/// through to schema validation, which reports it as a field error.
async fn check_sender_ownership(
    state: &AppState,
    requester: RequesterId,
    sender_account_id: &str,
) -> Result<(), HandlerError> {
    let Ok(account_id) = Uuid::parse_str(sender_account_id.trim()) else {
        return Ok(());
    };

    match AccountRepository::belongs_to(state.db.pool(), account_id, requester.0).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(forbidden("Sender account not found or not accessible")),
        Err(e) => Err(internal(e)),
    }
}

fn map_transfer_error(err: TransferError) -> HandlerError {
    match &err {
        TransferError::Validation(_) => bad_request(error_codes::INVALID_PARAMETER, err.to_string()),
        TransferError::InsufficientFunds { .. } => {
            bad_request(error_codes::INSUFFICIENT_BALANCE, err.to_string())
        }
        TransferError::AccountNotFound(_)
        | TransferError::AccountInactive(_)
        | TransferError::SameAccountTransfer => {
            bad_request(error_codes::INVALID_PARAMETER, err.to_string())
        }
        TransferError::DuplicateReference => {
            tracing::error!("Transfer failed: {}", err);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error(
                    error_codes::INTERNAL_ERROR,
                    "Transfer could not be processed, please retry",
                )),
            )
        }
        TransferError::Database(e) => internal(e),
    }
}

/// POST /api/v1/transfers/internal
pub async fn internal_transfer(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<RequesterId>,
    Json(req): Json<InternalTransferRequest>,
) -> Result<Json<ApiResponse<TransferReceipt>>, HandlerError> {
    check_sender_ownership(&state, requester, &req.sender_account_id).await?;

    match state.transfers.process_internal(req).await {
        Ok(receipt) => Ok(Json(ApiResponse::success(receipt))),
        Err(e) => Err(map_transfer_error(e)),
    }
}

/// POST /api/v1/transfers/external
pub async fn external_transfer(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<RequesterId>,
    Json(req): Json<ExternalTransferRequest>,
) -> Result<Json<ApiResponse<TransferReceipt>>, HandlerError> {
    check_sender_ownership(&state, requester, &req.sender_account_id).await?;

    match state.transfers.process_external(req).await {
        Ok(receipt) => Ok(Json(ApiResponse::success(receipt))),
        Err(e) => Err(map_transfer_error(e)),
    }
}
