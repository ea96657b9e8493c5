//! HTTP gateway: routing, requester identity, serving

pub mod handlers;
pub mod state;
pub mod types;

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::{Next, from_fn},
    response::Response,
    routing::{get, post},
};
use tokio::net::TcpListener;

use state::AppState;
use types::{ApiResponse, error_codes};

/// Requester identity, injected by the upstream authenticator via the
/// `X-User-Id` header. This service trusts it and never authenticates.
#[derive(Debug, Clone, Copy)]
pub struct RequesterId(pub i64);

async fn identity_middleware(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, Json<ApiResponse<()>>)> {
    let user_id = request
        .headers()
        .get("X-User-Id")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<()>::error(
                error_codes::MISSING_AUTH,
                "Missing or invalid X-User-Id header",
            )),
        ))?;

    request.extensions_mut().insert(RequesterId(user_id));
    Ok(next.run(request).await)
}

async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<&'static str>>, (StatusCode, Json<ApiResponse<()>>)> {
    match state.db.health_check().await {
        Ok(()) => Ok(Json(ApiResponse::success("ok"))),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::<()>::error(
                    error_codes::SERVICE_UNAVAILABLE,
                    "Database unavailable",
                )),
            ))
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route(
            "/api/v1/accounts",
            get(handlers::account::list_accounts).post(handlers::account::open_account),
        )
        .route(
            "/api/v1/transfers/internal",
            post(handlers::transfer::internal_transfer),
        )
        .route(
            "/api/v1/transfers/external",
            post(handlers::transfer::external_transfer),
        )
        .route(
            "/api/v1/transactions",
            get(handlers::transaction::transaction_history),
        )
        .route(
            "/api/v1/transactions/{reference}",
            get(handlers::transaction::transaction_by_reference),
        )
        .layer(from_fn(identity_middleware))
        .with_state(state.clone());

    let ops = Router::new()
        .route("/health", get(health))
        .route(
            "/internal/settlement",
            post(handlers::transaction::settlement_update),
        )
        .with_state(state);

    api.merge(ops)
}

pub async fn serve(state: Arc<AppState>, host: &str, port: u16) -> std::io::Result<()> {
    let app = build_router(state);
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Gateway listening on {}", addr);
    axum::serve(listener, app).await
}
