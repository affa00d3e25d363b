use super::handlers::{accounts, blockchains, health, transactions};
use super::middleware::auth::auth_middleware;
use super::middleware::correlation::correlation_middleware;
use super::middleware::logging::logging_middleware;
use super::middleware::metrics::metrics_middleware;
use super::state::ApiState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use cosign_core::CosignError;
use log::{error, info};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub async fn run_http_server(addr: SocketAddr, state: Arc<ApiState>, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<(), CosignError> {
    info!("binding http server addr={}", addr);
    let app = build_router(state);
    let listener = TcpListener::bind(addr).await.map_err(|err| CosignError::Message(format!("bind {}: {}", addr, err)))?;
    info!("HTTP server ready and accepting connections addr={}", addr);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).with_graceful_shutdown(shutdown).await.map_err(|err| {
        error!("HTTP server terminated unexpectedly addr={} error={}", addr, err);
        CosignError::Message(err.to_string())
    })
}

pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/multisig-accounts", post(accounts::create_account).get(accounts::list_accounts))
        .route("/multisig-accounts/count", get(accounts::count_accounts))
        .route(
            "/multisig-accounts/:id",
            get(accounts::get_account).put(accounts::update_account).delete(accounts::delete_account),
        )
        .route("/multisig-accounts/:id/assets", get(accounts::list_assets))
        .route("/multisig-accounts/:id/transfer-fee", post(accounts::detect_transfer_fee))
        .route("/multisig-accounts/:id/register", post(accounts::register_account))
        .route("/blockchains", get(blockchains::list_blockchains))
        .route("/blockchains/:rid", get(blockchains::get_blockchain))
        .route("/transactions", post(transactions::create_transaction).get(transactions::list_transactions))
        .route("/transactions/count", get(transactions::count_transactions))
        .route("/transactions/:id", get(transactions::get_transaction))
        .route("/transactions/:id/sign", post(transactions::sign_transaction))
        .route("/transactions/:id/reject", post(transactions::reject_transaction))
        .route("/transactions/:id/execute", post(transactions::execute_transaction))
        .route("/health", get(health::handle_health))
        .route("/ready", get(health::handle_ready))
        .route("/metrics", get(health::handle_metrics))
        .layer(DefaultBodyLimit::max(state.body_limit_bytes))
        .layer(axum::middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(axum::middleware::from_fn_with_state(state.clone(), metrics_middleware))
        .layer(axum::middleware::from_fn(logging_middleware))
        .layer(axum::middleware::from_fn(correlation_middleware))
        .with_state(state)
}
