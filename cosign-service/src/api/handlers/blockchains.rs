use super::types::BlockchainListParams;
use crate::api::error::ApiResult;
use crate::api::state::ApiState;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use cosign_core::application::accounts;
use cosign_core::domain::Blockchain;
use cosign_core::infrastructure::storage::Page;
use std::sync::Arc;

pub async fn list_blockchains(
    State(state): State<Arc<ApiState>>,
    params: Result<Query<BlockchainListParams>, QueryRejection>,
) -> ApiResult<Json<Page<Blockchain>>> {
    let Query(params) = params?;
    let active_only = params.active.unwrap_or(true);
    Ok(Json(accounts::list_blockchains(&state.ctx, params.network()?, active_only, &params.to_query()?)))
}

pub async fn get_blockchain(State(state): State<Arc<ApiState>>, rid: Result<Path<String>, PathRejection>) -> ApiResult<Json<Blockchain>> {
    let Path(rid) = rid?;
    Ok(Json(accounts::get_blockchain(&state.ctx, &rid)?))
}
