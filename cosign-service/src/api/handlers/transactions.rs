use super::types::{
    decode_payload, parse_user_address, CountResponse, CreateTransactionRequest, ExecuteResponse, SignRequest, TransactionListParams,
    UserAddressParams,
};
use crate::api::error::ApiResult;
use crate::api::state::ApiState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use cosign_core::application::{dispatcher, transactions, CreateTransferParams};
use cosign_core::domain::Transaction;
use cosign_core::foundation::RecordId;
use cosign_core::infrastructure::storage::Page;
use std::sync::Arc;

pub async fn create_transaction(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<CreateTransactionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let Json(body) = body?;
    let initiator = parse_user_address(&body.user_address)?;
    let tx = transactions::create_transfer(
        &state.ctx,
        CreateTransferParams {
            account: body.multi_sig_account,
            initiator,
            recipient: body.recipient,
            amount: body.amount,
            asset_id: body.asset_id,
            asset_symbol: body.asset_symbol,
            note: body.note,
            payload: decode_payload(body.tx.as_deref())?,
            signature: body.signature,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(tx)))
}

pub async fn list_transactions(
    State(state): State<Arc<ApiState>>,
    params: Result<Query<TransactionListParams>, QueryRejection>,
) -> ApiResult<Json<Page<Transaction>>> {
    let Query(params) = params?;
    Ok(Json(transactions::list_transactions(&state.ctx, &params.to_filter()?, &params.to_query()?)?))
}

pub async fn count_transactions(
    State(state): State<Arc<ApiState>>,
    params: Result<Query<TransactionListParams>, QueryRejection>,
) -> ApiResult<Json<CountResponse>> {
    let Query(params) = params?;
    let count = transactions::count_transactions(&state.ctx, &params.to_filter()?)?;
    Ok(Json(CountResponse { count }))
}

pub async fn get_transaction(
    State(state): State<Arc<ApiState>>,
    id: Result<Path<RecordId>, PathRejection>,
) -> ApiResult<Json<Transaction>> {
    let Path(id) = id?;
    Ok(Json(transactions::get_transaction(&state.ctx, &id)?))
}

pub async fn sign_transaction(
    State(state): State<Arc<ApiState>>,
    id: Result<Path<RecordId>, PathRejection>,
    body: Result<Json<SignRequest>, JsonRejection>,
) -> ApiResult<Json<Transaction>> {
    let Path(id) = id?;
    let Json(body) = body?;
    let signer = parse_user_address(&body.user_address)?;
    Ok(Json(transactions::sign_transaction(&state.ctx, &id, &signer, body.signature).await?))
}

pub async fn reject_transaction(
    State(state): State<Arc<ApiState>>,
    id: Result<Path<RecordId>, PathRejection>,
    body: Result<Json<UserAddressParams>, JsonRejection>,
) -> ApiResult<Json<Transaction>> {
    let Path(id) = id?;
    let Json(body) = body?;
    let actor = parse_user_address(&body.user_address)?;
    Ok(Json(transactions::reject_transaction(&state.ctx, &id, &actor).await?))
}

pub async fn execute_transaction(
    State(state): State<Arc<ApiState>>,
    id: Result<Path<RecordId>, PathRejection>,
    body: Result<Json<UserAddressParams>, JsonRejection>,
) -> ApiResult<Json<ExecuteResponse>> {
    let Path(id) = id?;
    let Json(body) = body?;
    let initiator = parse_user_address(&body.user_address)?;
    let outcome = dispatcher::execute(&state.ctx, &id, &initiator).await?;
    Ok(Json(ExecuteResponse { status: outcome.status, ledger_status: outcome.ledger_status, ledger_tx_id: outcome.ledger_tx_id }))
}
