use super::types::{
    decode_payload, parse_user_address, AccountListParams, CountResponse, CreateAccountRequest, RegisterRequest, UpdateAccountRequest,
    UpdateAccountResponse, UserAddressParams,
};
use crate::api::error::ApiResult;
use crate::api::state::ApiState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use cosign_core::application::{accounts, CreateAccountParams, RegisterParams, UpdateAccountParams};
use cosign_core::domain::{AssetBalance, MultiSigAccount, Transaction};
use cosign_core::foundation::RecordId;
use cosign_core::infrastructure::storage::Page;
use log::debug;
use std::sync::Arc;

pub async fn create_account(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body?;
    let initiator = parse_user_address(&body.user_address)?;
    let account = accounts::create_account(
        &state.ctx,
        CreateAccountParams {
            name: body.name,
            signers: body.signers,
            signatures_required: body.signatures_required,
            initiator,
            network: body.network,
            chain_identity: body.blockchain_rid,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn list_accounts(
    State(state): State<Arc<ApiState>>,
    params: Result<Query<AccountListParams>, QueryRejection>,
) -> ApiResult<Json<Page<MultiSigAccount>>> {
    let Query(params) = params?;
    let page = accounts::list_accounts(&state.ctx, &params.to_filter()?, &params.to_query()?)?;
    debug!("accounts listed total={} page={} limit={}", page.total, page.page, page.limit);
    Ok(Json(page))
}

pub async fn count_accounts(
    State(state): State<Arc<ApiState>>,
    params: Result<Query<AccountListParams>, QueryRejection>,
) -> ApiResult<Json<CountResponse>> {
    let Query(params) = params?;
    let count = accounts::count_accounts(&state.ctx, &params.to_filter()?)?;
    Ok(Json(CountResponse { count }))
}

pub async fn get_account(
    State(state): State<Arc<ApiState>>,
    id: Result<Path<RecordId>, PathRejection>,
) -> ApiResult<Json<MultiSigAccount>> {
    let Path(id) = id?;
    Ok(Json(accounts::get_account(&state.ctx, &id).await?))
}

pub async fn update_account(
    State(state): State<Arc<ApiState>>,
    id: Result<Path<RecordId>, PathRejection>,
    body: Result<Json<UpdateAccountRequest>, JsonRejection>,
) -> ApiResult<Json<UpdateAccountResponse>> {
    let Path(id) = id?;
    let Json(body) = body?;
    let initiator = parse_user_address(&body.user_address)?;
    let outcome = accounts::update_account(
        &state.ctx,
        &id,
        UpdateAccountParams {
            name: body.name,
            signers: body.signers,
            signatures_required: body.signatures_required,
            initiator,
            payload: decode_payload(body.tx.as_deref())?,
            signature: body.signature,
        },
    )
    .await?;
    Ok(Json(UpdateAccountResponse { account: outcome.account, transaction_id: outcome.transaction.map(|tx| tx.id) }))
}

pub async fn delete_account(
    State(state): State<Arc<ApiState>>,
    id: Result<Path<RecordId>, PathRejection>,
    params: Result<Query<UserAddressParams>, QueryRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    let Query(params) = params?;
    let initiator = parse_user_address(&params.user_address)?;
    accounts::delete_account(&state.ctx, &id, &initiator).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_assets(
    State(state): State<Arc<ApiState>>,
    id: Result<Path<RecordId>, PathRejection>,
) -> ApiResult<Json<Vec<AssetBalance>>> {
    let Path(id) = id?;
    Ok(Json(accounts::list_assets(&state.ctx, &id).await?))
}

pub async fn detect_transfer_fee(
    State(state): State<Arc<ApiState>>,
    id: Result<Path<RecordId>, PathRejection>,
) -> ApiResult<Json<MultiSigAccount>> {
    let Path(id) = id?;
    Ok(Json(accounts::detect_transfer_fee(&state.ctx, &id).await?))
}

pub async fn register_account(
    State(state): State<Arc<ApiState>>,
    id: Result<Path<RecordId>, PathRejection>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let Path(id) = id?;
    let Json(body) = body?;
    let initiator = parse_user_address(&body.user_address)?;
    let tx = accounts::register_account(
        &state.ctx,
        &id,
        RegisterParams { payload: decode_payload(body.tx.as_deref())?, signature: body.signature, initiator },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(tx)))
}
