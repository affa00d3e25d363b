//! Wire shapes for the REST surface. Domain records (accounts, transactions) serialize directly.

use cosign_core::domain::{LedgerStatus, MultiSigAccount, SignatureValue, Signer, TransactionStatus};
use cosign_core::foundation::{decode_hex, LedgerTxId, Network, RecordId, SignerKey};
use cosign_core::infrastructure::storage::{ListQuery, SortDirection, SortField};
use cosign_core::{CosignError, Result};
use serde::{Deserialize, Serialize};

pub fn parse_user_address(value: &str) -> Result<SignerKey> {
    SignerKey::parse(value).map_err(|_| CosignError::invalid_input("userAddress", format!("invalid address {:?}", value)))
}

fn parse_optional_key(field: &str, value: Option<&str>) -> Result<Option<SignerKey>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => SignerKey::parse(value).map(Some).map_err(|_| CosignError::invalid_input(field, format!("invalid address {:?}", value))),
        None => Ok(None),
    }
}

/// Decodes the optional client-built ledger payload (`tx`). Absent or empty means "build it server-side".
pub fn decode_payload(tx: Option<&str>) -> Result<Option<Vec<u8>>> {
    match tx.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => decode_hex(value).map(Some).map_err(|err| CosignError::invalid_input("tx", err.to_string())),
        None => Ok(None),
    }
}

fn parse_enum<T: std::str::FromStr<Err = CosignError>>(value: Option<&str>) -> Result<Option<T>> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::parse).transpose()
}

fn list_query(page: Option<u32>, limit: Option<u32>, sort: Option<SortField>, direction: Option<SortDirection>) -> Result<ListQuery> {
    let query = ListQuery::new(page, limit)?;
    Ok(query.with_sort(sort.unwrap_or_default(), direction.unwrap_or_default()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub name: String,
    pub signers: Vec<Signer>,
    pub signatures_required: u16,
    pub user_address: String,
    pub network: Network,
    pub blockchain_rid: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountListParams {
    pub signer: Option<String>,
    pub blockchain_rid: Option<String>,
    pub network: Option<String>,
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<SortField>,
    pub direction: Option<SortDirection>,
}

impl AccountListParams {
    pub fn to_query(&self) -> Result<ListQuery> {
        list_query(self.page, self.limit, self.sort, self.direction)
    }

    pub fn to_filter(&self) -> Result<cosign_core::infrastructure::storage::AccountFilter> {
        Ok(cosign_core::infrastructure::storage::AccountFilter {
            signer: parse_optional_key("signer", self.signer.as_deref())?,
            network: parse_enum(self.network.as_deref())?,
            chain_identity: self.blockchain_rid.as_ref().map(|rid| rid.trim().to_string()).filter(|rid| !rid.is_empty()),
            status: parse_enum(self.status.as_deref())?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockchainListParams {
    pub network: Option<String>,
    /// Only active chains unless `false`.
    pub active: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl BlockchainListParams {
    pub fn to_query(&self) -> Result<ListQuery> {
        ListQuery::new(self.page, self.limit)
    }

    pub fn network(&self) -> Result<Option<Network>> {
        parse_enum(self.network.as_deref())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    #[serde(default)]
    pub name: Option<String>,
    pub signers: Vec<Signer>,
    pub signatures_required: u16,
    #[serde(default)]
    pub tx: Option<String>,
    #[serde(default)]
    pub signature: Option<SignatureValue>,
    pub user_address: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountResponse {
    pub account: MultiSigAccount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<RecordId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAddressParams {
    pub user_address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub tx: Option<String>,
    pub signature: SignatureValue,
    pub user_address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub multi_sig_account: RecordId,
    #[serde(default)]
    pub tx: Option<String>,
    pub signature: SignatureValue,
    pub user_address: String,
    pub recipient: String,
    pub amount: String,
    pub asset_id: String,
    #[serde(default)]
    pub asset_symbol: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionListParams {
    pub signer: Option<String>,
    pub account: Option<String>,
    pub status: Option<String>,
    pub kind: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<SortField>,
    pub direction: Option<SortDirection>,
}

impl TransactionListParams {
    pub fn to_query(&self) -> Result<ListQuery> {
        list_query(self.page, self.limit, self.sort, self.direction)
    }

    pub fn to_filter(&self) -> Result<cosign_core::infrastructure::storage::TransactionFilter> {
        Ok(cosign_core::infrastructure::storage::TransactionFilter {
            signer: parse_optional_key("signer", self.signer.as_deref())?,
            account: self.account.as_ref().map(|id| id.trim()).filter(|id| !id.is_empty()).map(RecordId::from),
            status: parse_enum::<TransactionStatus>(self.status.as_deref())?,
            kind: parse_enum(self.kind.as_deref())?,
            ledger_status_in: Vec::new(),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    pub signature: SignatureValue,
    pub user_address: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResponse {
    pub status: TransactionStatus,
    pub ledger_status: Option<LedgerStatus>,
    pub ledger_tx_id: Option<LedgerTxId>,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: usize,
}
