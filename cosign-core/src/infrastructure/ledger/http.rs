//! JSON gateway client for a remote ledger node.

use crate::domain::{AssetBalance, AuthDescriptor, PendingTransfer, Submission, Transaction, TransactionDetails, TransactionKind};
use crate::foundation::{hex_bytes, AccountId, CosignError, LedgerTxId, Result};
use crate::infrastructure::ledger::{BuildParams, LedgerAdapter, LedgerReceipt};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub struct HttpLedger {
    client: Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BuildRequest<'a> {
    kind: TransactionKind,
    account_id: AccountId,
    auth_descriptor_id: Option<&'a str>,
    signers: Vec<&'a str>,
    signatures_required: u16,
    details: &'a TransactionDetails,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest<'a> {
    #[serde(with = "hex_bytes")]
    tx: &'a [u8],
    submission: &'a Submission,
}

#[derive(Serialize)]
struct PayloadRequest<'a> {
    #[serde(with = "hex_bytes")]
    tx: &'a [u8],
}

#[derive(Deserialize)]
struct PayloadResponse {
    #[serde(with = "hex_bytes")]
    tx: Vec<u8>,
}

#[derive(Deserialize)]
struct MessageResponse {
    #[serde(with = "hex_bytes")]
    message: Vec<u8>,
}

impl HttpLedger {
    pub fn new(base_url: impl Into<String>, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| CosignError::ConfigError(format!("ledger http client build failed: {}", err)))?;
        Ok(Self { client, base_url: base_url.into().trim_end_matches('/').to_string(), token })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token.as_ref() {
            Some(token) => req.header(header::AUTHORIZATION, format!("Bearer {}", token)),
            None => req,
        }
    }

    async fn read_response<T: DeserializeOwned>(operation: &str, resp: reqwest::Response) -> Result<Option<T>> {
        let status = resp.status();
        let body = resp.text().await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            warn!("ledger http call failed operation={} status={} body={}", operation, status, body);
            return Err(CosignError::ledger(operation, format!("http status {}: {}", status, body)));
        }
        serde_json::from_str(&body).map(Some).map_err(|err| CosignError::ledger(operation, format!("invalid json: {}", err)))
    }

    async fn get_json<T: DeserializeOwned>(&self, operation: &str, path: &str) -> Result<Option<T>> {
        let started = Instant::now();
        let resp = self.authorize(self.client.get(self.url(path))).send().await?;
        let out = Self::read_response(operation, resp).await;
        debug!("ledger http get operation={} path={} elapsed_ms={}", operation, path, started.elapsed().as_millis());
        out
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, operation: &str, path: &str, body: &B) -> Result<T> {
        let started = Instant::now();
        let resp = self.authorize(self.client.post(self.url(path)).json(body)).send().await?;
        let out = Self::read_response(operation, resp).await?;
        debug!("ledger http post operation={} path={} elapsed_ms={}", operation, path, started.elapsed().as_millis());
        out.ok_or_else(|| CosignError::ledger(operation, format!("endpoint not found: {}", path)))
    }
}

#[async_trait]
impl LedgerAdapter for HttpLedger {
    async fn build_transaction(&self, kind: TransactionKind, params: &BuildParams<'_>) -> Result<Vec<u8>> {
        let request = BuildRequest {
            kind,
            account_id: params.account.account_id,
            auth_descriptor_id: params.account.descriptor_id(),
            signers: params.account.signers.iter().map(|s| s.public_key.as_str()).collect(),
            signatures_required: params.account.signatures_required,
            details: params.details,
        };
        let response: PayloadResponse = self.post_json("build_transaction", "/v1/transactions/build", &request).await?;
        Ok(response.tx)
    }

    async fn registration_message(&self, tx: &Transaction) -> Result<Vec<u8>> {
        let response: MessageResponse =
            self.post_json("registration_message", "/v1/transactions/registration-message", &PayloadRequest { tx: &tx.payload }).await?;
        Ok(response.message)
    }

    async fn submit(&self, tx: &Transaction, submission: &Submission) -> Result<LedgerReceipt> {
        self.post_json("submit", "/v1/transactions/submit", &SubmitRequest { tx: &tx.payload, submission }).await
    }

    async fn transaction_status(&self, ledger_tx_id: &LedgerTxId) -> Result<LedgerReceipt> {
        let path = format!("/v1/transactions/{}", ledger_tx_id);
        self.get_json("transaction_status", &path)
            .await?
            .ok_or_else(|| CosignError::ledger("transaction_status", format!("unknown ledger tx {}", ledger_tx_id)))
    }

    async fn query_auth_descriptor(&self, account_id: &AccountId) -> Result<Option<AuthDescriptor>> {
        self.get_json("query_auth_descriptor", &format!("/v1/accounts/{}/descriptor", account_id)).await
    }

    async fn pending_transfers(&self, account_id: &AccountId) -> Result<Vec<PendingTransfer>> {
        Ok(self.get_json("pending_transfers", &format!("/v1/accounts/{}/pending-transfers", account_id)).await?.unwrap_or_default())
    }

    async fn balances(&self, account_id: &AccountId) -> Result<Vec<AssetBalance>> {
        Ok(self.get_json("balances", &format!("/v1/accounts/{}/balances", account_id)).await?.unwrap_or_default())
    }
}
