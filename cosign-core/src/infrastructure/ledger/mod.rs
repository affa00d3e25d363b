//! Ledger adapter: the only path from the coordinator to the blockchain.
//!
//! Implementations never mutate local records. Every call returns a value or a `CosignError` of kind `Ledger`.

pub mod circuit_breaker;
pub mod devnet;
pub mod http;
pub mod resilient;
pub mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
pub use devnet::{DevnetLedger, DevnetOutcome};
pub use http::HttpLedger;
pub use resilient::{ResilientLedger, RetryPolicy};
pub use retry::retry;

use crate::domain::resolver::{self, AccountIdComputationResult};
use crate::domain::{AssetBalance, AuthDescriptor, LedgerStatus, MultiSigAccount, PendingTransfer, Submission, Transaction};
use crate::domain::{TransactionDetails, TransactionKind};
use crate::foundation::{AccountId, LedgerTxId, Result, SignerKey};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Inputs for building an unsigned ledger payload.
#[derive(Clone, Copy, Debug)]
pub struct BuildParams<'a> {
    pub account: &'a MultiSigAccount,
    pub details: &'a TransactionDetails,
}

/// Ledger answer for a submission or status poll.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerReceipt {
    pub status: LedgerStatus,
    #[serde(default)]
    pub ledger_tx_id: Option<LedgerTxId>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl LedgerReceipt {
    pub fn confirmed(ledger_tx_id: LedgerTxId) -> Self {
        Self { status: LedgerStatus::Confirmed, ledger_tx_id: Some(ledger_tx_id), error_message: None }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == LedgerStatus::Confirmed
    }
}

#[async_trait]
pub trait LedgerAdapter: Send + Sync {
    fn derive_account_id(&self, keys: &[SignerKey], threshold: u16) -> Result<AccountIdComputationResult> {
        resolver::derive_account_id(keys, threshold)
    }

    async fn build_transaction(&self, kind: TransactionKind, params: &BuildParams<'_>) -> Result<Vec<u8>>;

    /// Message every owner signs to authorize a registration payload.
    async fn registration_message(&self, tx: &Transaction) -> Result<Vec<u8>>;

    async fn submit(&self, tx: &Transaction, submission: &Submission) -> Result<LedgerReceipt>;

    async fn transaction_status(&self, ledger_tx_id: &LedgerTxId) -> Result<LedgerReceipt>;

    async fn query_auth_descriptor(&self, account_id: &AccountId) -> Result<Option<AuthDescriptor>>;

    async fn pending_transfers(&self, account_id: &AccountId) -> Result<Vec<PendingTransfer>>;

    async fn balances(&self, account_id: &AccountId) -> Result<Vec<AssetBalance>>;
}
