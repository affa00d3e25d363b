//! Resilience wrapper around any ledger adapter.
//!
//! Every call is bounded by `timeout` and gated by a circuit breaker. Read-only calls are retried on ledger
//! errors; `submit` is never retried so one `execute` produces at most one submission.

use crate::domain::resolver::AccountIdComputationResult;
use crate::domain::{AssetBalance, AuthDescriptor, PendingTransfer, Submission, Transaction, TransactionKind};
use crate::foundation::{AccountId, CosignError, LedgerTxId, Result, SignerKey};
use crate::infrastructure::ledger::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
use crate::infrastructure::ledger::retry::retry;
use crate::infrastructure::ledger::{BuildParams, LedgerAdapter, LedgerReceipt};
use async_trait::async_trait;
use log::warn;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: usize,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { attempts: 3, delay: Duration::from_millis(200) }
    }
}

pub struct ResilientLedger {
    inner: Arc<dyn LedgerAdapter>,
    timeout: Duration,
    retry: RetryPolicy,
    breaker: CircuitBreaker,
}

fn is_retryable(err: &CosignError) -> bool {
    matches!(err, CosignError::LedgerError { .. } | CosignError::LedgerTimeout { .. })
}

impl ResilientLedger {
    pub fn new(inner: Arc<dyn LedgerAdapter>, timeout: Duration, retry: RetryPolicy, breaker: CircuitBreakerConfig) -> Self {
        Self { inner, timeout, retry, breaker: CircuitBreaker::new("ledger", breaker) }
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    async fn guarded<T, F>(&self, operation: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send,
        T: Send,
    {
        if !self.breaker.allow() {
            return Err(CosignError::LedgerUnavailable(format!("circuit open; {} skipped", operation)));
        }
        let result = match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!("ledger call timed out operation={} timeout_ms={}", operation, self.timeout.as_millis());
                Err(CosignError::LedgerTimeout { operation: operation.to_string(), timeout_ms: self.timeout.as_millis() as u64 })
            }
        };
        match &result {
            Ok(_) => self.breaker.record_success(),
            Err(err) if is_retryable(err) => self.breaker.record_failure(),
            Err(_) => {}
        }
        result
    }

    async fn read<T, F, Fut>(&self, operation: &'static str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send,
        T: Send,
    {
        retry(operation, self.retry.attempts, self.retry.delay, is_retryable, move || self.guarded(operation, op())).await
    }
}

#[async_trait]
impl LedgerAdapter for ResilientLedger {
    fn derive_account_id(&self, keys: &[SignerKey], threshold: u16) -> Result<AccountIdComputationResult> {
        self.inner.derive_account_id(keys, threshold)
    }

    async fn build_transaction(&self, kind: TransactionKind, params: &BuildParams<'_>) -> Result<Vec<u8>> {
        self.read("build_transaction", move || self.inner.build_transaction(kind, params)).await
    }

    async fn registration_message(&self, tx: &Transaction) -> Result<Vec<u8>> {
        self.read("registration_message", move || self.inner.registration_message(tx)).await
    }

    async fn submit(&self, tx: &Transaction, submission: &Submission) -> Result<LedgerReceipt> {
        self.guarded("submit", self.inner.submit(tx, submission)).await
    }

    async fn transaction_status(&self, ledger_tx_id: &LedgerTxId) -> Result<LedgerReceipt> {
        self.read("transaction_status", move || self.inner.transaction_status(ledger_tx_id)).await
    }

    async fn query_auth_descriptor(&self, account_id: &AccountId) -> Result<Option<AuthDescriptor>> {
        self.read("query_auth_descriptor", move || self.inner.query_auth_descriptor(account_id)).await
    }

    async fn pending_transfers(&self, account_id: &AccountId) -> Result<Vec<PendingTransfer>> {
        self.read("pending_transfers", move || self.inner.pending_transfers(account_id)).await
    }

    async fn balances(&self, account_id: &AccountId) -> Result<Vec<AssetBalance>> {
        self.read("balances", move || self.inner.balances(account_id)).await
    }
}
