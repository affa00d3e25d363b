use cosign_core::application::LifecycleObserver;
use cosign_core::domain::{AccountStatus, LedgerStatus, MultiSigAccount, Transaction};
use cosign_core::foundation::{RecordId, SignerKey};
use cosign_core::CosignError;
use log::debug;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub uptime: Duration,
    pub api_ok: u64,
    pub api_error: u64,
    pub transactions_completed: u64,
    pub submissions_failed: u64,
}

pub struct Metrics {
    registry: Registry,
    api_requests_total: IntCounterVec,
    transactions_total: IntCounterVec,
    ledger_submissions_total: IntCounterVec,
    accounts_total: IntCounterVec,
    started_at: Instant,
    api_ok: AtomicU64,
    api_error: AtomicU64,
    transactions_completed: AtomicU64,
    submissions_failed: AtomicU64,
}

fn metric_err(err: prometheus::Error) -> CosignError {
    CosignError::Message(format!("metrics: {}", err))
}

fn counter_vec(registry: &Registry, name: &str, help: &str, labels: &[&str]) -> Result<IntCounterVec, CosignError> {
    let counter = IntCounterVec::new(Opts::new(name, help), labels).map_err(metric_err)?;
    registry.register(Box::new(counter.clone())).map_err(metric_err)?;
    Ok(counter)
}

impl Metrics {
    pub fn new() -> Result<Self, CosignError> {
        debug!("initializing prometheus metrics");
        let registry = Registry::new();
        let api_requests_total = counter_vec(&registry, "cosign_api_requests_total", "API requests by route and status", &["route", "status"])?;
        let transactions_total = counter_vec(&registry, "cosign_transactions_total", "Transaction lifecycle events", &["event"])?;
        let ledger_submissions_total =
            counter_vec(&registry, "cosign_ledger_submissions_total", "Ledger submissions by outcome", &["outcome"])?;
        let accounts_total = counter_vec(&registry, "cosign_accounts_total", "Account lifecycle events", &["event"])?;
        debug!("prometheus metrics registered metric_count=4");
        Ok(Self {
            registry,
            api_requests_total,
            transactions_total,
            ledger_submissions_total,
            accounts_total,
            started_at: Instant::now(),
            api_ok: AtomicU64::new(0),
            api_error: AtomicU64::new(0),
            transactions_completed: AtomicU64::new(0),
            submissions_failed: AtomicU64::new(0),
        })
    }

    pub fn inc_api_request(&self, route: &str, status: u16) {
        self.api_requests_total.with_label_values(&[route, &status.to_string()]).inc();
        if status >= 400 {
            self.api_error.fetch_add(1, Ordering::Relaxed);
        } else {
            self.api_ok.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn inc_transaction(&self, event: &str) {
        self.transactions_total.with_label_values(&[event]).inc();
    }

    fn inc_account(&self, event: &str) {
        self.accounts_total.with_label_values(&[event]).inc();
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime: self.started_at.elapsed(),
            api_ok: self.api_ok.load(Ordering::Relaxed),
            api_error: self.api_error.load(Ordering::Relaxed),
            transactions_completed: self.transactions_completed.load(Ordering::Relaxed),
            submissions_failed: self.submissions_failed.load(Ordering::Relaxed),
        }
    }

    pub fn encode(&self) -> Result<String, CosignError> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metric_families, &mut buffer).map_err(metric_err)?;
        String::from_utf8(buffer).map_err(|err| CosignError::Message(err.to_string()))
    }
}

impl LifecycleObserver for Metrics {
    fn on_account_created(&self, _account: &MultiSigAccount) {
        self.inc_account("created");
    }

    fn on_account_status_changed(&self, account: &MultiSigAccount, _from: AccountStatus) {
        self.inc_account(account.status.as_str());
    }

    fn on_account_deleted(&self, _id: &RecordId) {
        self.inc_account("deleted");
    }

    fn on_transaction_created(&self, tx: &Transaction) {
        self.transactions_total.with_label_values(&[&format!("created_{}", tx.kind())]).inc();
    }

    fn on_signature_added(&self, _tx: &Transaction, _signer: &SignerKey, replaced: bool) {
        self.inc_transaction(if replaced { "resigned" } else { "signed" });
    }

    fn on_threshold_met(&self, _tx: &Transaction) {
        self.inc_transaction("ready");
    }

    fn on_transaction_rejected(&self, _tx: &Transaction) {
        self.inc_transaction("rejected");
    }

    fn on_submission(&self, _tx: &Transaction, status: LedgerStatus) {
        self.ledger_submissions_total.with_label_values(&[status.as_str()]).inc();
    }

    fn on_submission_failed(&self, _tx: &Transaction, _reason: &str) {
        self.ledger_submissions_total.with_label_values(&[LedgerStatus::Failed.as_str()]).inc();
        self.submissions_failed.fetch_add(1, Ordering::Relaxed);
    }

    fn on_completed(&self, _tx: &Transaction) {
        self.inc_transaction("completed");
        self.transactions_completed.fetch_add(1, Ordering::Relaxed);
    }
}
