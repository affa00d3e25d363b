use crate::domain::{AccountStatus, LedgerStatus, MultiSigAccount, Transaction};
use crate::foundation::{RecordId, SignerKey};
use log::{debug, info, trace, warn};
use std::sync::Arc;

/// Hooks fired after a state change has been persisted.
pub trait LifecycleObserver: Send + Sync {
    fn on_account_created(&self, _account: &MultiSigAccount) {}
    fn on_account_status_changed(&self, _account: &MultiSigAccount, _from: AccountStatus) {}
    fn on_account_deleted(&self, _id: &RecordId) {}
    fn on_transaction_created(&self, _tx: &Transaction) {}
    fn on_signature_added(&self, _tx: &Transaction, _signer: &SignerKey, _replaced: bool) {}
    fn on_threshold_met(&self, _tx: &Transaction) {}
    fn on_transaction_rejected(&self, _tx: &Transaction) {}
    fn on_submission(&self, _tx: &Transaction, _status: LedgerStatus) {}
    fn on_submission_failed(&self, _tx: &Transaction, _reason: &str) {}
    fn on_completed(&self, _tx: &Transaction) {}
}

pub struct NoopObserver;

impl LifecycleObserver for NoopObserver {}

#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn LifecycleObserver>>,
}

impl CompositeObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_observer(&mut self, observer: Arc<dyn LifecycleObserver>) {
        self.observers.push(observer);
    }

    fn each(&self, hook: &str, f: impl Fn(&dyn LifecycleObserver)) {
        trace!("lifecycle dispatch hook={} observer_count={}", hook, self.observers.len());
        for observer in &self.observers {
            f(observer.as_ref());
        }
    }
}

impl LifecycleObserver for CompositeObserver {
    fn on_account_created(&self, account: &MultiSigAccount) {
        debug!("account created id={} account_id={} signers={}", account.id, account.account_id, account.signers.len());
        self.each("on_account_created", |o| o.on_account_created(account));
    }

    fn on_account_status_changed(&self, account: &MultiSigAccount, from: AccountStatus) {
        info!("account status changed id={} from_state={} to_state={}", account.id, from, account.status);
        self.each("on_account_status_changed", |o| o.on_account_status_changed(account, from));
    }

    fn on_account_deleted(&self, id: &RecordId) {
        self.each("on_account_deleted", |o| o.on_account_deleted(id));
    }

    fn on_transaction_created(&self, tx: &Transaction) {
        debug!("transaction created tx_id={} kind={} account={} threshold={}", tx.id, tx.kind(), tx.account, tx.signatures_required);
        self.each("on_transaction_created", |o| o.on_transaction_created(tx));
    }

    fn on_signature_added(&self, tx: &Transaction, signer: &SignerKey, replaced: bool) {
        debug!("signature added tx_id={} signer={} replaced={} signature_count={}", tx.id, signer, replaced, tx.signatures.len());
        self.each("on_signature_added", |o| o.on_signature_added(tx, signer, replaced));
    }

    fn on_threshold_met(&self, tx: &Transaction) {
        info!("threshold met tx_id={} signature_count={} threshold={}", tx.id, tx.signatures.len(), tx.signatures_required);
        self.each("on_threshold_met", |o| o.on_threshold_met(tx));
    }

    fn on_transaction_rejected(&self, tx: &Transaction) {
        self.each("on_transaction_rejected", |o| o.on_transaction_rejected(tx));
    }

    fn on_submission(&self, tx: &Transaction, status: LedgerStatus) {
        self.each("on_submission", |o| o.on_submission(tx, status));
    }

    fn on_submission_failed(&self, tx: &Transaction, reason: &str) {
        warn!("ledger submission failed tx_id={} attempts={} reason={}", tx.id, tx.submission_attempts, reason);
        self.each("on_submission_failed", |o| o.on_submission_failed(tx, reason));
    }

    fn on_completed(&self, tx: &Transaction) {
        self.each("on_completed", |o| o.on_completed(tx));
    }
}
