//! In-process ledger for devnet runs and tests.
//!
//! Submissions are recorded and confirmed by default. Register and UpdateDescriptor confirmations create the
//! resulting authorization descriptor so that follow-up reads behave like a real chain. Tests script outcomes
//! with `push_outcome`.

use crate::domain::resolver::{canonical_keys, descriptor_identity};
use crate::domain::{AssetBalance, AuthDescriptor, LedgerStatus, PendingTransfer, Submission, Transaction, TransactionKind};
use crate::foundation::{AccountId, CosignError, LedgerTxId, RecordId, Result, DEVNET_TX_ID_DOMAIN};
use crate::infrastructure::ledger::{BuildParams, LedgerAdapter, LedgerReceipt};
use async_trait::async_trait;
use log::{debug, info};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

const DEVNET_FEE_ASSET_ID: &str = "devnet-fee";
const DEVNET_FEE_ASSET_SYMBOL: &str = "DFEE";
const DEVNET_FEE_AMOUNT: &str = "1000000";
const DEVNET_FEE_SENDER: &str = "devnet-faucet";

/// Scripted answer for the next `submit` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DevnetOutcome {
    Confirm,
    Wait,
    Reject(String),
    Unknown,
    /// Transport-level failure; the call returns `LedgerError`.
    Fail(String),
    /// Sleeps before confirming, for exercising caller timeouts.
    Stall(Duration),
}

#[derive(Clone, Debug)]
pub struct SubmittedTransaction {
    pub tx_id: RecordId,
    pub kind: TransactionKind,
    pub submission: Submission,
    pub ledger_tx_id: LedgerTxId,
}

#[derive(Debug)]
struct LedgerTx {
    status: LedgerStatus,
    error: Option<String>,
    effect: Option<(AccountId, AuthDescriptor)>,
}

#[derive(Default)]
struct DevnetState {
    descriptors: HashMap<AccountId, AuthDescriptor>,
    pending: HashMap<AccountId, Vec<PendingTransfer>>,
    balances: HashMap<AccountId, Vec<AssetBalance>>,
    ledger_txs: HashMap<LedgerTxId, LedgerTx>,
    script: VecDeque<DevnetOutcome>,
    submissions: Vec<SubmittedTransaction>,
    nonce: u64,
}

pub struct DevnetLedger {
    auto_fund_fee: bool,
    state: Mutex<DevnetState>,
}

impl DevnetLedger {
    pub fn new() -> Self {
        Self { auto_fund_fee: false, state: Mutex::new(DevnetState::default()) }
    }

    /// Every unregistered account reports a synthetic fee transfer.
    pub fn with_auto_fee() -> Self {
        Self { auto_fund_fee: true, state: Mutex::new(DevnetState::default()) }
    }

    pub fn push_outcome(&self, outcome: DevnetOutcome) {
        self.state.lock().script.push_back(outcome);
    }

    pub fn set_pending_transfers(&self, account_id: AccountId, transfers: Vec<PendingTransfer>) {
        self.state.lock().pending.insert(account_id, transfers);
    }

    pub fn set_balances(&self, account_id: AccountId, balances: Vec<AssetBalance>) {
        self.state.lock().balances.insert(account_id, balances);
    }

    pub fn set_descriptor(&self, account_id: AccountId, descriptor: AuthDescriptor) {
        self.state.lock().descriptors.insert(account_id, descriptor);
    }

    pub fn submissions(&self) -> Vec<SubmittedTransaction> {
        self.state.lock().submissions.clone()
    }

    pub fn submission_count(&self) -> usize {
        self.state.lock().submissions.len()
    }

    /// Confirms a previously waiting ledger transaction and applies its descriptor effect.
    pub fn confirm(&self, ledger_tx_id: &LedgerTxId) -> Result<()> {
        let mut state = self.state.lock();
        let entry = state
            .ledger_txs
            .get_mut(ledger_tx_id)
            .ok_or_else(|| CosignError::ledger("devnet confirm", format!("unknown ledger tx {}", ledger_tx_id)))?;
        entry.status = LedgerStatus::Confirmed;
        entry.error = None;
        if let Some((account_id, descriptor)) = entry.effect.take() {
            state.descriptors.insert(account_id, descriptor);
        }
        info!("devnet ledger tx confirmed ledger_tx_id={}", ledger_tx_id);
        Ok(())
    }

    fn next_ledger_tx_id(state: &mut DevnetState, tx: &Transaction) -> LedgerTxId {
        state.nonce = state.nonce.wrapping_add(1);
        let mut hasher = blake3::Hasher::new();
        hasher.update(DEVNET_TX_ID_DOMAIN);
        hasher.update(tx.id.as_bytes());
        hasher.update(&tx.payload);
        hasher.update(&state.nonce.to_le_bytes());
        LedgerTxId::from(*hasher.finalize().as_bytes())
    }

    fn descriptor_effect(tx: &Transaction, submission: &Submission) -> Result<Option<(AccountId, AuthDescriptor)>> {
        let descriptor = match submission {
            Submission::Register { owners, signatures_required, .. } => AuthDescriptor {
                id: tx.account_id.to_string(),
                signers: owners.clone(),
                signatures_required: *signatures_required,
                rules: None,
            },
            Submission::UpdateDescriptor { new_signers, new_signatures_required, .. } => AuthDescriptor {
                id: descriptor_identity(&canonical_keys(new_signers)?, *new_signatures_required).to_string(),
                signers: new_signers.clone(),
                signatures_required: *new_signatures_required,
                rules: None,
            },
            Submission::TransferFund { .. } => return Ok(None),
        };
        Ok(Some((tx.account_id, descriptor)))
    }

    fn record(&self, tx: &Transaction, submission: &Submission, outcome: &DevnetOutcome) -> Result<LedgerReceipt> {
        let effect = Self::descriptor_effect(tx, submission)?;
        let mut state = self.state.lock();
        let ledger_tx_id = Self::next_ledger_tx_id(&mut state, tx);
        state.submissions.push(SubmittedTransaction {
            tx_id: tx.id.clone(),
            kind: tx.kind(),
            submission: submission.clone(),
            ledger_tx_id,
        });

        if let Submission::TransferFund { auth_descriptor_id, .. } = submission {
            let known = state.descriptors.get(&tx.account_id).map_or(false, |d| &d.id == auth_descriptor_id);
            if !known {
                return Ok(LedgerReceipt {
                    status: LedgerStatus::Rejected,
                    ledger_tx_id: Some(ledger_tx_id),
                    error_message: Some(format!("unknown auth descriptor {}", auth_descriptor_id)),
                });
            }
        }

        let (status, error) = match outcome {
            DevnetOutcome::Confirm | DevnetOutcome::Stall(_) => (LedgerStatus::Confirmed, None),
            DevnetOutcome::Wait => (LedgerStatus::Waiting, None),
            DevnetOutcome::Reject(reason) => (LedgerStatus::Rejected, Some(reason.clone())),
            DevnetOutcome::Unknown => (LedgerStatus::Unknown, None),
            DevnetOutcome::Fail(reason) => return Err(CosignError::ledger("devnet submit", reason.clone())),
        };

        let effect = match status {
            LedgerStatus::Confirmed => {
                if let Some((account_id, descriptor)) = effect {
                    state.descriptors.insert(account_id, descriptor);
                }
                None
            }
            _ => effect,
        };
        state.ledger_txs.insert(ledger_tx_id, LedgerTx { status, error: error.clone(), effect });
        debug!("devnet ledger submission tx_id={} kind={} ledger_tx_id={} status={}", tx.id, tx.kind(), ledger_tx_id, status);
        Ok(LedgerReceipt { status, ledger_tx_id: Some(ledger_tx_id), error_message: error })
    }
}

impl Default for DevnetLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerAdapter for DevnetLedger {
    async fn build_transaction(&self, kind: TransactionKind, params: &BuildParams<'_>) -> Result<Vec<u8>> {
        if params.details.kind() != kind {
            return Err(CosignError::invalid_input("kind", format!("{} does not match details of kind {}", kind, params.details.kind())));
        }
        let nonce = {
            let mut state = self.state.lock();
            state.nonce = state.nonce.wrapping_add(1);
            state.nonce
        };
        let body = serde_json::json!({
            "operation": kind,
            "accountId": params.account.account_id,
            "descriptorId": params.account.descriptor_id(),
            "details": params.details,
            "nonce": nonce,
        });
        Ok(serde_json::to_vec(&body)?)
    }

    async fn registration_message(&self, tx: &Transaction) -> Result<Vec<u8>> {
        Ok(tx.payload.clone())
    }

    async fn submit(&self, tx: &Transaction, submission: &Submission) -> Result<LedgerReceipt> {
        let outcome = self.state.lock().script.pop_front().unwrap_or(DevnetOutcome::Confirm);
        if let DevnetOutcome::Stall(delay) = outcome {
            tokio::time::sleep(delay).await;
        }
        self.record(tx, submission, &outcome)
    }

    async fn transaction_status(&self, ledger_tx_id: &LedgerTxId) -> Result<LedgerReceipt> {
        let state = self.state.lock();
        Ok(match state.ledger_txs.get(ledger_tx_id) {
            Some(entry) => LedgerReceipt { status: entry.status, ledger_tx_id: Some(*ledger_tx_id), error_message: entry.error.clone() },
            None => LedgerReceipt { status: LedgerStatus::Unknown, ledger_tx_id: Some(*ledger_tx_id), error_message: None },
        })
    }

    async fn query_auth_descriptor(&self, account_id: &AccountId) -> Result<Option<AuthDescriptor>> {
        Ok(self.state.lock().descriptors.get(account_id).cloned())
    }

    async fn pending_transfers(&self, account_id: &AccountId) -> Result<Vec<PendingTransfer>> {
        let state = self.state.lock();
        if state.descriptors.contains_key(account_id) {
            return Ok(Vec::new());
        }
        if let Some(pending) = state.pending.get(account_id) {
            return Ok(pending.clone());
        }
        if !self.auto_fund_fee {
            return Ok(Vec::new());
        }
        Ok(vec![PendingTransfer {
            transfer_id: format!("fee-{}", account_id),
            asset_id: DEVNET_FEE_ASSET_ID.to_string(),
            asset_symbol: DEVNET_FEE_ASSET_SYMBOL.to_string(),
            amount: DEVNET_FEE_AMOUNT.to_string(),
            sender: DEVNET_FEE_SENDER.to_string(),
        }])
    }

    async fn balances(&self, account_id: &AccountId) -> Result<Vec<AssetBalance>> {
        Ok(self.state.lock().balances.get(account_id).cloned().unwrap_or_default())
    }
}
