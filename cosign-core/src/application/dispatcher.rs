//! Execution dispatcher: turns a `Ready` transaction into exactly one ledger submission and applies the
//! confirmed effect.
//!
//! A confirmed submission is finalized in one storage write (transaction `Completed` plus the account effect).
//! The confirmation itself is persisted first, so when the account effect or the final write fails the
//! transaction keeps `Ready` with `ledgerStatus = confirmed` and the next `execute` or `reconcile_pending` pass
//! finalizes it without resubmitting.
//!
//! A transaction authorized against a descriptor the account no longer uses is closed instead of submitted.

use crate::application::accounts::load_account;
use crate::application::context::CoordinatorContext;
use crate::application::transactions::load_transaction;
use crate::domain::account::lifecycle;
use crate::domain::transaction::aggregator;
use crate::domain::transaction::ordering::{build_submission, ensure_current_descriptor};
use crate::domain::{AccountStatus, LedgerStatus, MultiSigAccount, Transaction, TransactionDetails, TransactionKind, TransactionStatus};
use crate::foundation::{now_nanos, CosignError, LedgerTxId, RecordId, Result, SignerKey};
use crate::infrastructure::ledger::LedgerReceipt;
use crate::infrastructure::storage::TransactionFilter;
use log::{debug, info, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub status: TransactionStatus,
    pub ledger_status: Option<LedgerStatus>,
    pub ledger_tx_id: Option<LedgerTxId>,
}

impl From<&Transaction> for ExecutionOutcome {
    fn from(tx: &Transaction) -> Self {
        Self { status: tx.status, ledger_status: tx.ledger_status, ledger_tx_id: tx.ledger_tx_id }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub checked: usize,
    pub finalized: usize,
    pub failed: usize,
}

pub async fn execute(ctx: &CoordinatorContext, tx_id: &RecordId, initiator: &SignerKey) -> Result<ExecutionOutcome> {
    let _tx_guard = ctx.locks.lock_transaction(tx_id).await?;
    let mut tx = load_transaction(ctx, tx_id)?;
    match tx.status {
        TransactionStatus::Ready => {}
        TransactionStatus::Completed => {
            return Err(CosignError::AlreadyExecuted {
                ledger_tx_id: tx.ledger_tx_id.map(|id| id.to_string()).unwrap_or_default(),
            })
        }
        TransactionStatus::Rejected => return Err(CosignError::TransactionClosed { status: tx.status.to_string() }),
        other => return Err(CosignError::NotReady { status: other.to_string() }),
    }
    if !tx.may_execute(initiator) {
        return Err(CosignError::NotASigner(initiator.to_string()));
    }

    let _account_guard = ctx.locks.lock_account(&tx.account).await?;
    let account = load_account(ctx, &tx.account)?;

    let receipt = match (tx.ledger_status, tx.ledger_tx_id) {
        (Some(LedgerStatus::Confirmed), Some(ledger_tx_id)) => {
            info!("resuming confirmed execution tx_id={} ledger_tx_id={}", tx.id, ledger_tx_id);
            LedgerReceipt::confirmed(ledger_tx_id)
        }
        (Some(LedgerStatus::Waiting), Some(ledger_tx_id)) => {
            debug!("polling waiting submission tx_id={} ledger_tx_id={}", tx.id, ledger_tx_id);
            ctx.ledger.transaction_status(&ledger_tx_id).await?
        }
        _ => {
            close_if_stale(ctx, &mut tx, &account)?;
            submit(ctx, &mut tx, &account).await?
        }
    };
    settle(ctx, &mut tx, account, receipt, initiator).await
}

fn close_if_stale(ctx: &CoordinatorContext, tx: &mut Transaction, account: &MultiSigAccount) -> Result<()> {
    let err = match ensure_current_descriptor(tx, account) {
        Ok(()) => return Ok(()),
        Err(err) => err,
    };
    aggregator::supersede(tx, err.to_string(), now_nanos())?;
    ctx.storage.update_transaction(tx)?;
    warn!("stale transaction closed tx_id={} kind={} error={}", tx.id, tx.kind(), err);
    ctx.observer.on_transaction_rejected(tx);
    Err(err)
}

async fn submit(ctx: &CoordinatorContext, tx: &mut Transaction, account: &MultiSigAccount) -> Result<LedgerReceipt> {
    let registration_message = if tx.kind() == TransactionKind::Register {
        match ctx.ledger.registration_message(tx).await {
            Ok(message) => Some(message),
            Err(err) => return Err(record_failure(ctx, tx, err)),
        }
    } else {
        None
    };
    let submission = build_submission(tx, account, registration_message.as_deref())?;

    tx.submission_attempts = tx.submission_attempts.saturating_add(1);
    info!(
        "submitting to ledger tx_id={} kind={} attempt={} signatures={}",
        tx.id,
        tx.kind(),
        tx.submission_attempts,
        submission.present_signatures()
    );
    match ctx.ledger.submit(tx, &submission).await {
        Ok(receipt) => Ok(receipt),
        Err(err) => Err(record_failure(ctx, tx, err)),
    }
}

/// Persists `ledgerStatus = failed` and hands the ledger error back to the caller.
fn record_failure(ctx: &CoordinatorContext, tx: &mut Transaction, err: CosignError) -> CosignError {
    aggregator::record_ledger_outcome(tx, LedgerStatus::Failed, None, Some(err.to_string()), now_nanos());
    if let Err(storage_err) = ctx.storage.update_transaction(tx) {
        warn!("failed to persist ledger failure tx_id={} error={}", tx.id, storage_err);
        return storage_err;
    }
    ctx.observer.on_submission_failed(tx, &err.to_string());
    err
}

async fn settle(
    ctx: &CoordinatorContext,
    tx: &mut Transaction,
    account: MultiSigAccount,
    receipt: LedgerReceipt,
    executor: &SignerKey,
) -> Result<ExecutionOutcome> {
    if !receipt.is_confirmed() {
        aggregator::record_ledger_outcome(tx, receipt.status, receipt.ledger_tx_id, receipt.error_message, now_nanos());
        ctx.storage.update_transaction(tx)?;
        info!(
            "ledger submission not confirmed tx_id={} ledger_status={} ledger_tx_id={}",
            tx.id,
            receipt.status,
            tx.ledger_tx_id.map(|id| id.to_string()).unwrap_or_default()
        );
        ctx.observer.on_submission(tx, receipt.status);
        return Ok(ExecutionOutcome::from(&*tx));
    }

    let ledger_tx_id = receipt
        .ledger_tx_id
        .or(tx.ledger_tx_id)
        .ok_or_else(|| CosignError::ledger("submit", "confirmed receipt without a ledger tx id"))?;
    let now = now_nanos();
    if tx.ledger_status != Some(LedgerStatus::Confirmed) || tx.ledger_tx_id != Some(ledger_tx_id) {
        aggregator::record_ledger_outcome(tx, LedgerStatus::Confirmed, Some(ledger_tx_id), None, now);
        ctx.storage.update_transaction(tx)?;
        ctx.observer.on_submission(tx, LedgerStatus::Confirmed);
    }

    let updated_account = match account_effect(ctx, tx, account, now).await {
        Ok(updated) => updated,
        Err(err) => {
            warn!("account effect failed after confirmation tx_id={} ledger_tx_id={} error={}", tx.id, ledger_tx_id, err);
            note_pending_finalization(ctx, tx, format!("account effect pending: {}", err), now);
            return Err(err);
        }
    };

    let mut completed = tx.clone();
    aggregator::mark_completed(&mut completed, ledger_tx_id, executor, now)?;
    if let Err(err) = ctx.storage.write_transaction_with_account(&completed, updated_account.as_ref()) {
        warn!("finalization write failed after confirmation tx_id={} ledger_tx_id={} error={}", tx.id, ledger_tx_id, err);
        note_pending_finalization(ctx, tx, format!("finalization pending: {}", err), now);
        return Err(err);
    }
    *tx = completed;
    info!("transaction executed tx_id={} kind={} ledger_tx_id={}", tx.id, tx.kind(), ledger_tx_id);
    ctx.observer.on_completed(tx);
    if let Some(account) = updated_account.as_ref() {
        if tx.kind() == TransactionKind::Register {
            ctx.observer.on_account_status_changed(account, AccountStatus::Registering);
        }
    }
    Ok(ExecutionOutcome::from(&*tx))
}

/// Best effort: the confirmation is already stored, so a failure here only loses the note.
fn note_pending_finalization(ctx: &CoordinatorContext, tx: &mut Transaction, note: String, now: u64) {
    tx.ledger_error = Some(note);
    tx.updated_at_nanos = now;
    if let Err(err) = ctx.storage.update_transaction(tx) {
        warn!("failed to persist finalization note tx_id={} error={}", tx.id, err);
    }
}

/// Computes the account after a confirmed submission; `None` when the kind has no account effect.
async fn account_effect(ctx: &CoordinatorContext, tx: &Transaction, mut account: MultiSigAccount, now: u64) -> Result<Option<MultiSigAccount>> {
    match &tx.details {
        TransactionDetails::TransferFund { .. } => Ok(None),
        TransactionDetails::Register => {
            let descriptor = ctx
                .ledger
                .query_auth_descriptor(&account.account_id)
                .await?
                .ok_or_else(|| CosignError::ledger("query_auth_descriptor", "descriptor not visible after registration"))?;
            lifecycle::confirm_registration(&mut account, descriptor, now)?;
            Ok(Some(account))
        }
        TransactionDetails::UpdateDescriptor { signers_to_update, signatures_required_to_update, .. } => {
            let descriptor = ctx
                .ledger
                .query_auth_descriptor(&account.account_id)
                .await?
                .ok_or_else(|| CosignError::ledger("query_auth_descriptor", "descriptor missing after update"))?;
            lifecycle::apply_descriptor_update(&mut account, signers_to_update.clone(), *signatures_required_to_update, descriptor, now)?;
            Ok(Some(account))
        }
    }
}

/// Polls every `Ready` transaction whose last submission is waiting or confirmed and finalizes the confirmed
/// ones. Finalization is attributed to the transaction initiator.
pub async fn reconcile_pending(ctx: &CoordinatorContext) -> Result<ReconcileReport> {
    let candidates = ctx.storage.list_transactions(&TransactionFilter {
        status: Some(TransactionStatus::Ready),
        ledger_status_in: vec![LedgerStatus::Waiting, LedgerStatus::Confirmed],
        ..TransactionFilter::default()
    })?;
    let mut report = ReconcileReport { checked: candidates.len(), ..ReconcileReport::default() };
    for candidate in candidates {
        match reconcile_one(ctx, &candidate.id).await {
            Ok(true) => report.finalized += 1,
            Ok(false) => {}
            Err(err) => {
                report.failed += 1;
                warn!("reconcile failed tx_id={} error={}", candidate.id, err);
            }
        }
    }
    if report.checked > 0 {
        info!("reconcile pass checked={} finalized={} failed={}", report.checked, report.finalized, report.failed);
    }
    Ok(report)
}

async fn reconcile_one(ctx: &CoordinatorContext, tx_id: &RecordId) -> Result<bool> {
    let _tx_guard = ctx.locks.lock_transaction(tx_id).await?;
    let mut tx = load_transaction(ctx, tx_id)?;
    let ledger_tx_id = match (tx.status, tx.ledger_status, tx.ledger_tx_id) {
        (TransactionStatus::Ready, Some(LedgerStatus::Waiting | LedgerStatus::Confirmed), Some(id)) => id,
        _ => return Ok(false),
    };

    let _account_guard = ctx.locks.lock_account(&tx.account).await?;
    let account = load_account(ctx, &tx.account)?;
    let receipt = if tx.ledger_status == Some(LedgerStatus::Confirmed) {
        LedgerReceipt::confirmed(ledger_tx_id)
    } else {
        ctx.ledger.transaction_status(&ledger_tx_id).await?
    };
    if !receipt.is_confirmed() && Some(receipt.status) == tx.ledger_status {
        return Ok(false);
    }
    let executor = tx.initiator.clone();
    let outcome = settle(ctx, &mut tx, account, receipt, &executor).await?;
    Ok(outcome.status == TransactionStatus::Completed)
}
