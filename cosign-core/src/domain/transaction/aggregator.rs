//! Signature aggregation for a single pending operation.
//!
//! Every mutation validates first and writes second, so a failed call leaves the transaction untouched.
//! For open (non-terminal) transactions `status == Ready` holds exactly when `readiness_check` does.

use crate::domain::signature::SignatureValue;
use crate::domain::signer::Signer;
use crate::domain::transaction::state_machine::{is_terminal, transition};
use crate::domain::transaction::{
    ActivityAction, ActivityEntry, LedgerStatus, SignatureEntry, Transaction, TransactionDetails, TransactionStatus,
};
use crate::foundation::{AccountId, CosignError, LedgerTxId, RecordId, SignerKey};
use std::collections::HashMap;

pub struct OpenTransaction {
    pub account: RecordId,
    pub account_id: AccountId,
    pub details: TransactionDetails,
    pub payload: Vec<u8>,
    pub signers: Vec<Signer>,
    pub signatures_required: u16,
    pub initiator: SignerKey,
    pub initiator_signature: SignatureValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureOutcome {
    pub replaced: bool,
    pub became_ready: bool,
    pub signature_count: usize,
}

/// Creates a transaction carrying the initiator's signature and its `Created` + `Signed` log entries.
pub fn open(request: OpenTransaction, now: u64) -> Result<Transaction, CosignError> {
    if request.payload.is_empty() {
        return Err(CosignError::invalid_input("tx", "transaction payload must not be empty"));
    }
    if request.signatures_required == 0 || usize::from(request.signatures_required) > request.signers.len() {
        return Err(CosignError::InvalidSignerSet(format!(
            "signaturesRequired {} outside [1, {}]",
            request.signatures_required,
            request.signers.len()
        )));
    }
    if !crate::domain::signer::contains_key(&request.signers, &request.initiator) {
        return Err(CosignError::InitiatorNotASigner(request.initiator.to_string()));
    }
    request.initiator_signature.validate()?;

    let mut tx = Transaction {
        id: RecordId::generate(),
        account: request.account,
        account_id: request.account_id,
        details: request.details,
        payload: request.payload,
        signers: request.signers,
        signatures_required: request.signatures_required,
        signatures: HashMap::new(),
        status: TransactionStatus::Pending,
        ledger_tx_id: None,
        ledger_status: None,
        ledger_error: None,
        submission_attempts: 0,
        activity_log: Vec::new(),
        initiator: request.initiator.clone(),
        created_at_nanos: now,
        updated_at_nanos: now,
    };
    record_activity(&mut tx, ActivityAction::Created, &request.initiator, now);
    add_signature(&mut tx, &request.initiator, request.initiator_signature, now)?;
    Ok(tx)
}

pub fn readiness_check(tx: &Transaction) -> bool {
    tx.signatures.len() >= usize::from(tx.signatures_required)
}

/// Inserts or replaces `public_key`'s signature and re-evaluates readiness.
pub fn add_signature(
    tx: &mut Transaction,
    public_key: &SignerKey,
    signature: SignatureValue,
    now: u64,
) -> Result<SignatureOutcome, CosignError> {
    if is_terminal(tx.status) {
        return Err(CosignError::TransactionClosed { status: tx.status.to_string() });
    }
    if !tx.is_signer(public_key) {
        return Err(CosignError::NotASigner(public_key.to_string()));
    }
    signature.validate()?;

    let was_ready = tx.status == TransactionStatus::Ready;
    let entry = SignatureEntry { public_key: public_key.clone(), signature, timestamp_nanos: now };
    let replaced = tx.signatures.insert(public_key.clone(), entry).is_some();
    record_activity(tx, ActivityAction::Signed, public_key, now);
    tx.updated_at_nanos = now;

    if readiness_check(tx) {
        transition(tx, TransactionStatus::Ready, now)?;
    }

    Ok(SignatureOutcome {
        replaced,
        became_ready: !was_ready && tx.status == TransactionStatus::Ready,
        signature_count: tx.signatures.len(),
    })
}

/// Upserts the `(actor, action)` entry and keeps the log ordered by timestamp.
pub fn record_activity(tx: &mut Transaction, action: ActivityAction, actor: &SignerKey, now: u64) {
    let actor_name = tx.actor_name(actor);
    tx.activity_log.retain(|entry| !(entry.action == action && &entry.actor_public_key == actor));
    tx.activity_log.push(ActivityEntry { action, actor_public_key: actor.clone(), actor_name, timestamp_nanos: now });
    tx.activity_log.sort_by_key(|entry| entry.timestamp_nanos);
}

pub fn reject(tx: &mut Transaction, actor: &SignerKey, now: u64) -> Result<(), CosignError> {
    if !tx.may_execute(actor) {
        return Err(CosignError::NotASigner(actor.to_string()));
    }
    if is_terminal(tx.status) {
        return Err(CosignError::TransactionClosed { status: tx.status.to_string() });
    }
    transition(tx, TransactionStatus::Rejected, now)?;
    record_activity(tx, ActivityAction::Rejected, actor, now);
    Ok(())
}

/// Closes an open transaction that can no longer be submitted. `reason` is kept in `ledgerError`.
pub fn supersede(tx: &mut Transaction, reason: String, now: u64) -> Result<(), CosignError> {
    if is_terminal(tx.status) {
        return Err(CosignError::TransactionClosed { status: tx.status.to_string() });
    }
    transition(tx, TransactionStatus::Rejected, now)?;
    tx.ledger_error = Some(reason);
    Ok(())
}

/// Stores the ledger's view of the latest submission without touching the logical status.
pub fn record_ledger_outcome(
    tx: &mut Transaction,
    status: LedgerStatus,
    ledger_tx_id: Option<LedgerTxId>,
    error: Option<String>,
    now: u64,
) {
    tx.ledger_status = Some(status);
    if ledger_tx_id.is_some() {
        tx.ledger_tx_id = ledger_tx_id;
    }
    tx.ledger_error = error;
    tx.updated_at_nanos = now;
}

pub fn mark_completed(tx: &mut Transaction, ledger_tx_id: LedgerTxId, executor: &SignerKey, now: u64) -> Result<(), CosignError> {
    transition(tx, TransactionStatus::Completed, now)?;
    tx.ledger_tx_id = Some(ledger_tx_id);
    tx.ledger_status = Some(LedgerStatus::Confirmed);
    tx.ledger_error = None;
    record_activity(tx, ActivityAction::Executed, executor, now);
    Ok(())
}
