//! Transaction operations: opening transfers, collecting signatures, rejection and reads.

use crate::application::accounts::load_account;
use crate::application::context::CoordinatorContext;
use crate::domain::account::lifecycle;
use crate::domain::transaction::aggregator::{self, OpenTransaction};
use crate::domain::{AccountStatus, SignatureValue, Transaction, TransactionDetails, TransactionKind, TransactionStatus};
use crate::foundation::{now_nanos, CosignError, RecordId, Result, SignerKey, MAX_NOTE_LENGTH};
use crate::infrastructure::ledger::BuildParams;
use crate::infrastructure::storage::{paginate, ListQuery, Page, TransactionFilter};
use log::info;

#[derive(Clone, Debug)]
pub struct CreateTransferParams {
    pub account: RecordId,
    pub initiator: SignerKey,
    pub recipient: String,
    /// Decimal string in the asset's smallest unit.
    pub amount: String,
    pub asset_id: String,
    pub asset_symbol: String,
    pub note: Option<String>,
    pub payload: Option<Vec<u8>>,
    pub signature: SignatureValue,
}

pub(crate) fn load_transaction(ctx: &CoordinatorContext, id: &RecordId) -> Result<Transaction> {
    ctx.storage.get_transaction(id)?.ok_or_else(|| CosignError::TransactionNotFound(id.to_string()))
}

fn validate_transfer(params: &CreateTransferParams) -> Result<()> {
    if params.recipient.trim().is_empty() {
        return Err(CosignError::invalid_input("recipient", "must not be empty"));
    }
    let amount = params.amount.trim();
    if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) || amount.bytes().all(|b| b == b'0') {
        return Err(CosignError::invalid_input("amount", "must be a positive integer in the asset's smallest unit"));
    }
    if params.asset_id.trim().is_empty() {
        return Err(CosignError::invalid_input("assetId", "must not be empty"));
    }
    if params.note.as_ref().map_or(false, |note| note.len() > MAX_NOTE_LENGTH) {
        return Err(CosignError::invalid_input("note", format!("must be at most {} bytes", MAX_NOTE_LENGTH)));
    }
    Ok(())
}

pub async fn create_transfer(ctx: &CoordinatorContext, params: CreateTransferParams) -> Result<Transaction> {
    validate_transfer(&params)?;
    let account = load_account(ctx, &params.account)?;
    if account.status != AccountStatus::Created {
        return Err(CosignError::invalid_transition("account", account.status, TransactionKind::TransferFund));
    }
    let descriptor_id = account
        .descriptor_id()
        .ok_or_else(|| CosignError::MissingDescriptor { account_id: account.account_id.to_string() })?
        .to_string();
    if !account.is_signer(&params.initiator) {
        return Err(CosignError::InitiatorNotASigner(params.initiator.to_string()));
    }

    let details = TransactionDetails::TransferFund {
        recipient: params.recipient.trim().to_string(),
        asset_id: params.asset_id,
        asset_symbol: params.asset_symbol,
        amount: params.amount.trim().to_string(),
        note: params.note,
        auth_descriptor_id: descriptor_id,
    };
    let payload = match params.payload {
        Some(payload) => payload,
        None => ctx.ledger.build_transaction(TransactionKind::TransferFund, &BuildParams { account: &account, details: &details }).await?,
    };

    let tx = aggregator::open(
        OpenTransaction {
            account: account.id.clone(),
            account_id: account.account_id,
            details,
            payload,
            signers: account.signers.clone(),
            signatures_required: account.signatures_required,
            initiator: params.initiator,
            initiator_signature: params.signature,
        },
        now_nanos(),
    )?;
    ctx.storage.insert_transaction(&tx)?;
    info!("transfer opened tx_id={} account={} status={} threshold={}", tx.id, tx.account, tx.status, tx.signatures_required);
    ctx.observer.on_transaction_created(&tx);
    if tx.status == TransactionStatus::Ready {
        ctx.observer.on_threshold_met(&tx);
    }
    Ok(tx)
}

pub async fn sign_transaction(ctx: &CoordinatorContext, id: &RecordId, signer: &SignerKey, signature: SignatureValue) -> Result<Transaction> {
    let _guard = ctx.locks.lock_transaction(id).await?;
    let mut tx = load_transaction(ctx, id)?;
    if tx.kind() != TransactionKind::Register {
        let account = load_account(ctx, &tx.account)?;
        if account.main_descriptor.is_none() {
            return Err(CosignError::MissingDescriptor { account_id: account.account_id.to_string() });
        }
    }

    let outcome = aggregator::add_signature(&mut tx, signer, signature, now_nanos())?;
    ctx.storage.update_transaction(&tx)?;
    info!(
        "transaction signed tx_id={} signer={} replaced={} signatures={}/{} status={}",
        tx.id,
        signer,
        outcome.replaced,
        outcome.signature_count,
        tx.signatures_required,
        tx.status
    );
    ctx.observer.on_signature_added(&tx, signer, outcome.replaced);
    if outcome.became_ready {
        ctx.observer.on_threshold_met(&tx);
    }
    Ok(tx)
}

/// Rejecting a Register transaction returns its account to `TransferFee` in the same write, so registration
/// can be started again.
pub async fn reject_transaction(ctx: &CoordinatorContext, id: &RecordId, actor: &SignerKey) -> Result<Transaction> {
    let _guard = ctx.locks.lock_transaction(id).await?;
    let mut tx = load_transaction(ctx, id)?;
    let now = now_nanos();
    aggregator::reject(&mut tx, actor, now)?;

    if tx.kind() != TransactionKind::Register {
        ctx.storage.update_transaction(&tx)?;
        info!("transaction rejected tx_id={} actor={}", tx.id, actor);
        ctx.observer.on_transaction_rejected(&tx);
        return Ok(tx);
    }

    let _account_guard = ctx.locks.lock_account(&tx.account).await?;
    let mut account = load_account(ctx, &tx.account)?;
    let from = account.status;
    let reverted = if from == AccountStatus::Registering {
        lifecycle::abandon_registration(&mut account, now)?;
        Some(&account)
    } else {
        None
    };
    ctx.storage.write_transaction_with_account(&tx, reverted)?;
    info!("registration rejected tx_id={} actor={} account={} account_status={}", tx.id, actor, account.id, account.status);
    ctx.observer.on_transaction_rejected(&tx);
    if reverted.is_some() {
        ctx.observer.on_account_status_changed(&account, from);
    }
    Ok(tx)
}

pub fn get_transaction(ctx: &CoordinatorContext, id: &RecordId) -> Result<Transaction> {
    load_transaction(ctx, id)
}

fn require_signer(filter: &TransactionFilter) -> Result<()> {
    match filter.signer {
        Some(_) => Ok(()),
        None => Err(CosignError::invalid_input("signer", "required")),
    }
}

pub fn list_transactions(ctx: &CoordinatorContext, filter: &TransactionFilter, query: &ListQuery) -> Result<Page<Transaction>> {
    require_signer(filter)?;
    Ok(paginate(ctx.storage.list_transactions(filter)?, query))
}

pub fn count_transactions(ctx: &CoordinatorContext, filter: &TransactionFilter) -> Result<usize> {
    require_signer(filter)?;
    ctx.storage.count_transactions(filter)
}
