//! Account operations: creation, fee detection, registration, signer updates and reads.

use crate::application::context::CoordinatorContext;
use crate::application::locks::CREATE_ACCOUNT_LOCK;
use crate::domain::account::lifecycle::{self, NewAccount, SignerUpdate, SignerUpdateOutcome};
use crate::domain::{
    AccountStatus, AssetBalance, Blockchain, MultiSigAccount, SignatureValue, Signer, Transaction, TransactionDetails, TransactionKind, TransactionStatus,
};
use crate::foundation::{now_nanos, CosignError, Network, RecordId, Result, SignerKey};
use crate::infrastructure::ledger::BuildParams;
use crate::infrastructure::storage::{paginate, AccountFilter, ListQuery, Page, TransactionFilter};
use log::{debug, info, warn};

#[derive(Clone, Debug)]
pub struct CreateAccountParams {
    pub name: String,
    pub signers: Vec<Signer>,
    pub signatures_required: u16,
    pub initiator: SignerKey,
    pub network: Network,
    pub chain_identity: String,
}

#[derive(Clone, Debug)]
pub struct RegisterParams {
    /// Pre-built ledger payload; built by the ledger adapter when absent.
    pub payload: Option<Vec<u8>>,
    pub signature: SignatureValue,
    pub initiator: SignerKey,
}

#[derive(Clone, Debug)]
pub struct UpdateAccountParams {
    pub name: Option<String>,
    pub signers: Vec<Signer>,
    pub signatures_required: u16,
    pub initiator: SignerKey,
    pub payload: Option<Vec<u8>>,
    pub signature: Option<SignatureValue>,
}

#[derive(Clone, Debug)]
pub struct UpdateAccountOutcome {
    pub account: MultiSigAccount,
    /// Set when the update changes the signer set and needs an UpdateDescriptor transaction.
    pub transaction: Option<Transaction>,
}

pub(crate) fn load_account(ctx: &CoordinatorContext, id: &RecordId) -> Result<MultiSigAccount> {
    ctx.storage.get_account(id)?.ok_or_else(|| CosignError::AccountNotFound(id.to_string()))
}

pub async fn create_account(ctx: &CoordinatorContext, params: CreateAccountParams) -> Result<MultiSigAccount> {
    if !ctx.allowed_networks.contains(&params.network) {
        return Err(CosignError::invalid_input("network", format!("{} is not enabled", params.network)));
    }
    ctx.chains.ensure_accepts(&params.chain_identity, params.network)?;
    let _create_guard = ctx.locks.acquire(CREATE_ACCOUNT_LOCK).await?;
    let existing = ctx.storage.list_accounts(&AccountFilter {
        network: Some(params.network),
        chain_identity: Some(params.chain_identity.clone()),
        ..AccountFilter::default()
    })?;
    debug!("create_account duplicate scan network={} existing={}", params.network, existing.len());

    let account = lifecycle::create(
        NewAccount {
            name: params.name,
            signers: params.signers,
            signatures_required: params.signatures_required,
            initiator: params.initiator,
            network: params.network,
            chain_identity: params.chain_identity,
        },
        &existing,
        now_nanos(),
    )?;
    ctx.storage.insert_account(&account)?;
    info!(
        "multisig account created id={} account_id={} signers={} threshold={} network={}",
        account.id,
        account.account_id,
        account.signers.len(),
        account.signatures_required,
        account.network
    );
    ctx.observer.on_account_created(&account);
    Ok(account)
}

/// Returns the stored account; `Created` accounts get their main descriptor refreshed from the ledger.
/// A ledger failure during refresh is logged and the stored copy is returned.
pub async fn get_account(ctx: &CoordinatorContext, id: &RecordId) -> Result<MultiSigAccount> {
    let account = load_account(ctx, id)?;
    if account.status != AccountStatus::Created {
        return Ok(account);
    }
    let descriptor = match ctx.ledger.query_auth_descriptor(&account.account_id).await {
        Ok(descriptor) => descriptor,
        Err(err) => {
            warn!("descriptor refresh failed id={} account_id={} error={}", account.id, account.account_id, err);
            return Ok(account);
        }
    };

    let _guard = ctx.locks.lock_account(id).await?;
    let mut account = load_account(ctx, id)?;
    if lifecycle::refresh_descriptor(&mut account, descriptor, now_nanos()) {
        ctx.storage.update_account(&account)?;
        info!("account descriptor refreshed id={} descriptor_id={}", account.id, account.descriptor_id().unwrap_or("-"));
    }
    Ok(account)
}

fn require_list_filter(filter: &AccountFilter) -> Result<()> {
    if filter.signer.is_none() {
        return Err(CosignError::invalid_input("signer", "required"));
    }
    if filter.chain_identity.as_deref().map_or(true, |c| c.trim().is_empty()) {
        return Err(CosignError::invalid_input("blockchainRid", "required"));
    }
    Ok(())
}

pub fn list_accounts(ctx: &CoordinatorContext, filter: &AccountFilter, query: &ListQuery) -> Result<Page<MultiSigAccount>> {
    require_list_filter(filter)?;
    Ok(paginate(ctx.storage.list_accounts(filter)?, query))
}

pub fn count_accounts(ctx: &CoordinatorContext, filter: &AccountFilter) -> Result<usize> {
    require_list_filter(filter)?;
    ctx.storage.count_accounts(filter)
}

pub fn list_blockchains(ctx: &CoordinatorContext, network: Option<Network>, active_only: bool, query: &ListQuery) -> Page<Blockchain> {
    Page::from_items(ctx.chains.list(network, active_only), query)
}

pub fn get_blockchain(ctx: &CoordinatorContext, rid: &str) -> Result<Blockchain> {
    ctx.chains.find(rid).cloned()
}

pub async fn list_assets(ctx: &CoordinatorContext, id: &RecordId) -> Result<Vec<AssetBalance>> {
    let account = load_account(ctx, id)?;
    if account.status != AccountStatus::Created {
        return Err(CosignError::invalid_transition("account", account.status, "listAssets"));
    }
    ctx.ledger.balances(&account.account_id).await
}

/// Polls the ledger for the fee payment and moves the account to `TransferFee`. On a registered blockchain
/// only transfers paying its fee asset and amount count.
pub async fn detect_transfer_fee(ctx: &CoordinatorContext, id: &RecordId) -> Result<MultiSigAccount> {
    let _guard = ctx.locks.lock_account(id).await?;
    let mut account = load_account(ctx, id)?;
    if !matches!(account.status, AccountStatus::Pending | AccountStatus::TransferFee) {
        return Err(CosignError::invalid_transition("account", account.status, AccountStatus::TransferFee));
    }
    let reported = ctx.ledger.pending_transfers(&account.account_id).await?;
    let reported_count = reported.len();
    let pending = ctx.chains.fee_transfers(&account.chain_identity, reported);
    if pending.len() != reported_count {
        debug!("pending transfers below the chain fee ignored id={} reported={} kept={}", account.id, reported_count, pending.len());
    }
    let from = account.status;
    lifecycle::mark_fee_obligation_detected(&mut account, pending, now_nanos())?;
    ctx.storage.update_account(&account)?;
    if from != account.status {
        ctx.observer.on_account_status_changed(&account, from);
    }
    Ok(account)
}

pub async fn register_account(ctx: &CoordinatorContext, id: &RecordId, params: RegisterParams) -> Result<Transaction> {
    let _guard = ctx.locks.lock_account(id).await?;
    let mut account = load_account(ctx, id)?;
    if account.status != AccountStatus::TransferFee {
        return Err(CosignError::invalid_transition("account", account.status, AccountStatus::Registering));
    }
    if !account.is_signer(&params.initiator) {
        return Err(CosignError::InitiatorNotASigner(params.initiator.to_string()));
    }
    let payload = match params.payload {
        Some(payload) => payload,
        None => {
            let details = TransactionDetails::Register;
            let build = BuildParams { account: &account, details: &details };
            ctx.ledger.build_transaction(details.kind(), &build).await?
        }
    };

    let from = account.status;
    let tx = lifecycle::begin_registration(&mut account, &params.initiator, payload, params.signature, now_nanos())?;
    ctx.storage.write_transaction_with_account(&tx, Some(&account))?;
    info!("registration started id={} account_id={} tx_id={} required={}", account.id, account.account_id, tx.id, tx.signatures_required);
    ctx.observer.on_account_status_changed(&account, from);
    ctx.observer.on_transaction_created(&tx);
    if tx.status == TransactionStatus::Ready {
        ctx.observer.on_threshold_met(&tx);
    }
    Ok(tx)
}

/// Fails while another UpdateDescriptor for the account is still open.
fn ensure_no_open_descriptor_update(ctx: &CoordinatorContext, account: &MultiSigAccount) -> Result<()> {
    let open = ctx.storage.list_transactions(&TransactionFilter {
        account: Some(account.id.clone()),
        kind: Some(TransactionKind::UpdateDescriptor),
        ..TransactionFilter::default()
    })?;
    match open.iter().find(|tx| matches!(tx.status, TransactionStatus::Pending | TransactionStatus::Ready)) {
        Some(tx) => Err(CosignError::DescriptorUpdateInProgress { tx_id: tx.id.to_string() }),
        None => Ok(()),
    }
}

pub async fn update_account(ctx: &CoordinatorContext, id: &RecordId, params: UpdateAccountParams) -> Result<UpdateAccountOutcome> {
    let _guard = ctx.locks.lock_account(id).await?;
    let mut account = load_account(ctx, id)?;
    let update = SignerUpdate { name: params.name, signers: params.signers, signatures_required: params.signatures_required };
    lifecycle::validate_signer_update(&account, &update, &params.initiator)?;

    let authorization = if lifecycle::signer_set_changes(&account, &update.signers, update.signatures_required) {
        ensure_no_open_descriptor_update(ctx, &account)?;
        let signature = params.signature.ok_or_else(|| CosignError::invalid_input("signature", "required when the signer set changes"))?;
        let descriptor_id = account
            .descriptor_id()
            .ok_or_else(|| CosignError::MissingDescriptor { account_id: account.account_id.to_string() })?
            .to_string();
        let payload = match params.payload {
            Some(payload) => payload,
            None => {
                let details = TransactionDetails::UpdateDescriptor {
                    signers_to_update: update.signers.clone(),
                    signatures_required_to_update: update.signatures_required,
                    auth_descriptor_id: descriptor_id,
                };
                let build = BuildParams { account: &account, details: &details };
                ctx.ledger.build_transaction(details.kind(), &build).await?
            }
        };
        Some((payload, signature))
    } else {
        None
    };

    match lifecycle::request_signer_update(&mut account, update, &params.initiator, authorization, now_nanos())? {
        SignerUpdateOutcome::MetadataUpdated => {
            ctx.storage.update_account(&account)?;
            Ok(UpdateAccountOutcome { account, transaction: None })
        }
        SignerUpdateOutcome::DescriptorChange(tx) => {
            ctx.storage.insert_transaction(&tx)?;
            ctx.observer.on_transaction_created(&tx);
            Ok(UpdateAccountOutcome { account, transaction: Some(tx) })
        }
    }
}

/// Deletes an account that never reached the ledger.
pub async fn delete_account(ctx: &CoordinatorContext, id: &RecordId, initiator: &SignerKey) -> Result<()> {
    let _guard = ctx.locks.lock_account(id).await?;
    let account = load_account(ctx, id)?;
    if !account.is_signer(initiator) {
        return Err(CosignError::InitiatorNotASigner(initiator.to_string()));
    }
    if account.status != AccountStatus::Pending {
        return Err(CosignError::invalid_transition("account", account.status, "deleted"));
    }
    if !ctx.storage.delete_account(id)? {
        return Err(CosignError::AccountNotFound(id.to_string()));
    }
    info!("multisig account deleted id={} account_id={}", account.id, account.account_id);
    ctx.observer.on_account_deleted(id);
    Ok(())
}
