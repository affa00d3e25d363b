use crate::domain::account::{AccountStatus, AuthDescriptor, MultiSigAccount, PendingTransfer};
use crate::domain::resolver::derive_account_id;
use crate::domain::signature::SignatureValue;
use crate::domain::signer::{self, Signer};
use crate::domain::transaction::aggregator::{self, OpenTransaction};
use crate::domain::transaction::{Transaction, TransactionDetails};
use crate::domain::transition::{ensure_against, validate_against, StateTransitionResult};
use crate::foundation::{CosignError, Network, RecordId, SignerKey, MAX_ACCOUNT_NAME_LENGTH, MAX_SIGNATURES_REQUIRED, MIN_MULTISIG_SIGNERS};
use log::{info, warn};

const VALID_TRANSITIONS: &[(AccountStatus, AccountStatus)] = &[
    (AccountStatus::Pending, AccountStatus::TransferFee),
    (AccountStatus::TransferFee, AccountStatus::Registering),
    (AccountStatus::Registering, AccountStatus::Created),
    (AccountStatus::Registering, AccountStatus::TransferFee),
];

pub fn validate_transition(from: AccountStatus, to: AccountStatus) -> StateTransitionResult {
    validate_against(VALID_TRANSITIONS, from, to)
}

pub fn ensure_valid_transition(from: AccountStatus, to: AccountStatus) -> Result<(), CosignError> {
    ensure_against("account", VALID_TRANSITIONS, from, to)
}

pub fn is_terminal(status: AccountStatus) -> bool {
    status == AccountStatus::Created
}

fn transition(account: &mut MultiSigAccount, next: AccountStatus, now: u64) -> Result<(), CosignError> {
    let from = account.status;
    if let Err(err) = ensure_valid_transition(from, next) {
        warn!(
            "invalid account state transition id={} account_id={} from_state={} to_state={} error={}",
            account.id, account.account_id, from, next, err
        );
        return Err(err);
    }
    account.status = next;
    account.updated_at_nanos = now;
    if from != next {
        info!("account state transition id={} account_id={} from_state={} to_state={}", account.id, account.account_id, from, next);
    }
    Ok(())
}

pub struct NewAccount {
    pub name: String,
    pub signers: Vec<Signer>,
    pub signatures_required: u16,
    pub initiator: SignerKey,
    pub network: Network,
    pub chain_identity: String,
}

fn validate_membership(signers: &[Signer], threshold: u16, initiator: Option<&SignerKey>) -> Result<(), CosignError> {
    signer::validate_signers(signers)?;
    if signer::unique_keys(signers).len() < MIN_MULTISIG_SIGNERS {
        return Err(CosignError::InvalidSignerSet(format!("at least {} unique signer keys required", MIN_MULTISIG_SIGNERS)));
    }
    if threshold == 0 || threshold > MAX_SIGNATURES_REQUIRED || usize::from(threshold) > signers.len() {
        return Err(CosignError::InvalidSignerSet(format!(
            "signaturesRequired must be in [1, {}], got {}",
            signers.len().min(usize::from(MAX_SIGNATURES_REQUIRED)),
            threshold
        )));
    }
    if let Some(initiator) = initiator {
        if !signer::contains_key(signers, initiator) {
            return Err(CosignError::InitiatorNotASigner(initiator.to_string()));
        }
    }
    Ok(())
}

/// Builds a `Pending` account. `existing` holds the persisted accounts that share the target ledger.
pub fn create(request: NewAccount, existing: &[MultiSigAccount], now: u64) -> Result<MultiSigAccount, CosignError> {
    if request.name.trim().is_empty() || request.name.len() > MAX_ACCOUNT_NAME_LENGTH {
        return Err(CosignError::invalid_input("name", format!("must be 1..={} characters", MAX_ACCOUNT_NAME_LENGTH)));
    }
    if request.chain_identity.trim().is_empty() {
        return Err(CosignError::invalid_input("blockchainRid", "must not be empty"));
    }
    validate_membership(&request.signers, request.signatures_required, Some(&request.initiator))?;

    if let Some(duplicate) = existing.iter().find(|account| {
        account.network == request.network
            && account.chain_identity == request.chain_identity
            && signer::same_key_set(&account.signers, &request.signers)
    }) {
        return Err(CosignError::DuplicateSignerSet { account_id: duplicate.account_id.to_string() });
    }

    let derived = derive_account_id(&signer::keys(&request.signers), request.signatures_required)?;
    Ok(MultiSigAccount {
        id: RecordId::generate(),
        account_id: derived.account_id,
        name: request.name.trim().to_string(),
        signers: request.signers,
        signatures_required: request.signatures_required,
        status: AccountStatus::Pending,
        main_descriptor: None,
        pending_transfer: Vec::new(),
        network: request.network,
        chain_identity: request.chain_identity,
        created_by: request.initiator,
        created_at_nanos: now,
        updated_at_nanos: now,
    })
}

pub fn mark_fee_obligation_detected(
    account: &mut MultiSigAccount,
    pending: Vec<PendingTransfer>,
    now: u64,
) -> Result<(), CosignError> {
    if pending.is_empty() {
        return Err(CosignError::NoPendingTransfer { account_id: account.account_id.to_string() });
    }
    transition(account, AccountStatus::TransferFee, now)?;
    account.pending_transfer = pending;
    Ok(())
}

/// Moves the account to `Registering` and returns the Register transaction. Every owner must sign it.
pub fn begin_registration(
    account: &mut MultiSigAccount,
    initiator: &SignerKey,
    payload: Vec<u8>,
    signature: SignatureValue,
    now: u64,
) -> Result<Transaction, CosignError> {
    if account.status != AccountStatus::TransferFee {
        return Err(CosignError::invalid_transition("account", account.status, AccountStatus::Registering));
    }
    if !account.is_signer(initiator) {
        return Err(CosignError::InitiatorNotASigner(initiator.to_string()));
    }

    let tx = aggregator::open(
        OpenTransaction {
            account: account.id.clone(),
            account_id: account.account_id,
            details: TransactionDetails::Register,
            payload,
            signers: account.signers.clone(),
            signatures_required: account.signers.len() as u16,
            initiator: initiator.clone(),
            initiator_signature: signature,
        },
        now,
    )?;
    transition(account, AccountStatus::Registering, now)?;
    Ok(tx)
}

pub fn confirm_registration(account: &mut MultiSigAccount, descriptor: AuthDescriptor, now: u64) -> Result<(), CosignError> {
    if account.status != AccountStatus::Registering {
        return Err(CosignError::invalid_transition("account", account.status, AccountStatus::Created));
    }
    transition(account, AccountStatus::Created, now)?;
    account.main_descriptor = Some(descriptor);
    account.pending_transfer.clear();
    Ok(())
}

/// Returns a `Registering` account to `TransferFee` after its Register transaction was rejected. The fee
/// snapshot is kept so registration can be retried without another fee payment.
pub fn abandon_registration(account: &mut MultiSigAccount, now: u64) -> Result<(), CosignError> {
    if account.status != AccountStatus::Registering {
        return Err(CosignError::invalid_transition("account", account.status, AccountStatus::TransferFee));
    }
    transition(account, AccountStatus::TransferFee, now)
}

pub struct SignerUpdate {
    pub name: Option<String>,
    pub signers: Vec<Signer>,
    pub signatures_required: u16,
}

#[derive(Debug)]
pub enum SignerUpdateOutcome {
    /// Same key set and threshold; names were updated in place.
    MetadataUpdated,
    DescriptorChange(Transaction),
}

/// True when `signers`/`threshold` differ from the account in threshold or key membership.
pub fn signer_set_changes(account: &MultiSigAccount, signers: &[Signer], threshold: u16) -> bool {
    account.signatures_required != threshold || !signer::same_key_set(&account.signers, signers)
}

/// Validates an update request without mutating the account.
pub fn validate_signer_update(account: &MultiSigAccount, update: &SignerUpdate, initiator: &SignerKey) -> Result<(), CosignError> {
    if account.status != AccountStatus::Created {
        return Err(CosignError::invalid_transition("account", account.status, "updateDescriptor"));
    }
    if !account.is_signer(initiator) {
        return Err(CosignError::InitiatorNotASigner(initiator.to_string()));
    }
    if let Some(name) = update.name.as_ref() {
        if name.trim().is_empty() || name.len() > MAX_ACCOUNT_NAME_LENGTH {
            return Err(CosignError::invalid_input("name", format!("must be 1..={} characters", MAX_ACCOUNT_NAME_LENGTH)));
        }
    }
    validate_membership(&update.signers, update.signatures_required, None)
}

/// Applies a metadata-only update, or opens an UpdateDescriptor transaction over the union of the current and
/// target signer sets with a unanimous threshold.
///
/// `authorization` carries the encoded ledger payload and initiator signature; it is required only when the key
/// set or threshold changes.
pub fn request_signer_update(
    account: &mut MultiSigAccount,
    update: SignerUpdate,
    initiator: &SignerKey,
    authorization: Option<(Vec<u8>, SignatureValue)>,
    now: u64,
) -> Result<SignerUpdateOutcome, CosignError> {
    validate_signer_update(account, &update, initiator)?;

    if !signer_set_changes(account, &update.signers, update.signatures_required) {
        if let Some(name) = update.name {
            account.name = name.trim().to_string();
        }
        account.signers = update.signers;
        account.updated_at_nanos = now;
        info!("account metadata updated id={} account_id={}", account.id, account.account_id);
        return Ok(SignerUpdateOutcome::MetadataUpdated);
    }

    let descriptor_id = account
        .descriptor_id()
        .ok_or_else(|| CosignError::MissingDescriptor { account_id: account.account_id.to_string() })?
        .to_string();
    let (payload, signature) =
        authorization.ok_or_else(|| CosignError::invalid_input("signature", "required when the signer set changes"))?;

    let union = signer::union(&account.signers, &update.signers);
    let tx = aggregator::open(
        OpenTransaction {
            account: account.id.clone(),
            account_id: account.account_id,
            details: TransactionDetails::UpdateDescriptor {
                signers_to_update: update.signers,
                signatures_required_to_update: update.signatures_required,
                auth_descriptor_id: descriptor_id,
            },
            payload,
            signatures_required: union.len() as u16,
            signers: union,
            initiator: initiator.clone(),
            initiator_signature: signature,
        },
        now,
    )?;
    info!(
        "descriptor update requested id={} account_id={} tx_id={} union_size={}",
        account.id,
        account.account_id,
        tx.id,
        tx.signers.len()
    );
    Ok(SignerUpdateOutcome::DescriptorChange(tx))
}

/// Absorbs a confirmed descriptor update: the target signer set and threshold become authoritative.
pub fn apply_descriptor_update(
    account: &mut MultiSigAccount,
    target_signers: Vec<Signer>,
    target_threshold: u16,
    descriptor: AuthDescriptor,
    now: u64,
) -> Result<(), CosignError> {
    if account.status != AccountStatus::Created {
        return Err(CosignError::invalid_transition("account", account.status, "updateDescriptor"));
    }
    account.signers = target_signers;
    account.signatures_required = target_threshold;
    account.main_descriptor = Some(descriptor);
    account.updated_at_nanos = now;
    info!(
        "account descriptor updated id={} account_id={} signers={} threshold={}",
        account.id,
        account.account_id,
        account.signers.len(),
        account.signatures_required
    );
    Ok(())
}

pub fn refresh_descriptor(account: &mut MultiSigAccount, descriptor: Option<AuthDescriptor>, now: u64) -> bool {
    if account.status != AccountStatus::Created || descriptor.is_none() || account.main_descriptor == descriptor {
        return false;
    }
    account.main_descriptor = descriptor;
    account.updated_at_nanos = now;
    true
}
