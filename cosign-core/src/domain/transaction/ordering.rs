//! Canonical signature ordering for ledger submission, one shape per transaction kind.

use crate::domain::account::MultiSigAccount;
use crate::domain::resolver::{canonical_keys, sort_signatures_by_recovered_address, RecoveredSignature};
use crate::domain::signature::SignatureValue;
use crate::domain::signer::Signer;
use crate::domain::transaction::{Transaction, TransactionDetails};
use crate::foundation::{CosignError, SignerKey};
use serde::{Deserialize, Serialize};

/// Signed payload ready for the ledger. Positional vectors never drop missing signers; gaps are `None`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Submission {
    #[serde(rename_all = "camelCase")]
    Register {
        /// Owner keys in byte order, matching the descriptor identity.
        owners: Vec<SignerKey>,
        /// Threshold of the descriptor being registered.
        signatures_required: u16,
        signatures: Vec<RecoveredSignature>,
    },
    #[serde(rename_all = "camelCase")]
    TransferFund {
        auth_descriptor_id: String,
        signers: Vec<SignerKey>,
        signatures: Vec<Option<SignatureValue>>,
    },
    #[serde(rename_all = "camelCase")]
    UpdateDescriptor {
        auth_descriptor_id: String,
        new_signers: Vec<SignerKey>,
        new_signatures_required: u16,
        /// Aligned with `new_signers`.
        new_descriptor_signatures: Vec<Option<SignatureValue>>,
        /// Aligned with the account's current signer order; authorizes the change under the old descriptor.
        authorizing_signatures: Vec<Option<SignatureValue>>,
    },
}

impl Submission {
    pub fn present_signatures(&self) -> usize {
        match self {
            Submission::Register { signatures, .. } => signatures.len(),
            Submission::TransferFund { signatures, .. } => signatures.iter().flatten().count(),
            Submission::UpdateDescriptor { new_descriptor_signatures, authorizing_signatures, .. } => {
                new_descriptor_signatures.iter().flatten().count() + authorizing_signatures.iter().flatten().count()
            }
        }
    }
}

/// Fails with `StaleDescriptor` when `tx` was authorized against a descriptor the account no longer uses.
pub fn ensure_current_descriptor(tx: &Transaction, account: &MultiSigAccount) -> Result<(), CosignError> {
    match (tx.details.auth_descriptor_id(), account.descriptor_id()) {
        (None, _) => Ok(()),
        (Some(expected), Some(current)) if expected == current => Ok(()),
        (Some(expected), current) => {
            Err(CosignError::StaleDescriptor { expected: expected.to_string(), current: current.unwrap_or("-").to_string() })
        }
    }
}

/// Builds the submission for `tx` against the parent account's current signer order.
///
/// Register flows need the ledger's registration message; every signature must recover to the key it was
/// filed under.
pub fn build_submission(
    tx: &Transaction,
    account: &MultiSigAccount,
    registration_message: Option<&[u8]>,
) -> Result<Submission, CosignError> {
    ensure_current_descriptor(tx, account)?;
    match &tx.details {
        TransactionDetails::Register => {
            let message = registration_message
                .ok_or_else(|| CosignError::SignatureVerificationFailed { reason: "registration message unavailable".to_string() })?;
            register_submission(tx, account, message)
        }
        TransactionDetails::TransferFund { auth_descriptor_id, .. } => Ok(Submission::TransferFund {
            auth_descriptor_id: auth_descriptor_id.clone(),
            signers: crate::domain::signer::keys(&account.signers),
            signatures: positional(tx, &account.signers),
        }),
        TransactionDetails::UpdateDescriptor { signers_to_update, signatures_required_to_update, auth_descriptor_id } => {
            Ok(Submission::UpdateDescriptor {
                auth_descriptor_id: auth_descriptor_id.clone(),
                new_signers: crate::domain::signer::keys(signers_to_update),
                new_signatures_required: *signatures_required_to_update,
                new_descriptor_signatures: positional(tx, signers_to_update),
                authorizing_signatures: positional(tx, &account.signers),
            })
        }
    }
}

fn positional(tx: &Transaction, order: &[Signer]) -> Vec<Option<SignatureValue>> {
    order.iter().map(|signer| tx.signature_for(&signer.public_key).cloned()).collect()
}

fn register_submission(tx: &Transaction, account: &MultiSigAccount, message: &[u8]) -> Result<Submission, CosignError> {
    let filed: Vec<(&SignerKey, &SignatureValue)> =
        tx.signers.iter().filter_map(|s| tx.signature_for(&s.public_key).map(|sig| (&s.public_key, sig))).collect();
    let values: Vec<SignatureValue> = filed.iter().map(|(_, sig)| (*sig).clone()).collect();
    let sorted = sort_signatures_by_recovered_address(&values, message)?;

    for (key, signature) in &filed {
        let matches = sorted.iter().any(|r| &r.signature == *signature && r.address.same_address(key));
        if !matches {
            return Err(CosignError::SignatureVerificationFailed { reason: format!("signature filed by {} recovers to a different address", key) });
        }
    }

    let owners = canonical_keys(&crate::domain::signer::keys(&account.signers))?
        .into_iter()
        .map(|bytes| {
            let address: [u8; crate::foundation::SIGNER_ADDRESS_LEN] =
                bytes.as_slice().try_into().map_err(|_| CosignError::EncodingError(format!("owner key has {} bytes", bytes.len())))?;
            Ok(SignerKey::from_address_bytes(&address))
        })
        .collect::<Result<Vec<_>, CosignError>>()?;

    Ok(Submission::Register { owners, signatures_required: account.signatures_required, signatures: sorted })
}
