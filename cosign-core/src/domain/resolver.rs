//! Signer set resolution: canonical account identity and registration signature ordering.
//!
//! Both operations are pure. Identity is a blake3 content hash over the canonical authorization descriptor
//! (flags, threshold, byte-sorted keys) so that client-supplied ordering never changes the result.

use crate::domain::signature::SignatureValue;
use crate::foundation::{
    AccountId, CosignError, SignerKey, ACCOUNT_DESCRIPTOR_FLAGS, ACCOUNT_ID_DOMAIN, MAX_SIGNATURES_REQUIRED, MIN_MULTISIG_SIGNERS,
    SIGNER_ADDRESS_LEN,
};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
pub struct AccountIdComputationResult {
    pub account_id: AccountId,
    pub signer_count: usize,
    pub threshold: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveredSignature {
    pub address: SignerKey,
    pub signature: SignatureValue,
}

/// Derives the ledger account identity for a multi-signature signer set.
///
/// Keys are deduplicated by byte value before counting; fewer than two unique keys, a threshold outside
/// `[1, MAX_SIGNATURES_REQUIRED]`, or a threshold above the key count fail with `InvalidSignerSet`.
pub fn derive_account_id(signer_keys: &[SignerKey], threshold: u16) -> Result<AccountIdComputationResult, CosignError> {
    let keys = canonical_keys(signer_keys)?;
    if keys.len() < MIN_MULTISIG_SIGNERS {
        return Err(CosignError::InvalidSignerSet(format!(
            "at least {} unique signer keys required, got {}",
            MIN_MULTISIG_SIGNERS,
            keys.len()
        )));
    }
    if threshold == 0 || threshold > MAX_SIGNATURES_REQUIRED {
        return Err(CosignError::InvalidSignerSet(format!("threshold must be in [1, {}], got {}", MAX_SIGNATURES_REQUIRED, threshold)));
    }
    if usize::from(threshold) > keys.len() {
        return Err(CosignError::InvalidSignerSet(format!("threshold {} exceeds signer count {}", threshold, keys.len())));
    }

    Ok(AccountIdComputationResult { account_id: descriptor_identity(&keys, threshold), signer_count: keys.len(), threshold })
}

/// Identity of an authorization descriptor over already-canonical keys.
///
/// A single key skips sorting and descriptor framing: its identity is the hash of that key alone.
pub fn descriptor_identity(sorted_keys: &[Vec<u8>], threshold: u16) -> AccountId {
    if let [single] = sorted_keys {
        return AccountId::from(*blake3::hash(single).as_bytes());
    }

    let mut hasher = blake3::Hasher::new();
    hasher.update(ACCOUNT_ID_DOMAIN);
    hasher.update(&(ACCOUNT_DESCRIPTOR_FLAGS.len() as u32).to_le_bytes());
    for flag in ACCOUNT_DESCRIPTOR_FLAGS {
        hasher.update(&(flag.len() as u32).to_le_bytes());
        hasher.update(flag.as_bytes());
    }
    hasher.update(&threshold.to_le_bytes());
    hasher.update(&(sorted_keys.len() as u32).to_le_bytes());
    for key in sorted_keys {
        hasher.update(&(key.len() as u32).to_le_bytes());
        hasher.update(key);
    }
    AccountId::from(*hasher.finalize().as_bytes())
}

/// Decodes, deduplicates and byte-sorts signer keys.
pub fn canonical_keys(signer_keys: &[SignerKey]) -> Result<Vec<Vec<u8>>, CosignError> {
    let mut keys = BTreeSet::new();
    for key in signer_keys {
        let bytes = key.to_bytes().map_err(|err| CosignError::InvalidSignerSet(format!("undecodable key {}: {}", key, err)))?;
        keys.insert(bytes);
    }
    Ok(keys.into_iter().collect())
}

/// EIP-191 personal-message digest: keccak256("\x19Ethereum Signed Message:\n" + len + message).
pub fn personal_message_hash(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(format!("\x19Ethereum Signed Message:\n{}", message.len()).as_bytes());
    hasher.update(message);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

pub fn address_from_public_key(public_key: &PublicKey) -> SignerKey {
    let uncompressed = public_key.serialize_uncompressed();
    let digest = Keccak256::digest(&uncompressed[1..]);
    let mut address = [0u8; SIGNER_ADDRESS_LEN];
    address.copy_from_slice(&digest[32 - SIGNER_ADDRESS_LEN..]);
    SignerKey::from_address_bytes(&address)
}

pub fn recover_signer_address(message: &[u8], signature: &SignatureValue) -> Result<SignerKey, CosignError> {
    let verification_failed = |reason: String| CosignError::SignatureVerificationFailed { reason };

    let compact = signature.to_compact().map_err(|err| verification_failed(err.to_string()))?;
    let recovery_id = signature.recovery_id().map_err(|err| verification_failed(err.to_string()))?;
    let recovery_id = RecoveryId::from_i32(i32::from(recovery_id)).map_err(|err| verification_failed(err.to_string()))?;
    let recoverable = RecoverableSignature::from_compact(&compact, recovery_id).map_err(|err| verification_failed(err.to_string()))?;

    let digest = Message::from_digest(personal_message_hash(message));
    let public_key = Secp256k1::verification_only().recover_ecdsa(&digest, &recoverable).map_err(|err| verification_failed(err.to_string()))?;
    Ok(address_from_public_key(&public_key))
}

/// Maps every signature to its recovering address and sorts ascending by address bytes.
pub fn sort_signatures_by_recovered_address(
    signatures: &[SignatureValue],
    message: &[u8],
) -> Result<Vec<RecoveredSignature>, CosignError> {
    let mut recovered = Vec::with_capacity(signatures.len());
    for signature in signatures {
        let address = recover_signer_address(message, signature)?;
        let bytes = address.to_bytes()?;
        recovered.push((bytes, RecoveredSignature { address, signature: signature.clone() }));
    }
    recovered.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(recovered.into_iter().map(|(_, sig)| sig).collect())
}
