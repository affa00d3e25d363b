use crate::foundation::{CosignError, SignerKey, MAX_SIGNER_NAME_LENGTH};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signer {
    pub public_key: SignerKey,
    #[serde(default)]
    pub name: String,
}

impl Signer {
    pub fn new(public_key: impl Into<SignerKey>, name: impl Into<String>) -> Self {
        Self { public_key: public_key.into(), name: name.into() }
    }
}

/// Validates key format, display name length and list-level key uniqueness.
pub fn validate_signers(signers: &[Signer]) -> Result<(), CosignError> {
    let mut seen = HashSet::with_capacity(signers.len());
    for signer in signers {
        SignerKey::parse(signer.public_key.as_str())?;
        if signer.name.len() > MAX_SIGNER_NAME_LENGTH {
            return Err(CosignError::invalid_input("signers.name", format!("exceeds {} characters", MAX_SIGNER_NAME_LENGTH)));
        }
        if !seen.insert(signer.public_key.as_str()) {
            return Err(CosignError::InvalidSignerSet(format!("duplicate signer key {}", signer.public_key)));
        }
    }
    Ok(())
}

pub fn unique_keys(signers: &[Signer]) -> HashSet<&SignerKey> {
    signers.iter().map(|s| &s.public_key).collect()
}

pub fn contains_key(signers: &[Signer], key: &SignerKey) -> bool {
    signers.iter().any(|s| &s.public_key == key)
}

pub fn find_signer<'a>(signers: &'a [Signer], key: &SignerKey) -> Option<&'a Signer> {
    signers.iter().find(|s| &s.public_key == key)
}

/// Set equality over public keys; list order and display names are ignored.
pub fn same_key_set(a: &[Signer], b: &[Signer]) -> bool {
    unique_keys(a) == unique_keys(b)
}

/// `current` followed by every member of `additional` not already present, preserving order.
pub fn union(current: &[Signer], additional: &[Signer]) -> Vec<Signer> {
    let mut out = current.to_vec();
    for signer in additional {
        if !contains_key(&out, &signer.public_key) {
            out.push(signer.clone());
        }
    }
    out
}

pub fn keys(signers: &[Signer]) -> Vec<SignerKey> {
    signers.iter().map(|s| s.public_key.clone()).collect()
}
