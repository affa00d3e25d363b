use crate::domain::signer::Signer;
use crate::foundation::types::define_wire_enum;
use crate::foundation::{AccountId, Network, RecordId, SignerKey};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccountStatus {
    Pending,
    TransferFee,
    Registering,
    Created,
}

define_wire_enum!(AccountStatus {
    Pending => "pending",
    TransferFee => "transferFee",
    Registering => "registering",
    Created => "created",
});

/// Ledger-side authorization descriptor as returned after registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthDescriptor {
    pub id: String,
    pub signers: Vec<SignerKey>,
    pub signatures_required: u16,
    #[serde(default)]
    pub rules: Option<serde_json::Value>,
}

/// Outstanding fee transfer the ledger expects before registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTransfer {
    pub transfer_id: String,
    pub asset_id: String,
    pub asset_symbol: String,
    /// Decimal string in the asset's smallest unit.
    pub amount: String,
    #[serde(default)]
    pub sender: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetBalance {
    pub asset_id: String,
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    pub amount: String,
    #[serde(default)]
    pub decimals: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiSigAccount {
    pub id: RecordId,
    pub account_id: AccountId,
    pub name: String,
    pub signers: Vec<Signer>,
    pub signatures_required: u16,
    pub status: AccountStatus,
    #[serde(default)]
    pub main_descriptor: Option<AuthDescriptor>,
    #[serde(default)]
    pub pending_transfer: Vec<PendingTransfer>,
    pub network: Network,
    #[serde(rename = "blockchainRid")]
    pub chain_identity: String,
    pub created_by: SignerKey,
    pub created_at_nanos: u64,
    pub updated_at_nanos: u64,
}

impl MultiSigAccount {
    pub fn is_signer(&self, key: &SignerKey) -> bool {
        crate::domain::signer::contains_key(&self.signers, key)
    }

    pub fn descriptor_id(&self) -> Option<&str> {
        self.main_descriptor.as_ref().map(|d| d.id.as_str())
    }
}
