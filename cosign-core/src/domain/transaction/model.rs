use crate::domain::signature::SignatureValue;
use crate::domain::signer::{self, Signer};
use crate::foundation::hex_bytes;
use crate::foundation::types::define_wire_enum;
use crate::foundation::{AccountId, LedgerTxId, RecordId, SignerKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionKind {
    TransferFund,
    Register,
    UpdateDescriptor,
}

define_wire_enum!(TransactionKind { TransferFund => "transferFund", Register => "register", UpdateDescriptor => "updateDescriptor" });

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionStatus {
    Pending,
    Ready,
    Completed,
    Rejected,
}

define_wire_enum!(TransactionStatus { Pending => "pending", Ready => "ready", Completed => "completed", Rejected => "rejected" });

/// Raw status reported by the ledger for the latest submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LedgerStatus {
    Confirmed,
    Waiting,
    Rejected,
    Unknown,
    /// The submission call itself failed (transport error, timeout).
    Failed,
}

define_wire_enum!(LedgerStatus {
    Confirmed => "confirmed",
    Waiting => "waiting",
    Rejected => "rejected",
    Unknown => "unknown",
    Failed => "failed",
});

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityAction {
    Created,
    Signed,
    Rejected,
    Executed,
}

define_wire_enum!(ActivityAction { Created => "created", Signed => "signed", Rejected => "rejected", Executed => "executed" });

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureEntry {
    pub public_key: SignerKey,
    pub signature: SignatureValue,
    pub timestamp_nanos: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub action: ActivityAction,
    pub actor_public_key: SignerKey,
    pub actor_name: String,
    pub timestamp_nanos: u64,
}

/// Kind-specific transaction data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TransactionDetails {
    #[serde(rename_all = "camelCase")]
    TransferFund {
        recipient: String,
        asset_id: String,
        asset_symbol: String,
        amount: String,
        #[serde(default)]
        note: Option<String>,
        auth_descriptor_id: String,
    },
    Register,
    #[serde(rename_all = "camelCase")]
    UpdateDescriptor { signers_to_update: Vec<Signer>, signatures_required_to_update: u16, auth_descriptor_id: String },
}

impl TransactionDetails {
    pub fn kind(&self) -> TransactionKind {
        match self {
            TransactionDetails::TransferFund { .. } => TransactionKind::TransferFund,
            TransactionDetails::Register => TransactionKind::Register,
            TransactionDetails::UpdateDescriptor { .. } => TransactionKind::UpdateDescriptor,
        }
    }

    /// Descriptor the operation was authorized against; `None` for Register.
    pub fn auth_descriptor_id(&self) -> Option<&str> {
        match self {
            TransactionDetails::TransferFund { auth_descriptor_id, .. } | TransactionDetails::UpdateDescriptor { auth_descriptor_id, .. } => {
                Some(auth_descriptor_id)
            }
            TransactionDetails::Register => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: RecordId,
    /// Parent account record.
    pub account: RecordId,
    pub account_id: AccountId,
    pub details: TransactionDetails,
    #[serde(with = "hex_bytes")]
    pub payload: Vec<u8>,
    pub signers: Vec<Signer>,
    pub signatures_required: u16,
    pub signatures: HashMap<SignerKey, SignatureEntry>,
    pub status: TransactionStatus,
    #[serde(default)]
    pub ledger_tx_id: Option<LedgerTxId>,
    #[serde(default)]
    pub ledger_status: Option<LedgerStatus>,
    #[serde(default)]
    pub ledger_error: Option<String>,
    #[serde(default)]
    pub submission_attempts: u32,
    pub activity_log: Vec<ActivityEntry>,
    pub initiator: SignerKey,
    pub created_at_nanos: u64,
    pub updated_at_nanos: u64,
}

impl Transaction {
    pub fn kind(&self) -> TransactionKind {
        self.details.kind()
    }

    pub fn signers_to_update(&self) -> &[Signer] {
        match &self.details {
            TransactionDetails::UpdateDescriptor { signers_to_update, .. } => signers_to_update,
            _ => &[],
        }
    }

    pub fn is_signer(&self, key: &SignerKey) -> bool {
        signer::contains_key(&self.signers, key)
    }

    /// Members of `signers` or the pending target set may trigger execution.
    pub fn may_execute(&self, key: &SignerKey) -> bool {
        self.is_signer(key) || signer::contains_key(self.signers_to_update(), key)
    }

    pub fn signature_for(&self, key: &SignerKey) -> Option<&SignatureValue> {
        self.signatures.get(key).map(|entry| &entry.signature)
    }

    pub fn actor_name(&self, key: &SignerKey) -> String {
        signer::find_signer(&self.signers, key)
            .or_else(|| signer::find_signer(self.signers_to_update(), key))
            .map(|s| s.name.clone())
            .unwrap_or_default()
    }
}
