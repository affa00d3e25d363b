//! Blockchains accounts can be created on, and the registration fee each one charges.

use crate::domain::account::PendingTransfer;
use crate::foundation::{CosignError, Network};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blockchain {
    pub name: String,
    pub rid: String,
    pub network: Network,
    pub fee_asset_id: String,
    /// Decimal string in the fee asset's smallest unit.
    pub fee_value: String,
    pub fee_symbol: String,
    pub fee_decimals: u8,
    pub is_active: bool,
}

impl Blockchain {
    pub fn has_rid(&self, rid: &str) -> bool {
        self.rid.eq_ignore_ascii_case(rid.trim())
    }

    /// True when `transfer` pays at least the fee in the fee asset.
    pub fn covers_fee(&self, transfer: &PendingTransfer) -> bool {
        transfer.asset_id == self.fee_asset_id && amount_at_least(&transfer.amount, &self.fee_value)
    }
}

/// Compares two unsigned decimal strings without parsing them into a bounded integer.
fn amount_at_least(amount: &str, minimum: &str) -> bool {
    let digits = |value: &str| value.trim().trim_start_matches('0').to_string();
    let (amount, minimum) = (amount.trim(), minimum.trim());
    if !amount.bytes().all(|b| b.is_ascii_digit()) || !minimum.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let (amount, minimum) = (digits(amount), digits(minimum));
    (amount.len(), amount.as_str()) >= (minimum.len(), minimum.as_str())
}

/// An empty registry accepts every chain identity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChainRegistry {
    chains: Vec<Blockchain>,
}

impl ChainRegistry {
    pub fn new(chains: Vec<Blockchain>) -> Self {
        Self { chains }
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    pub fn list(&self, network: Option<Network>, active_only: bool) -> Vec<Blockchain> {
        self.chains
            .iter()
            .filter(|chain| network.map_or(true, |network| chain.network == network))
            .filter(|chain| !active_only || chain.is_active)
            .cloned()
            .collect()
    }

    pub fn get(&self, rid: &str) -> Option<&Blockchain> {
        self.chains.iter().find(|chain| chain.has_rid(rid))
    }

    pub fn find(&self, rid: &str) -> Result<&Blockchain, CosignError> {
        self.get(rid).ok_or_else(|| CosignError::BlockchainNotFound(rid.to_string()))
    }

    /// Checks that new accounts may target `rid` on `network`.
    pub fn ensure_accepts(&self, rid: &str, network: Network) -> Result<(), CosignError> {
        if self.is_empty() {
            return Ok(());
        }
        let chain = self.get(rid).ok_or_else(|| CosignError::invalid_input("blockchainRid", format!("unknown blockchain {}", rid)))?;
        if !chain.is_active {
            return Err(CosignError::invalid_input("blockchainRid", format!("blockchain {} is not active", chain.name)));
        }
        if chain.network != network {
            return Err(CosignError::invalid_input("network", format!("blockchain {} runs on {}", chain.name, chain.network)));
        }
        Ok(())
    }

    /// Keeps the transfers that pay the registration fee of `rid`; unregistered chains keep everything.
    pub fn fee_transfers(&self, rid: &str, pending: Vec<PendingTransfer>) -> Vec<PendingTransfer> {
        match self.get(rid) {
            Some(chain) => pending.into_iter().filter(|transfer| chain.covers_fee(transfer)).collect(),
            None => pending,
        }
    }
}
