use crate::foundation::{decode_hex, CosignError};
use serde::{Deserialize, Serialize};

/// Recoverable ECDSA signature as sent by wallets: 32-byte `r`/`s` in hex plus the recovery byte `v`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureValue {
    pub r: String,
    pub s: String,
    pub v: u8,
}

impl SignatureValue {
    pub fn from_compact(compact: &[u8; 64], recovery_id: u8) -> Self {
        Self { r: format!("0x{}", hex::encode(&compact[..32])), s: format!("0x{}", hex::encode(&compact[32..])), v: 27 + recovery_id }
    }

    pub fn validate(&self) -> Result<(), CosignError> {
        self.to_compact()?;
        self.recovery_id()?;
        Ok(())
    }

    pub fn to_compact(&self) -> Result<[u8; 64], CosignError> {
        let r = decode_component("r", &self.r)?;
        let s = decode_component("s", &self.s)?;
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&r);
        out[32..].copy_from_slice(&s);
        Ok(out)
    }

    /// Accepts both raw (0/1) and Ethereum-style (27/28) recovery bytes.
    pub fn recovery_id(&self) -> Result<u8, CosignError> {
        match self.v {
            0 | 1 => Ok(self.v),
            27 | 28 => Ok(self.v - 27),
            other => Err(CosignError::InvalidSignature(format!("unsupported recovery byte v={}", other))),
        }
    }
}

fn decode_component(name: &str, value: &str) -> Result<[u8; 32], CosignError> {
    let bytes = decode_hex(value).map_err(|err| CosignError::InvalidSignature(format!("{}: {}", name, err)))?;
    bytes.as_slice().try_into().map_err(|_| CosignError::InvalidSignature(format!("{} must be 32 bytes, got {}", name, bytes.len())))
}
