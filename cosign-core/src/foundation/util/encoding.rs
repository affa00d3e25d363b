use crate::foundation::{CosignError, Hash32};

pub fn strip_hex_prefix(s: &str) -> &str {
    s.trim().strip_prefix("0x").or_else(|| s.trim().strip_prefix("0X")).unwrap_or(s.trim())
}

pub fn decode_hex(s: &str) -> Result<Vec<u8>, CosignError> {
    hex::decode(strip_hex_prefix(s)).map_err(|e| e.into())
}

pub fn parse_hex_32bytes(s: &str) -> Result<Hash32, CosignError> {
    let bytes = decode_hex(s)?;
    bytes.as_slice().try_into().map_err(|_| CosignError::EncodingError(format!("expected 32 bytes, got {}", bytes.len())))
}

/// Serde adapter for opaque byte payloads carried as hex strings.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::decode_hex(&s).map_err(serde::de::Error::custom)
    }
}
