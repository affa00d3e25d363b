/// Helper to build storage keys consistently.
pub struct KeyBuilder {
    buf: Vec<u8>,
}

impl KeyBuilder {
    pub fn with_capacity(cap: usize) -> Self {
        Self { buf: Vec::with_capacity(cap) }
    }

    pub fn prefix(mut self, prefix: &[u8]) -> Self {
        self.buf.extend_from_slice(prefix);
        self
    }

    pub fn str(mut self, value: &str) -> Self {
        self.buf.extend_from_slice(value.as_bytes());
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

pub const CF_METADATA: &str = "metadata";
pub const CF_DEFAULT: &str = "default";
pub const CF_ACCOUNT: &str = "account";
pub const CF_TRANSACTION: &str = "transaction";

pub const KEY_SCHEMA_VERSION: &[u8] = b"schema_version";
pub const PREFIX_ACCOUNT: &[u8] = b"acct:";
pub const PREFIX_TRANSACTION: &[u8] = b"tx:";
