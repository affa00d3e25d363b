//! System-wide constants for multi-signature coordination.

/// Nanoseconds per second (10^9).
pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Minimum number of unique signer keys for a multi-signature account.
pub const MIN_MULTISIG_SIGNERS: usize = 2;

/// Upper bound on `signaturesRequired`, matching the ledger's descriptor limit.
pub const MAX_SIGNATURES_REQUIRED: u16 = 20;

/// Length of a decoded signer address in bytes.
pub const SIGNER_ADDRESS_LEN: usize = 20;

/// Authorization flags carried by every account descriptor (asset + transfer).
pub const ACCOUNT_DESCRIPTOR_FLAGS: &[&str] = &["A", "T"];

/// Domain separator for canonical account id hashing.
pub const ACCOUNT_ID_DOMAIN: &[u8] = b"cosign/account-descriptor/v1";

pub const MAX_ACCOUNT_NAME_LENGTH: usize = 128;
pub const MAX_SIGNER_NAME_LENGTH: usize = 128;
pub const MAX_NOTE_LENGTH: usize = 1024;

/// Pagination defaults for list endpoints.
pub const DEFAULT_PAGE_LIMIT: u32 = 25;
pub const MAX_PAGE_LIMIT: u32 = 200;

/// Test-only override for `now_nanos()`.
pub const TEST_NOW_NANOS_ENV_VAR: &str = "COSIGN_TEST_NOW_NANOS";

/// Upper bound on waiting for a storage-level write lock.
pub const STORAGE_LOCK_TIMEOUT_SECS: u64 = 5;

/// Current on-disk schema version for `RocksStorage`.
pub const STORAGE_SCHEMA_VERSION: u32 = 1;

/// First open interval of the ledger circuit breaker; doubles per re-open up to the configured cap.
pub const CIRCUIT_BREAKER_BASE_BACKOFF_SECS: u64 = 1;

/// Domain separator for devnet ledger transaction ids.
pub const DEVNET_TX_ID_DOMAIN: &[u8] = b"cosign/devnet-ledger-tx/v1";
