use secp256k1::Error as SecpError;
use serde::Serialize;
use std::io;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidSignerSet,
    InvalidInput,
    InvalidSignature,
    SignatureVerificationFailed,
    EncodingError,
    DuplicateSignerSet,
    NoPendingTransfer,
    InvalidStateTransition,
    NotReady,
    AlreadyExecuted,
    TransactionClosed,
    MissingDescriptor,
    DescriptorUpdateInProgress,
    StaleDescriptor,
    InitiatorNotASigner,
    NotASigner,
    Unauthorized,
    AccountNotFound,
    TransactionNotFound,
    BlockchainNotFound,
    LedgerError,
    LedgerTimeout,
    LedgerUnavailable,
    StorageError,
    StorageLockTimeout,
    SerializationError,
    CryptoError,
    ConfigError,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidSignerSet => "INVALID_SIGNER_SET",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::InvalidSignature => "INVALID_SIGNATURE",
            ErrorCode::SignatureVerificationFailed => "SIGNATURE_VERIFICATION_FAILED",
            ErrorCode::EncodingError => "ENCODING_ERROR",
            ErrorCode::DuplicateSignerSet => "DUPLICATE_SIGNER_SET",
            ErrorCode::NoPendingTransfer => "NO_PENDING_TRANSFER",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::NotReady => "NOT_READY",
            ErrorCode::AlreadyExecuted => "ALREADY_EXECUTED",
            ErrorCode::TransactionClosed => "TRANSACTION_CLOSED",
            ErrorCode::MissingDescriptor => "MISSING_DESCRIPTOR",
            ErrorCode::DescriptorUpdateInProgress => "DESCRIPTOR_UPDATE_IN_PROGRESS",
            ErrorCode::StaleDescriptor => "STALE_DESCRIPTOR",
            ErrorCode::InitiatorNotASigner => "INITIATOR_NOT_A_SIGNER",
            ErrorCode::NotASigner => "NOT_A_SIGNER",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::AccountNotFound => "ACCOUNT_NOT_FOUND",
            ErrorCode::TransactionNotFound => "TRANSACTION_NOT_FOUND",
            ErrorCode::BlockchainNotFound => "BLOCKCHAIN_NOT_FOUND",
            ErrorCode::LedgerError => "LEDGER_ERROR",
            ErrorCode::LedgerTimeout => "LEDGER_TIMEOUT",
            ErrorCode::LedgerUnavailable => "LEDGER_UNAVAILABLE",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::StorageLockTimeout => "STORAGE_LOCK_TIMEOUT",
            ErrorCode::SerializationError => "SERIALIZATION_ERROR",
            ErrorCode::CryptoError => "CRYPTO_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::Internal => "INTERNAL",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorCode::InvalidSignerSet
            | ErrorCode::InvalidInput
            | ErrorCode::InvalidSignature
            | ErrorCode::SignatureVerificationFailed
            | ErrorCode::EncodingError => ErrorKind::Validation,
            ErrorCode::DuplicateSignerSet
            | ErrorCode::NoPendingTransfer
            | ErrorCode::InvalidStateTransition
            | ErrorCode::NotReady
            | ErrorCode::AlreadyExecuted
            | ErrorCode::TransactionClosed
            | ErrorCode::MissingDescriptor
            | ErrorCode::DescriptorUpdateInProgress
            | ErrorCode::StaleDescriptor => ErrorKind::StateConflict,
            ErrorCode::InitiatorNotASigner | ErrorCode::NotASigner | ErrorCode::Unauthorized => ErrorKind::Authorization,
            ErrorCode::AccountNotFound | ErrorCode::TransactionNotFound | ErrorCode::BlockchainNotFound => ErrorKind::NotFound,
            ErrorCode::LedgerError | ErrorCode::LedgerTimeout | ErrorCode::LedgerUnavailable => ErrorKind::Ledger,
            ErrorCode::StorageError
            | ErrorCode::StorageLockTimeout
            | ErrorCode::SerializationError
            | ErrorCode::CryptoError
            | ErrorCode::ConfigError
            | ErrorCode::Internal => ErrorKind::Internal,
        }
    }
}

/// Caller-facing error classes. Transport layers map these to response statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    StateConflict,
    Authorization,
    NotFound,
    Ledger,
    Internal,
}

#[derive(Debug, Error)]
pub enum CosignError {
    // === Validation ===
    #[error("invalid signer set: {0}")]
    InvalidSignerSet(String),

    #[error("invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("signature verification failed: {reason}")]
    SignatureVerificationFailed { reason: String },

    #[error("encoding error: {0}")]
    EncodingError(String),

    // === State conflicts ===
    #[error("an account with the same signer set already exists on this ledger: account_id={account_id}")]
    DuplicateSignerSet { account_id: String },

    #[error("no pending transfer found for account_id={account_id}")]
    NoPendingTransfer { account_id: String },

    #[error("invalid {entity} state transition: {from} -> {to}")]
    InvalidStateTransition { entity: &'static str, from: String, to: String },

    #[error("transaction is not ready for execution: status={status}")]
    NotReady { status: String },

    #[error("transaction already executed: ledger_tx_id={ledger_tx_id}")]
    AlreadyExecuted { ledger_tx_id: String },

    #[error("transaction no longer accepts changes: status={status}")]
    TransactionClosed { status: String },

    #[error("account has no main authorization descriptor: account_id={account_id}")]
    MissingDescriptor { account_id: String },

    #[error("another descriptor update is open for this account: tx_id={tx_id}")]
    DescriptorUpdateInProgress { tx_id: String },

    #[error("transaction was built against descriptor {expected}, account now uses {current}")]
    StaleDescriptor { expected: String, current: String },

    // === Authorization ===
    #[error("initiator is not a signer of the account: {0}")]
    InitiatorNotASigner(String),

    #[error("public key is not a signer of this transaction: {0}")]
    NotASigner(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    // === Not found ===
    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("blockchain not found: {0}")]
    BlockchainNotFound(String),

    // === Ledger ===
    #[error("ledger error during {operation}: {details}")]
    LedgerError { operation: String, details: String },

    #[error("ledger call timed out: {operation} (waited {timeout_ms}ms)")]
    LedgerTimeout { operation: String, timeout_ms: u64 },

    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(String),

    // === Internal ===
    #[error("storage error during {operation}: {details}")]
    StorageError { operation: String, details: String },

    #[error("storage lock timeout: {operation} (waited {timeout_ms}ms)")]
    StorageLockTimeout { operation: String, timeout_ms: u64 },

    #[error("serialization error ({format}): {details}")]
    SerializationError { format: String, details: String },

    #[error("crypto error during {operation}: {details}")]
    CryptoError { operation: String, details: String },

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, CosignError>;

impl CosignError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CosignError::InvalidSignerSet(_) => ErrorCode::InvalidSignerSet,
            CosignError::InvalidInput { .. } => ErrorCode::InvalidInput,
            CosignError::InvalidSignature(_) => ErrorCode::InvalidSignature,
            CosignError::SignatureVerificationFailed { .. } => ErrorCode::SignatureVerificationFailed,
            CosignError::EncodingError(_) => ErrorCode::EncodingError,
            CosignError::DuplicateSignerSet { .. } => ErrorCode::DuplicateSignerSet,
            CosignError::NoPendingTransfer { .. } => ErrorCode::NoPendingTransfer,
            CosignError::InvalidStateTransition { .. } => ErrorCode::InvalidStateTransition,
            CosignError::NotReady { .. } => ErrorCode::NotReady,
            CosignError::AlreadyExecuted { .. } => ErrorCode::AlreadyExecuted,
            CosignError::TransactionClosed { .. } => ErrorCode::TransactionClosed,
            CosignError::MissingDescriptor { .. } => ErrorCode::MissingDescriptor,
            CosignError::DescriptorUpdateInProgress { .. } => ErrorCode::DescriptorUpdateInProgress,
            CosignError::StaleDescriptor { .. } => ErrorCode::StaleDescriptor,
            CosignError::InitiatorNotASigner(_) => ErrorCode::InitiatorNotASigner,
            CosignError::NotASigner(_) => ErrorCode::NotASigner,
            CosignError::Unauthorized(_) => ErrorCode::Unauthorized,
            CosignError::AccountNotFound(_) => ErrorCode::AccountNotFound,
            CosignError::TransactionNotFound(_) => ErrorCode::TransactionNotFound,
            CosignError::BlockchainNotFound(_) => ErrorCode::BlockchainNotFound,
            CosignError::LedgerError { .. } => ErrorCode::LedgerError,
            CosignError::LedgerTimeout { .. } => ErrorCode::LedgerTimeout,
            CosignError::LedgerUnavailable(_) => ErrorCode::LedgerUnavailable,
            CosignError::StorageError { .. } => ErrorCode::StorageError,
            CosignError::StorageLockTimeout { .. } => ErrorCode::StorageLockTimeout,
            CosignError::SerializationError { .. } => ErrorCode::SerializationError,
            CosignError::CryptoError { .. } => ErrorCode::CryptoError,
            CosignError::ConfigError(_) => ErrorCode::ConfigError,
            CosignError::Message(_) => ErrorCode::Internal,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.code().kind()
    }

    pub fn context(&self) -> ErrorContext {
        ErrorContext { code: self.code(), message: self.to_string() }
    }

    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CosignError::InvalidInput { field: field.into(), reason: reason.into() }
    }

    pub fn ledger(operation: impl Into<String>, details: impl Into<String>) -> Self {
        CosignError::LedgerError { operation: operation.into(), details: details.into() }
    }

    pub fn invalid_transition(entity: &'static str, from: impl ToString, to: impl ToString) -> Self {
        CosignError::InvalidStateTransition { entity, from: from.to_string(), to: to.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorContext {
    pub code: ErrorCode,
    pub message: String,
}

impl From<hex::FromHexError> for CosignError {
    fn from(err: hex::FromHexError) -> Self {
        CosignError::EncodingError(format!("hex decode error: {}", err))
    }
}

impl From<toml::de::Error> for CosignError {
    fn from(err: toml::de::Error) -> Self {
        CosignError::ConfigError(format!("TOML parsing error: {}", err))
    }
}

impl From<figment::Error> for CosignError {
    fn from(err: figment::Error) -> Self {
        CosignError::ConfigError(err.to_string())
    }
}

impl From<rocksdb::Error> for CosignError {
    fn from(err: rocksdb::Error) -> Self {
        CosignError::StorageError { operation: "rocksdb".to_string(), details: err.to_string() }
    }
}

impl From<reqwest::Error> for CosignError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return CosignError::LedgerTimeout { operation: "http".to_string(), timeout_ms: 0 };
        }
        CosignError::LedgerError { operation: "http".to_string(), details: err.to_string() }
    }
}

#[macro_export]
macro_rules! storage_err {
    ($op:expr, $err:expr) => {
        $crate::foundation::CosignError::StorageError { operation: $op.into(), details: $err.to_string() }
    };
}

#[macro_export]
macro_rules! serde_err {
    ($fmt:expr, $err:expr) => {
        $crate::foundation::CosignError::SerializationError { format: $fmt.into(), details: $err.to_string() }
    };
}

impl From<io::Error> for CosignError {
    fn from(err: io::Error) -> Self {
        CosignError::StorageError { operation: "io".to_string(), details: err.to_string() }
    }
}

impl From<serde_json::Error> for CosignError {
    fn from(err: serde_json::Error) -> Self {
        CosignError::SerializationError { format: "json".to_string(), details: err.to_string() }
    }
}

impl From<SecpError> for CosignError {
    fn from(err: SecpError) -> Self {
        CosignError::CryptoError { operation: "secp256k1".to_string(), details: err.to_string() }
    }
}

// NOTE: Avoid adding generic "stringly" error conversions here.
// Use structured `CosignError` variants at the call site to preserve context.
