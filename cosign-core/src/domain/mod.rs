//! Domain layer: pure account and transaction state machines. No I/O.

pub mod account;
pub mod chain;
pub mod resolver;
pub mod signature;
pub mod signer;
pub mod transaction;
pub mod transition;

pub use account::{AccountStatus, AssetBalance, AuthDescriptor, MultiSigAccount, PendingTransfer};
pub use chain::{Blockchain, ChainRegistry};
pub use signature::SignatureValue;
pub use signer::Signer;
pub use transaction::{
    ActivityAction, ActivityEntry, LedgerStatus, SignatureEntry, Submission, Transaction, TransactionDetails, TransactionKind,
    TransactionStatus,
};
