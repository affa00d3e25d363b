use crate::domain::{AccountStatus, LedgerStatus, MultiSigAccount, Transaction, TransactionKind, TransactionStatus};
use crate::foundation::{CosignError, Network, RecordId, SignerKey};

pub type Result<T> = std::result::Result<T, CosignError>;

/// Equality filters over accounts; `None` matches everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountFilter {
    pub signer: Option<SignerKey>,
    pub network: Option<Network>,
    pub chain_identity: Option<String>,
    pub status: Option<AccountStatus>,
}

impl AccountFilter {
    pub fn matches(&self, account: &MultiSigAccount) -> bool {
        self.signer.as_ref().map_or(true, |key| account.is_signer(key))
            && self.network.map_or(true, |network| account.network == network)
            && self.chain_identity.as_ref().map_or(true, |chain| &account.chain_identity == chain)
            && self.status.map_or(true, |status| account.status == status)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub signer: Option<SignerKey>,
    pub account: Option<RecordId>,
    pub status: Option<TransactionStatus>,
    pub kind: Option<TransactionKind>,
    /// Matches when the latest ledger status is any of these.
    pub ledger_status_in: Vec<LedgerStatus>,
}

impl TransactionFilter {
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.signer.as_ref().map_or(true, |key| tx.may_execute(key))
            && self.account.as_ref().map_or(true, |account| &tx.account == account)
            && self.status.map_or(true, |status| tx.status == status)
            && self.kind.map_or(true, |kind| tx.kind() == kind)
            && (self.ledger_status_in.is_empty() || tx.ledger_status.map_or(false, |s| self.ledger_status_in.contains(&s)))
    }
}

pub trait Storage: Send + Sync {
    /// Fails with `StorageError` if the id is already taken.
    fn insert_account(&self, account: &MultiSigAccount) -> Result<()>;
    fn get_account(&self, id: &RecordId) -> Result<Option<MultiSigAccount>>;
    /// Fails with `AccountNotFound` if the record does not exist.
    fn update_account(&self, account: &MultiSigAccount) -> Result<()>;
    /// Returns `Ok(false)` when nothing was deleted.
    fn delete_account(&self, id: &RecordId) -> Result<bool>;
    fn list_accounts(&self, filter: &AccountFilter) -> Result<Vec<MultiSigAccount>>;

    fn insert_transaction(&self, tx: &Transaction) -> Result<()>;
    fn get_transaction(&self, id: &RecordId) -> Result<Option<Transaction>>;
    fn update_transaction(&self, tx: &Transaction) -> Result<()>;
    fn list_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>>;

    /// Upserts the transaction and, when given, the account in a single atomic write.
    fn write_transaction_with_account(&self, tx: &Transaction, account: Option<&MultiSigAccount>) -> Result<()>;

    fn count_accounts(&self, filter: &AccountFilter) -> Result<usize> {
        Ok(self.list_accounts(filter)?.len())
    }

    fn count_transactions(&self, filter: &TransactionFilter) -> Result<usize> {
        Ok(self.list_transactions(filter)?.len())
    }

    fn health_check(&self) -> Result<()>;
}
