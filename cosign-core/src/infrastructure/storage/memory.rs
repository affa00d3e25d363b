use crate::domain::{MultiSigAccount, Transaction};
use crate::foundation::{CosignError, RecordId};
use crate::infrastructure::storage::{AccountFilter, Result, Storage, TransactionFilter};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

struct MemoryInner {
    accounts: HashMap<RecordId, MultiSigAccount>,
    transactions: HashMap<RecordId, Transaction>,
}

impl MemoryInner {
    fn new() -> Self {
        Self { accounts: HashMap::new(), transactions: HashMap::new() }
    }
}

pub struct MemoryStorage {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self { inner: Arc::new(Mutex::new(MemoryInner::new())) }
    }

    fn lock_inner(&self) -> Result<MutexGuard<'_, MemoryInner>> {
        self.inner.lock().map_err(|_| CosignError::StorageError {
            operation: "memory storage lock".to_string(),
            details: "poisoned".to_string(),
        })
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn insert_account(&self, account: &MultiSigAccount) -> Result<()> {
        let mut inner = self.lock_inner()?;
        if inner.accounts.contains_key(&account.id) {
            return Err(CosignError::StorageError { operation: "insert_account".to_string(), details: format!("duplicate id {}", account.id) });
        }
        inner.accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }

    fn get_account(&self, id: &RecordId) -> Result<Option<MultiSigAccount>> {
        Ok(self.lock_inner()?.accounts.get(id).cloned())
    }

    fn update_account(&self, account: &MultiSigAccount) -> Result<()> {
        let mut inner = self.lock_inner()?;
        match inner.accounts.get_mut(&account.id) {
            Some(existing) => {
                *existing = account.clone();
                Ok(())
            }
            None => Err(CosignError::AccountNotFound(account.id.to_string())),
        }
    }

    fn delete_account(&self, id: &RecordId) -> Result<bool> {
        Ok(self.lock_inner()?.accounts.remove(id).is_some())
    }

    fn list_accounts(&self, filter: &AccountFilter) -> Result<Vec<MultiSigAccount>> {
        Ok(self.lock_inner()?.accounts.values().filter(|a| filter.matches(a)).cloned().collect())
    }

    fn insert_transaction(&self, tx: &Transaction) -> Result<()> {
        let mut inner = self.lock_inner()?;
        if inner.transactions.contains_key(&tx.id) {
            return Err(CosignError::StorageError { operation: "insert_transaction".to_string(), details: format!("duplicate id {}", tx.id) });
        }
        inner.transactions.insert(tx.id.clone(), tx.clone());
        Ok(())
    }

    fn get_transaction(&self, id: &RecordId) -> Result<Option<Transaction>> {
        Ok(self.lock_inner()?.transactions.get(id).cloned())
    }

    fn update_transaction(&self, tx: &Transaction) -> Result<()> {
        let mut inner = self.lock_inner()?;
        match inner.transactions.get_mut(&tx.id) {
            Some(existing) => {
                *existing = tx.clone();
                Ok(())
            }
            None => Err(CosignError::TransactionNotFound(tx.id.to_string())),
        }
    }

    fn list_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        Ok(self.lock_inner()?.transactions.values().filter(|t| filter.matches(t)).cloned().collect())
    }

    fn write_transaction_with_account(&self, tx: &Transaction, account: Option<&MultiSigAccount>) -> Result<()> {
        let mut inner = self.lock_inner()?;
        if let Some(account) = account {
            if !inner.accounts.contains_key(&account.id) {
                return Err(CosignError::AccountNotFound(account.id.to_string()));
            }
            inner.accounts.insert(account.id.clone(), account.clone());
        }
        inner.transactions.insert(tx.id.clone(), tx.clone());
        Ok(())
    }

    fn health_check(&self) -> Result<()> {
        self.lock_inner().map(|_| ())
    }
}
