use super::RocksStorage;
use crate::domain::{MultiSigAccount, Transaction};
use crate::foundation::{CosignError, RecordId};
use crate::infrastructure::storage::rocks::schema::*;
use crate::infrastructure::storage::{AccountFilter, Result, Storage, TransactionFilter};
use crate::storage_err;
use log::{debug, trace};
use rocksdb::WriteBatch;

impl RocksStorage {
    fn exists(&self, cf_name: &str, key: &[u8]) -> Result<bool> {
        let cf = self.cf_handle(cf_name)?;
        Ok(self.db.get_cf(cf, key).map_err(|e| storage_err!("rocksdb get_cf exists", e))?.is_some())
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf_handle(cf_name)?;
        match self.db.get_cf(cf, key).map_err(|err| storage_err!("rocksdb get_cf", err))? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_json<T: serde::Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf_handle(cf_name)?;
        self.db.put_cf(cf, key, Self::encode(value)?).map_err(|err| storage_err!("rocksdb put_cf", err))
    }
}

impl Storage for RocksStorage {
    fn insert_account(&self, account: &MultiSigAccount) -> Result<()> {
        debug!("insert_account id={} account_id={}", account.id, account.account_id);
        let _guard = self.write_gate.enter("insert_account")?;
        let key = Self::key_account(&account.id);
        if self.exists(CF_ACCOUNT, &key)? {
            return Err(CosignError::StorageError { operation: "insert_account".to_string(), details: format!("duplicate id {}", account.id) });
        }
        self.put_json(CF_ACCOUNT, &key, account)
    }

    fn get_account(&self, id: &RecordId) -> Result<Option<MultiSigAccount>> {
        trace!("get_account id={}", id);
        self.get_json(CF_ACCOUNT, &Self::key_account(id))
    }

    fn update_account(&self, account: &MultiSigAccount) -> Result<()> {
        trace!("update_account id={} status={}", account.id, account.status);
        let _guard = self.write_gate.enter("update_account")?;
        let key = Self::key_account(&account.id);
        if !self.exists(CF_ACCOUNT, &key)? {
            return Err(CosignError::AccountNotFound(account.id.to_string()));
        }
        self.put_json(CF_ACCOUNT, &key, account)
    }

    fn delete_account(&self, id: &RecordId) -> Result<bool> {
        debug!("delete_account id={}", id);
        let _guard = self.write_gate.enter("delete_account")?;
        let key = Self::key_account(id);
        if !self.exists(CF_ACCOUNT, &key)? {
            return Ok(false);
        }
        let cf = self.cf_handle(CF_ACCOUNT)?;
        self.db.delete_cf(cf, key).map_err(|err| storage_err!("rocksdb delete_cf", err))?;
        Ok(true)
    }

    fn list_accounts(&self, filter: &AccountFilter) -> Result<Vec<MultiSigAccount>> {
        self.scan(CF_ACCOUNT, |account: &MultiSigAccount| filter.matches(account))
    }

    fn insert_transaction(&self, tx: &Transaction) -> Result<()> {
        debug!("insert_transaction tx_id={} kind={} account={}", tx.id, tx.kind(), tx.account);
        let _guard = self.write_gate.enter("insert_transaction")?;
        let key = Self::key_transaction(&tx.id);
        if self.exists(CF_TRANSACTION, &key)? {
            return Err(CosignError::StorageError { operation: "insert_transaction".to_string(), details: format!("duplicate id {}", tx.id) });
        }
        self.put_json(CF_TRANSACTION, &key, tx)
    }

    fn get_transaction(&self, id: &RecordId) -> Result<Option<Transaction>> {
        trace!("get_transaction tx_id={}", id);
        self.get_json(CF_TRANSACTION, &Self::key_transaction(id))
    }

    fn update_transaction(&self, tx: &Transaction) -> Result<()> {
        trace!("update_transaction tx_id={} status={}", tx.id, tx.status);
        let _guard = self.write_gate.enter("update_transaction")?;
        let key = Self::key_transaction(&tx.id);
        if !self.exists(CF_TRANSACTION, &key)? {
            return Err(CosignError::TransactionNotFound(tx.id.to_string()));
        }
        self.put_json(CF_TRANSACTION, &key, tx)
    }

    fn list_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        self.scan(CF_TRANSACTION, |tx: &Transaction| filter.matches(tx))
    }

    fn write_transaction_with_account(&self, tx: &Transaction, account: Option<&MultiSigAccount>) -> Result<()> {
        debug!(
            "write_transaction_with_account tx_id={} status={} account={}",
            tx.id,
            tx.status,
            account.map(|a| a.id.to_string()).unwrap_or_else(|| "-".to_string())
        );
        let _guard = self.write_gate.enter("write_transaction_with_account")?;
        let mut batch = WriteBatch::default();
        if let Some(account) = account {
            let key = Self::key_account(&account.id);
            if !self.exists(CF_ACCOUNT, &key)? {
                return Err(CosignError::AccountNotFound(account.id.to_string()));
            }
            batch.put_cf(self.cf_handle(CF_ACCOUNT)?, key, Self::encode(account)?);
        }
        batch.put_cf(self.cf_handle(CF_TRANSACTION)?, Self::key_transaction(&tx.id), Self::encode(tx)?);
        self.db.write(batch).map_err(|err| storage_err!("rocksdb write batch", err))
    }

    fn health_check(&self) -> Result<()> {
        let cf = self.cf_handle(CF_METADATA)?;
        self.db.get_cf(cf, KEY_SCHEMA_VERSION).map_err(|err| storage_err!("rocksdb health_check", err))?;
        Ok(())
    }
}
