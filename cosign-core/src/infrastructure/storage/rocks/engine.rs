//! RocksDB-backed storage engine.
//!
//! # Lock Semantics
//!
//! RocksDB itself is thread-safe. `WriteGate` serializes insert-if-absent checks and paired
//! transaction/account writes so existence checks cannot race. Entity-level read-modify-write ordering is the
//! caller's job (`application::locks::EntityLocks`).
//!
//! The gate is entered with a bounded timeout (`STORAGE_LOCK_TIMEOUT_SECS`).
//!
//! # Column Families
//!
//! See `schema.rs` for column family names and key prefixes. Values are JSON documents.

use crate::foundation::{CosignError, RecordId, STORAGE_SCHEMA_VERSION};
use crate::infrastructure::storage::rocks::migration::open_db_with_cfs;
use crate::infrastructure::storage::rocks::schema::*;
use crate::infrastructure::storage::rocks::util::WriteGate;
use crate::storage_err;
use log::{debug, info};
use rocksdb::{ColumnFamily, IteratorMode, DB};
use std::fs;
use std::path::Path;
use std::sync::Arc;

mod storage;

pub struct RocksStorage {
    db: Arc<DB>,
    write_gate: WriteGate,
}

impl RocksStorage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CosignError> {
        let path = path.as_ref();
        debug!("opening RocksStorage path={}", path.display());
        let db = open_db_with_cfs(path)?;
        let storage = Self { db: Arc::new(db), write_gate: WriteGate::default() };
        storage.maybe_run_migrations()?;
        info!("RocksStorage opened path={}", path.display());
        Ok(storage)
    }

    pub fn open_in_dir(data_dir: impl AsRef<Path>) -> Result<Self, CosignError> {
        let dir = data_dir.as_ref();
        if dir.as_os_str().is_empty() {
            return Err(CosignError::ConfigError("storage data_dir must not be empty".to_string()));
        }
        fs::create_dir_all(dir).map_err(|err| storage_err!("fs::create_dir_all open_in_dir", err))?;
        let path = dir.join("cosign-db");
        debug!("opening RocksStorage in dir path={}", path.display());
        Self::open(path)
    }

    fn cf_handle(&self, name: &str) -> Result<&ColumnFamily, CosignError> {
        self.db.cf_handle(name).ok_or_else(|| CosignError::StorageError {
            operation: "rocksdb cf_handle".to_string(),
            details: format!("missing column family: {}", name),
        })
    }

    fn maybe_run_migrations(&self) -> Result<(), CosignError> {
        match self.schema_version()? {
            None => {
                info!("initializing fresh db schema schema_version={}", STORAGE_SCHEMA_VERSION);
                self.set_schema_version(STORAGE_SCHEMA_VERSION)?;
            }
            Some(v) if v == STORAGE_SCHEMA_VERSION => {}
            Some(v) => {
                return Err(CosignError::StorageError {
                    operation: "schema_version check".to_string(),
                    details: format!("stored schema {} does not match current {}", v, STORAGE_SCHEMA_VERSION),
                })
            }
        }
        Ok(())
    }

    fn schema_version(&self) -> Result<Option<u32>, CosignError> {
        let cf = self.cf_handle(CF_METADATA)?;
        match self.db.get_cf(cf, KEY_SCHEMA_VERSION) {
            Ok(Some(bytes)) => {
                let array: [u8; 4] = bytes.as_slice().try_into().map_err(|_| CosignError::StorageError {
                    operation: "schema_version decode".to_string(),
                    details: "corrupt schema version".to_string(),
                })?;
                Ok(Some(u32::from_be_bytes(array)))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(storage_err!("rocksdb get_cf schema_version", e)),
        }
    }

    fn set_schema_version(&self, version: u32) -> Result<(), CosignError> {
        let cf = self.cf_handle(CF_METADATA)?;
        self.db.put_cf(cf, KEY_SCHEMA_VERSION, version.to_be_bytes()).map_err(CosignError::from)
    }

    fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, CosignError> {
        serde_json::to_vec(value).map_err(|err| err.into())
    }

    fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, CosignError> {
        serde_json::from_slice(bytes).map_err(|err| err.into())
    }

    fn key_account(id: &RecordId) -> Vec<u8> {
        KeyBuilder::with_capacity(PREFIX_ACCOUNT.len() + id.len()).prefix(PREFIX_ACCOUNT).str(id.as_str()).build()
    }

    fn key_transaction(id: &RecordId) -> Vec<u8> {
        KeyBuilder::with_capacity(PREFIX_TRANSACTION.len() + id.len()).prefix(PREFIX_TRANSACTION).str(id.as_str()).build()
    }

    fn scan<T: serde::de::DeserializeOwned>(&self, cf_name: &str, mut keep: impl FnMut(&T) -> bool) -> Result<Vec<T>, CosignError> {
        let cf = self.cf_handle(cf_name)?;
        let mut out = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = item.map_err(|err| storage_err!("rocksdb iterator_cf", err))?;
            let decoded: T = Self::decode(&value)?;
            if keep(&decoded) {
                out.push(decoded);
            }
        }
        Ok(out)
    }
}
