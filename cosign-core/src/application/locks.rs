//! Per-entity async locks.
//!
//! Every read-modify-write of a transaction or account runs under its entity lock. When both are needed the
//! transaction lock is taken first.

use crate::foundation::{CosignError, RecordId, Result};
use log::trace;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Serializes account creation so duplicate signer-set checks cannot race.
pub const CREATE_ACCOUNT_LOCK: &str = "accounts:create";

pub struct EntityLocks {
    entries: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    timeout: Duration,
}

pub struct EntityGuard {
    key: String,
    _guard: OwnedMutexGuard<()>,
}

impl EntityGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl EntityLocks {
    pub fn new(timeout: Duration) -> Self {
        Self { entries: Mutex::new(HashMap::new()), timeout }
    }

    pub fn transaction_key(id: &RecordId) -> String {
        format!("tx:{}", id)
    }

    pub fn account_key(id: &RecordId) -> String {
        format!("account:{}", id)
    }

    pub async fn lock_transaction(&self, id: &RecordId) -> Result<EntityGuard> {
        self.acquire(Self::transaction_key(id)).await
    }

    pub async fn lock_account(&self, id: &RecordId) -> Result<EntityGuard> {
        self.acquire(Self::account_key(id)).await
    }

    /// Waits up to the configured timeout; expiry fails with `StorageLockTimeout`.
    pub async fn acquire(&self, key: impl Into<String>) -> Result<EntityGuard> {
        let key = key.into();
        let lock = {
            let mut entries = self.entries.lock();
            // Entries only the registry still references have no holder and no waiter.
            entries.retain(|_, lock| Arc::strong_count(lock) > 1);
            entries.entry(key.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
        };
        trace!("entity lock acquiring key={}", key);
        match tokio::time::timeout(self.timeout, lock.lock_owned()).await {
            Ok(guard) => Ok(EntityGuard { key, _guard: guard }),
            Err(_) => Err(CosignError::StorageLockTimeout { operation: format!("entity lock {}", key), timeout_ms: self.timeout.as_millis() as u64 }),
        }
    }

    /// Number of registry entries, including idle ones not yet pruned.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
