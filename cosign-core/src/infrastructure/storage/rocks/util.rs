//! Write gate for the RocksDB engine.

use crate::foundation::{CosignError, STORAGE_LOCK_TIMEOUT_SECS};
use log::warn;
use parking_lot::{Mutex, MutexGuard};
use std::time::Duration;

/// Serializes existence checks with the writes that depend on them.
pub struct WriteGate {
    lock: Mutex<()>,
    timeout: Duration,
}

impl Default for WriteGate {
    fn default() -> Self {
        Self::with_timeout(Duration::from_secs(STORAGE_LOCK_TIMEOUT_SECS))
    }
}

impl WriteGate {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { lock: Mutex::new(()), timeout }
    }

    pub fn enter(&self, operation: &'static str) -> Result<MutexGuard<'_, ()>, CosignError> {
        self.lock.try_lock_for(self.timeout).ok_or_else(|| {
            warn!("storage write gate timed out operation={} timeout_ms={}", operation, self.timeout.as_millis());
            CosignError::StorageLockTimeout { operation: operation.to_string(), timeout_ms: self.timeout.as_millis() as u64 }
        })
    }
}
