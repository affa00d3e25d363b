use crate::foundation::{CosignError, Result};
use log::debug;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Runs `op` up to `attempts` times with a fixed `delay`, retrying only errors accepted by `retryable`.
pub async fn retry<F, Fut, T>(operation: &str, attempts: usize, delay: Duration, retryable: fn(&CosignError) -> bool, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < attempts && retryable(&err) => {
                debug!("ledger call retry operation={} attempt={} max_attempts={} error={}", operation, attempt, attempts, err);
                attempt += 1;
                sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
