use crate::infrastructure::config::types::{AppConfig, LedgerMode};
use std::collections::HashSet;
use std::net::SocketAddr;

const MAX_LEDGER_RETRY_ATTEMPTS: usize = 10;

impl AppConfig {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.rpc.addr.parse::<SocketAddr>().is_err() {
            errors.push(format!("rpc.addr is not a socket address: {}", self.rpc.addr));
        }
        if self.rpc.body_limit_bytes == 0 {
            errors.push("rpc.body_limit_bytes must be > 0".to_string());
        }

        match self.ledger.mode {
            LedgerMode::Http => match self.ledger.endpoint_url.as_deref().map(str::trim) {
                None | Some("") => errors.push("ledger.endpoint_url is required when ledger.mode=http".to_string()),
                Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                    errors.push(format!("ledger.endpoint_url must be an http(s) url: {}", url))
                }
                Some(_) => {}
            },
            LedgerMode::Devnet => {}
        }
        if self.ledger.timeout_ms == 0 {
            errors.push("ledger.timeout_ms must be > 0".to_string());
        }
        if self.ledger.retry_attempts == 0 || self.ledger.retry_attempts > MAX_LEDGER_RETRY_ATTEMPTS {
            errors.push(format!("ledger.retry_attempts must be in [1, {}]", MAX_LEDGER_RETRY_ATTEMPTS));
        }
        if self.ledger.circuit_breaker.failure_threshold == 0 {
            errors.push("ledger.circuit_breaker.failure_threshold must be > 0".to_string());
        }
        if self.ledger.allowed_networks.is_empty() {
            errors.push("ledger.allowed_networks must not be empty".to_string());
        }

        if self.coordination.lock_timeout_ms == 0 {
            errors.push("coordination.lock_timeout_ms must be > 0".to_string());
        }
        if self.coordination.reconcile_enabled && self.coordination.reconcile_interval_secs == 0 {
            errors.push("coordination.reconcile_interval_secs must be > 0 when reconciliation is enabled".to_string());
        }

        let mut rids = HashSet::new();
        for (idx, chain) in self.chains.iter().enumerate() {
            if chain.name.trim().is_empty() || chain.rid.trim().is_empty() {
                errors.push(format!("chains[{}] needs a name and a rid", idx));
            }
            if !rids.insert(chain.rid.trim().to_ascii_lowercase()) {
                errors.push(format!("chains[{}].rid is duplicated: {}", idx, chain.rid));
            }
            if chain.fee_asset_id.trim().is_empty() {
                errors.push(format!("chains[{}].fee_asset_id must not be empty", idx));
            }
            let fee = chain.fee_value.trim();
            if fee.is_empty() || !fee.bytes().all(|b| b.is_ascii_digit()) || fee.bytes().all(|b| b == b'0') {
                errors.push(format!("chains[{}].fee_value must be a positive integer", idx));
            }
            if chain.is_active && !self.ledger.allowed_networks.contains(&chain.network) {
                errors.push(format!("chains[{}] is active on disabled network {}", idx, chain.network));
            }
        }

        if self.logging.level.trim().is_empty() {
            errors.push("logging.level must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
