use cosign_core::application::{CompositeObserver, CoordinatorContext};
use cosign_core::infrastructure::config::{AppConfig, LedgerMode};
use cosign_core::infrastructure::ledger::{DevnetLedger, HttpLedger, LedgerAdapter, ResilientLedger, RetryPolicy};
use cosign_core::infrastructure::storage::{RocksStorage, Storage};
use cosign_core::{CosignError, Result};
use cosign_service::service::metrics::Metrics;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

pub fn init_logging(app_config: &AppConfig, cli_level: Option<&str>) -> Result<()> {
    let filters = cli_level.map(str::trim).filter(|level| !level.is_empty()).unwrap_or(app_config.logging.level.as_str());
    cosign_core::infrastructure::logging::init_logger(app_config.logging.dir.as_deref(), filters)
}

pub fn load_app_config() -> Result<AppConfig> {
    cosign_core::infrastructure::config::load_app_config()
}

pub fn init_storage(data_dir: &str) -> Result<Arc<dyn Storage>> {
    let storage = RocksStorage::open_in_dir(data_dir).map_err(|err| CosignError::Message(format!("rocksdb open error: {}", err)))?;
    Ok(Arc::new(storage))
}

pub fn init_ledger(app_config: &AppConfig) -> Result<Arc<dyn LedgerAdapter>> {
    let ledger = &app_config.ledger;
    let timeout = Duration::from_millis(ledger.timeout_ms);
    let inner: Arc<dyn LedgerAdapter> = match ledger.mode {
        LedgerMode::Devnet => {
            warn!("ledger mode is devnet; submissions never leave this process");
            if ledger.devnet_auto_fee {
                Arc::new(DevnetLedger::with_auto_fee())
            } else {
                Arc::new(DevnetLedger::new())
            }
        }
        LedgerMode::Http => {
            let url = ledger.endpoint_url.clone().ok_or_else(|| CosignError::ConfigError("ledger.endpoint_url is required in http mode".to_string()))?;
            info!("ledger gateway configured url={} timeout_ms={}", url, ledger.timeout_ms);
            Arc::new(HttpLedger::new(url, ledger.token.clone(), timeout)?)
        }
    };
    let retry = RetryPolicy { attempts: ledger.retry_attempts, delay: Duration::from_millis(ledger.retry_delay_ms) };
    Ok(Arc::new(ResilientLedger::new(inner, timeout, retry, ledger.circuit_breaker)))
}

pub fn build_context(app_config: &AppConfig, storage: Arc<dyn Storage>, ledger: Arc<dyn LedgerAdapter>, metrics: Arc<Metrics>) -> CoordinatorContext {
    let mut observer = CompositeObserver::new();
    observer.add_observer(metrics);
    CoordinatorContext::new(storage, ledger, Duration::from_millis(app_config.coordination.lock_timeout_ms))
        .with_observer(Arc::new(observer))
        .with_allowed_networks(app_config.ledger.allowed_networks.clone())
        .with_chains(app_config.chain_registry())
}

pub fn log_startup_banner(app_config: &AppConfig) {
    info!(
        "cosign-service configuration data_dir={} rpc_addr={} auth={} ledger_mode={} allowed_networks={:?} chains={} reconcile_enabled={} reconcile_interval_secs={}",
        app_config.service.data_dir,
        app_config.rpc.addr,
        if app_config.rpc.token.is_some() { "token" } else { "none" },
        app_config.ledger.mode,
        app_config.ledger.allowed_networks,
        app_config.chains.len(),
        app_config.coordination.reconcile_enabled,
        app_config.coordination.reconcile_interval_secs
    );
}
