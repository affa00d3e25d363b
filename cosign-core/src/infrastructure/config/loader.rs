//! Configuration loader using Figment for layered config management.
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. TOML config file (optional)
//! 3. Environment variables (`COSIGN_*` prefix, `__` separates sections)

use crate::foundation::{CosignError, Result};
use crate::infrastructure::config::types::AppConfig;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use log::{debug, info};
use std::path::Path;

/// Example: `COSIGN_RPC__ADDR` -> `rpc.addr`.
const ENV_PREFIX: &str = "COSIGN_";

/// Process-level variables that share the prefix but are not config keys.
const ENV_IGNORED: &[&str] = &["CONFIG_PATH", "DATA_DIR", "LOG_LEVEL", "TEST_NOW_NANOS"];

pub fn load_config(data_dir: &Path) -> Result<AppConfig> {
    load_config_from_file(&data_dir.join("cosign.toml"), data_dir)
}

/// Load configuration from `path`; a missing file leaves defaults plus environment overrides.
pub fn load_config_from_file(path: &Path, data_dir: &Path) -> Result<AppConfig> {
    info!("loading configuration path={} data_dir={} file_exists={}", path.display(), data_dir.display(), path.exists());
    let figment = Figment::from(Serialized::defaults(AppConfig::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).ignore(ENV_IGNORED).split("__"));
    let mut config: AppConfig = figment.extract().map_err(|e| CosignError::ConfigError(format!("config extraction failed: {e}")))?;
    postprocess(&mut config, data_dir);
    debug!(
        "configuration loaded rpc_addr={} ledger_mode={} reconcile_enabled={} api_token_set={}",
        config.rpc.addr,
        config.ledger.mode,
        config.coordination.reconcile_enabled,
        config.rpc.token.is_some()
    );
    Ok(config)
}

fn postprocess(config: &mut AppConfig, data_dir: &Path) {
    if config.service.data_dir.trim().is_empty() {
        config.service.data_dir = data_dir.display().to_string();
    }
    config.rpc.token = config.rpc.token.take().map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
    config.ledger.token = config.ledger.token.take().map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
}
