mod loader;
mod types;
pub mod validation;

pub use loader::{load_config, load_config_from_file};
pub use types::*;

use crate::foundation::{CosignError, Result};
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "COSIGN_CONFIG_PATH";
pub const DATA_DIR_ENV: &str = "COSIGN_DATA_DIR";
pub const LOG_LEVEL_ENV: &str = "COSIGN_LOG_LEVEL";

pub fn load_app_config() -> Result<AppConfig> {
    let data_dir = resolve_data_dir()?;
    let config_path = resolve_config_path(&data_dir);
    load_validated(&config_path, &data_dir)
}

pub fn load_app_config_from_path(path: &Path) -> Result<AppConfig> {
    let data_dir = resolve_data_dir()?;
    load_validated(path, &data_dir)
}

fn load_validated(path: &Path, data_dir: &Path) -> Result<AppConfig> {
    let config = load_config_from_file(path, data_dir)?;
    config.validate().map_err(|errors| CosignError::ConfigError(format!("validation failed: {}", errors.join("; "))))?;
    Ok(config)
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty()).map(PathBuf::from)
}

pub fn resolve_config_path(data_dir: &Path) -> PathBuf {
    env_path(CONFIG_PATH_ENV).unwrap_or_else(|| data_dir.join("cosign.toml"))
}

pub fn resolve_data_dir() -> Result<PathBuf> {
    if let Some(dir) = env_path(DATA_DIR_ENV) {
        return Ok(dir);
    }
    let cwd = std::env::current_dir().map_err(|err| crate::storage_err!("env::current_dir", err))?;
    Ok(cwd.join(".cosign"))
}
