use clap::Parser;
use cosign_core::infrastructure::config::{CONFIG_PATH_ENV, DATA_DIR_ENV, LOG_LEVEL_ENV};
use std::path::PathBuf;

const RPC_ADDR_ENV: &str = "COSIGN_RPC__ADDR";

#[derive(Parser, Debug)]
#[command(name = "cosign-service")]
#[command(about = "Multi-signature account coordination service", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = CONFIG_PATH_ENV)]
    pub config: Option<PathBuf>,

    /// Override data directory
    #[arg(short, long, env = DATA_DIR_ENV)]
    pub data_dir: Option<PathBuf>,

    /// Log filters, e.g. `info` or `info,cosign_core=debug`
    #[arg(short, long, env = LOG_LEVEL_ENV)]
    pub log_level: Option<String>,

    /// Override the HTTP listen address
    #[arg(long)]
    pub rpc_addr: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Exports overrides so the config loader sees them.
    pub fn apply_to_env(&self) {
        if let Some(config_path) = &self.config {
            std::env::set_var(CONFIG_PATH_ENV, config_path);
        }

        if let Some(data_dir) = &self.data_dir {
            std::env::set_var(DATA_DIR_ENV, data_dir);
        }

        if let Some(rpc_addr) = &self.rpc_addr {
            std::env::set_var(RPC_ADDR_ENV, rpc_addr);
        }
    }
}
