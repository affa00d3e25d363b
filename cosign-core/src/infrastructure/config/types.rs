use crate::domain::{Blockchain, ChainRegistry};
use crate::foundation::Network;
use crate::infrastructure::ledger::CircuitBreakerConfig;
use serde::{Deserialize, Serialize};

const DEFAULT_RPC_ADDR: &str = "127.0.0.1:8090";
const DEFAULT_BODY_LIMIT_BYTES: usize = 256 * 1024;
const DEFAULT_LEDGER_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_LEDGER_RETRY_ATTEMPTS: usize = 3;
const DEFAULT_LEDGER_RETRY_DELAY_MS: u64 = 200;
const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_RECONCILE_INTERVAL_SECS: u64 = 15;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub rpc: RpcConfig,
    pub ledger: LedgerConfig,
    pub coordination: CoordinationConfig,
    pub logging: LoggingConfig,
    /// Blockchains accounts may be created on. Empty accepts any `blockchainRid`.
    pub chains: Vec<ChainConfig>,
}

impl AppConfig {
    pub fn chain_registry(&self) -> ChainRegistry {
        ChainRegistry::new(self.chains.iter().cloned().map(Blockchain::from).collect())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub name: String,
    pub rid: String,
    pub network: Network,
    pub fee_asset_id: String,
    /// Smallest unit of the fee asset.
    #[serde(default = "default_fee_value")]
    pub fee_value: String,
    #[serde(default)]
    pub fee_symbol: String,
    #[serde(default)]
    pub fee_decimals: u8,
    #[serde(default)]
    pub is_active: bool,
}

fn default_fee_value() -> String {
    "1".to_string()
}

impl From<ChainConfig> for Blockchain {
    fn from(config: ChainConfig) -> Self {
        Blockchain {
            name: config.name.trim().to_string(),
            rid: config.rid.trim().to_string(),
            network: config.network,
            fee_asset_id: config.fee_asset_id.trim().to_string(),
            fee_value: config.fee_value.trim().to_string(),
            fee_symbol: config.fee_symbol,
            fee_decimals: config.fee_decimals,
            is_active: config.is_active,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// RocksDB lives under `${data_dir}/cosign-db`. Filled from the resolved data dir when empty.
    pub data_dir: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    pub addr: String,
    /// When set, every route except `/health` requires this token.
    pub token: Option<String>,
    pub body_limit_bytes: usize,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self { addr: DEFAULT_RPC_ADDR.to_string(), token: None, body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerMode {
    #[default]
    Devnet,
    Http,
}

impl std::fmt::Display for LedgerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Devnet => write!(f, "devnet"),
            Self::Http => write!(f, "http"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub mode: LedgerMode,
    pub endpoint_url: Option<String>,
    pub token: Option<String>,
    pub timeout_ms: u64,
    /// Attempts for read-only ledger calls. Submissions are never retried.
    pub retry_attempts: usize,
    pub retry_delay_ms: u64,
    pub circuit_breaker: CircuitBreakerConfig,
    /// Networks accepted on account creation.
    pub allowed_networks: Vec<Network>,
    /// Devnet only: unregistered accounts report a synthetic fee transfer.
    pub devnet_auto_fee: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            mode: LedgerMode::Devnet,
            endpoint_url: None,
            token: None,
            timeout_ms: DEFAULT_LEDGER_TIMEOUT_MS,
            retry_attempts: DEFAULT_LEDGER_RETRY_ATTEMPTS,
            retry_delay_ms: DEFAULT_LEDGER_RETRY_DELAY_MS,
            circuit_breaker: CircuitBreakerConfig::default(),
            allowed_networks: vec![Network::Testnet, Network::Mainnet],
            devnet_auto_fee: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinationConfig {
    pub lock_timeout_ms: u64,
    pub reconcile_enabled: bool,
    pub reconcile_interval_secs: u64,
}

impl Default for CoordinationConfig {
    fn default() -> Self {
        Self { lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS, reconcile_enabled: true, reconcile_interval_secs: DEFAULT_RECONCILE_INTERVAL_SECS }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter expression, e.g. `info` or `info,cosign_core=debug`.
    pub level: String,
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: DEFAULT_LOG_LEVEL.to_string(), dir: None }
    }
}
