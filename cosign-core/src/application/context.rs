use crate::application::lifecycle::{LifecycleObserver, NoopObserver};
use crate::application::locks::EntityLocks;
use crate::domain::ChainRegistry;
use crate::foundation::Network;
use crate::infrastructure::ledger::LedgerAdapter;
use crate::infrastructure::storage::Storage;
use std::sync::Arc;
use std::time::Duration;

/// Everything an operation needs; built once at startup and shared.
#[derive(Clone)]
pub struct CoordinatorContext {
    pub storage: Arc<dyn Storage>,
    pub ledger: Arc<dyn LedgerAdapter>,
    pub locks: Arc<EntityLocks>,
    pub observer: Arc<dyn LifecycleObserver>,
    /// Networks accepted on account creation.
    pub allowed_networks: Vec<Network>,
    pub chains: Arc<ChainRegistry>,
}

impl CoordinatorContext {
    pub fn new(storage: Arc<dyn Storage>, ledger: Arc<dyn LedgerAdapter>, lock_timeout: Duration) -> Self {
        Self {
            storage,
            ledger,
            locks: Arc::new(EntityLocks::new(lock_timeout)),
            observer: Arc::new(NoopObserver),
            allowed_networks: vec![Network::Testnet, Network::Mainnet],
            chains: Arc::new(ChainRegistry::default()),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_allowed_networks(mut self, networks: Vec<Network>) -> Self {
        self.allowed_networks = networks;
        self
    }

    pub fn with_chains(mut self, chains: ChainRegistry) -> Self {
        self.chains = Arc::new(chains);
        self
    }
}
