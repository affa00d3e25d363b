use crate::service::metrics::Metrics;
use cosign_core::application::CoordinatorContext;
use cosign_core::infrastructure::config::RpcConfig;
use std::sync::Arc;

#[derive(Clone)]
pub struct ApiState {
    pub ctx: CoordinatorContext,
    pub rpc_token: Option<String>,
    pub metrics: Arc<Metrics>,
    pub body_limit_bytes: usize,
}

impl ApiState {
    pub fn new(ctx: CoordinatorContext, metrics: Arc<Metrics>) -> Self {
        Self { ctx, rpc_token: None, metrics, body_limit_bytes: RpcConfig::default().body_limit_bytes }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.rpc_token = token.filter(|value| !value.trim().is_empty());
        self
    }

    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit_bytes = limit;
        self
    }
}
