pub mod metrics;
pub mod reconciler;
