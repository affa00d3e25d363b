pub mod auth;
pub mod correlation;
pub mod logging;
pub mod metrics;
