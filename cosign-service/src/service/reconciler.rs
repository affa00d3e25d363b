use crate::service::metrics::Metrics;
use cosign_core::application::{reconcile_pending, CoordinatorContext};
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Periodically finalizes submissions the ledger accepted after their `execute` call returned.
pub async fn run_reconcile_loop(ctx: CoordinatorContext, period: Duration, mut shutdown: watch::Receiver<bool>) {
    info!("reconcile loop started interval_secs={}", period.as_secs());
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(err) = reconcile_pending(&ctx).await {
                    warn!("reconcile pass failed error={}", err);
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    info!("reconcile loop stopping");
                    return;
                }
            }
        }
    }
}

/// Logs a one-line summary of the service counters on every tick.
pub async fn run_status_reporter(metrics: Arc<Metrics>, period: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let snapshot = metrics.snapshot();
                info!(
                    "periodic status report uptime_minutes={} api_ok={} api_error={} transactions_completed={} submissions_failed={}",
                    snapshot.uptime.as_secs() / 60,
                    snapshot.api_ok,
                    snapshot.api_error,
                    snapshot.transactions_completed,
                    snapshot.submissions_failed
                );
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return;
                }
            }
        }
    }
}
