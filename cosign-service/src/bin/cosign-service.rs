#[path = "cosign-service/cli.rs"]
mod cli;
#[path = "cosign-service/setup.rs"]
mod setup;

use crate::cli::Cli;
use cosign_service::api::{run_http_server, ApiState};
use cosign_service::service::metrics::Metrics;
use cosign_service::service::reconciler::{run_reconcile_loop, run_status_reporter};
use log::{error, info};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

const STATUS_REPORT_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse_args();
    args.apply_to_env();

    let app_config = setup::load_app_config()?;
    setup::init_logging(&app_config, args.log_level.as_deref())?;
    info!("cosign-service starting version={}", env!("CARGO_PKG_VERSION"));
    setup::log_startup_banner(&app_config);

    let storage = setup::init_storage(&app_config.service.data_dir)?;
    info!("storage initialized data_dir={}", app_config.service.data_dir);
    let ledger = setup::init_ledger(&app_config)?;
    let metrics = Arc::new(Metrics::new()?);
    let ctx = setup::build_context(&app_config, storage, ledger, metrics.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut tasks = Vec::new();
    if app_config.coordination.reconcile_enabled {
        let period = Duration::from_secs(app_config.coordination.reconcile_interval_secs);
        tasks.push(tokio::spawn(run_reconcile_loop(ctx.clone(), period, shutdown_rx.clone())));
    }
    tasks.push(tokio::spawn(run_status_reporter(metrics.clone(), STATUS_REPORT_INTERVAL, shutdown_rx.clone())));

    let rpc_addr: SocketAddr = app_config.rpc.addr.parse().map_err(|err| format!("invalid rpc.addr {}: {}", app_config.rpc.addr, err))?;
    let state = Arc::new(
        ApiState::new(ctx, metrics).with_token(app_config.rpc.token.clone()).with_body_limit(app_config.rpc.body_limit_bytes),
    );

    let shutdown = async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("failed to listen for shutdown signal error={}", err);
        }
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    };
    run_http_server(rpc_addr, state, shutdown).await?;

    for task in tasks {
        let _ = task.await;
    }
    info!("cosign-service stopped");
    Ok(())
}
