//! Serve command - runs the HTTP API until Ctrl+C or SIGTERM

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::api::router::{RouterOptions, create_router};
use crate::config::AppConfig;
use crate::infrastructure::observability::{init_metrics, init_tracing, shutdown_tracing};
use crate::infrastructure::services::IndexBuildOrchestrator;

/// Lower bound on the interval between retention sweeps
const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Override `server.host`
    #[arg(long)]
    pub host: Option<String>,

    /// Override `server.port`
    #[arg(long)]
    pub port: Option<u16>,
}

/// Run the API server
pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load().context("Failed to load configuration")?;
    apply_overrides(&mut config, args);

    init_tracing(&config.logging, &config.observability.tracing);

    let metrics = init_metrics(&config.observability.metrics)
        .map(|m| (m, config.observability.metrics.path.clone()));

    let state = crate::create_app_state(&config)?;
    let sweeper = spawn_retention_sweeper(
        state.build_orchestrator.clone(),
        Duration::from_secs(config.indexing.job_retention_secs),
    );

    let app = create_router(
        state,
        RouterOptions {
            metrics,
            cors_origins: config.server.cors_origins.clone(),
        },
    );

    let addr = build_socket_addr(&config)?;
    info!("Starting federated search API on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    shutdown_tracing();

    Ok(())
}

fn apply_overrides(config: &mut AppConfig, args: ServeArgs) {
    if let Some(host) = args.host {
        config.server.host = host;
    }

    if let Some(port) = args.port {
        config.server.port = port;
    }
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    let ip = config
        .server
        .host
        .parse::<std::net::IpAddr>()
        .with_context(|| format!("Invalid server.host '{}'", config.server.host))?;

    Ok(SocketAddr::from((ip, config.server.port)))
}

fn sweep_interval(retention: Duration) -> Duration {
    (retention / 4).max(MIN_SWEEP_INTERVAL)
}

/// Periodically drop terminal jobs older than the retention window
fn spawn_retention_sweeper(
    builds: Arc<dyn IndexBuildOrchestrator>,
    retention: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval(retention));
        ticker.tick().await;

        loop {
            ticker.tick().await;

            match builds.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => info!(purged, "Purged expired build jobs"),
                Err(e) => warn!(error = %e, "Build job retention sweep failed"),
            }
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply() {
        let mut config = AppConfig::default();
        apply_overrides(
            &mut config,
            ServeArgs {
                host: Some("127.0.0.1".to_string()),
                port: Some(9100),
            },
        );

        let addr = build_socket_addr(&config).unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:9100");
    }

    #[test]
    fn test_invalid_host_rejected() {
        let mut config = AppConfig::default();
        config.server.host = "not an ip".to_string();

        assert!(build_socket_addr(&config).is_err());
    }

    #[test]
    fn test_sweep_interval_has_floor() {
        assert_eq!(sweep_interval(Duration::from_secs(10)), MIN_SWEEP_INTERVAL);
        assert_eq!(
            sweep_interval(Duration::from_secs(24 * 3600)),
            Duration::from_secs(6 * 3600)
        );
    }
}
