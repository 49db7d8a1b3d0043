//! # Payroll Oracle API Server
//!
//! Binary entry point for the oracle REST service.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use payroll_oracle_api::{ApiContext, Config, StoreBackend, build_router};
use payroll_persistence::{MasterStore, ScyllaClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!(version = payroll_oracle_api::VERSION, "Starting payroll oracle API");

    let store = match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory master store, data is lost on shutdown");
            MasterStore::in_memory()
        }
        StoreBackend::Scylla => {
            tracing::info!(
                hosts = ?config.scylla.hosts,
                keyspace = %config.scylla.keyspace,
                "Connecting to ScyllaDB"
            );
            let scylla = ScyllaClient::new(config.scylla.clone()).await?;
            tracing::info!("ScyllaDB connected");
            MasterStore::scylla(scylla)
        }
    };

    let app = build_router(ApiContext::new(store), &config.cors_origins);

    let addr = config.server_addr;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
