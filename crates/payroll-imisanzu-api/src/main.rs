//! # Payroll Imisanzu API Server
//!
//! Binary entry point for the downstream REST service.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use payroll_imisanzu_api::{ApiContext, CacheBackend, Config, StoreBackend, build_router};
use payroll_persistence::{
    CacheClient, EmployeeRepository, HttpMasterDataClient, MasterStore, MemoryCache, ScyllaClient,
    SharedCacheStore,
};

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

    tracing::info!(version = payroll_imisanzu_api::VERSION, "Starting payroll imisanzu API");

    let employees: Arc<dyn EmployeeRepository> = match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory employee mirror, data is lost on shutdown");
            MasterStore::in_memory().employees
        }
        StoreBackend::Scylla => {
            tracing::info!(
                hosts = ?config.scylla.hosts,
                keyspace = %config.scylla.keyspace,
                "Connecting to ScyllaDB"
            );
            let scylla = ScyllaClient::new(config.scylla.clone()).await?;
            tracing::info!("ScyllaDB connected");
            MasterStore::scylla(scylla).employees
        }
    };

    let cache: SharedCacheStore = match config.cache_backend {
        CacheBackend::Memory => {
            tracing::warn!("Using in-process contribution cache");
            Arc::new(MemoryCache::new())
        }
        CacheBackend::Redis => {
            tracing::info!(url = %config.redis.url, "Connecting to Redis");
            let cache = CacheClient::new(&config.redis).await?;
            tracing::info!("Redis connected");
            Arc::new(cache)
        }
    };

    let remote = HttpMasterDataClient::new(&config.oracle)?;
    tracing::info!(
        base_url = remote.base_url(),
        timeout_ms = u64::try_from(config.oracle.timeout.as_millis()).unwrap_or(u64::MAX),
        "Oracle master data client ready"
    );

    let ctx = ApiContext::new(employees, Arc::new(remote), cache, config.cache_ttl);
    tracing::info!(
        ttl_secs = ctx.contributions.ttl().as_secs(),
        "Contribution cache ready"
    );
    let app = build_router(ctx, &config.cors_origins);

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
