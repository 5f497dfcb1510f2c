//! Lecturer Claims - API Server Binary
//!
//! Starts the HTTP API for the lecturer claims workflow.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration (PostgreSQL + filesystem documents)
//! cargo run --bin claims-api
//!
//! # Run without a database
//! API_STORAGE=memory API_LECTURERS_FILE=lecturers.json cargo run --bin claims-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_JWT_EXPIRATION_SECS` - JWT token expiration in seconds (default: 3600)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_STORAGE` - `postgres` or `memory` (default: postgres)
//! * `API_DOCUMENT_DIR` - Directory for uploaded documents (default: ./data/documents)
//! * `API_MAX_UPLOAD_BYTES` - Request body limit (default: 10 MiB)
//! * `API_LECTURERS_FILE` - JSON array of lecturer records to load at startup

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_claims::ports::mock::{InMemoryClaimRepository, InMemoryDocumentStore};
use domain_claims::{ClaimService, Lecturer};
use infra_db::{create_pool, run_migrations, DatabaseConfig, FileSystemDocumentStore, PostgresClaimAdapter};
use interface_api::config::{ApiConfig, StorageBackend};
use interface_api::create_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid API_* configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        storage = ?config.storage,
        "Starting Lecturer Claims API Server"
    );

    let lecturers = match &config.lecturers_file {
        Some(path) => load_lecturers(path).await?,
        None => Vec::new(),
    };

    let service = build_service(&config, lecturers).await?;
    let app = create_router(Arc::new(service), config.clone());

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid listen address {}", config.server_addr()))?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber; `RUST_LOG` overrides `log_level`
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Wires the claim service to the configured backend
async fn build_service(config: &ApiConfig, lecturers: Vec<Lecturer>) -> anyhow::Result<ClaimService> {
    match config.storage {
        StorageBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let pool = create_pool(
                DatabaseConfig::new(&config.database_url)
                    .max_connections(10)
                    .min_connections(2)
                    .connect_timeout(Duration::from_secs(30)),
            )
            .await
            .context("failed to connect to database")?;

            run_migrations(&pool).await.context("failed to run migrations")?;
            tracing::info!("Database ready");

            let adapter = PostgresClaimAdapter::new(pool);
            for lecturer in &lecturers {
                adapter
                    .upsert_lecturer(lecturer)
                    .await
                    .with_context(|| format!("failed to load lecturer {}", lecturer.email))?;
            }

            Ok(ClaimService::new(
                Arc::new(adapter),
                Arc::new(FileSystemDocumentStore::new(&config.document_dir)),
            ))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; claims are lost on restart");
            let repository = InMemoryClaimRepository::with_lecturers(lecturers).await;
            Ok(ClaimService::new(
                Arc::new(repository),
                Arc::new(InMemoryDocumentStore::new()),
            ))
        }
    }
}

/// Reads lecturer records from a JSON array
async fn load_lecturers(path: &Path) -> anyhow::Result<Vec<Lecturer>> {
    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let lecturers: Vec<Lecturer> = serde_json::from_slice(&raw)
        .with_context(|| format!("{} is not a JSON array of lecturers", path.display()))?;

    tracing::info!(count = lecturers.len(), "Loaded lecturers");
    Ok(lecturers)
}

/// Waits for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
