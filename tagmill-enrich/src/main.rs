//! tagmill-enrich - Object Metadata Enrichment Service
//!
//! Joins a local reference dataset with a remote record API and writes the
//! combined document back onto each object in the configured store.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use tagmill_common::config::ServiceConfig;
use tagmill_enrich::services::dataset;
use tagmill_enrich::services::lookup::LookupTable;
use tagmill_enrich::services::remote::RemoteClient;
use tagmill_enrich::store::{ObjectStorage, RemoteObjectStore};
use tagmill_enrich::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting tagmill-enrich (object metadata enrichment) service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Step 1: Resolve configuration (env over TOML over defaults)
    let config = ServiceConfig::resolve()?;
    info!("Object store: {}", config.store_url);
    info!("Remote record API: {}", config.api_base_url);

    // Step 2: Connect the object store backend
    let store: Arc<dyn ObjectStorage> = Arc::new(RemoteObjectStore::from_url(&config.store_url)?);

    // Step 3: Load the reference dataset and build the lookup table once.
    // Failures here are unrecoverable setup errors and abort startup.
    let rows = dataset::load_rows(store.as_ref(), &config.dataset_path).await?;
    dataset::ensure_column(&rows, &config.join_key_column)?;
    let lookup_table = LookupTable::build(rows, &config.join_key_column);
    info!(
        "Lookup table ready: {} rows indexed by '{}'",
        lookup_table.len(),
        config.join_key_column
    );

    // Step 4: Remote record API client with the configured timeout
    let remote_client = RemoteClient::new(
        &config.api_base_url,
        Duration::from_secs(config.request_timeout_secs),
    );

    // Create application state and router
    let state = AppState::new(store, lookup_table, remote_client);
    let app = tagmill_enrich::build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", config.listen_port)).await?;
    info!("Listening on http://127.0.0.1:{}", config.listen_port);
    info!("Health check: http://127.0.0.1:{}/health", config.listen_port);

    axum::serve(listener, app).await?;

    Ok(())
}
