//! tagmill-enrich library interface
//!
//! Exposes the service internals for integration testing.

pub mod api;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::services::key_extractor::{KeyExtractor, StemKeyExtractor};
use crate::services::lookup::LookupTable;
use crate::services::pipeline::EnrichmentPipeline;
use crate::services::remote::RemoteClient;
use crate::services::scheduler::BatchScheduler;
use crate::store::ObjectStorage;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Object storage the batches enumerate and write back to
    pub store: Arc<dyn ObjectStorage>,
    /// Batch scheduler over the enrichment pipeline
    pub scheduler: Arc<BatchScheduler>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    /// Wire up the pipeline with the stock key-extraction policy.
    pub fn new(
        store: Arc<dyn ObjectStorage>,
        lookup_table: LookupTable,
        remote_client: RemoteClient,
    ) -> Self {
        Self::with_extractor(store, lookup_table, remote_client, Arc::new(StemKeyExtractor))
    }

    /// Wire up the pipeline with a custom key-extraction policy.
    pub fn with_extractor(
        store: Arc<dyn ObjectStorage>,
        lookup_table: LookupTable,
        remote_client: RemoteClient,
        key_extractor: Arc<dyn KeyExtractor>,
    ) -> Self {
        let pipeline = Arc::new(EnrichmentPipeline::new(
            Arc::new(lookup_table),
            Arc::new(remote_client),
            Arc::clone(&store),
            key_extractor,
        ));
        Self {
            store,
            scheduler: Arc::new(BatchScheduler::new(pipeline)),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::enrich_routes())
        .merge(api::health_routes())
        .with_state(state)
}
