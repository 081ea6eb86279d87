//! Per-object enrichment pipeline
//!
//! One run per object key, stepping through:
//! extract identifier → resolve lookup row → fetch remote record →
//! combine → write metadata.
//!
//! # Error Handling
//! The pipeline API is infallible: every step failure is captured into the
//! returned outcome and ends the run there, with the unreached steps'
//! fields left as empty placeholders. A lookup miss is data, not a failure.
//! One attempt per run; retries are the caller's business.

use crate::models::{EnrichmentOutcome, LookupValue};
use crate::services::combiner;
use crate::services::key_extractor::KeyExtractor;
use crate::services::lookup::LookupTable;
use crate::services::remote::RemoteClient;
use crate::store::ObjectStorage;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

/// Executes the enrichment steps for single object keys.
///
/// Cheap to share: all fields are read-only after construction, so one
/// pipeline serves every concurrent run of a batch.
pub struct EnrichmentPipeline {
    lookup_table: Arc<LookupTable>,
    remote_client: Arc<RemoteClient>,
    store: Arc<dyn ObjectStorage>,
    key_extractor: Arc<dyn KeyExtractor>,
}

impl EnrichmentPipeline {
    pub fn new(
        lookup_table: Arc<LookupTable>,
        remote_client: Arc<RemoteClient>,
        store: Arc<dyn ObjectStorage>,
        key_extractor: Arc<dyn KeyExtractor>,
    ) -> Self {
        Self {
            lookup_table,
            remote_client,
            store,
            key_extractor,
        }
    }

    /// Run the full pipeline for one object key.
    pub async fn run(&self, object_key: &str) -> EnrichmentOutcome {
        // Step 1: derive the join key (pure, cannot fail)
        let identifier = self.key_extractor.extract(object_key);
        debug!(object_key, identifier = %identifier, "starting enrichment");

        // Step 2: resolve against the reference dataset
        let lookup_row = match self.lookup_table.lookup(&identifier) {
            Some(row) => LookupValue::Row(row.clone()),
            None => {
                debug!(identifier = %identifier, "no reference row for identifier");
                LookupValue::not_found(&identifier)
            }
        };

        // Step 3: fetch the remote record (soft API failures come back as
        // error-shaped records; hard failures end the run)
        let remote_record = match self.remote_client.fetch(&identifier).await {
            Ok(record) => record,
            Err(e) => {
                warn!(object_key, error = %e, "remote fetch failed");
                return EnrichmentOutcome::failed(
                    object_key,
                    lookup_row,
                    json!({}),
                    format!("remote fetch failed: {e}"),
                );
            }
        };

        // Step 4: combine both sources with a processing timestamp
        let combined = combiner::combine(object_key, &lookup_row, &remote_record);
        let combined_metadata = match serde_json::to_value(&combined) {
            Ok(value) => value,
            Err(e) => {
                warn!(object_key, error = %e, "combined document serialization failed");
                return EnrichmentOutcome::failed(
                    object_key,
                    lookup_row,
                    remote_record,
                    format!("combine failed: {e}"),
                );
            }
        };

        // Step 5: full-replace metadata write
        if let Err(e) = self.store.write_metadata(object_key, &combined_metadata).await {
            warn!(object_key, error = %e, "metadata write failed");
            return EnrichmentOutcome::failed(
                object_key,
                lookup_row,
                remote_record,
                format!("metadata write failed: {e}"),
            );
        }

        debug!(object_key, "enrichment complete");
        EnrichmentOutcome::succeeded(object_key, lookup_row, remote_record, combined_metadata)
    }
}
