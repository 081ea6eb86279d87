//! Batch fan-out scheduler
//!
//! Runs the enrichment pipeline over a batch of object keys under a
//! concurrency bound, in one of two strategies with identical contracts
//! apart from result ordering:
//!
//! - [`Strategy::Buffered`]: cooperative execution on the current task via
//!   `futures::stream::buffered`; at most `concurrency` runs in flight,
//!   outcomes in input order.
//! - [`Strategy::Spawned`]: one worker task per key on the runtime's thread
//!   pool, admission-gated by a counting semaphore; outcomes collected as
//!   they complete, so ordering is not guaranteed.
//!
//! Either way every submitted key yields exactly one outcome, and nothing
//! escapes the batch once it has started: a worker that dies without
//! reporting gets a failed outcome back-filled for its key.

use crate::models::{BatchResult, EnrichmentOutcome, LookupValue, Strategy};
use crate::services::pipeline::EnrichmentPipeline;
use futures::stream::{self, StreamExt};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

/// Fan-out/fan-in executor for enrichment batches.
pub struct BatchScheduler {
    pipeline: Arc<EnrichmentPipeline>,
}

impl BatchScheduler {
    pub fn new(pipeline: Arc<EnrichmentPipeline>) -> Self {
        Self { pipeline }
    }

    /// Run the pipeline over `object_keys` with at most `concurrency` runs
    /// in flight. A bound of zero is treated as one.
    pub async fn run_batch(
        &self,
        object_keys: Vec<String>,
        concurrency: usize,
        strategy: Strategy,
    ) -> BatchResult {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        let concurrency = concurrency.max(1);

        info!(
            run_id = %run_id,
            keys = object_keys.len(),
            concurrency,
            strategy = ?strategy,
            "starting enrichment batch"
        );

        let outcomes = match strategy {
            Strategy::Buffered => self.run_buffered(&object_keys, concurrency).await,
            Strategy::Spawned => self.run_spawned(&object_keys, concurrency).await,
        };

        let result = BatchResult::from_outcomes(run_id, strategy, outcomes, started.elapsed());
        info!(
            run_id = %run_id,
            successful = result.success_count,
            failed = result.failure_count,
            "enrichment batch complete"
        );
        result
    }

    /// Cooperative strategy: bounded buffering on the current task keeps
    /// input order.
    async fn run_buffered(&self, object_keys: &[String], concurrency: usize) -> Vec<EnrichmentOutcome> {
        let futures: Vec<_> = object_keys
            .iter()
            .cloned()
            .map(|key| {
                let pipeline = Arc::clone(&self.pipeline);
                async move { pipeline.run(&key).await }
            })
            .collect();
        stream::iter(futures)
            .buffered(concurrency)
            .collect()
            .await
    }

    /// Worker-pool strategy: spawned tasks gated by a counting semaphore,
    /// collected in completion order.
    async fn run_spawned(&self, object_keys: &[String], concurrency: usize) -> Vec<EnrichmentOutcome> {
        let gate = Arc::new(Semaphore::new(concurrency));
        let mut workers = JoinSet::new();

        for (index, key) in object_keys.iter().enumerate() {
            let pipeline = Arc::clone(&self.pipeline);
            let gate = Arc::clone(&gate);
            let key = key.clone();
            workers.spawn(async move {
                // The semaphore is never closed while workers hold it.
                let _permit = gate.acquire_owned().await.expect("admission gate closed");
                (index, pipeline.run(&key).await)
            });
        }

        let mut reported = vec![false; object_keys.len()];
        let mut outcomes = Vec::with_capacity(object_keys.len());
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((index, outcome)) => {
                    reported[index] = true;
                    outcomes.push(outcome);
                }
                Err(e) => {
                    warn!(error = %e, "enrichment worker aborted");
                }
            }
        }

        // Every key still gets an outcome even if its worker died.
        for (index, reported) in reported.into_iter().enumerate() {
            if !reported {
                outcomes.push(EnrichmentOutcome::failed(
                    &object_keys[index],
                    LookupValue::empty(),
                    json!({}),
                    "enrichment worker aborted before producing an outcome".to_string(),
                ));
            }
        }

        outcomes
    }
}
