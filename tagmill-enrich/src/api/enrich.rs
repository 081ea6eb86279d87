//! Batch enrichment API handler
//!
//! POST /enrich lists one page of object keys and runs the enrichment
//! batch over them. Only listing and setup failures surface as API errors;
//! once the batch starts, the response always carries one outcome per key.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use tracing::warn;

use crate::error::{ApiError, ApiResult};
use crate::models::{BatchResult, Strategy};
use crate::AppState;

/// POST /enrich request
#[derive(Debug, Deserialize)]
pub struct EnrichRequest {
    /// Listing filter; empty lists the whole store
    #[serde(default)]
    pub prefix: String,
    /// Listing page cap (single page; objects beyond it are not visited)
    #[serde(default = "default_max_keys")]
    pub max_keys: usize,
    /// Execution strategy
    #[serde(default)]
    pub strategy: Strategy,
    /// Maximum enrichment runs in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_max_keys() -> usize {
    1000
}

fn default_concurrency() -> usize {
    10
}

/// POST /enrich
///
/// Run one enrichment batch and return the full result.
pub async fn run_enrichment(
    State(state): State<AppState>,
    Json(request): Json<EnrichRequest>,
) -> ApiResult<Json<BatchResult>> {
    if request.concurrency == 0 {
        return Err(ApiError::BadRequest(
            "concurrency must be at least 1".to_string(),
        ));
    }

    let keys = match state
        .store
        .list_keys(&request.prefix, request.max_keys)
        .await
    {
        Ok(keys) => keys,
        Err(e) => {
            let message = format!("object listing failed: {e}");
            *state.last_error.write().await = Some(message.clone());
            return Err(ApiError::Internal(message));
        }
    };

    if keys.is_empty() {
        warn!(prefix = %request.prefix, "no objects found for prefix");
    }

    let result = state
        .scheduler
        .run_batch(keys, request.concurrency, request.strategy)
        .await;

    Ok(Json(result))
}

/// Build enrichment routes
pub fn enrich_routes() -> Router<AppState> {
    Router::new().route("/enrich", post(run_enrichment))
}
