//! Combined metadata document construction

use crate::models::LookupValue;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// The document written back onto an object: both source records joined
/// under the object's key, stamped with the processing time.
#[derive(Debug, Clone, Serialize)]
pub struct CombinedMetadata {
    pub object_key: String,
    /// Capture time of this combination, ISO-8601 UTC
    pub processing_timestamp: DateTime<Utc>,
    pub lookup_row: LookupValue,
    pub remote_record: Value,
}

/// Merge both sources into one document. Pure apart from reading the clock.
pub fn combine(
    object_key: &str,
    lookup_row: &LookupValue,
    remote_record: &Value,
) -> CombinedMetadata {
    CombinedMetadata {
        object_key: object_key.to_string(),
        processing_timestamp: Utc::now(),
        lookup_row: lookup_row.clone(),
        remote_record: remote_record.clone(),
    }
}
