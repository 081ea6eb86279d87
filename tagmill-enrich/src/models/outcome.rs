//! Per-object enrichment outcomes and batch results

use crate::services::lookup::LookupRow;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;

/// Batch execution strategy
///
/// Both strategies share one contract (every input key yields exactly one
/// outcome); they differ in result ordering — see [`BatchResult::outcomes`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Cooperative execution on the current task; outcomes preserve input
    /// order (`outcomes[i]` corresponds to the i-th listed key).
    #[default]
    Buffered,
    /// One worker task per key on the runtime's thread pool; outcomes arrive
    /// in completion order.
    Spawned,
}

/// Result of resolving an identifier against the lookup table.
///
/// A miss is recorded as an explicit error-shaped value so consumers can
/// tell "not found" apart from "found but empty".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LookupValue {
    Row(LookupRow),
    NotFound { error: String },
}

impl LookupValue {
    /// Placeholder for runs that never reached the lookup step.
    pub fn empty() -> Self {
        LookupValue::Row(LookupRow::new())
    }

    pub fn not_found(identifier: &str) -> Self {
        LookupValue::NotFound {
            error: format!("no matching row for identifier: {identifier}"),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, LookupValue::Row(_))
    }
}

/// Outcome of one enrichment pipeline run.
///
/// Always well-formed: failed runs carry empty placeholders for the steps
/// they never reached, plus the failing step's error text.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentOutcome {
    /// Object storage key this outcome belongs to
    pub object_key: String,
    /// Reference row (or explicit not-found marker) for the object
    pub lookup_row: LookupValue,
    /// Parsed remote record
    pub remote_record: Value,
    /// Combined document as written to the object's metadata
    pub combined_metadata: Value,
    /// Whether the run reached its successful terminal state
    pub success: bool,
    /// Failing step's error text, present only on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl EnrichmentOutcome {
    pub fn succeeded(
        object_key: &str,
        lookup_row: LookupValue,
        remote_record: Value,
        combined_metadata: Value,
    ) -> Self {
        Self {
            object_key: object_key.to_string(),
            lookup_row,
            remote_record,
            combined_metadata,
            success: true,
            error_message: None,
        }
    }

    pub fn failed(
        object_key: &str,
        lookup_row: LookupValue,
        remote_record: Value,
        error_message: String,
    ) -> Self {
        Self {
            object_key: object_key.to_string(),
            lookup_row,
            remote_record,
            combined_metadata: json!({}),
            success: false,
            error_message: Some(error_message),
        }
    }
}

/// Aggregated result of one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    /// Identifier of this run, for log correlation
    pub run_id: Uuid,
    /// Strategy the batch executed under
    pub strategy: Strategy,
    /// One outcome per submitted key; ordering per [`Strategy`]
    pub outcomes: Vec<EnrichmentOutcome>,
    pub success_count: usize,
    pub failure_count: usize,
    pub duration_seconds: u64,
}

impl BatchResult {
    /// Common aggregation for both strategies: tally successes and failures.
    pub fn from_outcomes(
        run_id: Uuid,
        strategy: Strategy,
        outcomes: Vec<EnrichmentOutcome>,
        elapsed: Duration,
    ) -> Self {
        let success_count = outcomes.iter().filter(|o| o.success).count();
        let failure_count = outcomes.len() - success_count;
        Self {
            run_id,
            strategy,
            outcomes,
            success_count,
            failure_count,
            duration_seconds: elapsed.as_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_counts() {
        let outcomes = vec![
            EnrichmentOutcome::succeeded("a", LookupValue::empty(), json!({}), json!({})),
            EnrichmentOutcome::failed("b", LookupValue::empty(), json!({}), "boom".to_string()),
            EnrichmentOutcome::succeeded("c", LookupValue::empty(), json!({}), json!({})),
        ];
        let result = BatchResult::from_outcomes(
            Uuid::new_v4(),
            Strategy::Buffered,
            outcomes,
            Duration::from_secs(3),
        );
        assert_eq!(result.success_count, 2);
        assert_eq!(result.failure_count, 1);
        assert_eq!(result.duration_seconds, 3);
    }

    #[test]
    fn test_strategy_serde_names() {
        assert_eq!(serde_json::to_string(&Strategy::Buffered).unwrap(), "\"buffered\"");
        let parsed: Strategy = serde_json::from_str("\"spawned\"").unwrap();
        assert_eq!(parsed, Strategy::Spawned);
    }

    #[test]
    fn test_not_found_serializes_as_error_object() {
        let value = serde_json::to_value(LookupValue::not_found("x")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"error": "no matching row for identifier: x"})
        );
    }

    #[test]
    fn test_failed_outcome_omits_nothing_required() {
        let outcome = EnrichmentOutcome::failed(
            "a.xml",
            LookupValue::empty(),
            json!({}),
            "remote fetch failed".to_string(),
        );
        assert!(!outcome.success);
        assert_eq!(outcome.combined_metadata, json!({}));
        let serialized = serde_json::to_value(&outcome).unwrap();
        assert_eq!(serialized["lookup_row"], json!({}));
        assert_eq!(serialized["error_message"], json!("remote fetch failed"));
    }
}
