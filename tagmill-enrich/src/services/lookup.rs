//! In-memory lookup table over the reference dataset
//!
//! Built once at service startup and shared read-only across all concurrent
//! pipeline runs; no lock is needed after construction.

use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

/// One reference record: column name to scalar value.
pub type LookupRow = Map<String, Value>;

/// Reference rows indexed by the stringified join-key column.
///
/// Duplicate join keys keep the **first** row encountered; later rows are
/// silently shadowed. This matches the upstream dataset contract and is a
/// deliberate policy, not an accident — a shadowed-row count is logged at
/// debug level so the condition stays observable.
#[derive(Debug, Clone)]
pub struct LookupTable {
    rows: HashMap<String, LookupRow>,
}

impl LookupTable {
    /// Index `rows` by `key_column`.
    ///
    /// Values equal to the dataset's missing sentinel (the empty string) are
    /// rewritten to explicit null before storage. An empty input yields an
    /// empty table; there are no error conditions.
    pub fn build(rows: Vec<LookupRow>, key_column: &str) -> Self {
        let mut indexed: HashMap<String, LookupRow> = HashMap::with_capacity(rows.len());
        let mut shadowed = 0usize;

        for mut row in rows {
            let key = stringify(row.get(key_column).unwrap_or(&Value::Null));

            for value in row.values_mut() {
                if value.as_str() == Some("") {
                    *value = Value::Null;
                }
            }

            if indexed.contains_key(&key) {
                shadowed += 1;
                continue;
            }
            indexed.insert(key, row);
        }

        if shadowed > 0 {
            debug!(shadowed, "duplicate join keys in dataset; first row kept");
        }

        Self { rows: indexed }
    }

    /// Exact string match on the join key. No normalization beyond the
    /// stringification applied at build time.
    pub fn lookup(&self, key: &str) -> Option<&LookupRow> {
        self.rows.get(key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// String form of a join-key cell. Strings pass through unquoted; other
/// scalars use their JSON rendering.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
