//! Reference dataset loading
//!
//! The dataset is a headered CSV, read either from the local filesystem or
//! from the object store when the configured path is a `store://<key>`
//! reference. Loading happens once at startup; failures here abort the
//! service rather than individual pipeline runs.

use crate::services::lookup::LookupRow;
use crate::store::ObjectStorage;
use serde_json::Value;
use tagmill_common::{Error, Result};
use tracing::info;

/// Path prefix marking a dataset held in the object store
pub const STORE_SCHEME: &str = "store://";

/// Load the reference rows from `dataset_path`.
pub async fn load_rows(store: &dyn ObjectStorage, dataset_path: &str) -> Result<Vec<LookupRow>> {
    let bytes = if let Some(key) = dataset_path.strip_prefix(STORE_SCHEME) {
        store
            .fetch_bytes(key)
            .await
            .map_err(|e| Error::Config(format!("failed to load dataset from store: {e}")))?
    } else {
        tokio::fs::read(dataset_path).await?
    };

    let rows = parse_csv(&bytes)?;
    info!(rows = rows.len(), source = dataset_path, "reference dataset loaded");
    Ok(rows)
}

/// Parse CSV content into column-name → value rows.
///
/// Fields are typed by inference: integer, then float, then boolean, else
/// string. Empty fields stay empty strings here; the lookup table rewrites
/// them to null when it builds its index.
pub fn parse_csv(bytes: &[u8]) -> Result<Vec<LookupRow>> {
    let mut reader = csv::Reader::from_reader(bytes);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| Error::InvalidInput(format!("unreadable dataset header: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| Error::InvalidInput(format!("malformed dataset row: {e}")))?;
        let mut row = LookupRow::new();
        for (header, field) in headers.iter().zip(record.iter()) {
            row.insert(header.clone(), infer_value(field));
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Verify the join-key column exists in the dataset. An empty dataset
/// passes (it yields an empty lookup table).
pub fn ensure_column(rows: &[LookupRow], column: &str) -> Result<()> {
    match rows.first() {
        Some(first) if !first.contains_key(column) => Err(Error::Config(format!(
            "join key column '{column}' not present in dataset"
        ))),
        _ => Ok(()),
    }
}

fn infer_value(field: &str) -> Value {
    if let Ok(n) = field.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(f) = field.parse::<f64>() {
        // Non-finite parses (inf, NaN) become null rather than a NaN marker.
        return Value::from(f);
    }
    match field {
        "true" | "True" | "TRUE" => Value::Bool(true),
        "false" | "False" | "FALSE" => Value::Bool(false),
        _ => Value::String(field.to_string()),
    }
}
