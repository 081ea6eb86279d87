//! Join-key extraction from object storage keys
//!
//! Deployments differ in how their object keys encode the identifier that
//! joins against the reference dataset, so extraction is a trait seam: the
//! pipeline takes any `KeyExtractor`, with [`StemKeyExtractor`] as the
//! stock policy.

/// Derives the join key from an object's storage key.
///
/// Implementations must be pure: no I/O, no failure mode, always a string
/// (possibly empty).
pub trait KeyExtractor: Send + Sync {
    fn extract(&self, object_key: &str) -> String;
}

/// Stock policy: final path segment of the key, truncated at the first `.`.
///
/// `"a/b/c.ext"` yields `"c"`; a key ending in `/` yields the empty string.
#[derive(Debug, Default, Clone, Copy)]
pub struct StemKeyExtractor;

impl KeyExtractor for StemKeyExtractor {
    fn extract(&self, object_key: &str) -> String {
        let file_name = object_key.rsplit('/').next().unwrap_or(object_key);
        let stem = file_name.split('.').next().unwrap_or(file_name);
        stem.to_string()
    }
}
