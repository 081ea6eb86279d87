//! Data models for enrichment runs

pub mod outcome;

pub use outcome::{BatchResult, EnrichmentOutcome, LookupValue, Strategy};
