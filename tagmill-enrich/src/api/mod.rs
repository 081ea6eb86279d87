//! HTTP API handlers

pub mod enrich;
pub mod health;

pub use enrich::enrich_routes;
pub use health::health_routes;
