//! Core types and service wiring for the quoteboard shipping quote aggregator.

/// Aggregation of quote history into carrier metrics.
pub mod metrics;
/// Domain models shared by all providers.
pub mod model;
/// Traits describing the provider and store interfaces.
pub mod ports;
/// High-level service facade used by clients.
pub mod service;
/// In-memory quote history.
pub mod store;

pub use metrics::*;
pub use model::*;
pub use ports::*;
pub use service::*;
pub use store::*;
