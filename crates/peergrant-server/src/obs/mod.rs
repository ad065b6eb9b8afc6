//! Lightweight in-process metrics.
//!
//! Metrics are stored as atomics and rendered in Prometheus text format by
//! whatever ops surface the embedding server exposes.

pub mod metrics;

pub use metrics::PeerGrantMetrics;
