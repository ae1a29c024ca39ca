//! Metrics collection for partition assignment.
//!
//! Provides Prometheus-compatible counters describing how candidates were
//! decided. The assigner itself never records anything; callers feed
//! verdicts in after evaluation.

pub mod prometheus;

pub use prometheus::AssignmentMetrics;
