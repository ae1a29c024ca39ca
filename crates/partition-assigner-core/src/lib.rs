//! Partition Assignment Core Library
//!
//! This library decides which topic-partitions a connector task should
//! consume. A fixed pool of N cooperating tasks each build a
//! [`PartitionAssigner`] from the same settings and their own task index;
//! every task then evaluates candidates independently, and the pool as a
//! whole accepts each in-scope topic-partition exactly once.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Settings parsing and validation
//! - [`error`] - Domain-specific error types
//! - [`filter`] - Inclusion rules, shard selection and the composed assigner
//! - [`metrics`] - Prometheus metrics for assignment outcomes
//! - [`types`] - Candidate topic-partition type
//!
//! # Example
//!
//! ```rust
//! use partition_assigner_core::{AssignmentConfig, PartitionAssigner};
//!
//! let config = AssignmentConfig::from_settings([
//!     ("topics.ignore", "audit"),
//!     ("tasks.splitTopics", "true"),
//!     ("taskCount", "5"),
//!     ("taskNum", "2"),
//! ])?;
//! let assigner = PartitionAssigner::new(&config)?;
//!
//! assert!(!assigner.matches("audit", 0));
//! # Ok::<(), partition_assigner_core::ConfigError>(())
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod types;

/// Test utilities for exercising a whole task pool.
///
/// This module is only available when compiling tests or when the `testing` feature is enabled.
#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export commonly used types
pub use config::{AssignmentConfig, LoggingConfig, SettingsFile};
pub use error::{CandidateError, ConfigError, ConfigResult};
pub use filter::{ExclusionReason, PartitionAssigner, Verdict};
pub use metrics::AssignmentMetrics;
pub use types::TopicPartition;
