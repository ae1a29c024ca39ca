//! Test utilities for the partition assignment engine.
//!
//! - [`TaskPool`] - one assigner per task index, all built from the same
//!   configuration, for checking pool-wide properties
//! - [`TaskPoolBuilder`] - builder for pools with custom inclusion rules
//!
//! # Example
//!
//! ```rust
//! use partition_assigner_core::testing::TaskPool;
//!
//! let pool = TaskPool::new(5);
//! assert_eq!(pool.owners_of("orders", 0).len(), 1);
//! ```

pub mod pool;

pub use pool::{TaskPool, TaskPoolBuilder};
