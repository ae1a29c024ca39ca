//! Topic-partition assignment logic.
//!
//! This module decides whether a task instance should handle a given
//! topic-partition. Evaluation runs in two stages:
//!
//! - [`InclusionFilter`] applies the partition allow-list and the topic
//!   allow/deny lists
//! - [`ShardSelector`] maps in-scope candidates onto exactly one task of the
//!   pool when task splitting is enabled
//!
//! [`PartitionAssigner`] composes both and is the type callers hold on to.

mod assigner;
mod inclusion;
mod shard;

pub use assigner::{PartitionAssigner, Verdict};
pub use inclusion::{ExclusionReason, InclusionFilter, InclusionRule};
pub use shard::{digest, owns, target_index, ShardSelector};
