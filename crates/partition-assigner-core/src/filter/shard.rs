//! Deterministic shard selection across a fixed task pool.
//!
//! Every topic-partition has exactly one owning task index, computed from
//! the pair alone:
//!
//! ```text
//! target = xxh3_64(topic_bytes ++ partition_be_bytes) % task_count
//! ```
//!
//! Each task evaluates the same function and keeps the candidates whose
//! target equals its own index, so the pool shards the keyspace without any
//! coordination. xxHash3 output is fixed by the algorithm and does not
//! depend on the process or platform, so every task computes the same target.

use std::num::NonZeroU32;

use xxhash_rust::xxh3::Xxh3;

use crate::error::{ConfigError, ConfigResult};

/// Stable 64-bit digest of a topic-partition.
///
/// The partition is appended as four big-endian bytes after the topic name,
/// so distinct pairs always feed distinct byte strings to the hasher.
#[must_use]
pub fn digest(topic: &str, partition: u32) -> u64 {
    let mut hasher = Xxh3::new();
    hasher.update(topic.as_bytes());
    hasher.update(&partition.to_be_bytes());
    hasher.digest()
}

/// Index of the task that owns a topic-partition in a pool of `task_count`.
///
/// The result is always in `[0, task_count)` and does not depend on which
/// task asks.
#[must_use]
pub fn target_index(topic: &str, partition: u32, task_count: NonZeroU32) -> u32 {
    // The remainder is below task_count, so it always fits in u32.
    (digest(topic, partition) % u64::from(task_count.get())) as u32
}

/// Whether `task_index` owns the topic-partition in a pool of `task_count`.
#[must_use]
pub fn owns(topic: &str, partition: u32, task_index: u32, task_count: NonZeroU32) -> bool {
    target_index(topic, partition, task_count) == task_index
}

/// Shard selector bound to one task's position in the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardSelector {
    task_index: u32,
    task_count: NonZeroU32,
}

impl ShardSelector {
    /// Create a selector for task `task_index` of `task_count`.
    ///
    /// # Errors
    ///
    /// Returns an error if `task_count` is zero or `task_index` is not less
    /// than `task_count`.
    pub fn new(task_index: u32, task_count: u32) -> ConfigResult<Self> {
        let count =
            NonZeroU32::new(task_count).ok_or(ConfigError::InvalidTaskCount(task_count))?;

        if task_index >= task_count {
            return Err(ConfigError::TaskIndexOutOfRange {
                task_index,
                task_count,
            });
        }

        Ok(Self {
            task_index,
            task_count: count,
        })
    }

    /// This task's index.
    #[must_use]
    pub fn task_index(&self) -> u32 {
        self.task_index
    }

    /// Size of the task pool.
    #[must_use]
    pub fn task_count(&self) -> u32 {
        self.task_count.get()
    }

    /// Index of the task that owns the topic-partition.
    #[must_use]
    pub fn target(&self, topic: &str, partition: u32) -> u32 {
        target_index(topic, partition, self.task_count)
    }

    /// Whether this task owns the topic-partition.
    #[must_use]
    pub fn owns(&self, topic: &str, partition: u32) -> bool {
        self.target(topic, partition) == self.task_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn test_new_validates_count() {
        assert!(matches!(
            ShardSelector::new(0, 0),
            Err(ConfigError::InvalidTaskCount(0))
        ));
    }

    #[test]
    fn test_new_validates_index() {
        assert!(matches!(
            ShardSelector::new(5, 5),
            Err(ConfigError::TaskIndexOutOfRange {
                task_index: 5,
                task_count: 5
            })
        ));
        assert!(ShardSelector::new(4, 5).is_ok());
    }

    #[test]
    fn test_accessors() {
        let selector = ShardSelector::new(2, 7).unwrap();
        assert_eq!(selector.task_index(), 2);
        assert_eq!(selector.task_count(), 7);
    }

    #[test]
    fn test_digest_is_stable() {
        assert_eq!(digest("orders", 3), digest("orders", 3));
        assert_ne!(digest("orders", 3), digest("orders", 4));
        assert_ne!(digest("orders", 3), digest("orderz", 3));
    }

    #[test]
    fn test_digest_separates_topic_and_partition() {
        // "a" + partition bytes must not collide with a longer topic name.
        assert_ne!(digest("a", 0), digest("a\0", 0));
        assert_ne!(digest("", 1), digest("\0\0\0\x01", 0));
    }

    #[test]
    fn test_single_task_owns_everything() {
        let selector = ShardSelector::new(0, 1).unwrap();
        for partition in 0..100 {
            assert!(selector.owns("orders", partition));
        }
    }

    #[test]
    fn test_exactly_one_owner() {
        let n = 5;
        let topics = ["eevee-banking-1", "eevee-banking-2", "eevee-adapter", "eevee-albatros"];

        for topic in topics {
            for partition in 0..4 {
                let owners = (0..n)
                    .filter(|&index| owns(topic, partition, index, count(n)))
                    .count();
                assert_eq!(owners, 1, "{topic}:{partition} should have one owner");
            }
        }
    }

    #[test]
    fn test_selector_agrees_with_free_function() {
        for index in 0..3 {
            let selector = ShardSelector::new(index, 3).unwrap();
            assert_eq!(
                selector.owns("payments", 9),
                owns("payments", 9, index, count(3))
            );
            assert_eq!(
                selector.target("payments", 9),
                target_index("payments", 9, count(3))
            );
        }
    }

    #[test]
    fn test_target_in_range() {
        for n in 1..=16 {
            for partition in 0..32 {
                let target = target_index("metrics", partition, count(n));
                assert!(target < n, "target {target} out of range for {n} tasks");
            }
        }
    }

    #[test]
    fn test_partitions_of_one_topic_spread() {
        let targets: std::collections::HashSet<u32> = (0..50)
            .map(|partition| target_index("orders", partition, count(5)))
            .collect();
        assert_eq!(targets.len(), 5, "50 partitions should reach every task");
    }

    #[test]
    fn test_distribution_is_reasonably_uniform() {
        // 10,000 pairs across 10 tasks: each task should get roughly 1,000.
        let n = 10;
        let mut counts = vec![0u32; n as usize];

        for t in 0..1000 {
            let topic = format!("topic-{t}");
            for partition in 0..10 {
                counts[target_index(&topic, partition, count(n)) as usize] += 1;
            }
        }

        for (index, &c) in counts.iter().enumerate() {
            assert!(
                (800..=1200).contains(&c),
                "task {index} got {c} pairs, expected ~1000"
            );
        }
    }
}
