//! Composed task assignment.
//!
//! Runs the inclusion filter first and, for in-scope candidates, the shard
//! selector when task splitting is enabled:
//!
//! ```text
//! matches = included(topic, partition)
//!           && (!split_enabled || target(topic, partition) == task_index)
//! ```

use std::fmt;

use tracing::{debug, trace};

use crate::config::AssignmentConfig;
use crate::error::ConfigResult;
use crate::types::TopicPartition;

use super::{ExclusionReason, InclusionFilter, ShardSelector};

/// Outcome of evaluating one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// This task is responsible for the topic-partition.
    Owned,
    /// The topic-partition is out of scope for every task.
    Excluded(ExclusionReason),
    /// The topic-partition is in scope but belongs to another task.
    AssignedElsewhere {
        /// Index of the owning task.
        owner: u32,
    },
}

impl Verdict {
    /// Whether this task owns the candidate.
    #[must_use]
    pub fn is_owned(&self) -> bool {
        matches!(self, Self::Owned)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owned => f.write_str("owned"),
            Self::Excluded(reason) => write!(f, "excluded ({reason})"),
            Self::AssignedElsewhere { owner } => write!(f, "assigned to task {owner}"),
        }
    }
}

/// Decides which topic-partitions this task instance handles.
///
/// Holds no mutable state after construction, so a single instance can be
/// shared across threads and queried concurrently.
#[derive(Debug, Clone)]
pub struct PartitionAssigner {
    filter: InclusionFilter,
    /// `None` when task splitting is disabled.
    selector: Option<ShardSelector>,
}

impl PartitionAssigner {
    /// Create an assigner from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if splitting is enabled and the task pool settings
    /// are invalid.
    pub fn new(config: &AssignmentConfig) -> ConfigResult<Self> {
        config.validate()?;

        let selector = if config.split_enabled {
            Some(ShardSelector::new(config.task_index, config.task_count)?)
        } else {
            None
        };
        let filter = InclusionFilter::new(config);

        debug!(
            partitions = config.partitions.len(),
            topics = config.topics_allow.len(),
            ignored_topics = config.topics_ignore.len(),
            split_enabled = config.split_enabled,
            task_index = config.task_index,
            task_count = config.task_count,
            "built partition assigner"
        );

        Ok(Self { filter, selector })
    }

    /// Evaluate a candidate, explaining the decision.
    #[must_use]
    pub fn evaluate(&self, topic: &str, partition: u32) -> Verdict {
        let verdict = if let Some(reason) = self.filter.check(topic, partition) {
            Verdict::Excluded(reason)
        } else {
            match &self.selector {
                None => Verdict::Owned,
                Some(selector) => {
                    let owner = selector.target(topic, partition);
                    if owner == selector.task_index() {
                        Verdict::Owned
                    } else {
                        Verdict::AssignedElsewhere { owner }
                    }
                }
            }
        };

        trace!(topic, partition, ?verdict, "evaluated topic-partition");
        verdict
    }

    /// Whether this task should handle the topic-partition.
    #[must_use]
    pub fn matches(&self, topic: &str, partition: u32) -> bool {
        self.evaluate(topic, partition).is_owned()
    }

    /// Index of the task that owns the topic-partition, ignoring the
    /// inclusion rules. Always 0 when splitting is disabled.
    #[must_use]
    pub fn target_task(&self, topic: &str, partition: u32) -> u32 {
        self.selector
            .map_or(0, |selector| selector.target(topic, partition))
    }

    /// Keep only the candidates this task owns.
    pub fn filter_owned<'a, I>(
        &'a self,
        candidates: I,
    ) -> impl Iterator<Item = TopicPartition> + 'a
    where
        I: IntoIterator<Item = TopicPartition>,
        I::IntoIter: 'a,
    {
        candidates
            .into_iter()
            .filter(move |tp| self.matches(&tp.topic, tp.partition))
    }

    /// The inclusion rule chain.
    #[must_use]
    pub fn inclusion_filter(&self) -> &InclusionFilter {
        &self.filter
    }

    /// Whether topic-partitions are split across the task pool.
    #[must_use]
    pub fn split_enabled(&self) -> bool {
        self.selector.is_some()
    }

    /// This task's index (0 when splitting is disabled).
    #[must_use]
    pub fn task_index(&self) -> u32 {
        self.selector.map_or(0, |selector| selector.task_index())
    }

    /// Size of the task pool (1 when splitting is disabled).
    #[must_use]
    pub fn task_count(&self) -> u32 {
        self.selector.map_or(1, |selector| selector.task_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    fn assigner(config: AssignmentConfig) -> PartitionAssigner {
        PartitionAssigner::new(&config).unwrap()
    }

    #[test]
    fn test_default_matches_everything() {
        let a = assigner(AssignmentConfig::default());
        assert!(a.matches("anyTopic", 1));
        assert!(a.matches("other", 0));
        assert!(!a.split_enabled());
        assert_eq!(a.task_count(), 1);
        assert_eq!(a.task_index(), 0);
    }

    #[test]
    fn test_exclusion_short_circuits() {
        let a = assigner(
            AssignmentConfig::default()
                .with_ignored_topics(["audit"])
                .with_split(3, 0),
        );
        assert_eq!(
            a.evaluate("audit", 0),
            Verdict::Excluded(ExclusionReason::TopicIgnored)
        );
        assert!(!a.matches("audit", 0));
    }

    #[test]
    fn test_split_verdicts() {
        let count = 4;
        let owner = assigner(AssignmentConfig::default().with_split(count, 0))
            .target_task("orders", 7);

        for index in 0..count {
            let a = assigner(AssignmentConfig::default().with_split(count, index));
            let verdict = a.evaluate("orders", 7);
            if index == owner {
                assert_eq!(verdict, Verdict::Owned);
            } else {
                assert_eq!(verdict, Verdict::AssignedElsewhere { owner });
            }
        }
    }

    #[test]
    fn test_target_task_without_split() {
        let a = assigner(AssignmentConfig::default());
        assert_eq!(a.target_task("orders", 42), 0);
    }

    #[test]
    fn test_invalid_pool_rejected() {
        let mut config = AssignmentConfig::default().with_split(2, 0);
        config.task_index = 3;
        assert!(matches!(
            PartitionAssigner::new(&config),
            Err(ConfigError::TaskIndexOutOfRange { .. })
        ));

        config.task_count = 0;
        assert!(matches!(
            PartitionAssigner::new(&config),
            Err(ConfigError::InvalidTaskCount(0))
        ));
    }

    #[test]
    fn test_filter_owned() {
        let a = assigner(AssignmentConfig::default().with_partitions([0, 2]));
        let candidates = (0..4).map(|p| TopicPartition::new("orders", p));
        let owned: Vec<TopicPartition> = a.filter_owned(candidates).collect();
        assert_eq!(
            owned,
            vec![TopicPartition::new("orders", 0), TopicPartition::new("orders", 2)]
        );
    }

    #[test]
    fn test_filter_owned_partitions_pool() {
        let candidates: Vec<TopicPartition> = (0..20)
            .map(|p| TopicPartition::new("orders", p))
            .collect();

        let mut total = 0;
        for index in 0..3 {
            let a = assigner(AssignmentConfig::default().with_split(3, index));
            total += a.filter_owned(candidates.clone()).count();
        }
        assert_eq!(total, candidates.len());
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(Verdict::Owned.to_string(), "owned");
        assert_eq!(
            Verdict::Excluded(ExclusionReason::TopicNotListed).to_string(),
            "excluded (topic_not_listed)"
        );
        assert_eq!(
            Verdict::AssignedElsewhere { owner: 2 }.to_string(),
            "assigned to task 2"
        );
    }

    #[test]
    fn test_assigner_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PartitionAssigner>();
    }
}
