//! Topic and partition inclusion rules.
//!
//! Decides whether a topic-partition is in scope for the connector at all,
//! before any task splitting happens. Rules are evaluated in a fixed order
//! and the first rejection wins:
//!
//! 1. Partition allow-list
//! 2. Topic deny-list
//! 3. Topic allow-list
//!
//! A rule is only installed when its list is non-empty, so an unrestricted
//! configuration evaluates no rules at all.

use std::collections::BTreeSet;
use std::fmt;

use crate::config::AssignmentConfig;

/// Why a topic-partition was rejected by the inclusion filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExclusionReason {
    /// The partition is not in the configured partition list.
    PartitionNotListed,
    /// The topic is in the ignore list.
    TopicIgnored,
    /// The topic is not in the configured topic list.
    TopicNotListed,
}

impl ExclusionReason {
    /// Short label, used for metrics and CLI output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PartitionNotListed => "partition_not_listed",
            Self::TopicIgnored => "topic_ignored",
            Self::TopicNotListed => "topic_not_listed",
        }
    }
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single inclusion rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InclusionRule {
    /// Only the listed partitions pass.
    PartitionAllowList(BTreeSet<u32>),
    /// The listed topics never pass.
    TopicDenyList(BTreeSet<String>),
    /// Only the listed topics pass.
    TopicAllowList(BTreeSet<String>),
}

impl InclusionRule {
    /// Check a topic-partition against this rule.
    ///
    /// Returns the rejection reason, or `None` if the candidate passes.
    #[must_use]
    pub fn check(&self, topic: &str, partition: u32) -> Option<ExclusionReason> {
        match self {
            Self::PartitionAllowList(partitions) => (!partitions.contains(&partition))
                .then_some(ExclusionReason::PartitionNotListed),
            Self::TopicDenyList(topics) => {
                topics.contains(topic).then_some(ExclusionReason::TopicIgnored)
            }
            Self::TopicAllowList(topics) => {
                (!topics.contains(topic)).then_some(ExclusionReason::TopicNotListed)
            }
        }
    }
}

/// Ordered chain of inclusion rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InclusionFilter {
    rules: Vec<InclusionRule>,
}

impl InclusionFilter {
    /// Build the rule chain from configuration.
    #[must_use]
    pub fn new(config: &AssignmentConfig) -> Self {
        let mut rules = Vec::with_capacity(3);

        if !config.partitions.is_empty() {
            rules.push(InclusionRule::PartitionAllowList(config.partitions.clone()));
        }
        if !config.topics_ignore.is_empty() {
            rules.push(InclusionRule::TopicDenyList(config.topics_ignore.clone()));
        }
        if !config.topics_allow.is_empty() {
            rules.push(InclusionRule::TopicAllowList(config.topics_allow.clone()));
        }

        Self { rules }
    }

    /// Evaluate the chain, returning the first rejection.
    #[must_use]
    pub fn check(&self, topic: &str, partition: u32) -> Option<ExclusionReason> {
        self.rules
            .iter()
            .find_map(|rule| rule.check(topic, partition))
    }

    /// Whether the topic-partition is in scope.
    #[must_use]
    pub fn matches(&self, topic: &str, partition: u32) -> bool {
        self.check(topic, partition).is_none()
    }

    /// The installed rules, in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[InclusionRule] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(config: AssignmentConfig) -> InclusionFilter {
        InclusionFilter::new(&config)
    }

    #[test]
    fn test_unrestricted_has_no_rules() {
        let f = filter(AssignmentConfig::default());
        assert!(f.rules().is_empty());
        assert!(f.matches("anyTopic", 1));
        assert!(f.matches("", u32::MAX));
    }

    #[test]
    fn test_partition_allow_list() {
        let f = filter(AssignmentConfig::default().with_partitions([1, 999, 2]));
        assert!(f.matches("anyTopic", 999));
        assert!(!f.matches("anyTopic", 998));
        assert_eq!(
            f.check("anyTopic", 998),
            Some(ExclusionReason::PartitionNotListed)
        );
    }

    #[test]
    fn test_topic_allow_list() {
        let f = filter(AssignmentConfig::default().with_topics(["topic1", "topic2"]));
        assert!(!f.matches("anyTopic", 1));
        assert!(f.matches("topic1", 1));
        assert!(f.matches("topic2", 1));
        assert_eq!(f.check("anyTopic", 1), Some(ExclusionReason::TopicNotListed));
    }

    #[test]
    fn test_topic_deny_list() {
        let f = filter(AssignmentConfig::default().with_ignored_topics(["topic1", "topic2"]));
        assert!(f.matches("anyTopic", 1));
        assert!(!f.matches("topic1", 1));
        assert!(!f.matches("topic2", 1));
        assert_eq!(f.check("topic1", 1), Some(ExclusionReason::TopicIgnored));
    }

    #[test]
    fn test_ignore_wins_over_allow() {
        let f = filter(
            AssignmentConfig::default()
                .with_topics(["topic1", "topic2"])
                .with_ignored_topics(["topic1"]),
        );
        assert_eq!(f.check("topic1", 0), Some(ExclusionReason::TopicIgnored));
        assert!(f.matches("topic2", 0));
    }

    #[test]
    fn test_partition_rule_checked_first() {
        let f = filter(
            AssignmentConfig::default()
                .with_partitions([0])
                .with_ignored_topics(["topic1"]),
        );
        assert_eq!(
            f.check("topic1", 5),
            Some(ExclusionReason::PartitionNotListed)
        );
        assert_eq!(f.check("topic1", 0), Some(ExclusionReason::TopicIgnored));
    }

    #[test]
    fn test_rule_order() {
        let f = filter(
            AssignmentConfig::default()
                .with_topics(["a"])
                .with_ignored_topics(["b"])
                .with_partitions([0]),
        );
        assert!(matches!(
            f.rules(),
            [
                InclusionRule::PartitionAllowList(_),
                InclusionRule::TopicDenyList(_),
                InclusionRule::TopicAllowList(_),
            ]
        ));
    }

    #[test]
    fn test_topic_match_is_exact() {
        let f = filter(AssignmentConfig::default().with_topics(["orders"]));
        assert!(!f.matches("orders-v2", 0));
        assert!(!f.matches("Orders", 0));
    }

    #[test]
    fn test_reason_labels() {
        assert_eq!(
            ExclusionReason::PartitionNotListed.to_string(),
            "partition_not_listed"
        );
        assert_eq!(ExclusionReason::TopicIgnored.as_str(), "topic_ignored");
        assert_eq!(ExclusionReason::TopicNotListed.as_str(), "topic_not_listed");
    }
}
