//! Candidate types evaluated by the assigner.

use std::fmt;
use std::str::FromStr;

use crate::error::{CandidateError, CandidateResult};

/// A topic-partition offered to a task for evaluation.
///
/// Purely a value handed in by the caller; the assigner never stores one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TopicPartition {
    /// Topic name.
    pub topic: String,
    /// Partition number within the topic.
    pub partition: u32,
}

impl TopicPartition {
    /// Create a new topic-partition.
    pub fn new(topic: impl Into<String>, partition: u32) -> Self {
        Self {
            topic: topic.into(),
            partition,
        }
    }
}

impl fmt::Display for TopicPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.topic, self.partition)
    }
}

impl FromStr for TopicPartition {
    type Err = CandidateError;

    /// Parse `topic:partition`, splitting at the last `:` so topic names
    /// containing colons are preserved.
    fn from_str(s: &str) -> CandidateResult<Self> {
        let parts: Vec<&str> = s.rsplitn(2, ':').collect();
        if parts.len() != 2 {
            return Err(CandidateError::MissingPartition(s.to_string()));
        }
        let topic = parts[1];
        if topic.is_empty() {
            return Err(CandidateError::EmptyTopic(s.to_string()));
        }
        let partition = parts[0]
            .trim()
            .parse::<u32>()
            .map_err(|_| CandidateError::InvalidPartition {
                input: s.to_string(),
                partition: parts[0].to_string(),
            })?;
        Ok(Self::new(topic, partition))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(TopicPartition::new("orders", 3).to_string(), "orders:3");
    }

    #[test]
    fn test_parse() {
        let tp: TopicPartition = "orders:12".parse().unwrap();
        assert_eq!(tp, TopicPartition::new("orders", 12));
    }

    #[test]
    fn test_parse_topic_with_colon() {
        let tp: TopicPartition = "ns:orders:4".parse().unwrap();
        assert_eq!(tp.topic, "ns:orders");
        assert_eq!(tp.partition, 4);
    }

    #[test]
    fn test_parse_missing_partition() {
        let result = "orders".parse::<TopicPartition>();
        assert_eq!(
            result,
            Err(CandidateError::MissingPartition("orders".to_string()))
        );
    }

    #[test]
    fn test_parse_empty_topic() {
        let result = ":1".parse::<TopicPartition>();
        assert!(matches!(result, Err(CandidateError::EmptyTopic(_))));
    }

    #[test]
    fn test_parse_negative_partition() {
        let result = "orders:-1".parse::<TopicPartition>();
        assert!(matches!(
            result,
            Err(CandidateError::InvalidPartition { .. })
        ));
    }
}
