//! A simulated pool of cooperating tasks.

use std::collections::BTreeMap;

use crate::config::AssignmentConfig;
use crate::error::ConfigResult;
use crate::filter::PartitionAssigner;
use crate::types::TopicPartition;

/// Every task of a pool, evaluated side by side.
#[derive(Debug, Clone)]
pub struct TaskPool {
    /// Assigners indexed by task number.
    pub tasks: Vec<PartitionAssigner>,
    /// Configuration shared by every task (with `task_index` 0).
    pub config: AssignmentConfig,
}

impl TaskPool {
    /// Create a pool of `task_count` tasks with splitting enabled and no
    /// inclusion rules.
    ///
    /// # Panics
    ///
    /// Panics if `task_count` is zero.
    #[must_use]
    pub fn new(task_count: u32) -> Self {
        TaskPoolBuilder::new(task_count)
            .build()
            .expect("task pool configuration should be valid")
    }

    /// Build a pool from a base configuration, replacing its task index with
    /// every index in `[0, task_count)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: &AssignmentConfig) -> ConfigResult<Self> {
        config.validate()?;

        let task_count = if config.split_enabled {
            config.task_count
        } else {
            1
        };

        let tasks = (0..task_count)
            .map(|index| {
                let mut task_config = config.clone();
                task_config.task_index = index;
                PartitionAssigner::new(&task_config)
            })
            .collect::<ConfigResult<Vec<_>>>()?;

        let mut config = config.clone();
        config.task_index = 0;
        Ok(Self { tasks, config })
    }

    /// Number of tasks in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the pool has no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Get the assigner for a task index.
    #[must_use]
    pub fn task(&self, index: u32) -> Option<&PartitionAssigner> {
        self.tasks.get(index as usize)
    }

    /// Task indices that accept the topic-partition.
    #[must_use]
    pub fn owners_of(&self, topic: &str, partition: u32) -> Vec<u32> {
        self.tasks
            .iter()
            .zip(0u32..)
            .filter(|(task, _)| task.matches(topic, partition))
            .map(|(_, index)| index)
            .collect()
    }

    /// Count how many of the candidates each task accepts.
    ///
    /// Every task index appears in the result, including idle ones.
    #[must_use]
    pub fn distribution<'a, I>(&self, candidates: I) -> BTreeMap<u32, usize>
    where
        I: IntoIterator<Item = &'a TopicPartition>,
    {
        let mut counts: BTreeMap<u32, usize> = self
            .tasks
            .iter()
            .zip(0u32..)
            .map(|(_, index)| (index, 0))
            .collect();

        for tp in candidates {
            for index in self.owners_of(&tp.topic, tp.partition) {
                *counts.entry(index).or_insert(0) += 1;
            }
        }

        counts
    }
}

/// Builder for [`TaskPool`].
#[derive(Debug, Clone)]
pub struct TaskPoolBuilder {
    config: AssignmentConfig,
}

impl TaskPoolBuilder {
    /// Start a pool of `task_count` tasks with splitting enabled.
    #[must_use]
    pub fn new(task_count: u32) -> Self {
        Self {
            config: AssignmentConfig::default().with_split(task_count, 0),
        }
    }

    /// Restrict every task to the given partitions.
    #[must_use]
    pub fn partitions(mut self, partitions: impl IntoIterator<Item = u32>) -> Self {
        self.config = self.config.with_partitions(partitions);
        self
    }

    /// Restrict every task to the given topics.
    #[must_use]
    pub fn topics<S: Into<String>>(mut self, topics: impl IntoIterator<Item = S>) -> Self {
        self.config = self.config.with_topics(topics);
        self
    }

    /// Exclude the given topics from every task.
    #[must_use]
    pub fn ignored_topics<S: Into<String>>(mut self, topics: impl IntoIterator<Item = S>) -> Self {
        self.config = self.config.with_ignored_topics(topics);
        self
    }

    /// Build the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the task count is zero.
    pub fn build(self) -> ConfigResult<TaskPool> {
        TaskPool::from_config(&self.config)
    }
}
