//! Prometheus metrics for partition assignment.

use prometheus::{Counter, CounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::filter::Verdict;

/// Assignment metrics collection.
pub struct AssignmentMetrics {
    /// The Prometheus registry.
    pub registry: Registry,

    /// Total candidates evaluated.
    pub candidates_evaluated: Counter,

    /// Candidates owned by this task.
    pub candidates_owned: Counter,

    /// Candidates rejected by the inclusion filter, by reason.
    pub candidates_excluded: CounterVec,

    /// Candidates in scope but owned by another task.
    pub candidates_assigned_elsewhere: Counter,

    /// Configured size of the task pool.
    pub task_count: IntGauge,
}

impl AssignmentMetrics {
    /// Create a new metrics collection.
    ///
    /// # Panics
    ///
    /// Panics if metric registration fails (should not happen with unique names).
    #[must_use]
    pub fn new() -> Self {
        let registry = Registry::new();

        let candidates_evaluated = Counter::new(
            "partition_assigner_candidates_evaluated_total",
            "Total number of topic-partitions evaluated",
        )
        .expect("metric creation should succeed");

        let candidates_owned = Counter::new(
            "partition_assigner_candidates_owned_total",
            "Topic-partitions owned by this task",
        )
        .expect("metric creation should succeed");

        let candidates_excluded = CounterVec::new(
            Opts::new(
                "partition_assigner_candidates_excluded_total",
                "Topic-partitions rejected by the inclusion filter by reason",
            ),
            &["reason"],
        )
        .expect("metric creation should succeed");

        let candidates_assigned_elsewhere = Counter::new(
            "partition_assigner_candidates_assigned_elsewhere_total",
            "In-scope topic-partitions owned by another task",
        )
        .expect("metric creation should succeed");

        let task_count = IntGauge::new(
            "partition_assigner_task_count",
            "Configured number of cooperating tasks",
        )
        .expect("metric creation should succeed");

        registry
            .register(Box::new(candidates_evaluated.clone()))
            .expect("metric registration should succeed");
        registry
            .register(Box::new(candidates_owned.clone()))
            .expect("metric registration should succeed");
        registry
            .register(Box::new(candidates_excluded.clone()))
            .expect("metric registration should succeed");
        registry
            .register(Box::new(candidates_assigned_elsewhere.clone()))
            .expect("metric registration should succeed");
        registry
            .register(Box::new(task_count.clone()))
            .expect("metric registration should succeed");

        Self {
            registry,
            candidates_evaluated,
            candidates_owned,
            candidates_excluded,
            candidates_assigned_elsewhere,
            task_count,
        }
    }

    /// Record the outcome of one evaluation.
    pub fn record_verdict(&self, verdict: &Verdict) {
        self.candidates_evaluated.inc();
        match verdict {
            Verdict::Owned => self.candidates_owned.inc(),
            Verdict::Excluded(reason) => self
                .candidates_excluded
                .with_label_values(&[reason.as_str()])
                .inc(),
            Verdict::AssignedElsewhere { .. } => self.candidates_assigned_elsewhere.inc(),
        }
    }

    /// Set the configured task pool size.
    pub fn set_task_count(&self, count: u32) {
        self.task_count.set(i64::from(count));
    }

    /// Encode metrics in Prometheus text format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = String::new();
        encoder.encode_utf8(&metric_families, &mut buffer)?;
        Ok(buffer)
    }
}

impl Default for AssignmentMetrics {
    fn default() -> Self {
        Self::new()
    }
}
