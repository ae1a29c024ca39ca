//! Domain error types for the partition assignment engine.
//!
//! Uses `thiserror` for ergonomic error definitions with proper context.
//! Every error here is raised while building an assigner; evaluating a
//! candidate never fails.

use std::num::ParseIntError;

use thiserror::Error;

/// Errors related to configuration parsing and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A setting that must be an integer could not be parsed.
    #[error("invalid integer '{value}' for setting '{key}': {source}")]
    InvalidInteger {
        key: String,
        value: String,
        #[source]
        source: ParseIntError,
    },

    /// A setting that must be a boolean was neither `true` nor `false`.
    #[error("invalid boolean '{value}' for setting '{key}' (expected 'true' or 'false')")]
    InvalidBoolean { key: String, value: String },

    /// Task splitting needs at least one task in the pool.
    #[error("taskCount must be at least 1 when task splitting is enabled, got {0}")]
    InvalidTaskCount(u32),

    /// The task index does not identify a member of the pool.
    #[error("taskNum ({task_index}) must be less than taskCount ({task_count})")]
    TaskIndexOutOfRange { task_index: u32, task_count: u32 },

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("failed to parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// A YAML setting held a list or mapping instead of a scalar.
    #[error("setting '{0}' must be a string, number or boolean")]
    NonScalarSetting(String),
}

/// Errors raised when reading a `topic:partition` candidate from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CandidateError {
    /// No `:` separator between topic and partition.
    #[error("missing partition in '{0}' (expected 'topic:partition')")]
    MissingPartition(String),

    /// The topic part was empty.
    #[error("empty topic name in '{0}'")]
    EmptyTopic(String),

    /// The partition part was not a non-negative integer.
    #[error("invalid partition '{partition}' in '{input}'")]
    InvalidPartition { input: String, partition: String },
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for candidate parsing.
pub type CandidateResult<T> = std::result::Result<T, CandidateError>;
