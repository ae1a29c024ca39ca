//! Configuration types for the partition assignment engine.
//!
//! The host runtime hands each task a flat map of string settings. The keys
//! the engine understands are listed in [`keys`]; everything else is
//! ignored. Settings can also be loaded from a YAML document holding the
//! same flat mapping, which is what the CLI uses.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// Setting keys recognised by [`AssignmentConfig::from_settings`].
pub mod keys {
    /// Comma-separated partition allow-list.
    pub const PARTITIONS: &str = "partitions";
    /// Comma-separated topic allow-list.
    pub const TOPICS: &str = "topics";
    /// Comma-separated topic deny-list.
    pub const TOPICS_IGNORE: &str = "topics.ignore";
    /// Whether topic-partitions are split across the task pool.
    pub const SPLIT_TOPICS: &str = "tasks.splitTopics";
    /// Size of the task pool.
    pub const TASK_COUNT: &str = "taskCount";
    /// Index of this task within the pool.
    pub const TASK_NUM: &str = "taskNum";
}

/// Immutable assignment configuration for one task.
///
/// Built once at task startup and shared read-only by every evaluation.
/// An empty set means "no restriction" for that dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentConfig {
    /// Partitions this task may consume. Empty admits every partition.
    pub partitions: BTreeSet<u32>,

    /// Topics this task may consume. Empty admits every topic.
    pub topics_allow: BTreeSet<String>,

    /// Topics this task never consumes. Takes precedence over `topics_allow`.
    pub topics_ignore: BTreeSet<String>,

    /// Whether topic-partitions are sharded across the task pool.
    pub split_enabled: bool,

    /// Number of cooperating tasks. Only meaningful when splitting.
    pub task_count: u32,

    /// Index of this task within the pool, in `[0, task_count)`.
    pub task_index: u32,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            partitions: BTreeSet::new(),
            topics_allow: BTreeSet::new(),
            topics_ignore: BTreeSet::new(),
            split_enabled: false,
            task_count: default_task_count(),
            task_index: 0,
        }
    }
}

fn default_task_count() -> u32 {
    1
}

impl AssignmentConfig {
    /// Build and validate a configuration from flat key/value settings.
    ///
    /// Values may reference environment variables as `${VAR_NAME}`.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or boolean setting is malformed, or if
    /// the task index does not fit the task pool while splitting is enabled.
    pub fn from_settings<I, K, V>(settings: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();

        for (key, value) in settings {
            let key = key.as_ref();
            let value = expand_env_vars(value.as_ref());

            match key {
                keys::PARTITIONS => {
                    config.partitions = split_list(&value)
                        .map(|entry| parse_u32(key, entry))
                        .collect::<ConfigResult<_>>()?;
                }
                keys::TOPICS => {
                    config.topics_allow = split_list(&value).map(str::to_string).collect();
                }
                keys::TOPICS_IGNORE => {
                    config.topics_ignore = split_list(&value).map(str::to_string).collect();
                }
                keys::SPLIT_TOPICS => config.split_enabled = parse_bool(key, &value)?,
                keys::TASK_COUNT => config.task_count = parse_u32(key, &value)?,
                keys::TASK_NUM => config.task_index = parse_u32(key, &value)?,
                other => debug!(key = other, "ignoring unrecognised setting"),
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Load settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if
    /// validation fails.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        SettingsFile::from_file(path)?.assignment_config()
    }

    /// Load settings from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails.
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        SettingsFile::from_yaml_str(content)?.assignment_config()
    }

    /// Restrict the task to the given partitions.
    #[must_use]
    pub fn with_partitions(mut self, partitions: impl IntoIterator<Item = u32>) -> Self {
        self.partitions = partitions.into_iter().collect();
        self
    }

    /// Restrict the task to the given topics.
    #[must_use]
    pub fn with_topics<S: Into<String>>(mut self, topics: impl IntoIterator<Item = S>) -> Self {
        self.topics_allow = topics.into_iter().map(Into::into).collect();
        self
    }

    /// Exclude the given topics.
    #[must_use]
    pub fn with_ignored_topics<S: Into<String>>(
        mut self,
        topics: impl IntoIterator<Item = S>,
    ) -> Self {
        self.topics_ignore = topics.into_iter().map(Into::into).collect();
        self
    }

    /// Enable splitting across `task_count` tasks, as task `task_index`.
    #[must_use]
    pub fn with_split(mut self, task_count: u32, task_index: u32) -> Self {
        self.split_enabled = true;
        self.task_count = task_count;
        self.task_index = task_index;
        self
    }

    /// Validate the task pool settings.
    ///
    /// # Errors
    ///
    /// Returns an error if splitting is enabled and:
    /// - `task_count` is zero
    /// - `task_index` is not less than `task_count`
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.split_enabled {
            return Ok(());
        }

        if self.task_count == 0 {
            return Err(ConfigError::InvalidTaskCount(self.task_count));
        }

        if self.task_index >= self.task_count {
            return Err(ConfigError::TaskIndexOutOfRange {
                task_index: self.task_index,
                task_count: self.task_count,
            });
        }

        Ok(())
    }
}

/// A YAML settings document.
///
/// Holds the flat engine settings plus an optional `logging` section used
/// by the binary.
///
/// ```yaml
/// partitions: "0,1,2"
/// topics.ignore: [audit, dlq]
/// tasks.splitTopics: true
/// taskCount: 5
/// taskNum: 2
/// logging:
///   level: debug
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SettingsFile {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Engine settings, as written in the document.
    #[serde(flatten)]
    pub settings: BTreeMap<String, serde_yaml::Value>,
}

impl SettingsFile {
    /// Read a settings document from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse a settings document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a YAML mapping.
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Flatten the document into string settings.
    ///
    /// Numbers and booleans are rendered as text and sequences are joined
    /// with commas, so `topics: [a, b]` reads the same as `topics: "a,b"`.
    ///
    /// # Errors
    ///
    /// Returns an error if a setting holds a mapping or a nested sequence.
    pub fn string_settings(&self) -> ConfigResult<BTreeMap<String, String>> {
        self.settings
            .iter()
            .map(|(key, value)| {
                let text = match value {
                    serde_yaml::Value::Sequence(items) => items
                        .iter()
                        .map(|item| scalar_to_string(key, item))
                        .collect::<ConfigResult<Vec<_>>>()?
                        .join(","),
                    scalar => scalar_to_string(key, scalar)?,
                };
                Ok((key.clone(), text))
            })
            .collect()
    }

    /// Build the assignment configuration from this document.
    ///
    /// # Errors
    ///
    /// Returns an error if a setting is malformed or validation fails.
    pub fn assignment_config(&self) -> ConfigResult<AssignmentConfig> {
        AssignmentConfig::from_settings(self.string_settings()?)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output logs in JSON format (for production).
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn scalar_to_string(key: &str, value: &serde_yaml::Value) -> ConfigResult<String> {
    match value {
        serde_yaml::Value::Null => Ok(String::new()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::String(s) => Ok(s.clone()),
        _ => Err(ConfigError::NonScalarSetting(key.to_string())),
    }
}

/// Split a comma-separated list, dropping blank entries.
fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|entry| !entry.is_empty())
}

fn parse_u32(key: &str, value: &str) -> ConfigResult<u32> {
    let value = value.trim();
    value.parse().map_err(|source| ConfigError::InvalidInteger {
        key: key.to_string(),
        value: value.to_string(),
        source,
    })
}

fn parse_bool(key: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidBoolean {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Expand environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of the environment variable `VAR_NAME`.
/// If the variable is not set, replaces with an empty string.
fn expand_env_vars(s: &str) -> String {
    static ENV_VAR: OnceLock<Regex> = OnceLock::new();
    let re = ENV_VAR
        .get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex"));
    re.replace_all(s, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_default()
    })
    .to_string()
}
