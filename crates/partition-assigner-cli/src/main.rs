//! Partition Assigner CLI
//!
//! Answers "which connector task handles this topic-partition?" for a given
//! set of task settings, without starting a connector.

use std::collections::BTreeMap;
use std::io::{self, Write};

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use partition_assigner_core::config::{keys, LoggingConfig, SettingsFile};
use partition_assigner_core::{
    AssignmentConfig, AssignmentMetrics, ConfigResult, PartitionAssigner, TopicPartition,
    Verdict,
};

/// Topic-partition assignment inspector.
#[derive(Parser)]
#[command(name = "partition-assigner")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a YAML settings file.
    #[arg(short, long)]
    config: Option<String>,

    /// Override a setting, e.g. `--set taskCount=5`. May be repeated.
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    overrides: Vec<(String, String)>,

    /// Override the task index (`taskNum`).
    #[arg(long)]
    task_num: Option<u32>,

    /// Print Prometheus metrics for the evaluated candidates.
    #[arg(long)]
    metrics: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show whether the configured task handles each topic-partition.
    Check {
        /// Candidates as `topic:partition`.
        #[arg(required = true)]
        candidates: Vec<TopicPartition>,
    },
    /// Show which task of the pool handles each topic-partition.
    Plan {
        /// Candidates as `topic:partition`.
        #[arg(required = true)]
        candidates: Vec<TopicPartition>,
    },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid setting '{s}' (expected KEY=VALUE)"))?;
    if key.trim().is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load settings
    let file = match &args.config {
        Some(path) => SettingsFile::from_file(path)?,
        None => SettingsFile::default(),
    };

    // Override log level from verbosity flag
    let log_config = match args.verbose {
        0 => file.logging.clone(),
        1 => LoggingConfig {
            level: "debug".to_string(),
            ..file.logging.clone()
        },
        _ => LoggingConfig {
            level: "trace".to_string(),
            ..file.logging.clone()
        },
    };

    setup_tracing(&log_config);

    let settings = merge_settings(&file, &args.overrides, args.task_num)?;
    let config = AssignmentConfig::from_settings(&settings)?;
    let assigner = PartitionAssigner::new(&config)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        split_enabled = assigner.split_enabled(),
        task_index = assigner.task_index(),
        task_count = assigner.task_count(),
        "loaded task settings"
    );

    let metrics = AssignmentMetrics::new();
    metrics.set_task_count(assigner.task_count());

    let mut out = io::stdout().lock();
    match &args.command {
        Command::Check { candidates } => run_check(&mut out, &assigner, candidates, &metrics)?,
        Command::Plan { candidates } => run_plan(&mut out, &assigner, candidates, &metrics)?,
    }

    if args.metrics {
        let output = metrics
            .encode()
            .map_err(|e| anyhow::anyhow!("failed to encode metrics: {e}"))?;
        write!(out, "{output}")?;
    }

    Ok(())
}

/// Layer the command-line settings over the file: `--set` entries in order,
/// then `--task-num`.
fn merge_settings(
    file: &SettingsFile,
    overrides: &[(String, String)],
    task_num: Option<u32>,
) -> ConfigResult<BTreeMap<String, String>> {
    let mut settings = file.string_settings()?;
    for (key, value) in overrides {
        settings.insert(key.clone(), value.clone());
    }
    if let Some(task_num) = task_num {
        settings.insert(keys::TASK_NUM.to_string(), task_num.to_string());
    }
    Ok(settings)
}

fn setup_tracing(config: &LoggingConfig) {
    let level = match config.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // stdout carries results only
    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Print this task's verdict for each candidate.
fn run_check<W: Write>(
    out: &mut W,
    assigner: &PartitionAssigner,
    candidates: &[TopicPartition],
    metrics: &AssignmentMetrics,
) -> io::Result<()> {
    for tp in candidates {
        let verdict = assigner.evaluate(&tp.topic, tp.partition);
        metrics.record_verdict(&verdict);
        writeln!(out, "{tp}\t{verdict}")?;
    }
    Ok(())
}

/// Print the owning task for each candidate, then the load per task.
fn run_plan<W: Write>(
    out: &mut W,
    assigner: &PartitionAssigner,
    candidates: &[TopicPartition],
    metrics: &AssignmentMetrics,
) -> io::Result<()> {
    let mut load: BTreeMap<u32, usize> =
        (0..assigner.task_count()).map(|task| (task, 0)).collect();
    let mut excluded = 0usize;

    for tp in candidates {
        let verdict = assigner.evaluate(&tp.topic, tp.partition);
        metrics.record_verdict(&verdict);

        match verdict {
            Verdict::Excluded(reason) => {
                excluded += 1;
                writeln!(out, "{tp}\t-\t{reason}")?;
            }
            Verdict::Owned | Verdict::AssignedElsewhere { .. } => {
                let owner = assigner.target_task(&tp.topic, tp.partition);
                *load.entry(owner).or_insert(0) += 1;
                writeln!(out, "{tp}\ttask {owner}")?;
            }
        }
    }

    writeln!(out)?;
    for (task, count) in &load {
        writeln!(out, "task {task}\t{count}")?;
    }
    if excluded > 0 {
        writeln!(out, "excluded\t{excluded}")?;
    }
    Ok(())
}
