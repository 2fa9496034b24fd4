//! Vitalwatch CLI - Command-line interface for the monitoring engine
//!
//! Commands:
//! - watch: run the engine against a latest-vitals endpoint
//! - check: evaluate a single sample offline
//! - thresholds: print the effective threshold tables

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Utc};
use vitalwatch::config::MonitorConfig;
use vitalwatch::engine::MonitorEngine;
use vitalwatch::notify::LogBridge;
use vitalwatch::source::{HttpSampleSource, LatestVitals};
use vitalwatch::thresholds::{self, ThresholdTable};
use vitalwatch::types::{vital_label, VitalStatus};
use vitalwatch::ENGINE_VERSION;

/// Vitalwatch - real-time patient vitals monitoring
#[derive(Parser)]
#[command(name = "vitalwatch")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Monitor a vitals feed with threshold alarms and reminders", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the monitoring engine against a vitals feed
    Watch {
        /// Latest-vitals endpoint URL
        #[arg(long)]
        url: String,

        /// Engine configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Seed reminders from a JSON file of definitions
        #[arg(long)]
        reminders: Option<PathBuf>,

        /// Stop after this many seconds (runs until Ctrl-C when unset)
        #[arg(long)]
        duration_secs: Option<u64>,
    },

    /// Evaluate a single sample from a file (use - for stdin)
    Check {
        /// Input file with a latest-vitals JSON object
        #[arg(short, long)]
        input: PathBuf,

        /// Which table to evaluate against
        #[arg(long, default_value = "both")]
        table: TableChoice,

        /// Engine configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective threshold tables
    Thresholds {
        /// Engine configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TableChoice {
    /// Advisory table (visualization ranges)
    Advisory,
    /// Critical table (alarm ranges)
    Critical,
    /// Both tables
    Both,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Watch {
            url,
            config,
            reminders,
            duration_secs,
        } => cmd_watch(&url, config.as_deref(), reminders.as_deref(), duration_secs),
        Commands::Check {
            input,
            table,
            config,
            json,
        } => cmd_check(&input, table, config.as_deref(), json),
        Commands::Thresholds { config, json } => cmd_thresholds(config.as_deref(), json),
    }
}

fn load_config(path: Option<&Path>) -> Result<MonitorConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => MonitorConfig::from_json(&fs::read_to_string(path)?)?,
        None => MonitorConfig::default(),
    };
    Ok(config)
}

fn cmd_watch(
    url: &str,
    config_path: Option<&Path>,
    reminders_path: Option<&Path>,
    duration_secs: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let reminder_seed = reminders_path.map(fs::read_to_string).transpose()?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let engine = MonitorEngine::start(
            config,
            Arc::new(HttpSampleSource::new(url)),
            Arc::new(LogBridge),
        );

        if let Some(seed) = reminder_seed {
            let store = engine.reminder_store();
            let count = store
                .lock()
                .await
                .seed_from_json(&seed, Local::now().naive_local())?;
            tracing::info!(count, "reminders seeded");
        }

        match duration_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => {
                tokio::signal::ctrl_c().await?;
                tracing::info!("interrupt received");
            }
        }

        engine.stop();

        let history_len = engine.history().lock().await.len();
        let active = engine.alarms().lock().await.active().len();
        let outstanding = engine.scheduler().lock().await.active().len();
        tracing::info!(
            history_len,
            active_alarms = active,
            outstanding_reminders = outstanding,
            "session summary"
        );
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

fn cmd_check(
    input: &Path,
    table: TableChoice,
    config_path: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let wire: LatestVitals = serde_json::from_str(&raw)?;
    let Some(sample) = wire.into_sample(Utc::now()) else {
        eprintln!("no vitals present in input");
        return Ok(());
    };

    let config = load_config(config_path)?;
    let tables: Vec<(&str, &ThresholdTable)> = match table {
        TableChoice::Advisory => vec![("advisory", &config.advisory)],
        TableChoice::Critical => vec![("critical", &config.critical)],
        TableChoice::Both => vec![
            ("advisory", &config.advisory),
            ("critical", &config.critical),
        ],
    };

    let pretty = !json && atty::is(atty::Stream::Stdout);
    for (name, table) in tables {
        let statuses = thresholds::evaluate(&sample, table);
        if pretty {
            println!("{name}:");
            for status in &statuses {
                print_status(status);
            }
        } else {
            let line = serde_json::json!({ "table": name, "statuses": statuses });
            println!("{}", serde_json::to_string(&line)?);
        }
    }

    Ok(())
}

fn print_status(status: &VitalStatus) {
    println!(
        "  {:<16} {:>8} {:<6} {:<8} deviation {}",
        vital_label(&status.vital),
        status.actual_value,
        status.unit,
        status.status,
        status.deviation,
    );
}

fn cmd_thresholds(
    config_path: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;

    if json {
        let out = serde_json::json!({
            "advisory": config.advisory,
            "critical": config.critical,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for (name, table) in [("advisory", &config.advisory), ("critical", &config.critical)] {
        println!("{name}:");
        for (vital, range) in table.iter() {
            println!("  {:<16} {}", vital_label(vital), range.display());
        }
    }
    Ok(())
}
