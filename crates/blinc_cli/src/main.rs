//! blinc-replay: inspect and dry-run Blinc event logs

mod config;
mod simulate;

use anyhow::{Context, Result};
use blinc_recorder::{EventKind, LogReader, Parser as LogParser, WindowBase};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use config::CliConfig;

#[derive(Parser)]
#[command(name = "blinc-replay", version, about = "Inspect and dry-run recorded event logs")]
struct Cli {
    /// Config file (defaults to ./blinc-replay.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse every line of a log and summarize it
    Check {
        /// Log file
        log: PathBuf,
    },

    /// Print every record of a log
    Dump {
        /// Log file
        log: PathBuf,

        /// One JSON object per record
        #[arg(long)]
        json: bool,
    },

    /// Replay a log in real time against a headless display
    Simulate {
        /// Log file
        log: PathBuf,

        /// Playback speed multiplier
        #[arg(short, long)]
        speed: Option<f64>,

        /// Print the final report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    let config = CliConfig::load(cli.config.as_deref(), &cwd)?;

    match cli.command {
        Command::Check { log } => cmd_check(&log, &config),
        Command::Dump { log, json } => cmd_dump(&log, &config, json),
        Command::Simulate { log, speed, json } => cmd_simulate(&log, config, speed, json),
        Command::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn log_base(config: &CliConfig) -> WindowBase {
    WindowBase(config.replay.window_base.unwrap_or(0))
}

fn open_log(path: &Path, config: &CliConfig) -> Result<LogReader> {
    LogReader::open(path, LogParser::new(log_base(config)))
        .with_context(|| format!("Failed to open log {}", path.display()))
}

fn cmd_check(path: &Path, config: &CliConfig) -> Result<()> {
    let mut reader = open_log(path, config)?;
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut total = 0;

    while let Some(record) = reader.next_record()? {
        *counts.entry(record.kind().keyword()).or_default() += 1;
        total += 1;
    }

    println!("{}: {} records, {} lines", path.display(), total, reader.line_number());
    for kind in EventKind::ALL {
        if let Some(count) = counts.get(kind.keyword()) {
            println!("  {:<18} {}", kind.keyword(), count);
        }
    }
    if reader.skipped() > 0 {
        println!("  {:<18} {}", "(skipped)", reader.skipped());
    }
    Ok(())
}

fn cmd_dump(path: &Path, config: &CliConfig, json: bool) -> Result<()> {
    let base = log_base(config);
    let mut out = io::stdout().lock();
    for record in open_log(path, config)? {
        let record = record?;
        if json {
            writeln!(out, "{}", serde_json::to_string(&record)?)?;
        } else {
            writeln!(out, "{}", record.to_log_line(base))?;
        }
    }
    out.flush()?;
    Ok(())
}

fn cmd_simulate(path: &Path, config: CliConfig, speed: Option<f64>, json: bool) -> Result<()> {
    let mut replay = config.replay;
    if let Some(speed) = speed {
        replay = replay.with_speed(speed);
    }

    tracing::info!("simulating {} at {}x", path.display(), replay.playback_speed);
    let report = simulate::run(path, replay, &config.simulate)
        .with_context(|| format!("Simulation of {} failed", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} injected, {} delivered, {} clicks in {}ms",
            report.injected, report.delivered, report.clicks, report.elapsed_ms
        );
    }
    Ok(())
}
