use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::SystemTime;

use clap::{Parser, Subcommand};
use lockstep_fixed::config::{load_config, read_config, VerifyConfig, DEFAULT_CONFIG_PATH};
use lockstep_fixed::table_file::{load_table, save_table};
use lockstep_fixed::{verify, ReciprocalTable};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_DIR: &str = "logs";
const LOG_PREFIX: &str = "lockstep_fixed";
const KEPT_LOGS: usize = 25;

#[derive(Debug, Parser)]
#[command(name = "lockstep_fixed")]
#[command(about = "Check the fixed-point kernel and its reciprocal table")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verify config (RON). Without it, `assets/verify_config.ron` is tried and
    /// defaults are used if that is unusable; a named file must load.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write the built-in reciprocal table to PATH as a table file.
    DumpTable { path: PathBuf },
}

/// A config named on the command line must load; the shipped default may fall back.
fn resolve_config(explicit: Option<&Path>) -> lockstep_fixed::Result<VerifyConfig> {
    match explicit {
        Some(path) => read_config(path),
        None => Ok(load_config(DEFAULT_CONFIG_PATH)),
    }
}

fn init_logging() -> io::Result<PathBuf> {
    let log_dir = Path::new(LOG_DIR);
    fs::create_dir_all(log_dir)?;
    for stale in stale_logs(log_dir, KEPT_LOGS)? {
        let _ = fs::remove_file(stale);
    }

    let file_name = format!("{}_{}.log", LOG_PREFIX, chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let appender = RollingFileAppender::new(Rotation::NEVER, log_dir, &file_name);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lockstep_fixed=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(appender).with_ansi(false))
        .with(fmt::layer().with_writer(io::stdout).with_target(false))
        .init();

    Ok(log_dir.join(file_name))
}

/// Log files in `log_dir` beyond the newest `keep`, oldest first.
fn stale_logs(log_dir: &Path, keep: usize) -> io::Result<Vec<PathBuf>> {
    let mut logs: Vec<(SystemTime, PathBuf)> = fs::read_dir(log_dir)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let path = entry.path();
            let name = path.file_name()?.to_str()?;
            if !name.starts_with(LOG_PREFIX) || !name.ends_with(".log") {
                return None;
            }
            let modified = entry.metadata().ok()?.modified().ok()?;
            Some((modified, path))
        })
        .collect();

    logs.sort();
    let excess = logs.len().saturating_sub(keep);
    Ok(logs.into_iter().take(excess).map(|(_, path)| path).collect())
}

fn dump_table(path: &Path) -> ExitCode {
    match save_table(path, &ReciprocalTable::standard()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Failed to write {}: {}", path.display(), e);
            ExitCode::FAILURE
        }
    }
}

fn run_verification(config: &VerifyConfig) -> ExitCode {
    let loaded = match &config.table_path {
        Some(path) => match load_table(path) {
            Ok(table_file) => Some(table_file),
            Err(e) => {
                tracing::error!("Failed to load table {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    let table = match &loaded {
        Some(table_file) => match table_file.table() {
            Ok(table) => table,
            Err(e) => {
                tracing::error!("Rejected table: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => ReciprocalTable::standard(),
    };

    let report = verify::run(&table, config);

    println!();
    for result in &report.results {
        let status = if result.passed() { "ok  " } else { "FAIL" };
        println!(
            "  [{}] {:<30} samples={:<8} worst_error={}",
            status, result.name, result.samples, result.worst_error
        );
    }
    println!();

    if report.passed() {
        tracing::info!("All {} properties hold", report.results.len());
        ExitCode::SUCCESS
    } else {
        for result in report.failed() {
            tracing::error!(
                "{}: {} of {} samples failed, first: {}",
                result.name,
                result.failures,
                result.samples,
                result.first_failure.as_deref().unwrap_or("-")
            );
        }
        ExitCode::FAILURE
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match init_logging() {
        Ok(log_file) => tracing::info!("lockstep_fixed logging to {}", log_file.display()),
        Err(e) => {
            eprintln!("Failed to set up logging: {}", e);
            return ExitCode::FAILURE;
        }
    }

    match cli.command {
        Some(Commands::DumpTable { path }) => dump_table(&path),
        None => match resolve_config(cli.config.as_deref()) {
            Ok(config) => run_verification(&config),
            Err(e) => {
                tracing::error!("Failed to load verify config: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}
