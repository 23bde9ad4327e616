// stocktake - merge inventory sources and write the inventory reports

mod exit_codes;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::Parser;
use stocktake_inventory::{ReportKind, RunSummary, StocktakeConfig, StocktakeError};

use exit_codes::{error_exit_code, error_kind, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

/// Env var holding a tracing filter directive, e.g. `STOCKTAKE_LOG=debug`.
const LOG_ENV: &str = "STOCKTAKE_LOG";

#[derive(Parser)]
#[command(name = "stocktake")]
#[command(about = "Merge manufacturer, price and service-date lists into inventory reports")]
#[command(long_version = long_version())]
#[command(version)]
#[command(after_help = "\
With no options, reads ManufacturerList.csv, PriceList.csv and ServiceDatesList.csv
from the current directory and writes FullInventory.csv, <category>Inventory.csv,
PastServiceDateInventory.csv and DamagedInventory.csv next to them.

Examples:
  stocktake
  stocktake --input-dir data --output-dir reports
  stocktake --config stocktake.toml --json
  stocktake --as-of 01/31/2025")]
struct Cli {
    /// TOML config overriding file names, directories or the date format
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding the three input lists
    #[arg(long, value_name = "DIR")]
    input_dir: Option<PathBuf>,

    /// Directory the reports are written to
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Treat this date (in the configured date format) as today
    #[arg(long, value_name = "DATE")]
    as_of: Option<String>,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Log every merged item
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Only report errors
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn engine(err: &StocktakeError) -> Self {
        let hint = match err {
            StocktakeError::SourceNotFound { .. } => {
                Some("run from the directory holding the input lists, or pass --input-dir".to_string())
            }
            StocktakeError::MissingServiceDate { .. } => {
                Some("every item in the manufacturer list needs a service date row".to_string())
            }
            _ => None,
        };
        Self { code: error_exit_code(err), message: err.to_string(), hint }
    }
}

/// Structured error printed on stderr when `--json` is set.
#[derive(Debug, serde::Serialize)]
struct ErrorOutput<'a> {
    error: &'a str,
    message: String,
    exit_code: u8,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\nengine:  stocktake-inventory ", env!("CARGO_PKG_VERSION"),
        "\ninputs:  ManufacturerList.csv, PriceList.csv, ServiceDatesList.csv",
        "\nlog:     STOCKTAKE_LOG",
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(message) = init_logging(&cli) {
        eprintln!("error: {message}");
        return ExitCode::from(EXIT_ERROR);
    }

    match cmd_run(&cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging(cli: &Cli) -> Result<(), String> {
    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .map_err(|e| format!("failed to initialize logging: {e}"))
}

fn cmd_run(cli: &Cli) -> Result<(), CliError> {
    let config = build_config(cli)?;
    let as_of = resolve_as_of(cli.as_of.as_deref(), &config.date_format)?;
    log::debug!("as of {as_of}, inputs from {}", config.input_dir.display());

    let summary = match stocktake_inventory::run(&config, as_of) {
        Ok(summary) => summary,
        Err(err) => {
            if cli.json {
                print_json_error(&err);
                return Err(CliError { message: String::new(), ..CliError::engine(&err) });
            }
            return Err(CliError::engine(&err));
        }
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| CliError { code: EXIT_ERROR, message: format!("JSON serialization error: {e}"), hint: None })?;
        println!("{json}");
    }

    if !cli.quiet {
        eprintln!("{}", human_summary(&summary));
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<StocktakeConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => StocktakeConfig::load(path).map_err(|e| CliError::usage(e.to_string()))?,
        None => StocktakeConfig::default(),
    };

    if let Some(dir) = &cli.input_dir {
        config.input_dir = dir.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }

    Ok(config)
}

/// `--as-of D` behaves as if the clock read the last second of day D, so
/// items serviced on D count as past, matching a run made during that day.
fn resolve_as_of(as_of: Option<&str>, date_format: &str) -> Result<NaiveDateTime, CliError> {
    match as_of {
        None => Ok(Local::now().naive_local()),
        Some(text) => NaiveDate::parse_from_str(text.trim(), date_format)
            .ok()
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .ok_or_else(|| CliError {
                code: EXIT_USAGE,
                message: format!("--as-of: cannot parse date '{text}'"),
                hint: Some(format!("expected format {date_format}")),
            }),
    }
}

fn print_json_error(err: &StocktakeError) {
    let output = ErrorOutput {
        error: error_kind(err),
        message: err.to_string(),
        exit_code: error_exit_code(err),
    };
    if let Ok(json) = serde_json::to_string(&output) {
        eprintln!("{json}");
    }
}

fn human_summary(summary: &RunSummary) -> String {
    format!(
        "stocktake: {} items merged; {} full, {} category file(s), {} past service, {} damaged",
        summary.records_merged,
        summary.rows_for(ReportKind::Full),
        summary.files_for(ReportKind::Category),
        summary.rows_for(ReportKind::PastService),
        summary.rows_for(ReportKind::Damaged),
    )
}
