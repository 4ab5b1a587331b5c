//! equipment-analyzer - chemical equipment parameter analytics CLI
//!
//! Analyzes dataset summaries produced by the equipment backend: pressure vs
//! temperature correlation, thermal stability, and per-unit risk status.
//!
//! # Usage
//!
//! ```bash
//! # Analyze a saved summary JSON offline
//! equipment-analyzer analyze --file summary.json
//!
//! # Log in, then work against the backend with the printed token
//! equipment-analyzer login --username alice --password ...
//! export EQUIPMENT_API_TOKEN=...
//! equipment-analyzer history
//! equipment-analyzer summary --run 12 --json
//! equipment-analyzer trends --runs 5
//! equipment-analyzer upload --file plant_a.csv
//! ```
//!
//! # Environment Variables
//!
//! - `EQUIPMENT_ANALYZER_CONFIG`: Path to analyzer_config.toml
//! - `EQUIPMENT_API_URL`: Backend base URL (overrides `backend.base_url`)
//! - `EQUIPMENT_API_TOKEN`: Bearer token for backend calls
//! - `RUST_LOG`: Logging level (default: info)

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use equipment_analyzer::analytics::TrendSeries;
use equipment_analyzer::config::{self, defaults, AnalyzerConfig};
use equipment_analyzer::types::HistoryEntry;
use equipment_analyzer::{ingest, AnalysisReport, BackendClient, Session};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "equipment-analyzer")]
#[command(about = "Chemical equipment correlation, stability and risk analytics")]
#[command(version)]
struct CliArgs {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Bearer token for backend calls
    #[arg(long, global = true, env = defaults::BACKEND_TOKEN_ENV_VAR, hide_env_values = true)]
    token: Option<String>,

    /// Analyzer config file (overrides the standard search path)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Analyze a summary JSON file without contacting the backend
    Analyze {
        /// Path to a saved `/summary/{id}/` response
        #[arg(long)]
        file: PathBuf,
    },

    /// Fetch one run's summary from the backend and analyze it
    Summary {
        /// Dataset id from `history`
        #[arg(long)]
        run: u64,
    },

    /// List uploaded runs, newest first
    History,

    /// Average parameter trend across the most recent runs
    Trends {
        /// Number of runs (default: trends.runs from config)
        #[arg(long)]
        runs: Option<usize>,
    },

    /// Upload an equipment CSV for processing
    Upload {
        #[arg(long)]
        file: PathBuf,
    },

    /// Obtain an access token
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },

    /// Create a backend account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

// ============================================================================
// Output
// ============================================================================

fn emit<T: Serialize + std::fmt::Display>(value: &T, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(value).context("Failed to serialize output")?
        );
    } else {
        print!("{value}");
    }
    Ok(())
}

fn print_history(history: &[HistoryEntry], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(history)?);
        return Ok(());
    }
    if history.is_empty() {
        println!("No uploaded runs.");
        return Ok(());
    }
    for run in history {
        let uploaded = run
            .uploaded_at
            .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());
        println!(
            "{:>6}  {:<16}  {}",
            run.id,
            uploaded,
            run.display_name().unwrap_or("(unnamed)")
        );
    }
    Ok(())
}

fn print_trends(series: &TrendSeries, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(series)?);
        return Ok(());
    }
    println!("{:<10}  {:>10}  {:>10}  {:>11}", "Run", "Flowrate", "Pressure", "Temperature");
    for p in &series.points {
        println!(
            "{:<10}  {:>10.2}  {:>10.2}  {:>11.2}",
            p.label, p.flowrate, p.pressure, p.temperature
        );
    }
    println!();
    println!("{}", series.insight);
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn load_config(path: Option<&PathBuf>) -> Result<AnalyzerConfig> {
    match path {
        Some(p) => AnalyzerConfig::load_from_file(p)
            .with_context(|| format!("Failed to load config from {}", p.display())),
        None => Ok(AnalyzerConfig::load()),
    }
}

fn require_session(token: Option<String>) -> Result<Session> {
    match token.filter(|t| !t.trim().is_empty()) {
        Some(t) => Ok(Session::new(t)),
        None => bail!(
            "No access token: run `equipment-analyzer login` and pass --token or set {}",
            defaults::BACKEND_TOKEN_ENV_VAR
        ),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    config::init(load_config(args.config.as_ref())?);
    let cfg = config::get();

    // Offline analysis needs no backend
    if let SubCommand::Analyze { file } = &args.command {
        let raw = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let summary = ingest::summary_from_str(&raw)
            .with_context(|| format!("Invalid summary in {}", file.display()))?;
        info!(rows = summary.rows.len(), file = %file.display(), "Analyzing summary");
        return emit(&AnalysisReport::build(&summary, cfg), args.json);
    }

    let client = BackendClient::new(&cfg.backend).context("Failed to build HTTP client")?;
    info!(url = %client.base_url(), "Using backend");

    match args.command {
        SubCommand::Analyze { .. } => Ok(()),

        SubCommand::Login { username, password } => {
            let session = client
                .login(&username, &password)
                .await
                .context("Login failed")?;
            println!("{}", session.access_token());
            Ok(())
        }

        SubCommand::Register {
            username,
            email,
            password,
        } => {
            client
                .register(&username, &email, &password)
                .await
                .context("Registration failed")?;
            println!("Account '{username}' created. Log in to obtain a token.");
            Ok(())
        }

        SubCommand::Summary { run } => {
            let session = require_session(args.token)?;
            let summary = client
                .summary(&session, run)
                .await
                .with_context(|| format!("Failed to load dataset {run}"))?;
            emit(&AnalysisReport::build(&summary, cfg), args.json)
        }

        SubCommand::History => {
            let session = require_session(args.token)?;
            let history = client
                .history(&session)
                .await
                .context("Failed to fetch history")?;
            print_history(&history, args.json)
        }

        SubCommand::Trends { runs } => {
            let session = require_session(args.token)?;
            let mut trend_config = cfg.trends;
            if let Some(n) = runs {
                if n == 0 {
                    bail!("--runs must be at least 1");
                }
                trend_config.runs = n;
            }
            let history = client
                .history(&session)
                .await
                .context("Failed to fetch history")?;
            match client.trends(&session, &history, &trend_config).await {
                Some(series) => print_trends(&series, args.json),
                None => {
                    println!("Upload more datasets to see multi-run trends.");
                    Ok(())
                }
            }
        }

        SubCommand::Upload { file } => {
            let session = require_session(args.token)?;
            let receipt = client
                .upload_file(&session, &file)
                .await
                .with_context(|| format!("Upload of {} failed", file.display()))?;
            info!(dataset_id = receipt.dataset_id, "Dataset processed successfully");
            let summary = client
                .summary(&session, receipt.dataset_id)
                .await
                .context("Failed to load the uploaded dataset")?;
            emit(&AnalysisReport::build(&summary, cfg), args.json)
        }
    }
}
