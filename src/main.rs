//! `weatherguard` command line
//!
//! One-shot lookups print a snapshot and exit; `session` keeps an
//! orchestrator alive and reads queries from stdin.

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinSet;
use tracing::{debug, info};
use weatherguard::config::DisplayConfig;
use weatherguard::models::forecast::window;
use weatherguard::{
    AlertStatus, CurrentConditions, Orchestrator, QueryOutcome, QueryState, Session,
    WeatherGuardConfig, WeatherGuardError, WeatherSnapshot, logging,
};

#[derive(Parser)]
#[command(name = "weatherguard", version)]
#[command(about = "Emergency weather awareness: forecast, conditions and ranked NWS alerts")]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, env = "WEATHERGUARD_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Print snapshots as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up one place: "City, ST", a ZIP code, or "lat,lon"
    Lookup {
        query: String,
    },

    /// Look up the configured current position
    Locate,

    /// Read queries from stdin; "retry", "locate" and "quit" are commands
    Session,
}

#[derive(Serialize)]
struct Report<'a> {
    status: AlertStatus,
    conditions: CurrentConditions,
    snapshot: &'a WeatherSnapshot,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = WeatherGuardConfig::load_from_path(cli.config.clone())
        .with_context(|| "Failed to load configuration")?;
    logging::init(&config.logging, cli.verbose)?;
    debug!("Configuration: {:?}", config);

    let orchestrator = Arc::new(
        Orchestrator::from_config(&config).with_context(|| "Failed to create HTTP clients")?,
    );
    let printer = Printer {
        display: config.display.clone(),
        json: cli.json,
    };

    match cli.command {
        Commands::Lookup { query } => Ok(printer.outcome(orchestrator.search(&query).await)),
        Commands::Locate => Ok(printer.outcome(orchestrator.locate().await)),
        Commands::Session => {
            run_session(orchestrator, printer, tokio::io::stdin()).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Every line starts a new query without waiting for the previous one; the
/// watcher prints whatever state is committed. At end of input the queries
/// already started run to completion and the final state is printed; `quit`
/// drops them. Returns the last session the watcher saw.
async fn run_session<R>(
    orchestrator: Arc<Orchestrator>,
    printer: Printer,
    input: R,
) -> Result<Session>
where
    R: AsyncRead + Unpin,
{
    let mut updates = orchestrator.subscribe();
    let printer = Arc::new(printer);
    let watcher = {
        let printer = printer.clone();
        tokio::spawn(async move {
            let mut last = updates.borrow_and_update().clone();
            while updates.changed().await.is_ok() {
                last = updates.borrow_and_update().clone();
                printer.state(last.query, &last.state);
            }
            last
        })
    };

    println!("Enter a city, ZIP code or lat,lon ('retry', 'locate', 'quit'):");
    let mut queries = JoinSet::new();
    let mut lines = BufReader::new(input).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim().to_string();
        let orchestrator = orchestrator.clone();
        match line.as_str() {
            "quit" | "exit" => {
                info!("Session ended; dropping {} queries", queries.len());
                queries.abort_all();
                watcher.abort();
                return Ok(orchestrator.session());
            }
            "retry" => {
                queries.spawn(async move {
                    if orchestrator.retry().await.is_none() {
                        println!("Nothing to retry yet.");
                    }
                });
            }
            "locate" => {
                queries.spawn(async move {
                    orchestrator.locate().await;
                });
            }
            _ => {
                queries.spawn(async move {
                    orchestrator.search(&line).await;
                });
            }
        }
    }

    debug!("End of input; waiting for {} queries", queries.len());
    while queries.join_next().await.is_some() {}

    // Closing the channel lets the watcher drain the last state and stop.
    drop(orchestrator);
    let last = watcher.await.context("Session watcher failed")?;
    info!("Session ended");
    Ok(last)
}

struct Printer {
    display: DisplayConfig,
    json: bool,
}

impl Printer {
    fn outcome(&self, outcome: QueryOutcome) -> ExitCode {
        match outcome {
            QueryOutcome::Ready(snapshot) => {
                self.snapshot(&snapshot);
                ExitCode::SUCCESS
            }
            QueryOutcome::Failed(e) => {
                self.error(&e);
                ExitCode::FAILURE
            }
            QueryOutcome::Superseded => ExitCode::FAILURE,
        }
    }

    fn state(&self, query: u64, state: &QueryState) {
        match state {
            QueryState::Idle => {}
            QueryState::Resolving => println!("[{query}] Resolving location..."),
            QueryState::Fetching => println!("[{query}] Fetching weather data..."),
            QueryState::Ready(snapshot) => self.snapshot(snapshot),
            QueryState::Error(e) => self.error(e),
        }
    }

    fn error(&self, e: &WeatherGuardError) {
        eprintln!("{}: {}", e.title(), e.user_message());
        if e.is_retryable() {
            eprintln!("(retry to try again)");
        }
    }

    fn snapshot(&self, snapshot: &WeatherSnapshot) {
        if self.json {
            let report = Report {
                status: snapshot.alert_status(),
                conditions: CurrentConditions::from_snapshot(snapshot),
                snapshot,
            };
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("Failed to encode snapshot: {e}"),
            }
            return;
        }

        let location = snapshot.location();
        println!();
        println!("{}", location.name());
        println!(
            "Last updated: {}",
            snapshot
                .fetched_at()
                .with_timezone(&Local)
                .format("%a, %b %-d, %-I:%M %p")
        );

        if let Some(banner) = snapshot.banner() {
            println!();
            println!(
                "{} {}: {}",
                banner.icon().glyph(),
                banner.severity.badge(),
                banner.banner_message()
            );
        }

        println!();
        match snapshot.alert_status() {
            AlertStatus::AllClear => println!("All clear: no active weather alerts."),
            AlertStatus::Advisory | AlertStatus::Emergency => {
                println!("Active alerts ({}):", snapshot.alerts().len());
                for alert in snapshot.alerts() {
                    println!(
                        "  {} {} [{}]",
                        alert.icon().glyph(),
                        alert.event,
                        alert.severity.badge()
                    );
                    println!("     Area:    {}", alert.area_or(location.name()));
                    println!("     Expires: {}", alert.expires_label());
                    if let Some(instruction) = &alert.instruction {
                        println!("     {}", instruction.replace('\n', " "));
                    }
                }
            }
        }

        println!();
        println!("{}", CurrentConditions::from_snapshot(snapshot));

        println!();
        println!("Forecast:");
        for period in window(snapshot.forecast(), self.display.forecast_periods) {
            println!(
                "  {:<16} {:>4}°{}  {:<12} {}",
                period.name,
                period.temperature,
                period.temperature_unit,
                period.format_wind(),
                period.short_forecast
            );
        }

        println!();
        println!("Hourly:");
        for period in window(snapshot.hourly(), self.display.hourly_periods) {
            println!(
                "  {:>6} {:>4}°{}  {}",
                period.start_time.format("%-I %p").to_string(),
                period.temperature,
                period.temperature_unit,
                period.short_forecast
            );
        }
    }
}
