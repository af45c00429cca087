//! CLI entry point for the NEO stats tool.
//!
//! Provides subcommands for fetching a date range from NeoWs, analyzing a
//! saved feed body, and an interactive prompt driven by the session loop.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use neo_stats::{
    chart::render_png,
    config::Config,
    dashboard::Dashboard,
    feed::RawFeedResponse,
    fetch::{BasicClient, auth::UrlParam},
    output::{render_state, series_table, stats_table, to_json, write_series_csv},
    range::DateRange,
    session::{Session, load_dashboard},
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "neo_stats")]
#[command(about = "Near-Earth object statistics from the NASA NeoWs feed", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a date range (at most 7 days) and show its statistics
    Fetch {
        /// First day of the range, YYYY-MM-DD, not after today
        #[arg(short, long)]
        start_date: NaiveDate,

        /// Last day of the range, YYYY-MM-DD
        #[arg(short, long)]
        end_date: NaiveDate,

        #[command(flatten)]
        render: RenderArgs,
    },
    /// Compute statistics over a saved feed response
    Analyze {
        /// Path to a JSON feed body
        #[arg(value_name = "FILE")]
        source: PathBuf,

        #[command(flatten)]
        render: RenderArgs,
    },
    /// Read `START END` lines from stdin; each line replaces the previous request
    Interactive,
}

#[derive(clap::Args)]
struct RenderArgs {
    /// How to print the results
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Also draw the per-date counts as a PNG line chart
    #[arg(long, value_name = "PATH")]
    chart: Option<PathBuf>,

    /// Chart width and height in pixels
    #[arg(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"], default_values_t = [1024, 576])]
    chart_size: Vec<u32>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Json,
    Csv,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/neo_stats.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("neo_stats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(quiet_transport(
            EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?),
        )?);

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(quiet_transport(
            EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?),
        )?);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            start_date,
            end_date,
            render,
        } => {
            let range = DateRange::new(start_date, end_date, today())?;
            let config = Config::from_env()?;
            let client = feed_client(&config)?;

            let dashboard = load_dashboard(&client, &config.feed_url, range)
                .await
                .inspect_err(|e| error!(kind = %e.kind(), error = %e, "Fetch failed"))?;
            info!(range = %range, total_count = dashboard.summary.total_count, "Feed fetched");
            present(&dashboard, &render)?;
        }
        Commands::Analyze { source, render } => {
            let bytes = std::fs::read(&source)
                .with_context(|| format!("failed to read {}", source.display()))?;
            let feed = RawFeedResponse::from_slice(&bytes)?;
            let dashboard = Dashboard::from_feed(&feed)
                .inspect_err(|e| error!(kind = %e.kind(), error = %e, "Analysis failed"))?;
            present(&dashboard, &render)?;
        }
        Commands::Interactive => interactive().await?,
    }

    Ok(())
}

/// Caps HTTP stack targets at `info`; their debug records print request URLs,
/// and those carry the API key.
fn quiet_transport(filter: EnvFilter) -> Result<EnvFilter> {
    Ok(filter
        .add_directive("reqwest=info".parse()?)
        .add_directive("hyper=info".parse()?)
        .add_directive("hyper_util=info".parse()?))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Plain client, optionally with a transport timeout, carrying the API key.
fn feed_client(config: &Config) -> Result<UrlParam<BasicClient>> {
    let inner = BasicClient::with_timeout(config.timeout).context("failed to build HTTP client")?;
    Ok(UrlParam::api_key(inner, config.api_key.clone()))
}

fn present(dashboard: &Dashboard, args: &RenderArgs) -> Result<()> {
    match args.format {
        Format::Table => {
            println!("{}", series_table(&dashboard.series));
            println!("{}", stats_table(&dashboard.summary));
        }
        Format::Json => println!("{}", to_json(dashboard)?),
        Format::Csv => write_series_csv(std::io::stdout().lock(), &dashboard.series)?,
    }

    if let Some(path) = &args.chart {
        let size = match args.chart_size.as_slice() {
            [width, height] => (*width, *height),
            _ => (1024, 576),
        };
        render_png(&dashboard.series, path, size)?;
    }
    Ok(())
}

/// Feeds stdin lines into the session loop and prints every state it reaches.
async fn interactive() -> Result<()> {
    let config = Config::from_env()?;
    let session = Session::new(feed_client(&config)?, config.feed_url.clone());
    let (tx, rx) = mpsc::channel(1);

    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        eprintln!("Enter START END (YYYY-MM-DD YYYY-MM-DD), Ctrl+D to quit");
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match parse_submission(line) {
                Ok(range) => {
                    if tx.send(range).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!(input = line, error = %e, "Ignoring submission"),
            }
        }
        anyhow::Ok(())
    });

    let last = session.run(rx, |state| println!("{}", render_state(state))).await;
    reader.await??;
    info!(generation = last.generation, "Session finished");
    Ok(())
}

fn parse_submission(line: &str) -> Result<DateRange> {
    let mut parts = line.split_whitespace();
    let (Some(start), Some(end), None) = (parts.next(), parts.next(), parts.next()) else {
        anyhow::bail!("expected two dates");
    };
    let start: NaiveDate = start.parse().with_context(|| format!("invalid start date '{start}'"))?;
    let end: NaiveDate = end.parse().with_context(|| format!("invalid end date '{end}'"))?;
    Ok(DateRange::new(start, end, today())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_targets_stay_at_info() {
        let filter = quiet_transport(EnvFilter::new("debug,reqwest=trace")).unwrap();
        let directives = filter.to_string().to_lowercase();

        assert!(directives.contains("reqwest=info"));
        assert!(directives.contains("hyper_util=info"));
        assert!(!directives.contains("reqwest=trace"));
    }

    #[test]
    fn test_parse_submission() {
        let range = parse_submission("2023-01-01  2023-01-03").unwrap();
        assert_eq!(range.start(), "2023-01-01".parse::<NaiveDate>().unwrap());
        assert_eq!(range.end(), "2023-01-03".parse::<NaiveDate>().unwrap());

        assert!(parse_submission("2023-01-01").is_err());
        assert!(parse_submission("2023-01-01 2023-01-02 2023-01-03").is_err());
        assert!(parse_submission("2023-01-01 2023-01-20").is_err());
    }
}
