//! TrendGrid CLI — chart search interest for up to three keywords in the terminal.
//!
//! Keywords come from the command line or, when none are given, an interactive
//! prompt. Logs go to stderr; the chart goes to stdout.

mod prompt;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::tty::IsTty;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;
use trendgrid_core::config::AppConfig;
use trendgrid_core::data::{
    parse_keywords, FetchError, GoogleTrendsSource, SeriesFetcher, SeriesRequest,
};
use trendgrid_core::render::{GridRenderer, PanelSink, PlainSink, TitleParts};

use crate::terminal::TerminalSink;

#[derive(Parser)]
#[command(
    name = "trendgrid",
    version,
    about = "TrendGrid — search interest over time as a terminal grid"
)]
struct Cli {
    /// Keywords (1 to 3). Separate with spaces or commas. Prompts when omitted.
    keywords: Vec<String>,

    /// Path to a TOML config file. Defaults to <config dir>/trendgrid/config.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Timeframe, e.g. "today 12-m" or "now 7-d".
    #[arg(long)]
    timeframe: Option<String>,

    /// Region code, e.g. US. Pass an empty string for worldwide.
    #[arg(long, alias = "geo")]
    region: Option<String>,

    /// Chart height in rows.
    #[arg(long)]
    height: Option<usize>,

    /// Chart width in columns.
    #[arg(long)]
    width: Option<usize>,

    /// Maximum fetch attempts.
    #[arg(long)]
    max_retries: Option<u32>,

    /// Plain output without colors or escape sequences.
    #[arg(long, default_value_t = false)]
    no_color: bool,

    /// Debug logging.
    #[arg(short, long, default_value_t = false, conflicts_with = "quiet")]
    verbose: bool,

    /// Only warnings and errors.
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
}

fn init_tracing(cli: &Cli) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => match AppConfig::default_path().filter(|p| p.is_file()) {
            Some(path) => {
                debug!(path = %path.display(), "using config file");
                AppConfig::from_file(&path)
                    .with_context(|| format!("loading config {}", path.display()))?
            }
            None => AppConfig::default(),
        },
    };

    if let Some(timeframe) = &cli.timeframe {
        config.query.timeframe = timeframe.clone();
    }
    if let Some(region) = &cli.region {
        config.query.region = region.clone();
    }
    if let Some(height) = cli.height {
        config.chart.height = height;
    }
    if let Some(width) = cli.width {
        config.chart.width = width;
    }
    if let Some(max_retries) = cli.max_retries {
        config.retry.max_retries = max_retries;
    }
    config.validate().context("invalid settings")?;
    Ok(config)
}

/// Keywords from arguments, or from the prompt. `None` when input was aborted.
fn keywords(cli: &Cli) -> Result<Option<Vec<String>>> {
    if !cli.keywords.is_empty() {
        let keys = parse_keywords(&cli.keywords.join(",")).context("invalid keywords")?;
        return Ok(Some(keys));
    }
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let keys = prompt::read_keywords(&mut stdin.lock(), &mut stdout)?;
    Ok(keys)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);
    let config = load_config(&cli)?;

    let Some(keys) = keywords(&cli)? else {
        eprintln!();
        eprintln!("Input aborted. Exiting.");
        std::process::exit(1);
    };

    let source = GoogleTrendsSource::new(config.google_options())?;
    let fetcher = SeriesFetcher::new(&source, config.retry_policy()?);
    let request = SeriesRequest::new(keys, &config.query.timeframe, &config.query.region)?;

    let outcome = match fetcher.fetch(request) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("{e}");
            if let FetchError::Exhausted { last_error, .. } = &e {
                error!("last error: {last_error}");
            }
            eprintln!("Could not generate chart due to data fetching issues or no data found.");
            std::process::exit(1);
        }
    };
    info!(
        attempts = outcome.attempts.len(),
        points = outcome.result.len(),
        "fetch complete"
    );

    let renderer = GridRenderer::new(config.chart.height, config.chart.width)?;
    let title = TitleParts::new(
        &config.query.source_label,
        &config.query.timeframe,
        &config.query.region,
    );
    let (panel, legend) = renderer.render(&outcome.result, &outcome.keys_with_data, &title)?;

    let stdout = io::stdout();
    if stdout.is_tty() {
        TerminalSink::new(stdout.lock(), !cli.no_color).write_panel(&panel, &legend)?;
    } else {
        PlainSink::new(stdout.lock()).write_panel(&panel, &legend)?;
    }
    io::stdout().flush()?;
    Ok(())
}
