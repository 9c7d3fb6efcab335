//! dcmap-crawler main entry point
//!
//! This is the command-line interface for the data center directory crawler.

use anyhow::Context;
use clap::Parser;
use dcmap_crawler::config::{load_config_with_hash, validate, Config};
use dcmap_crawler::crawler::{run_with, Coordinator};
use dcmap_crawler::output::print_summary;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// dcmap-crawler: a three-tier data center directory crawler
///
/// Walks the country index page, every state page it links to and every city
/// page those link to, and writes the data center listings found on them as CSV.
#[derive(Parser, Debug)]
#[command(name = "dcmap-crawler")]
#[command(version)]
#[command(about = "Crawls a data center directory into a CSV file", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Index page to start from
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// CSV output path
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Also write the raw markup of every fetched page to this file
    #[arg(long, value_name = "PATH")]
    dump_html: Option<String>,

    /// Maximum simultaneous fetches
    #[arg(long, value_name = "N")]
    concurrency: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Cancel the crawl after this many seconds, keeping partial results
    #[arg(long, value_name = "SECS")]
    crawl_timeout: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate configuration and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = build_config(&cli)?;

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    handle_crawl(config, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("dcmap_crawler=info,warn"),
            1 => EnvFilter::new("dcmap_crawler=debug,info"),
            2 => EnvFilter::new("dcmap_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the config file (if any), then applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(url) = &cli.url {
        config.crawler.root_url = url.clone();
    }
    if let Some(output) = &cli.output {
        config.output.csv_path = output.clone();
    }
    if let Some(dump) = &cli.dump_html {
        config.output.dump_html_path = Some(dump.clone());
    }
    if let Some(limit) = cli.concurrency {
        config.crawler.concurrency_limit = limit;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.request_timeout_secs = timeout;
    }
    if let Some(timeout) = cli.crawl_timeout {
        config.crawler.crawl_timeout_secs = Some(timeout);
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let coordinator = Coordinator::new(config.clone())?;
    let layout = coordinator.layout();

    println!("=== dcmap-crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Root URL: {}", config.crawler.root_url);
    println!("  Concurrency limit: {}", config.crawler.concurrency_limit);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!(
        "  Retries: {} (initial delay {}ms)",
        config.crawler.max_retries, config.crawler.retry_delay_ms
    );
    match config.crawler.crawl_timeout_secs {
        Some(secs) => println!("  Crawl timeout: {}s", secs),
        None => println!("  Crawl timeout: none"),
    }

    println!("\nUser Agent:");
    println!("  Header: {}", config.user_agent.header);
    println!("  Accept-Language: {}", config.user_agent.accept_language);

    println!("\nSite Layout:");
    println!("  Index: {}", layout.root());
    let prefix = layout.prefix().join("/");
    println!("  State pages: /{}/<state>", prefix);
    println!("  City pages: /{}/<state>/<city>", prefix);

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);
    match &config.output.dump_html_path {
        Some(path) => println!("  HTML dump: {}", path),
        None => println!("  HTML dump: disabled"),
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, quiet: bool) -> anyhow::Result<()> {
    tracing::info!(
        "Starting crawl of {} (concurrency {})",
        config.crawler.root_url,
        config.crawler.concurrency_limit
    );

    let coordinator = Coordinator::new(config).context("Failed to initialize crawler")?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing with partial results");
            on_interrupt.cancel();
        }
    });

    let outcome = run_with(&coordinator, cancel).await.context("Crawl failed")?;

    if !quiet {
        print_summary(&outcome.summary);
    }

    Ok(())
}
