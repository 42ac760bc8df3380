//! Media-Publisher main entry point
//!
//! Resolves the publisher behind a media URL and prints the record as JSON.

use anyhow::Context;
use clap::Parser;
use media_publisher::config::{load_config, Environment, ResolverConfig};
use media_publisher::{HttpTransport, PublisherResolver};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Media-Publisher: finds who published a piece of media
///
/// The media URL is matched against the provider ruleset, each matching
/// provider is asked about it in turn, and the first publisher found is
/// printed with its normalized favicon and identity-service properties.
#[derive(Parser, Debug)]
#[command(name = "media-publisher")]
#[command(version = "1.0.0")]
#[command(about = "Resolve the publisher behind a media URL", long_about = None)]
struct Cli {
    /// Media URL to resolve
    #[arg(value_name = "MEDIA_URL")]
    media_url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Provider ruleset (JSON) to use instead of the built-in one
    #[arg(long, value_name = "FILE")]
    ruleset: Option<PathBuf>,

    /// Identity service environment (staging or production)
    #[arg(long)]
    environment: Option<Environment>,

    /// Per-request timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Deadline for the whole resolution in milliseconds
    #[arg(long, value_name = "MS")]
    deadline_ms: Option<u64>,

    /// Trace every request and response on the wire
    #[arg(long)]
    debug: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = build_config(&cli)?;
    setup_logging(cli.verbose, cli.quiet, wire_tracing(&config));

    if let Some(path) = &cli.config {
        tracing::info!("Loaded configuration from: {}", path.display());
    }
    tracing::debug!("Effective configuration: {:?}", config);

    let transport = HttpTransport::new().context("Failed to build HTTP client")?;
    let resolver = PublisherResolver::builder(config)
        .transport(Arc::new(transport))
        .build()
        .context("Invalid configuration")?;

    let info = resolver
        .resolve(&cli.media_url)
        .await
        .with_context(|| format!("Failed to resolve {}", cli.media_url))?;

    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

/// Loads the configuration file (if any) and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<ResolverConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => ResolverConfig::default(),
    };

    if let Some(ruleset) = &cli.ruleset {
        config.ruleset = Some(ruleset.clone());
    }
    if let Some(environment) = cli.environment {
        config.environment = environment;
    }
    if cli.timeout_ms.is_some() {
        config.timeout_ms = cli.timeout_ms;
    }
    if cli.deadline_ms.is_some() {
        config.deadline_ms = cli.deadline_ms;
    }
    if cli.debug {
        config.debug = true;
        // -vv with --debug also dumps responses; never turns a file's verbose off
        if cli.verbose > 1 {
            config.verbose = true;
        }
    }

    Ok(config)
}

/// Whether the executor will emit wire traces for this configuration
fn wire_tracing(config: &ResolverConfig) -> bool {
    config.debug || config.verbose
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool, wire: bool) {
    let mut filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("media_publisher=info,warn"),
            1 => EnvFilter::new("media_publisher=debug,info"),
            2 => EnvFilter::new("media_publisher=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Wire traces are logged at debug under their own target
    if wire && !quiet {
        if let Ok(directive) = format!("{}=debug", media_publisher::fetch::WIRE_TARGET).parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(wire)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}
