//! jwt-probe - JWT mutation generator
//!
//! Reads one raw HTTP request and prints candidate requests carrying mutated tokens.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jwt_probe::reporting::{MutationReport, OutputFormat, ReportMetadata};
use jwt_probe::{Config, MutationEngine, ProbeError, StrategyKind, TokenSelection};

/// JWT mutation generator
#[derive(Parser, Debug)]
#[command(name = "jwt-probe")]
#[command(author, version, about = "Generate JWT attack variants from a raw HTTP request", long_about = None)]
struct Cli {
    /// Raw HTTP request file (stdin when omitted or "-")
    request: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, env = "JWT_PROBE_CONFIG")]
    config: Option<PathBuf>,

    /// Callback base URL for SSRF probes
    #[arg(short = 'u', long, env = "JWT_PROBE_CORRELATION_URL")]
    correlation_url: Option<String>,

    /// Strategy to apply (repeatable, replaces the configured list)
    #[arg(short, long = "strategy", value_enum)]
    strategies: Vec<StrategyKind>,

    /// Do not expand mutated tokens into signature variants
    #[arg(long)]
    no_variants: bool,

    /// Mutate every distinct token instead of only the first
    #[arg(long)]
    all_tokens: bool,

    /// Output format
    #[arg(short, long, value_enum, env = "JWT_PROBE_FORMAT")]
    format: Option<OutputFormat>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "JWT_PROBE_LOG_LEVEL")]
    log_level: String,

    /// Log file path (enables file logging)
    #[arg(long, env = "JWT_PROBE_LOG_FILE")]
    log_file: Option<String>,

    /// Enable JSON structured logging
    #[arg(long, env = "JWT_PROBE_LOG_JSON")]
    log_json: bool,

    /// Generate default configuration and exit
    #[arg(long)]
    generate_config: bool,

    /// Validate configuration and exit
    #[arg(long)]
    validate_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.generate_config {
        return generate_default_config();
    }

    init_logging(&cli)?;

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "Starting jwt-probe");

    let config = load_config(&cli)?;

    if cli.validate_config {
        tracing::info!("Configuration is valid");
        return Ok(());
    }

    let request = read_request(cli.request.as_deref())?;
    let engine = MutationEngine::from_config(&config.engine);

    let results = match engine.run(&request) {
        Ok(results) => results,
        Err(ProbeError::NoTokenFound) => {
            tracing::warn!("{}", ProbeError::NoTokenFound.user_message());
            Vec::new()
        }
        Err(e) => {
            tracing::error!("{}", e.user_message());
            return Err(e).context("Mutation run failed");
        }
    };

    let metadata = ReportMetadata::new(&config.engine.correlation_url, &engine.strategy_names());
    let report = MutationReport::new(results, metadata);
    let rendered = report
        .render(config.output.format, config.output.pretty)
        .context("Failed to render report")?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", rendered).context("Failed to write report")?;

    Ok(())
}

/// Initialize the logging system
///
/// Logs go to stderr or a file; stdout carries the report.
fn init_logging(cli: &Cli) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if let Some(log_path) = &cli.log_file {
        let path = Path::new(log_path);
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => Config::data_dir()
                .map(|d| d.join("logs"))
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create log directory {:?}", dir))?;
        let filename = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("jwt-probe.log");
        let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, filename);

        if cli.log_json {
            let file_layer = fmt::layer()
                .json()
                .with_writer(file_appender)
                .with_ansi(false);

            subscriber.with(file_layer).init();
        } else {
            let file_layer = fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false);

            subscriber.with(file_layer).init();
        }
    } else if cli.log_json {
        subscriber.with(fmt::layer().json().with_writer(io::stderr)).init();
    } else {
        subscriber.with(fmt::layer().with_writer(io::stderr)).init();
    }

    Ok(())
}

/// Load configuration with CLI overrides
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config =
        Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(url) = &cli.correlation_url {
        config.engine.correlation_url = url.clone();
    }
    if !cli.strategies.is_empty() {
        config.engine.strategies = cli.strategies.clone();
    }
    if cli.no_variants {
        config.engine.expand_variants = false;
    }
    if cli.all_tokens {
        config.engine.token_selection = TokenSelection::All;
    }
    if let Some(format) = cli.format {
        config.output.format = format;
    }

    config.validate().context("Invalid configuration")?;

    Ok(config)
}

fn read_request(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .with_context(|| format!("Failed to read request from {:?}", p)),
        _ => {
            let mut request = String::new();
            io::stdin()
                .read_to_string(&mut request)
                .context("Failed to read request from stdin")?;
            Ok(request)
        }
    }
}

/// Generate default configuration file
fn generate_default_config() -> Result<()> {
    let toml = Config::default()
        .to_toml()
        .context("Failed to serialize configuration")?;

    println!("{}", toml);
    Ok(())
}
