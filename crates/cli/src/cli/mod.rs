pub mod config;
pub mod describe;
pub mod next;
pub mod parse;

use clap::{Parser, Subcommand};

use tracing_subscriber::EnvFilter;

use ck_domain::config::{Config, ObservabilityConfig, OutputFormat, DEFAULT_LOG_FILTER};
use ck_domain::{ComputeError, CronDialect, ParseError};

/// cronkit: parse, explain and schedule cron expressions across dialects.
#[derive(Debug, Parser)]
#[command(name = "cronkit", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the next fire times of an expression.
    Next {
        /// The cron expression (quote it).
        expression: String,
        /// Dialect: auto, unix, unix_seconds, quartz, aws, k8s, jenkins.
        #[arg(long)]
        dialect: Option<CronDialect>,
        /// IANA timezone (e.g. "America/New_York").
        #[arg(long)]
        tz: Option<String>,
        /// Number of fire times to print.
        #[arg(long, short = 'n')]
        count: Option<usize>,
        /// Start instant as RFC 3339 (defaults to now).
        #[arg(long)]
        from: Option<String>,
        /// Output JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },
    /// Show the resolved dialect, canonical fields and per-field values.
    Parse {
        expression: String,
        #[arg(long)]
        dialect: Option<CronDialect>,
        #[arg(long)]
        json: bool,
    },
    /// Describe an expression in English (or as JSON tokens).
    Describe {
        expression: String,
        #[arg(long)]
        dialect: Option<CronDialect>,
        #[arg(long)]
        json: bool,
    },
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path specified by `CRONKIT_CONFIG` (or
/// `cronkit.toml` by default). Returns the parsed [`Config`] and the path
/// that was used. A missing file yields the defaults.
pub fn load_config() -> anyhow::Result<(Config, String)> {
    let config_path = std::env::var("CRONKIT_CONFIG").unwrap_or_else(|_| "cronkit.toml".into());

    let config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
        toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))?
    } else {
        Config::default()
    };

    Ok((config, config_path))
}

// ── Shared output helpers ─────────────────────────────────────────────

/// `--json` wins; otherwise the configured output format decides.
pub fn wants_json(config: &Config, flag: bool) -> bool {
    flag || config.output.format == OutputFormat::Json
}

pub fn resolve_dialect(config: &Config, flag: Option<CronDialect>) -> CronDialect {
    flag.unwrap_or(config.engine.default_dialect)
}

/// The configured log filter. Invalid directives fall back to
/// [`DEFAULT_LOG_FILTER`] so `config validate` can still report them.
pub fn configured_filter(obs: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_new(obs.filter_directive()).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn parse_error_body(expression: &str, err: &ParseError) -> serde_json::Value {
    serde_json::json!({
        "expression": expression,
        "error": err.to_string(),
        "field": err.field(),
    })
}

fn compute_error_body(expression: &str, err: &ComputeError) -> serde_json::Value {
    serde_json::json!({
        "expression": expression,
        "error": err.to_string(),
    })
}

/// Report a parse failure, naming the offending field when known.
pub fn report_parse_error(expression: &str, err: &ParseError, json: bool) {
    if json {
        println!("{:#}", parse_error_body(expression, err));
        return;
    }
    match err.field() {
        Some(field) => eprintln!("error: invalid {field} field in '{expression}': {err}"),
        None => eprintln!("error: '{expression}': {err}"),
    }
}

/// Report a schedule that parsed but could not produce fire times.
pub fn report_compute_error(expression: &str, err: &ComputeError, json: bool) {
    if json {
        println!("{:#}", compute_error_body(expression, err));
    } else {
        eprintln!("error: computing next runs for '{expression}': {err}");
    }
}
