use anyhow::Context;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use ck_cli::cli::next::NextArgs;
use ck_cli::cli::{Cli, Command, ConfigCommand};
use ck_domain::config::ObservabilityConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Command::Version = cli.command {
        println!("cronkit {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let (config, config_path) = ck_cli::cli::load_config()?;
    init_tracing(&config.observability).context("initializing logging")?;
    tracing::debug!(config_path = %config_path, "configuration loaded");

    let ok = match cli.command {
        Command::Next {
            expression,
            dialect,
            tz,
            count,
            from,
            json,
        } => ck_cli::cli::next::run(
            &config,
            NextArgs {
                expression,
                dialect,
                tz,
                count,
                from,
                json,
            },
        )?,
        Command::Parse {
            expression,
            dialect,
            json,
        } => ck_cli::cli::parse::run(&config, &expression, dialect, json)?,
        Command::Describe {
            expression,
            dialect,
            json,
        } => ck_cli::cli::describe::run(&config, &expression, dialect, json)?,
        Command::Config(ConfigCommand::Validate) => {
            ck_cli::cli::config::validate(&config, &config_path)
        }
        Command::Config(ConfigCommand::Show) => {
            ck_cli::cli::config::show(&config)?;
            true
        }
        Command::Version => true,
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

/// Log to stderr so stdout stays clean for output. `RUST_LOG` overrides the
/// configured filter.
fn init_tracing(obs: &ObservabilityConfig) -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| ck_cli::cli::configured_filter(obs));

    let registry = tracing_subscriber::registry().with(env_filter);
    if obs.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }
    Ok(())
}
