mod engine;
mod observability;
mod output;

pub use engine::*;
pub use observability::*;
pub use output::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl ConfigError {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Search budgets below this rarely find leap-day or nth-weekday schedules.
const LOW_ITERATION_BUDGET: usize = 1_000;

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let engine = &self.engine;

        if engine.default_timezone.parse::<chrono_tz::Tz>().is_err() {
            errors.push(ConfigError::error(
                "engine.default_timezone",
                format!(
                    "unknown timezone '{}'; use IANA names like 'America/New_York' or 'UTC'",
                    engine.default_timezone
                ),
            ));
        }

        if engine.default_count == 0 {
            errors.push(ConfigError::error(
                "engine.default_count",
                "default_count must be greater than 0",
            ));
        }

        if engine.max_count == 0 {
            errors.push(ConfigError::error(
                "engine.max_count",
                "max_count must be greater than 0",
            ));
        } else if engine.default_count > engine.max_count {
            errors.push(ConfigError::error(
                "engine.default_count",
                format!(
                    "default_count ({}) exceeds max_count ({})",
                    engine.default_count, engine.max_count
                ),
            ));
        }

        if engine.max_iterations == 0 {
            errors.push(ConfigError::error(
                "engine.max_iterations",
                "max_iterations must be greater than 0",
            ));
        } else if engine.max_iterations < LOW_ITERATION_BUDGET {
            errors.push(ConfigError::warning(
                "engine.max_iterations",
                format!(
                    "max_iterations = {} may report sparse schedules (e.g. Feb 29) as unsatisfiable",
                    engine.max_iterations
                ),
            ));
        }

        if self.output.datetime_format.trim().is_empty() {
            errors.push(ConfigError::error(
                "output.datetime_format",
                "datetime_format must not be empty",
            ));
        }

        let log_filter = self.observability.log_filter.trim();
        if log_filter.is_empty() {
            errors.push(ConfigError::warning(
                "observability.log_filter",
                format!("empty log_filter, falling back to '{DEFAULT_LOG_FILTER}'"),
            ));
        } else if let Err(e) = tracing_subscriber::EnvFilter::try_new(log_filter) {
            errors.push(ConfigError::error(
                "observability.log_filter",
                format!("invalid log_filter '{log_filter}': {e}"),
            ));
        }

        errors
    }
}
