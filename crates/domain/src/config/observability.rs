use serde::{Deserialize, Serialize};

/// Filter used when `log_filter` is blank or cannot be parsed.
pub const DEFAULT_LOG_FILTER: &str = "warn";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Observability (logging) configuration
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Logging configuration for the `cronkit` binary.
///
/// Logs always go to stderr so that results printed on stdout stay
/// machine-readable.  `RUST_LOG` takes precedence over `log_filter`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// `EnvFilter` directive, e.g. `warn` or `info,ck_engine=debug`.
    #[serde(default = "d_log_filter")]
    pub log_filter: String,

    /// Emit one JSON object per log line instead of the compact format.
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: d_log_filter(),
            json_logs: false,
        }
    }
}

impl ObservabilityConfig {
    /// The configured directive, or [`DEFAULT_LOG_FILTER`] when blank.
    pub fn filter_directive(&self) -> &str {
        match self.log_filter.trim() {
            "" => DEFAULT_LOG_FILTER,
            directive => directive,
        }
    }
}

fn d_log_filter() -> String {
    DEFAULT_LOG_FILTER.into()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_is_warn() {
        let cfg = ObservabilityConfig::default();
        assert_eq!(cfg.log_filter, "warn");
        assert!(!cfg.json_logs);
    }

    #[test]
    fn blank_filter_directive_uses_default() {
        let cfg = ObservabilityConfig {
            log_filter: "  ".into(),
            json_logs: false,
        };
        assert_eq!(cfg.filter_directive(), DEFAULT_LOG_FILTER);

        let cfg = ObservabilityConfig {
            log_filter: " info,ck_engine=debug ".into(),
            json_logs: false,
        };
        assert_eq!(cfg.filter_directive(), "info,ck_engine=debug");
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: ObservabilityConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.log_filter, "warn");
        assert!(!cfg.json_logs);
    }

    #[test]
    fn deserialize_with_values() {
        let toml_str = r#"
            log_filter = "info,ck_engine=trace"
            json_logs = true
        "#;
        let cfg: ObservabilityConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.log_filter, "info,ck_engine=trace");
        assert!(cfg.json_logs);
    }
}
