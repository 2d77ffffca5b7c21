use serde::{Deserialize, Serialize};

use crate::dialect::CronDialect;

/// Search steps allowed per fire time before a schedule counts as
/// unsatisfiable.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Engine defaults
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Defaults applied when a caller does not specify dialect, timezone or
/// count, plus the next-run search budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub default_dialect: CronDialect,
    /// IANA timezone used when neither the caller nor a `CRON_TZ=` prefix
    /// names one.
    #[serde(default = "d_timezone")]
    pub default_timezone: String,
    #[serde(default = "d_default_count")]
    pub default_count: usize,
    /// Requests above this are clamped.
    #[serde(default = "d_max_count")]
    pub max_count: usize,
    /// Advancement steps allowed per result before giving up as
    /// unsatisfiable.
    #[serde(default = "d_max_iterations")]
    pub max_iterations: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_dialect: CronDialect::Auto,
            default_timezone: d_timezone(),
            default_count: d_default_count(),
            max_count: d_max_count(),
            max_iterations: d_max_iterations(),
        }
    }
}

impl EngineConfig {
    /// Resolve a requested count against the defaults and the cap.
    pub fn effective_count(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_count)
            .clamp(1, self.max_count.max(1))
    }
}

fn d_timezone() -> String {
    "UTC".into()
}

fn d_default_count() -> usize {
    5
}

fn d_max_count() -> usize {
    1000
}

fn d_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}
