use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named cron syntax variant.
///
/// `Auto` is only meaningful as a hint: the normalizer always resolves it to
/// one of the concrete dialects before anything else consults the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CronDialect {
    #[default]
    Auto,
    /// Vixie / POSIX 5-field cron.
    Unix,
    /// 6-field cron with a leading seconds field.
    UnixSeconds,
    /// Quartz scheduler: seconds, optional year, `?`, `L`, `W`, `#`.
    Quartz,
    /// AWS EventBridge `cron(...)` expressions.
    Aws,
    /// Kubernetes CronJob schedules.
    K8s,
    /// Jenkins triggers with `H` hash tokens.
    Jenkins,
}

/// How day-of-month and day-of-week combine when both are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayCombination {
    /// Both restricted: a day matches if either field matches.
    Or,
    /// Exactly one field is `?`; only the other one is consulted.
    Exclusive,
    /// A `?` field defers to its sibling; otherwise behaves like [`Or`](Self::Or).
    Selective,
}

/// Numbering used by the day-of-week field as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekdayNumbering {
    /// `0-6` with Sunday = 0 (`7` accepted as Sunday).
    ZeroSunday,
    /// `1-7` with Sunday = 1.
    OneSunday,
}

/// Per-dialect rules consulted by the normalizer, field parser and calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectPolicy {
    pub seconds: bool,
    pub optional_year: bool,
    pub day_combination: DayCombination,
    pub weekday_numbering: WeekdayNumbering,
    /// `?` accepted in the day fields.
    pub question_mark: bool,
    /// `L`, `W` and `#` accepted in the day fields.
    pub calendar_tokens: bool,
    /// Jenkins `H` accepted in every field.
    pub hash_tokens: bool,
    /// Expression must be wrapped in `cron( ... )`.
    pub wrapped: bool,
    /// `CRON_TZ=` / `TZ=` prefix accepted.
    pub timezone_prefix: bool,
}

const UNIX: DialectPolicy = DialectPolicy {
    seconds: false,
    optional_year: false,
    day_combination: DayCombination::Or,
    weekday_numbering: WeekdayNumbering::ZeroSunday,
    question_mark: false,
    calendar_tokens: false,
    hash_tokens: false,
    wrapped: false,
    timezone_prefix: true,
};

const UNIX_SECONDS: DialectPolicy = DialectPolicy {
    seconds: true,
    ..UNIX
};

const QUARTZ: DialectPolicy = DialectPolicy {
    seconds: true,
    optional_year: true,
    day_combination: DayCombination::Exclusive,
    weekday_numbering: WeekdayNumbering::OneSunday,
    question_mark: true,
    calendar_tokens: true,
    hash_tokens: false,
    wrapped: false,
    timezone_prefix: false,
};

const AWS: DialectPolicy = DialectPolicy {
    seconds: false,
    wrapped: true,
    ..QUARTZ
};

const K8S: DialectPolicy = DialectPolicy {
    day_combination: DayCombination::Selective,
    question_mark: true,
    ..UNIX
};

const JENKINS: DialectPolicy = DialectPolicy {
    hash_tokens: true,
    ..UNIX
};

impl CronDialect {
    /// Every concrete dialect, in the order auto-detection reports them.
    pub const CONCRETE: [CronDialect; 6] = [
        CronDialect::Unix,
        CronDialect::UnixSeconds,
        CronDialect::Quartz,
        CronDialect::Aws,
        CronDialect::K8s,
        CronDialect::Jenkins,
    ];

    /// Policy table entry. `Auto` reports the unix policy.
    pub const fn policy(self) -> &'static DialectPolicy {
        match self {
            CronDialect::Auto | CronDialect::Unix => &UNIX,
            CronDialect::UnixSeconds => &UNIX_SECONDS,
            CronDialect::Quartz => &QUARTZ,
            CronDialect::Aws => &AWS,
            CronDialect::K8s => &K8S,
            CronDialect::Jenkins => &JENKINS,
        }
    }

    /// Smallest number of whitespace separated fields.
    pub fn min_fields(self) -> usize {
        let p = self.policy();
        5 + usize::from(p.seconds)
    }

    /// Largest number of whitespace separated fields.
    pub fn max_fields(self) -> usize {
        self.min_fields() + usize::from(self.policy().optional_year)
    }

    /// Human readable expected field count, e.g. `"5"` or `"6 or 7"`.
    pub fn expected_fields(self) -> String {
        let (min, max) = (self.min_fields(), self.max_fields());
        if min == max {
            min.to_string()
        } else {
            format!("{min} or {max}")
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CronDialect::Auto => "auto",
            CronDialect::Unix => "unix",
            CronDialect::UnixSeconds => "unix_seconds",
            CronDialect::Quartz => "quartz",
            CronDialect::Aws => "aws",
            CronDialect::K8s => "k8s",
            CronDialect::Jenkins => "jenkins",
        }
    }
}

impl fmt::Display for CronDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CronDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "auto" => Ok(CronDialect::Auto),
            "unix" | "vixie" | "posix" => Ok(CronDialect::Unix),
            "unix_seconds" | "seconds" => Ok(CronDialect::UnixSeconds),
            "quartz" => Ok(CronDialect::Quartz),
            "aws" | "eventbridge" => Ok(CronDialect::Aws),
            "k8s" | "kubernetes" => Ok(CronDialect::K8s),
            "jenkins" => Ok(CronDialect::Jenkins),
            other => Err(format!(
                "unknown cron dialect '{other}' (expected auto, unix, unix_seconds, quartz, aws, k8s or jenkins)"
            )),
        }
    }
}
