use crate::dialect::CronDialect;
use crate::field::FieldKind;

/// Why a schedule string could not be turned into a `ParsedSchedule`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected {expected} fields for {dialect}, got {found}")]
    FieldCount {
        dialect: CronDialect,
        expected: String,
        found: usize,
    },

    #[error("{}invalid token '{token}': {reason}", field_prefix(.field))]
    InvalidToken {
        field: Option<FieldKind>,
        token: String,
        reason: String,
    },

    #[error("{field}: value {value} out of range {min}..={max}")]
    OutOfRange {
        field: FieldKind,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("{field}: invalid range '{token}': {reason}")]
    InvalidRange {
        field: FieldKind,
        token: String,
        reason: String,
    },

    #[error("{dialect}: {reason}")]
    DialectConflict {
        dialect: CronDialect,
        reason: String,
    },
}

fn field_prefix(field: &Option<FieldKind>) -> String {
    match field {
        Some(f) => format!("{f}: "),
        None => String::new(),
    }
}

impl ParseError {
    /// The field the error points at, for highlighting the offending token.
    pub fn field(&self) -> Option<FieldKind> {
        match self {
            ParseError::InvalidToken { field, .. } => *field,
            ParseError::OutOfRange { field, .. } | ParseError::InvalidRange { field, .. } => {
                Some(*field)
            }
            ParseError::FieldCount { .. } | ParseError::DialectConflict { .. } => None,
        }
    }

    pub fn invalid_token(field: Option<FieldKind>, token: &str, reason: impl Into<String>) -> Self {
        ParseError::InvalidToken {
            field,
            token: token.to_owned(),
            reason: reason.into(),
        }
    }

    pub fn invalid_range(field: FieldKind, token: &str, reason: impl Into<String>) -> Self {
        ParseError::InvalidRange {
            field,
            token: token.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Why a parsed schedule could not produce fire times.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ComputeError {
    #[error("no matching time found after {iterations} search steps")]
    Unsatisfiable { iterations: usize },

    #[error("invalid timezone: '{0}' (use IANA names like 'America/New_York' or 'UTC')")]
    InvalidTimezone(String),
}

/// Crate-spanning error used by front ends.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("parse: {0}")]
    Parse(#[from] ParseError),

    #[error("compute: {0}")]
    Compute(#[from] ComputeError),

    #[error("config: {0}")]
    Config(String),

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
