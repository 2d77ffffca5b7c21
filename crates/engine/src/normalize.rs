//! Dialect normalizer: raw schedule string → canonical field array.

use std::fmt;

use serde::Serialize;

use ck_domain::{CronDialect, DayCombination, FieldKind, ParseError};

/// Advisory notice attached to a successful parse. Never blocks computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Day-of-month and day-of-week are both restricted; a day matching
    /// either one fires.
    OrSemantics,
    MacroExpanded { from: String, to: String },
    TimezonePrefix { timezone: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::OrSemantics => f.write_str(
                "both day-of-month and day-of-week are restricted: a day matching either one fires (OR semantics)",
            ),
            Warning::MacroExpanded { from, to } => write!(f, "{from} expanded to '{to}'"),
            Warning::TimezonePrefix { timezone } => {
                write!(f, "schedule pins its own timezone {timezone}")
            }
        }
    }
}

/// Canonical form of a schedule: raw field strings in fixed position order
/// `[seconds?, minutes, hours, dayOfMonth, month, dayOfWeek, year?]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedExpression {
    /// Trimmed input, used as the Jenkins hash seed.
    pub source: String,
    pub dialect: CronDialect,
    pub fields: Vec<String>,
    pub layout: Vec<FieldKind>,
    pub warnings: Vec<Warning>,
    /// Zone named by a `CRON_TZ=` / `TZ=` prefix.
    pub timezone: Option<String>,
}

impl NormalizedExpression {
    pub fn field(&self, kind: FieldKind) -> Option<&str> {
        self.layout
            .iter()
            .position(|k| *k == kind)
            .and_then(|i| self.fields.get(i))
            .map(String::as_str)
    }

    /// Space separated canonical fields.
    pub fn canonical(&self) -> String {
        self.fields.join(" ")
    }
}

/// Normalize `raw` under `dialect`, resolving `Auto` to a concrete dialect.
pub fn normalize(raw: &str, dialect: CronDialect) -> Result<NormalizedExpression, ParseError> {
    let source = raw.trim();
    let mut warnings = Vec::new();

    let (prefix, body) = strip_timezone_prefix(source)?;
    let timezone = prefix.map(|(_, zone)| zone.to_owned());
    if let Some(tz) = &timezone {
        warnings.push(Warning::TimezonePrefix {
            timezone: tz.clone(),
        });
    }

    let (mut dialect, body) = unwrap_aws(body, dialect)?;

    let body = if body.starts_with('@') {
        let (resolved, expansion) = expand_macro(body, dialect)?;
        warnings.push(Warning::MacroExpanded {
            from: body.to_owned(),
            to: expansion.to_owned(),
        });
        dialect = resolved;
        expansion
    } else {
        body
    };

    let fields: Vec<String> = body.split_whitespace().map(str::to_owned).collect();
    if dialect == CronDialect::Auto {
        dialect = detect(&fields);
    }

    // Checked once the dialect is known, so auto-detected quartz/aws are covered.
    if let Some((token, _)) = prefix {
        if !dialect.policy().timezone_prefix {
            return Err(ParseError::invalid_token(
                None,
                token,
                format!("timezone prefixes are not supported by {dialect}"),
            ));
        }
    }

    let count = fields.len();
    if count < dialect.min_fields() || count > dialect.max_fields() {
        return Err(ParseError::FieldCount {
            dialect,
            expected: dialect.expected_fields(),
            found: count,
        });
    }

    let layout = FieldKind::layout(dialect, count > dialect.min_fields());
    let mut normalized = NormalizedExpression {
        source: source.to_owned(),
        dialect,
        fields,
        layout,
        warnings,
        timezone,
    };
    if let Some(warning) = check_day_fields(&normalized)? {
        normalized.warnings.push(warning);
    }

    tracing::trace!(
        dialect = %normalized.dialect,
        canonical = %normalized.canonical(),
        "normalized cron expression"
    );
    Ok(normalized)
}

/// Split off a leading `CRON_TZ=<zone>` / `TZ=<zone>` token, returning the
/// token and the zone name.
fn strip_timezone_prefix(source: &str) -> Result<(Option<(&str, &str)>, &str), ParseError> {
    let first = source.split_whitespace().next().unwrap_or_default();
    let zone = first
        .strip_prefix("CRON_TZ=")
        .or_else(|| first.strip_prefix("TZ="));

    let Some(zone) = zone else {
        return Ok((None, source));
    };
    if zone.is_empty() {
        return Err(ParseError::invalid_token(None, first, "missing timezone name"));
    }
    let rest = source[first.len()..].trim_start();
    Ok((Some((first, zone)), rest))
}

/// Remove the AWS `cron( ... )` wrapper. `Auto` + wrapper resolves to `Aws`.
fn unwrap_aws(body: &str, dialect: CronDialect) -> Result<(CronDialect, &str), ParseError> {
    let wrapped = body
        .get(..5)
        .is_some_and(|head| head.eq_ignore_ascii_case("cron("));

    match (dialect, wrapped) {
        (CronDialect::Auto | CronDialect::Aws, true) => {
            let inner = body[5..].trim_end().strip_suffix(')').ok_or_else(|| {
                ParseError::invalid_token(None, body, "missing closing ')' in cron(...) wrapper")
            })?;
            Ok((CronDialect::Aws, inner.trim()))
        }
        (CronDialect::Aws, false) => Err(ParseError::invalid_token(
            None,
            body,
            "AWS schedules must be wrapped in cron(...)",
        )),
        (_, true) => Err(ParseError::invalid_token(
            None,
            body,
            format!("cron(...) wrapper is only valid for aws, not {dialect}"),
        )),
        (_, false) => Ok((dialect, body)),
    }
}

/// Expand an `@` shortcut to the dialect's canonical equivalent.
fn expand_macro(
    body: &str,
    dialect: CronDialect,
) -> Result<(CronDialect, &'static str), ParseError> {
    let name = body.to_ascii_lowercase();
    if body.split_whitespace().count() != 1 {
        return Err(ParseError::invalid_token(
            None,
            body,
            "an @ shortcut must be the whole expression",
        ));
    }
    if name == "@reboot" {
        return Err(ParseError::invalid_token(
            None,
            body,
            "@reboot runs once at startup and has no calendar schedule",
        ));
    }

    let dialect = match dialect {
        CronDialect::Auto => CronDialect::Unix,
        CronDialect::Aws => {
            return Err(ParseError::invalid_token(
                None,
                body,
                "AWS schedules do not support @ shortcuts",
            ))
        }
        other => other,
    };

    // (unix, unix_seconds, quartz, jenkins)
    let table: (&str, &str, &str, &str) = match name.as_str() {
        "@yearly" | "@annually" => ("0 0 1 1 *", "0 0 0 1 1 *", "0 0 0 1 1 ?", "H H H H *"),
        "@monthly" => ("0 0 1 * *", "0 0 0 1 * *", "0 0 0 1 * ?", "H H H * *"),
        "@weekly" => ("0 0 * * 0", "0 0 0 * * 0", "0 0 0 ? * 1", "H H * * H"),
        "@daily" => ("0 0 * * *", "0 0 0 * * *", "0 0 0 * * ?", "H H * * *"),
        "@midnight" => ("0 0 * * *", "0 0 0 * * *", "0 0 0 * * ?", "H H(0-2) * * *"),
        "@hourly" => ("0 * * * *", "0 0 * * * *", "0 0 * * * ?", "H * * * *"),
        _ => {
            return Err(ParseError::invalid_token(
                None,
                body,
                "unknown @ shortcut (expected @yearly, @annually, @monthly, @weekly, @daily, @midnight or @hourly)",
            ))
        }
    };

    let expansion = match dialect {
        CronDialect::UnixSeconds => table.1,
        CronDialect::Quartz => table.2,
        CronDialect::Jenkins => table.3,
        _ => table.0,
    };
    Ok((dialect, expansion))
}

/// Infer a dialect from the split fields of an unwrapped expression.
fn detect(fields: &[String]) -> CronDialect {
    if fields.iter().any(|f| has_hash_token(f)) {
        return CronDialect::Jenkins;
    }
    if fields.iter().any(|f| has_quartz_token(f)) {
        return CronDialect::Quartz;
    }
    match fields.len() {
        7 => CronDialect::Quartz,
        6 => CronDialect::UnixSeconds,
        _ => CronDialect::Unix,
    }
}

fn has_hash_token(field: &str) -> bool {
    field
        .split(',')
        .any(|p| p == "H" || p.starts_with("H/") || p.starts_with("H("))
}

const DAY_NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

fn has_quartz_token(field: &str) -> bool {
    if field.contains('?') || field.contains('#') {
        return true;
    }
    field.split(',').any(|part| {
        let upper = part.to_ascii_uppercase();
        if upper == "L" || upper == "LW" || upper.starts_with("L-") {
            return true;
        }
        let Some(head) = upper
            .strip_suffix('L')
            .or_else(|| upper.strip_suffix('W'))
        else {
            return false;
        };
        (!head.is_empty() && head.bytes().all(|b| b.is_ascii_digit()))
            || (upper.ends_with('L') && DAY_NAMES.contains(&head))
    })
}

/// Day-field combination rules: warning for OR semantics, error for
/// dialects that require exactly one `?`.
fn check_day_fields(expr: &NormalizedExpression) -> Result<Option<Warning>, ParseError> {
    let dom = expr.field(FieldKind::DayOfMonth).unwrap_or("*");
    let dow = expr.field(FieldKind::DayOfWeek).unwrap_or("*");
    let restricted = |f: &str| f != "*" && f != "?";

    match expr.dialect.policy().day_combination {
        DayCombination::Or | DayCombination::Selective => {
            Ok((restricted(dom) && restricted(dow)).then_some(Warning::OrSemantics))
        }
        DayCombination::Exclusive => match (dom == "?", dow == "?") {
            (true, true) => Err(ParseError::DialectConflict {
                dialect: expr.dialect,
                reason: "day-of-month and day-of-week cannot both be '?'".into(),
            }),
            (false, false) => Err(ParseError::DialectConflict {
                dialect: expr.dialect,
                reason: format!(
                    "exactly one of day-of-month ('{dom}') or day-of-week ('{dow}') must be '?'"
                ),
            }),
            _ => Ok(None),
        },
    }
}
