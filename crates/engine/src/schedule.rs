use std::str::FromStr;

use serde::Serialize;

use ck_domain::trace::TraceEvent;
use ck_domain::{CronDialect, DayCombination, FieldKind, ParseError};

use crate::field::{parse_field, FieldContext, FieldSpec};
use crate::normalize::{normalize, Warning};

/// A fully parsed schedule. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedSchedule {
    expression: String,
    dialect: CronDialect,
    fields: Vec<FieldSpec>,
    warnings: Vec<Warning>,
    timezone_hint: Option<String>,
}

/// Parse `raw` under `dialect_hint` (`Auto` to detect).
pub fn parse_cron(raw: &str, dialect_hint: CronDialect) -> Result<ParsedSchedule, ParseError> {
    match build(raw, dialect_hint) {
        Ok(schedule) => {
            TraceEvent::ScheduleParsed {
                dialect: schedule.dialect,
                requested: dialect_hint,
                fields: schedule.fields.len(),
                warnings: schedule.warnings.len(),
            }
            .emit();
            Ok(schedule)
        }
        Err(e) => {
            tracing::debug!(expression = raw, error = %e, "cron expression rejected");
            TraceEvent::ScheduleRejected {
                requested: dialect_hint,
                error: e.to_string(),
            }
            .emit();
            Err(e)
        }
    }
}

fn build(raw: &str, dialect_hint: CronDialect) -> Result<ParsedSchedule, ParseError> {
    let normalized = normalize(raw, dialect_hint)?;
    let ctx = FieldContext::new(normalized.dialect, &normalized.source);

    let fields = normalized
        .layout
        .iter()
        .zip(&normalized.fields)
        .map(|(kind, text)| parse_field(text, *kind, &ctx))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ParsedSchedule {
        expression: normalized.source,
        dialect: normalized.dialect,
        fields,
        warnings: normalized.warnings,
        timezone_hint: normalized.timezone,
    })
}

impl ParsedSchedule {
    /// Trimmed source expression.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Resolved dialect, never `Auto`.
    pub fn dialect(&self) -> CronDialect {
        self.dialect
    }

    /// Fields in canonical order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, kind: FieldKind) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.field() == kind)
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Zone named by a `CRON_TZ=` / `TZ=` prefix, if any.
    pub fn timezone_hint(&self) -> Option<&str> {
        self.timezone_hint.as_deref()
    }

    pub fn has_seconds(&self) -> bool {
        self.field(FieldKind::Second).is_some()
    }

    pub fn day_combination(&self) -> DayCombination {
        self.dialect.policy().day_combination
    }

    /// Canonical field array joined by spaces.
    pub fn canonical(&self) -> String {
        self.fields
            .iter()
            .map(FieldSpec::raw)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl FromStr for ParsedSchedule {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_cron(s, CronDialect::Auto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldShape;

    #[test]
    fn parses_unix_expression() {
        let s = parse_cron("*/15 9-17 * * MON-FRI", CronDialect::Unix).unwrap();
        assert_eq!(s.dialect(), CronDialect::Unix);
        assert_eq!(s.fields().len(), 5);
        assert!(!s.has_seconds());
        let minutes = s.field(FieldKind::Minute).unwrap();
        assert_eq!(minutes.values().iter().copied().collect::<Vec<_>>(), vec![0, 15, 30, 45]);
        assert!(s.warnings().is_empty());
    }

    #[test]
    fn parse_is_idempotent() {
        let a = parse_cron("0 0 1 * MON", CronDialect::Auto).unwrap();
        let b = parse_cron("0 0 1 * MON", CronDialect::Auto).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn field_errors_propagate_with_field() {
        let err = parse_cron("0 ? * * *", CronDialect::Unix).unwrap_err();
        assert_eq!(err.field(), Some(FieldKind::Hour));
        let err = parse_cron("0 12 * 13 ?", CronDialect::K8s).unwrap_err();
        assert_eq!(err.field(), Some(FieldKind::Month));
    }

    #[test]
    fn quartz_with_year() {
        let s = parse_cron("0 30 10 ? * 2#1 2030-2032", CronDialect::Quartz).unwrap();
        assert!(s.has_seconds());
        let year = s.field(FieldKind::Year).unwrap();
        assert_eq!(year.values().len(), 3);
        assert!(s.field(FieldKind::DayOfMonth).unwrap().is_question());
        assert_eq!(s.field(FieldKind::DayOfWeek).unwrap().shape(), FieldShape::Nth);
    }

    #[test]
    fn from_str_uses_auto() {
        let s: ParsedSchedule = "@hourly".parse().unwrap();
        assert_eq!(s.canonical(), "0 * * * *");
        assert_eq!(s.expression(), "@hourly");
    }

    #[test]
    fn timezone_hint_is_kept() {
        let s = parse_cron("CRON_TZ=Asia/Tokyo 0 9 * * *", CronDialect::Auto).unwrap();
        assert_eq!(s.timezone_hint(), Some("Asia/Tokyo"));
    }
}
