//! Field parser: one canonical field string → [`FieldSpec`].
//!
//! Simple members (`*`, numbers, names, ranges, steps, Jenkins `H`) are
//! materialized into an ordered value set. `L`, `W` and `#` depend on the
//! candidate month, so they are kept as [`DayRule`]s and evaluated lazily.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use ck_domain::{CronDialect, FieldDomain, FieldKind, ParseError, WeekdayNumbering};

use crate::hash;

/// Dominant form of a field as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldShape {
    Wildcard,
    List,
    Range,
    Step,
    Question,
    Last,
    Weekday,
    Nth,
    Hash,
}

/// Day predicate that can only be decided against a concrete date.
///
/// Weekdays are canonical: `0 = Sunday .. 6 = Saturday`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum DayRule {
    /// `L` / `L-n`: the last day of the month, minus `offset` days.
    LastDayOfMonth { offset: u32 },
    /// `LW`: the last Monday–Friday of the month.
    LastBusinessDayOfMonth,
    /// `nW`: the Monday–Friday closest to day `n`, without leaving the month.
    NearestBusinessDay { day: u32 },
    /// `nL`: the last given weekday of the month.
    LastWeekdayOfMonth { weekday: u32 },
    /// `n#m`: the `nth` occurrence of a weekday. Months without that
    /// occurrence simply have no match.
    NthWeekdayOfMonth { weekday: u32, nth: u32 },
}

impl DayRule {
    pub fn matches(&self, date: NaiveDate) -> bool {
        let day = date.day();
        let last = days_in_month(date.year(), date.month());
        let weekday = date.weekday().num_days_from_sunday();

        match *self {
            DayRule::LastDayOfMonth { offset } => last > offset && day == last - offset,
            DayRule::LastBusinessDayOfMonth => {
                business_day_near(date.year(), date.month(), last) == Some(day)
            }
            DayRule::NearestBusinessDay { day: target } => {
                business_day_near(date.year(), date.month(), target) == Some(day)
            }
            DayRule::LastWeekdayOfMonth { weekday: wanted } => {
                weekday == wanted && day + 7 > last
            }
            DayRule::NthWeekdayOfMonth { weekday: wanted, nth } => {
                weekday == wanted && (day - 1) / 7 + 1 == nth
            }
        }
    }
}

/// Number of days in the given month.
pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map_or(28, |d| d.day())
}

/// Quartz `W` resolution: the weekday nearest `target`, staying inside the
/// month. `None` when the month is shorter than `target`.
fn business_day_near(year: i32, month: u32, target: u32) -> Option<u32> {
    let last = days_in_month(year, month);
    if target > last {
        return None;
    }
    let weekday = NaiveDate::from_ymd_opt(year, month, target)?.weekday();
    Some(match weekday {
        Weekday::Sat if target == 1 => 3,
        Weekday::Sat => target - 1,
        Weekday::Sun if target == last => target - 2,
        Weekday::Sun => target + 1,
        _ => target,
    })
}

/// Parsed representation of one cron field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    field: FieldKind,
    shape: FieldShape,
    values: BTreeSet<u32>,
    rules: Vec<DayRule>,
    raw: String,
}

impl FieldSpec {
    pub fn field(&self) -> FieldKind {
        self.field
    }

    pub fn shape(&self) -> FieldShape {
        self.shape
    }

    /// Materialized canonical values. Empty when the field is made only of
    /// day rules.
    pub fn values(&self) -> &BTreeSet<u32> {
        &self.values
    }

    pub fn rules(&self) -> &[DayRule] {
        &self.rules
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_question(&self) -> bool {
        self.shape == FieldShape::Question
    }

    /// Neither `*` nor `?`.
    pub fn is_restricted(&self) -> bool {
        !matches!(self.shape, FieldShape::Wildcard | FieldShape::Question)
    }

    pub fn contains(&self, value: u32) -> bool {
        self.values.contains(&value)
    }

    /// Smallest member `>= from`.
    pub fn next_value(&self, from: u32) -> Option<u32> {
        self.values.range(from..).next().copied()
    }

    /// Day-field test against a full date. Non-day fields never match.
    pub fn matches_date(&self, date: NaiveDate) -> bool {
        let value = match self.field {
            FieldKind::DayOfMonth => date.day(),
            FieldKind::DayOfWeek => date.weekday().num_days_from_sunday(),
            _ => return false,
        };
        self.values.contains(&value) || self.rules.iter().any(|r| r.matches(date))
    }
}

/// Everything the parser needs besides the raw field text.
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    pub dialect: CronDialect,
    /// Jenkins `H` hash seed: the whole source expression.
    pub seed: &'a str,
}

impl<'a> FieldContext<'a> {
    pub fn new(dialect: CronDialect, seed: &'a str) -> Self {
        Self { dialect, seed }
    }

    fn numbering(&self) -> WeekdayNumbering {
        self.dialect.policy().weekday_numbering
    }

    /// Domain of values as written, before day-of-week remapping.
    fn written_domain(&self, field: FieldKind) -> FieldDomain {
        match (field, self.numbering()) {
            (FieldKind::DayOfWeek, WeekdayNumbering::ZeroSunday) => FieldDomain::new(0, 7),
            (FieldKind::DayOfWeek, WeekdayNumbering::OneSunday) => FieldDomain::new(1, 7),
            _ => field.domain(),
        }
    }

    /// Range covered by `*`.
    fn wildcard_range(&self, field: FieldKind) -> (u32, u32) {
        let d = self.written_domain(field);
        match (field, self.numbering()) {
            (FieldKind::DayOfWeek, WeekdayNumbering::ZeroSunday) => (0, 6),
            _ => (d.min, d.max),
        }
    }

    /// Written day-of-week value → canonical `0 = Sunday`.
    fn canonical(&self, field: FieldKind, value: u32) -> u32 {
        match (field, self.numbering()) {
            (FieldKind::DayOfWeek, WeekdayNumbering::ZeroSunday) => value % 7,
            (FieldKind::DayOfWeek, WeekdayNumbering::OneSunday) => value - 1,
            _ => value,
        }
    }
}

const MONTH_NAMES: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];
const DAY_NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// Parse one canonical field.
pub fn parse_field(
    raw: &str,
    field: FieldKind,
    ctx: &FieldContext<'_>,
) -> Result<FieldSpec, ParseError> {
    let policy = ctx.dialect.policy();

    if raw.is_empty() {
        return Err(ParseError::invalid_token(Some(field), raw, "empty field"));
    }

    if raw == "?" {
        if !field.is_day() || !policy.question_mark {
            return Err(ParseError::invalid_token(
                Some(field),
                raw,
                format!(
                    "'?' is only allowed in day-of-month or day-of-week for quartz, aws and k8s (dialect is {})",
                    ctx.dialect
                ),
            ));
        }
        return Ok(FieldSpec {
            field,
            shape: FieldShape::Question,
            values: field.domain().iter().collect(),
            rules: Vec::new(),
            raw: raw.to_owned(),
        });
    }

    let mut values = BTreeSet::new();
    let mut rules = Vec::new();
    let mut shape = None;

    for part in raw.split(',') {
        if part.is_empty() {
            return Err(ParseError::invalid_token(
                Some(field),
                raw,
                "empty element in list",
            ));
        }
        let part_shape = parse_part(part, field, ctx, &mut values, &mut rules)?;
        shape = Some(match shape {
            None => part_shape,
            Some(_) => FieldShape::List,
        });
    }

    Ok(FieldSpec {
        field,
        shape: shape.unwrap_or(FieldShape::List),
        values,
        rules,
        raw: raw.to_owned(),
    })
}

fn parse_part(
    part: &str,
    field: FieldKind,
    ctx: &FieldContext<'_>,
    values: &mut BTreeSet<u32>,
    rules: &mut Vec<DayRule>,
) -> Result<FieldShape, ParseError> {
    if part == "?" {
        return Err(ParseError::invalid_token(
            Some(field),
            part,
            "'?' cannot be combined with other values",
        ));
    }

    if part.starts_with('H') {
        return parse_hash(part, field, ctx, values);
    }

    let upper = part.to_ascii_uppercase();
    if field.is_day() && is_calendar_token(&upper) {
        if !ctx.dialect.policy().calendar_tokens {
            return Err(ParseError::invalid_token(
                Some(field),
                part,
                format!("L, W and # are only supported by quartz and aws (dialect is {})", ctx.dialect),
            ));
        }
        return match field {
            FieldKind::DayOfMonth => parse_day_of_month_token(&upper, part, rules),
            _ => parse_day_of_week_token(&upper, part, ctx, values, rules),
        };
    }

    let (range_part, step) = match part.split_once('/') {
        Some((range, step)) => (range, Some(parse_step(step, part, field)?)),
        None => (part, None),
    };

    let (start, end, shape) = if range_part == "*" {
        let (lo, hi) = ctx.wildcard_range(field);
        let shape = if step.is_some() {
            FieldShape::Step
        } else {
            FieldShape::Wildcard
        };
        (lo, hi, shape)
    } else if let Some((a, b)) = range_part.split_once('-') {
        let start = parse_value(a, field, ctx)?;
        let end = parse_value(b, field, ctx)?;
        if start > end {
            return Err(ParseError::invalid_range(
                field,
                part,
                format!("start {start} is after end {end}"),
            ));
        }
        let shape = if step.is_some() {
            FieldShape::Step
        } else {
            FieldShape::Range
        };
        (start, end, shape)
    } else {
        let value = parse_value(range_part, field, ctx)?;
        match step {
            // `a/c` runs from `a` to the end of the domain.
            Some(_) => (value, ctx.written_domain(field).max, FieldShape::Step),
            None => (value, value, FieldShape::List),
        }
    };

    let step = step.unwrap_or(1) as usize;
    values.extend((start..=end).step_by(step).map(|v| ctx.canonical(field, v)));
    Ok(shape)
}

fn parse_step(step: &str, part: &str, field: FieldKind) -> Result<u32, ParseError> {
    let max = field.domain().max;
    let n: u32 = step
        .parse()
        .map_err(|_| ParseError::invalid_range(field, part, format!("invalid step '{step}'")))?;
    if n == 0 || n > max {
        return Err(ParseError::invalid_range(
            field,
            part,
            format!("step {n} out of range 1..={max}"),
        ));
    }
    Ok(n)
}

/// Number or name, validated against the written domain.
fn parse_value(token: &str, field: FieldKind, ctx: &FieldContext<'_>) -> Result<u32, ParseError> {
    let domain = ctx.written_domain(field);
    let value = match token.parse::<u32>() {
        Ok(n) => n,
        Err(_) => name_value(token, field, ctx).ok_or_else(|| {
            ParseError::invalid_token(Some(field), token, "expected a number or name")
        })?,
    };
    if !domain.contains(value) {
        return Err(ParseError::OutOfRange {
            field,
            value,
            min: domain.min,
            max: domain.max,
        });
    }
    Ok(value)
}

/// `JAN..DEC` / `SUN..SAT`, case-insensitive, in the dialect's numbering.
fn name_value(token: &str, field: FieldKind, ctx: &FieldContext<'_>) -> Option<u32> {
    let upper = token.to_ascii_uppercase();
    match field {
        FieldKind::Month => MONTH_NAMES
            .iter()
            .position(|n| *n == upper)
            .map(|i| i as u32 + 1),
        FieldKind::DayOfWeek => {
            let index = DAY_NAMES.iter().position(|n| *n == upper)? as u32;
            Some(match ctx.numbering() {
                WeekdayNumbering::ZeroSunday => index,
                WeekdayNumbering::OneSunday => index + 1,
            })
        }
        _ => None,
    }
}

fn is_calendar_token(upper: &str) -> bool {
    upper == "L"
        || upper == "LW"
        || upper.starts_with("L-")
        || upper.contains('#')
        || (upper.len() > 1 && (upper.ends_with('L') || upper.ends_with('W')))
}

fn parse_day_of_month_token(
    upper: &str,
    part: &str,
    rules: &mut Vec<DayRule>,
) -> Result<FieldShape, ParseError> {
    let field = FieldKind::DayOfMonth;
    if upper == "L" {
        rules.push(DayRule::LastDayOfMonth { offset: 0 });
        return Ok(FieldShape::Last);
    }
    if upper == "LW" {
        rules.push(DayRule::LastBusinessDayOfMonth);
        return Ok(FieldShape::Weekday);
    }
    if let Some(offset) = upper.strip_prefix("L-") {
        let offset: u32 = offset.parse().map_err(|_| {
            ParseError::invalid_token(Some(field), part, "expected L-<days>")
        })?;
        if offset > 30 {
            return Err(ParseError::OutOfRange {
                field,
                value: offset,
                min: 0,
                max: 30,
            });
        }
        rules.push(DayRule::LastDayOfMonth { offset });
        return Ok(FieldShape::Last);
    }
    if let Some(day) = upper.strip_suffix('W') {
        let day: u32 = day
            .parse()
            .map_err(|_| ParseError::invalid_token(Some(field), part, "expected <day>W"))?;
        let domain = field.domain();
        if !domain.contains(day) {
            return Err(ParseError::OutOfRange {
                field,
                value: day,
                min: domain.min,
                max: domain.max,
            });
        }
        rules.push(DayRule::NearestBusinessDay { day });
        return Ok(FieldShape::Weekday);
    }
    Err(ParseError::invalid_token(
        Some(field),
        part,
        "expected L, L-n, LW or nW",
    ))
}

fn parse_day_of_week_token(
    upper: &str,
    part: &str,
    ctx: &FieldContext<'_>,
    values: &mut BTreeSet<u32>,
    rules: &mut Vec<DayRule>,
) -> Result<FieldShape, ParseError> {
    let field = FieldKind::DayOfWeek;
    if upper == "L" {
        // Quartz: a bare `L` in day-of-week means Saturday.
        values.insert(6);
        return Ok(FieldShape::Last);
    }
    if let Some((day, nth)) = upper.split_once('#') {
        let weekday = ctx.canonical(field, parse_value(day, field, ctx)?);
        let nth: u32 = nth
            .parse()
            .map_err(|_| ParseError::invalid_token(Some(field), part, "expected <weekday>#<1-5>"))?;
        if !(1..=5).contains(&nth) {
            return Err(ParseError::OutOfRange {
                field,
                value: nth,
                min: 1,
                max: 5,
            });
        }
        rules.push(DayRule::NthWeekdayOfMonth { weekday, nth });
        return Ok(FieldShape::Nth);
    }
    if let Some(day) = upper.strip_suffix('L') {
        let weekday = ctx.canonical(field, parse_value(day, field, ctx)?);
        rules.push(DayRule::LastWeekdayOfMonth { weekday });
        return Ok(FieldShape::Last);
    }
    Err(ParseError::invalid_token(
        Some(field),
        part,
        "expected L, <weekday>L or <weekday>#<n>",
    ))
}

/// Range used by `H` without an explicit `H(a-b)`. Day-of-month stops at 28
/// so the value exists in every month.
fn hash_range(field: FieldKind) -> (u32, u32) {
    match field {
        FieldKind::DayOfMonth => (1, 28),
        _ => {
            let d = field.domain();
            (d.min, d.max)
        }
    }
}

/// Jenkins `H`, `H/n`, `H(a-b)`, `H(a-b)/n`.
fn parse_hash(
    part: &str,
    field: FieldKind,
    ctx: &FieldContext<'_>,
    values: &mut BTreeSet<u32>,
) -> Result<FieldShape, ParseError> {
    if !ctx.dialect.policy().hash_tokens {
        return Err(ParseError::invalid_token(
            Some(field),
            part,
            format!("H is only supported by jenkins (dialect is {})", ctx.dialect),
        ));
    }

    let rest = &part[1..];
    let (range, step) = match rest.split_once('/') {
        Some((range, step)) => (range, Some(parse_step(step, part, field)?)),
        None => (rest, None),
    };

    let (lo, hi) = if range.is_empty() {
        hash_range(field)
    } else {
        let inner = range
            .strip_prefix('(')
            .and_then(|r| r.strip_suffix(')'))
            .ok_or_else(|| {
                ParseError::invalid_token(Some(field), part, "expected H, H/n, H(a-b) or H(a-b)/n")
            })?;
        let (a, b) = inner.split_once('-').ok_or_else(|| {
            ParseError::invalid_range(field, part, "H(...) needs a range like H(0-29)")
        })?;
        // Hash over the written range; `H(0-7)` in day-of-week keeps all eight slots.
        let lo = parse_value(a, field, ctx)?;
        let hi = parse_value(b, field, ctx)?;
        if lo > hi {
            return Err(ParseError::invalid_range(
                field,
                part,
                format!("start {lo} is after end {hi}"),
            ));
        }
        (lo, hi)
    };

    let h = hash::field_hash(ctx.seed, field);
    match step {
        Some(step) => {
            let start = lo + hash::spread(h, step.min(hi - lo + 1));
            values.extend(
                (start..=hi)
                    .step_by(step as usize)
                    .map(|v| ctx.canonical(field, v)),
            );
        }
        None => {
            values.insert(ctx.canonical(field, lo + hash::spread(h, hi - lo + 1)));
        }
    }
    Ok(FieldShape::Hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unix() -> FieldContext<'static> {
        FieldContext::new(CronDialect::Unix, "test")
    }

    fn quartz() -> FieldContext<'static> {
        FieldContext::new(CronDialect::Quartz, "test")
    }

    fn values(spec: &FieldSpec) -> Vec<u32> {
        spec.values().iter().copied().collect()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn wildcard_is_full_domain() {
        let spec = parse_field("*", FieldKind::Hour, &unix()).unwrap();
        assert_eq!(spec.shape(), FieldShape::Wildcard);
        assert_eq!(spec.values().len(), 24);
        assert!(!spec.is_restricted());
    }

    #[test]
    fn lists_ranges_and_steps() {
        let spec = parse_field("1,5-7,*/20", FieldKind::Minute, &unix()).unwrap();
        assert_eq!(spec.shape(), FieldShape::List);
        assert_eq!(values(&spec), vec![0, 1, 5, 6, 7, 20, 40]);

        let spec = parse_field("10-30/10", FieldKind::Minute, &unix()).unwrap();
        assert_eq!(spec.shape(), FieldShape::Step);
        assert_eq!(values(&spec), vec![10, 20, 30]);

        let spec = parse_field("5/15", FieldKind::Minute, &unix()).unwrap();
        assert_eq!(values(&spec), vec![5, 20, 35, 50]);
    }

    #[test]
    fn range_errors() {
        let err = parse_field("30-10", FieldKind::Minute, &unix()).unwrap_err();
        assert!(matches!(err, ParseError::InvalidRange { field: FieldKind::Minute, .. }));
        assert!(matches!(
            parse_field("*/0", FieldKind::Minute, &unix()),
            Err(ParseError::InvalidRange { .. })
        ));
        assert!(matches!(
            parse_field("*/x", FieldKind::Minute, &unix()),
            Err(ParseError::InvalidRange { .. })
        ));
        assert_eq!(
            parse_field("60", FieldKind::Minute, &unix()).unwrap_err(),
            ParseError::OutOfRange {
                field: FieldKind::Minute,
                value: 60,
                min: 0,
                max: 59,
            }
        );
        assert!(matches!(
            parse_field("0", FieldKind::DayOfMonth, &unix()),
            Err(ParseError::OutOfRange { .. })
        ));
        assert!(matches!(
            parse_field("1,,2", FieldKind::Minute, &unix()),
            Err(ParseError::InvalidToken { .. })
        ));
        assert!(matches!(
            parse_field("abc", FieldKind::Minute, &unix()),
            Err(ParseError::InvalidToken { .. })
        ));
    }

    #[test]
    fn names_are_case_insensitive() {
        let spec = parse_field("jan,Mar-MAY", FieldKind::Month, &unix()).unwrap();
        assert_eq!(values(&spec), vec![1, 3, 4, 5]);
        let spec = parse_field("mon-FRI", FieldKind::DayOfWeek, &unix()).unwrap();
        assert_eq!(values(&spec), vec![1, 2, 3, 4, 5]);
        assert!(parse_field("MON", FieldKind::Month, &unix()).is_err());
    }

    #[test]
    fn weekday_numbering_is_canonicalized() {
        // unix: 7 is Sunday
        let spec = parse_field("5-7", FieldKind::DayOfWeek, &unix()).unwrap();
        assert_eq!(values(&spec), vec![0, 5, 6]);
        // quartz: 1 = Sunday
        let spec = parse_field("1,2-6", FieldKind::DayOfWeek, &quartz()).unwrap();
        assert_eq!(values(&spec), vec![0, 1, 2, 3, 4, 5]);
        let spec = parse_field("SUN", FieldKind::DayOfWeek, &quartz()).unwrap();
        assert_eq!(values(&spec), vec![0]);
        assert!(matches!(
            parse_field("0", FieldKind::DayOfWeek, &quartz()),
            Err(ParseError::OutOfRange { min: 1, max: 7, .. })
        ));
    }

    #[test]
    fn question_mark_rules() {
        let spec = parse_field("?", FieldKind::DayOfMonth, &quartz()).unwrap();
        assert!(spec.is_question());
        assert!(!spec.is_restricted());
        assert!(matches!(
            parse_field("?", FieldKind::Minute, &quartz()),
            Err(ParseError::InvalidToken { field: Some(FieldKind::Minute), .. })
        ));
        assert!(parse_field("?", FieldKind::DayOfMonth, &unix()).is_err());
        assert!(parse_field("1,?", FieldKind::DayOfMonth, &quartz()).is_err());
        let k8s = FieldContext::new(CronDialect::K8s, "x");
        assert!(parse_field("?", FieldKind::DayOfWeek, &k8s).is_ok());
    }

    #[test]
    fn calendar_tokens_need_quartz() {
        assert!(matches!(
            parse_field("L", FieldKind::DayOfMonth, &unix()),
            Err(ParseError::InvalidToken { .. })
        ));
        let spec = parse_field("L", FieldKind::DayOfMonth, &quartz()).unwrap();
        assert_eq!(spec.shape(), FieldShape::Last);
        assert_eq!(spec.rules(), &[DayRule::LastDayOfMonth { offset: 0 }]);
        assert!(spec.values().is_empty());
    }

    #[test]
    fn last_day_rules() {
        let last = DayRule::LastDayOfMonth { offset: 0 };
        assert!(last.matches(date(2024, 2, 29)));
        assert!(!last.matches(date(2023, 2, 27)));
        assert!(last.matches(date(2023, 2, 28)));

        let spec = parse_field("L-2", FieldKind::DayOfMonth, &quartz()).unwrap();
        assert!(spec.matches_date(date(2024, 1, 29)));
        assert!(!spec.matches_date(date(2024, 1, 31)));

        // 2024-08-31 is a Saturday
        let lw = DayRule::LastBusinessDayOfMonth;
        assert!(lw.matches(date(2024, 8, 30)));
        assert!(!lw.matches(date(2024, 8, 31)));
    }

    #[test]
    fn nearest_business_day() {
        let spec = parse_field("15W", FieldKind::DayOfMonth, &quartz()).unwrap();
        // 2024-06-15 is a Saturday -> Friday 14th
        assert!(spec.matches_date(date(2024, 6, 14)));
        assert!(!spec.matches_date(date(2024, 6, 15)));
        // 2024-09-15 is a Sunday -> Monday 16th
        assert!(spec.matches_date(date(2024, 9, 16)));

        // 1W on a Saturday does not leave the month: 2024-06-01 -> Monday 3rd
        let first = DayRule::NearestBusinessDay { day: 1 };
        assert!(first.matches(date(2024, 6, 3)));
        // 31W in a 30-day month never fires
        let late = DayRule::NearestBusinessDay { day: 31 };
        assert!((1..=30).all(|d| !late.matches(date(2024, 6, d))));
    }

    #[test]
    fn weekday_rules() {
        // quartz 6 = Friday
        let spec = parse_field("6L", FieldKind::DayOfWeek, &quartz()).unwrap();
        assert_eq!(spec.rules(), &[DayRule::LastWeekdayOfMonth { weekday: 5 }]);
        assert!(spec.matches_date(date(2024, 5, 31)));
        assert!(!spec.matches_date(date(2024, 5, 24)));

        let spec = parse_field("FRI#3", FieldKind::DayOfWeek, &quartz()).unwrap();
        assert_eq!(spec.shape(), FieldShape::Nth);
        assert!(spec.matches_date(date(2024, 5, 17)));
        assert!(!spec.matches_date(date(2024, 5, 10)));

        assert!(matches!(
            parse_field("2#6", FieldKind::DayOfWeek, &quartz()),
            Err(ParseError::OutOfRange { value: 6, .. })
        ));

        let sat = parse_field("L", FieldKind::DayOfWeek, &quartz()).unwrap();
        assert_eq!(values(&sat), vec![6]);
    }

    #[test]
    fn jenkins_hash_is_deterministic_and_in_range() {
        let ctx = FieldContext::new(CronDialect::Jenkins, "H H * * *");
        let a = parse_field("H", FieldKind::Minute, &ctx).unwrap();
        let b = parse_field("H", FieldKind::Minute, &ctx).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.shape(), FieldShape::Hash);
        assert_eq!(a.values().len(), 1);
        assert!(a.values().iter().all(|v| *v < 60));

        let dom = parse_field("H", FieldKind::DayOfMonth, &ctx).unwrap();
        assert!(dom.values().iter().all(|v| (1..=28).contains(v)));

        let stepped = parse_field("H/15", FieldKind::Minute, &ctx).unwrap();
        assert_eq!(stepped.values().len(), 4);
        let first = *stepped.values().iter().next().unwrap();
        assert!(first < 15);

        let scoped = parse_field("H(0-2)", FieldKind::Hour, &ctx).unwrap();
        assert!(scoped.values().iter().all(|v| *v <= 2));

        assert!(parse_field("H(5-1)", FieldKind::Hour, &ctx).is_err());

        // 7 is Sunday, but the range is hashed before mapping
        let weekly = parse_field("H(0-7)", FieldKind::DayOfWeek, &ctx).unwrap();
        assert_eq!(weekly.values().len(), 1);
        assert!(weekly.values().iter().all(|v| *v <= 6));
        let stepped = parse_field("H(0-7)/2", FieldKind::DayOfWeek, &ctx).unwrap();
        assert_eq!(stepped.values().len(), 4);
        assert!(parse_field("H[1-2]", FieldKind::Hour, &ctx).is_err());
        assert!(parse_field("H", FieldKind::Minute, &unix()).is_err());
    }
}
