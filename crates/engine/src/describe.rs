//! Structured schedule descriptions.
//!
//! [`describe`] returns language-neutral tokens; callers with their own
//! phrase tables can render them however they like. `Display` provides an
//! English rendering.

use std::fmt;

use serde::Serialize;

use ck_domain::{DayCombination, FieldKind};

use crate::field::{DayRule, FieldSpec};
use crate::schedule::ParsedSchedule;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "token", rename_all = "snake_case")]
pub enum DescriptionToken {
    /// One fixed time of day.
    AtTime { hour: u32, minute: u32, second: u32 },
    /// Every value of the unit.
    Every { unit: FieldKind },
    /// Every `step` values of the unit, beginning at `start`.
    EveryNth { unit: FieldKind, step: u32, start: u32 },
    Values { unit: FieldKind, values: Vec<u32> },
    Range { unit: FieldKind, start: u32, end: u32 },
    Day { rule: DayRule },
    /// Day-of-month and day-of-week are alternatives (either may match).
    DayCombination,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Description {
    pub tokens: Vec<DescriptionToken>,
}

/// Describe a parsed schedule.
pub fn describe(schedule: &ParsedSchedule) -> Description {
    let mut tokens = time_tokens(schedule);

    let dom = schedule.field(FieldKind::DayOfMonth);
    let dow = schedule.field(FieldKind::DayOfWeek);
    let dom_tokens = dom.map(day_tokens).unwrap_or_default();
    let dow_tokens = dow.map(day_tokens).unwrap_or_default();

    let either = match schedule.day_combination() {
        DayCombination::Exclusive => false,
        DayCombination::Or | DayCombination::Selective => {
            dom.is_some_and(FieldSpec::is_restricted) && dow.is_some_and(FieldSpec::is_restricted)
        }
    };

    tokens.extend(dom_tokens);
    if either {
        tokens.push(DescriptionToken::DayCombination);
    }
    tokens.extend(dow_tokens);

    for kind in [FieldKind::Month, FieldKind::Year] {
        if let Some(token) = schedule.field(kind).and_then(calendar_token) {
            tokens.push(token);
        }
    }

    Description { tokens }
}

fn single(spec: &FieldSpec) -> Option<u32> {
    match spec.values().len() {
        1 => spec.values().iter().next().copied(),
        _ => None,
    }
}

fn time_tokens(schedule: &ParsedSchedule) -> Vec<DescriptionToken> {
    // A seconds field of exactly `0` adds nothing to the description.
    let second = schedule
        .field(FieldKind::Second)
        .filter(|s| single(s) != Some(0));
    let minute = schedule.field(FieldKind::Minute);
    let hour = schedule.field(FieldKind::Hour);

    if let (Some(m), Some(h)) = (minute.and_then(single), hour.and_then(single)) {
        match second {
            None => return vec![DescriptionToken::AtTime { hour: h, minute: m, second: 0 }],
            Some(s) => {
                if let Some(s) = single(s) {
                    return vec![DescriptionToken::AtTime { hour: h, minute: m, second: s }];
                }
            }
        }
    }

    let mut tokens = Vec::new();
    let mut previous: Option<DescriptionToken> = None;
    for spec in [second, minute, hour].into_iter().flatten() {
        let Some(token) = classify(spec) else { continue };
        // `every hour` only reads well after a fixed minute list.
        let emit = match token {
            DescriptionToken::Every { .. } => matches!(
                previous,
                None | Some(DescriptionToken::Values { .. })
            ),
            _ => true,
        };
        if emit {
            tokens.push(token.clone());
        }
        previous = Some(token);
    }
    tokens
}

fn day_tokens(spec: &FieldSpec) -> Vec<DescriptionToken> {
    if !spec.is_restricted() {
        return Vec::new();
    }
    let mut tokens: Vec<_> = calendar_token(spec).into_iter().collect();
    tokens.extend(spec.rules().iter().map(|rule| DescriptionToken::Day { rule: *rule }));
    tokens
}

/// Day, month and year fields: `Every` is implied, so it is dropped.
fn calendar_token(spec: &FieldSpec) -> Option<DescriptionToken> {
    classify(spec).filter(|t| !matches!(t, DescriptionToken::Every { .. }))
}

fn classify(spec: &FieldSpec) -> Option<DescriptionToken> {
    let unit = spec.field();
    let domain = unit.domain();
    let values: Vec<u32> = spec.values().iter().copied().collect();
    let (&first, &last) = (values.first()?, values.last()?);

    if values.len() as u32 == domain.max - domain.min + 1 {
        return Some(DescriptionToken::Every { unit });
    }
    if values.len() >= 2 {
        let step = values[1] - values[0];
        let even = values.windows(2).all(|w| w[1] - w[0] == step);
        if even && step == 1 {
            return Some(DescriptionToken::Range { unit, start: first, end: last });
        }
        if even && last + step > domain.max {
            return Some(DescriptionToken::EveryNth { unit, step, start: first });
        }
    }
    Some(DescriptionToken::Values { unit, values })
}

// ── English rendering ─────────────────────────────────────────────

const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];
const WEEKDAYS: [&str; 7] = [
    "Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday",
];
const ORDINALS: [&str; 5] = ["first", "second", "third", "fourth", "fifth"];

fn label(unit: FieldKind, value: u32) -> String {
    let name = match unit {
        FieldKind::Month => MONTHS.get(value.saturating_sub(1) as usize),
        FieldKind::DayOfWeek => WEEKDAYS.get(value as usize),
        _ => None,
    };
    name.map_or_else(|| value.to_string(), |n| (*n).to_owned())
}

/// `a`, `a and b`, `a, b and c`.
fn join(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [one] => one.clone(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

fn unit_noun(unit: FieldKind, plural: bool) -> &'static str {
    match (unit, plural) {
        (FieldKind::Second, false) => "second",
        (FieldKind::Second, true) => "seconds",
        (FieldKind::Minute, false) => "minute",
        (FieldKind::Minute, true) => "minutes",
        (FieldKind::Hour, false) => "hour",
        (FieldKind::Hour, true) => "hours",
        (FieldKind::DayOfMonth, false) => "day",
        (FieldKind::DayOfMonth, true) => "days",
        (FieldKind::Month, false) => "month",
        (FieldKind::Month, true) => "months",
        (FieldKind::DayOfWeek, false) => "day of the week",
        (FieldKind::DayOfWeek, true) => "days of the week",
        (FieldKind::Year, false) => "year",
        (FieldKind::Year, true) => "years",
    }
}

fn describe_rule(rule: &DayRule) -> String {
    match *rule {
        DayRule::LastDayOfMonth { offset: 0 } => "on the last day of the month".into(),
        DayRule::LastDayOfMonth { offset: 1 } => {
            "1 day before the last day of the month".into()
        }
        DayRule::LastDayOfMonth { offset } => {
            format!("{offset} days before the last day of the month")
        }
        DayRule::LastBusinessDayOfMonth => "on the last weekday of the month".into(),
        DayRule::NearestBusinessDay { day } => format!("on the weekday nearest day {day}"),
        DayRule::LastWeekdayOfMonth { weekday } => format!(
            "on the last {} of the month",
            label(FieldKind::DayOfWeek, weekday)
        ),
        DayRule::NthWeekdayOfMonth { weekday, nth } => format!(
            "on the {} {} of the month",
            ORDINALS.get(nth.saturating_sub(1) as usize).unwrap_or(&"nth"),
            label(FieldKind::DayOfWeek, weekday)
        ),
    }
}

impl fmt::Display for DescriptionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptionToken::AtTime { hour, minute, second: 0 } => {
                write!(f, "at {hour:02}:{minute:02}")
            }
            DescriptionToken::AtTime { hour, minute, second } => {
                write!(f, "at {hour:02}:{minute:02}:{second:02}")
            }
            DescriptionToken::Every { unit } => write!(f, "every {}", unit_noun(*unit, false)),
            DescriptionToken::EveryNth { unit, step, start } => {
                write!(f, "every {step} {}", unit_noun(*unit, true))?;
                if *start != unit.domain().min {
                    write!(f, " starting at {} {}", unit_noun(*unit, false), label(*unit, *start))?;
                }
                Ok(())
            }
            DescriptionToken::Values { unit, values } => {
                let items: Vec<String> = values.iter().map(|v| label(*unit, *v)).collect();
                let list = join(&items);
                let plural = values.len() > 1;
                match unit {
                    FieldKind::Second | FieldKind::Minute => {
                        write!(f, "at {} {list}", unit_noun(*unit, plural))
                    }
                    FieldKind::Hour => write!(f, "during {} {list}", unit_noun(*unit, plural)),
                    FieldKind::DayOfMonth => {
                        write!(f, "on {} {list} of the month", unit_noun(*unit, plural))
                    }
                    FieldKind::DayOfWeek => write!(f, "on {list}"),
                    FieldKind::Month | FieldKind::Year => write!(f, "in {list}"),
                }
            }
            DescriptionToken::Range { unit, start, end } => {
                let (start, end) = (label(*unit, *start), label(*unit, *end));
                match unit {
                    FieldKind::Second | FieldKind::Minute | FieldKind::Hour => {
                        write!(f, "during {} {start} through {end}", unit_noun(*unit, true))
                    }
                    FieldKind::DayOfMonth => {
                        write!(f, "on days {start} through {end} of the month")
                    }
                    FieldKind::DayOfWeek => write!(f, "on {start} through {end}"),
                    FieldKind::Month | FieldKind::Year => write!(f, "from {start} through {end}"),
                }
            }
            DescriptionToken::Day { rule } => f.write_str(&describe_rule(rule)),
            DescriptionToken::DayCombination => f.write_str("or"),
        }
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut phrases: Vec<String> = Vec::new();
        let mut join_next = false;
        let mut has_day = false;

        for token in &self.tokens {
            match token {
                DescriptionToken::DayCombination => {
                    join_next = true;
                    continue;
                }
                DescriptionToken::Day { .. } => has_day = true,
                DescriptionToken::Values { unit, .. }
                | DescriptionToken::Range { unit, .. }
                | DescriptionToken::EveryNth { unit, .. }
                    if matches!(unit, FieldKind::DayOfMonth | FieldKind::DayOfWeek) =>
                {
                    has_day = true
                }
                _ => {}
            }
            let text = token.to_string();
            match phrases.last_mut() {
                Some(prev) if join_next => {
                    prev.push_str(" or ");
                    prev.push_str(&text);
                }
                _ => phrases.push(text),
            }
            join_next = false;
        }

        let at_time = matches!(self.tokens.first(), Some(DescriptionToken::AtTime { .. }));
        if at_time && !has_day {
            phrases.insert(1, "every day".into());
        }
        f.write_str(&phrases.join(", "))
    }
}
