use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dialect::CronDialect;

/// Position of a field inside a canonical expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Second,
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
    Year,
}

/// Inclusive range of legal values for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDomain {
    pub min: u32,
    pub max: u32,
}

impl FieldDomain {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn iter(&self) -> std::ops::RangeInclusive<u32> {
        self.min..=self.max
    }
}

impl FieldKind {
    pub const ALL: [FieldKind; 7] = [
        FieldKind::Second,
        FieldKind::Minute,
        FieldKind::Hour,
        FieldKind::DayOfMonth,
        FieldKind::Month,
        FieldKind::DayOfWeek,
        FieldKind::Year,
    ];

    /// Canonical domain. Day-of-week is `0=Sunday..6=Saturday`.
    pub const fn domain(self) -> FieldDomain {
        match self {
            FieldKind::Second | FieldKind::Minute => FieldDomain::new(0, 59),
            FieldKind::Hour => FieldDomain::new(0, 23),
            FieldKind::DayOfMonth => FieldDomain::new(1, 31),
            FieldKind::Month => FieldDomain::new(1, 12),
            FieldKind::DayOfWeek => FieldDomain::new(0, 6),
            FieldKind::Year => FieldDomain::new(1970, 2099),
        }
    }

    /// Field positions for a dialect, in canonical order.
    pub fn layout(dialect: CronDialect, with_year: bool) -> Vec<FieldKind> {
        let policy = dialect.policy();
        FieldKind::ALL
            .into_iter()
            .filter(|kind| match kind {
                FieldKind::Second => policy.seconds,
                FieldKind::Year => with_year && policy.optional_year,
                _ => true,
            })
            .collect()
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Second => "second",
            FieldKind::Minute => "minute",
            FieldKind::Hour => "hour",
            FieldKind::DayOfMonth => "day-of-month",
            FieldKind::Month => "month",
            FieldKind::DayOfWeek => "day-of-week",
            FieldKind::Year => "year",
        }
    }

    pub fn is_day(self) -> bool {
        matches!(self, FieldKind::DayOfMonth | FieldKind::DayOfWeek)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
