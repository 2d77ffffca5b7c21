//! Timezone-aware next-run calculator.
//!
//! The search runs on wall-clock components in the requested zone and walks
//! year → month → day → hour → minute → second. A unit that does not match
//! jumps straight to its next member; when a unit has no member left, the
//! next larger unit rolls over and the search restarts from the top.
//!
//! **DST handling:**
//! - Spring-forward gaps: local times that don't exist are skipped.
//! - Fall-back overlaps: the earliest mapping not before the lower bound is
//!   chosen, so the output stays strictly increasing.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use ck_domain::config::DEFAULT_MAX_ITERATIONS;
use ck_domain::trace::TraceEvent;
use ck_domain::{ComputeError, DayCombination, FieldKind};

use crate::field::{days_in_month, FieldSpec};
use crate::schedule::ParsedSchedule;
use crate::timezone::resolve_timezone;

/// Inputs for one calculation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub from: DateTime<Utc>,
    pub timezone: String,
    pub count: usize,
    /// Advancement steps allowed per produced time.
    pub max_iterations: usize,
}

impl RunOptions {
    pub fn new(from: DateTime<Utc>, timezone: impl Into<String>, count: usize) -> Self {
        Self {
            from,
            timezone: timezone.into(),
            count,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// A schedule paired with per-request options.
#[derive(Debug, Clone)]
pub struct RunQuery<'a> {
    pub schedule: &'a ParsedSchedule,
    pub options: RunOptions,
}

impl<'a> RunQuery<'a> {
    pub fn new(schedule: &'a ParsedSchedule, options: RunOptions) -> Self {
        Self { schedule, options }
    }

    /// Collect `options.count` times eagerly.
    pub fn run(&self) -> Result<Vec<DateTime<Tz>>, ComputeError> {
        compute_next_runs(self.schedule, &self.options)
    }

    /// Lazy iterator over fire times. `options.count` is ignored.
    pub fn iter(&self) -> Result<RunIter<'a>, ComputeError> {
        let tz = resolve_timezone(&self.options.timezone)?;
        Ok(RunIter::new(self.schedule, self.options.from, tz)
            .with_max_iterations(self.options.max_iterations))
    }
}

/// Compute the next `options.count` fire times at or after `options.from`.
pub fn compute_next_runs(
    schedule: &ParsedSchedule,
    options: &RunOptions,
) -> Result<Vec<DateTime<Tz>>, ComputeError> {
    let tz = resolve_timezone(&options.timezone)?;
    let mut iter = RunIter::new(schedule, options.from, tz)
        .with_max_iterations(options.max_iterations);

    // `count` is caller-controlled; grow as results arrive.
    let mut runs = Vec::new();
    for _ in 0..options.count {
        match iter.next() {
            Some(Ok(run)) => runs.push(run),
            Some(Err(e)) => {
                if let ComputeError::Unsatisfiable { iterations } = e {
                    TraceEvent::SearchExhausted {
                        timezone: options.timezone.clone(),
                        iterations,
                    }
                    .emit();
                }
                return Err(e);
            }
            None => break,
        }
    }

    TraceEvent::RunsComputed {
        timezone: options.timezone.clone(),
        requested: options.count,
        produced: runs.len(),
        iterations: iter.iterations(),
    }
    .emit();
    Ok(runs)
}

/// Convenience wrapper around [`compute_next_runs`].
pub fn next_runs(
    schedule: &ParsedSchedule,
    from: DateTime<Utc>,
    timezone: &str,
    count: usize,
) -> Result<Vec<DateTime<Tz>>, ComputeError> {
    compute_next_runs(schedule, &RunOptions::new(from, timezone, count))
}

/// Unbounded lazy sequence of fire times at or after `from`.
pub fn next_runs_lazy(schedule: &ParsedSchedule, from: DateTime<Utc>, tz: Tz) -> RunIter<'_> {
    RunIter::new(schedule, from, tz)
}

/// Lower bound on the next produced instant.
#[derive(Debug, Clone, Copy)]
enum Bound {
    AtOrAfter(DateTime<Utc>),
    After(DateTime<Utc>),
}

impl Bound {
    fn admits<T: TimeZone>(&self, candidate: &DateTime<T>) -> bool {
        let candidate = candidate.with_timezone(&Utc);
        match *self {
            Bound::AtOrAfter(lower) => candidate >= lower,
            Bound::After(lower) => candidate > lower,
        }
    }
}

/// Iterator over fire times. Yields `Err` at most once, then ends.
#[derive(Debug, Clone)]
pub struct RunIter<'a> {
    matcher: Matcher<'a>,
    tz: Tz,
    /// Next wall-clock time to examine; `None` once exhausted.
    cursor: Option<NaiveDateTime>,
    bound: Bound,
    max_iterations: usize,
    iterations: usize,
}

impl<'a> RunIter<'a> {
    pub fn new(schedule: &'a ParsedSchedule, from: DateTime<Utc>, tz: Tz) -> Self {
        let matcher = Matcher::new(schedule);
        let local = from.with_timezone(&tz).naive_local();
        Self {
            cursor: Some(ceil_to_unit(local, matcher.unit())),
            matcher,
            tz,
            bound: Bound::AtOrAfter(from),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            iterations: 0,
        }
    }

    /// Continue strictly after `last`, a time previously produced for this
    /// schedule (or any instant the caller wants to skip past).
    pub fn resume_after(schedule: &'a ParsedSchedule, last: DateTime<Tz>) -> Self {
        let matcher = Matcher::new(schedule);
        let tz = last.timezone();
        let local = last.naive_local();
        let unit = matcher.unit();
        let cursor = if is_on_unit(local, unit) {
            local.checked_add_signed(unit)
        } else {
            Some(ceil_to_unit(local, unit))
        };
        Self {
            cursor,
            matcher,
            tz,
            bound: Bound::After(last.with_timezone(&Utc)),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            iterations: 0,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Advancement steps spent so far, across all produced times.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    fn advance(&mut self, mut start: NaiveDateTime) -> Result<DateTime<Tz>, ComputeError> {
        let mut budget = Budget::new(self.max_iterations);
        let result = loop {
            let wall = match self.matcher.next_match(start, &mut budget) {
                Ok(wall) => wall,
                Err(e) => break Err(e),
            };
            let accepted = match self.tz.from_local_datetime(&wall) {
                LocalResult::Single(dt) => Some(dt).filter(|dt| self.bound.admits(dt)),
                LocalResult::Ambiguous(earliest, latest) => [earliest, latest]
                    .into_iter()
                    .find(|dt| self.bound.admits(dt)),
                LocalResult::None => {
                    tracing::trace!(%wall, tz = %self.tz, "skipping nonexistent local time");
                    None
                }
            };
            match accepted {
                Some(dt) => {
                    self.cursor = wall.checked_add_signed(self.matcher.unit());
                    self.bound = Bound::After(dt.with_timezone(&Utc));
                    break Ok(dt);
                }
                None => match wall.checked_add_signed(self.matcher.unit()) {
                    Some(next) => start = next,
                    None => break Err(budget.exhausted()),
                },
            }
        };
        self.iterations += budget.spent;
        result
    }
}

impl Iterator for RunIter<'_> {
    type Item = Result<DateTime<Tz>, ComputeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.cursor.take()?;
        let result = self.advance(start);
        match &result {
            Ok(dt) => tracing::trace!(run = %dt, "next run"),
            Err(e) => tracing::debug!(error = %e, "run search stopped"),
        }
        Some(result)
    }
}

/// Round up to the next whole second or minute.
fn ceil_to_unit(t: NaiveDateTime, unit: Duration) -> NaiveDateTime {
    if is_on_unit(t, unit) {
        return t;
    }
    let truncated = if unit == Duration::seconds(1) {
        t.with_nanosecond(0)
    } else {
        t.with_nanosecond(0).and_then(|t| t.with_second(0))
    };
    truncated
        .and_then(|t| t.checked_add_signed(unit))
        .unwrap_or(t)
}

fn is_on_unit(t: NaiveDateTime, unit: Duration) -> bool {
    t.nanosecond() == 0 && (unit == Duration::seconds(1) || t.second() == 0)
}

/// Per-result iteration counter.
struct Budget {
    limit: usize,
    spent: usize,
}

impl Budget {
    fn new(limit: usize) -> Self {
        Self { limit, spent: 0 }
    }

    fn tick(&mut self) -> Result<(), ComputeError> {
        self.spent += 1;
        if self.spent > self.limit {
            return Err(self.exhausted());
        }
        Ok(())
    }

    fn exhausted(&self) -> ComputeError {
        ComputeError::Unsatisfiable {
            iterations: self.spent,
        }
    }
}

/// Matching source for seconds and years, which some dialects omit.
#[derive(Debug, Clone, Copy)]
enum Slot<'a> {
    Spec(&'a FieldSpec),
    /// Absent seconds: always zero.
    Fixed(u32),
    /// Absent year: any value.
    Any,
}

impl Slot<'_> {
    fn next_value(&self, from: u32) -> Option<u32> {
        match *self {
            Slot::Spec(spec) => spec.next_value(from),
            Slot::Fixed(v) => (from <= v).then_some(v),
            Slot::Any => Some(from),
        }
    }
}

#[derive(Debug, Clone)]
struct Matcher<'a> {
    second: Slot<'a>,
    minute: &'a FieldSpec,
    hour: &'a FieldSpec,
    day_of_month: &'a FieldSpec,
    month: &'a FieldSpec,
    day_of_week: &'a FieldSpec,
    year: Slot<'a>,
    combination: DayCombination,
    last_year: i32,
}

impl<'a> Matcher<'a> {
    fn new(schedule: &'a ParsedSchedule) -> Self {
        let fields = schedule.fields();
        let get = move |kind: FieldKind| fields.iter().find(|f| f.field() == kind);
        // Every dialect carries minute through day-of-week.
        let required = move |kind: FieldKind| get(kind).unwrap_or(&fields[0]);

        Self {
            second: get(FieldKind::Second).map_or(Slot::Fixed(0), Slot::Spec),
            minute: required(FieldKind::Minute),
            hour: required(FieldKind::Hour),
            day_of_month: required(FieldKind::DayOfMonth),
            month: required(FieldKind::Month),
            day_of_week: required(FieldKind::DayOfWeek),
            year: get(FieldKind::Year).map_or(Slot::Any, Slot::Spec),
            combination: schedule.day_combination(),
            last_year: FieldKind::Year.domain().max as i32,
        }
    }

    /// Smallest unit present in the schedule.
    fn unit(&self) -> Duration {
        match self.second {
            Slot::Spec(_) => Duration::seconds(1),
            _ => Duration::minutes(1),
        }
    }

    fn day_matches(&self, date: NaiveDate) -> bool {
        let dom = self.day_of_month;
        let dow = self.day_of_week;
        match self.combination {
            DayCombination::Exclusive if dom.is_question() => dow.matches_date(date),
            DayCombination::Exclusive => dom.matches_date(date),
            DayCombination::Selective if dom.is_question() => dow.matches_date(date),
            DayCombination::Selective if dow.is_question() => dom.matches_date(date),
            DayCombination::Or | DayCombination::Selective => {
                if dom.is_restricted() && dow.is_restricted() {
                    dom.matches_date(date) || dow.matches_date(date)
                } else {
                    dom.matches_date(date) && dow.matches_date(date)
                }
            }
        }
    }

    /// First wall-clock time at or after `start` that satisfies every field.
    fn next_match(
        &self,
        start: NaiveDateTime,
        budget: &mut Budget,
    ) -> Result<NaiveDateTime, ComputeError> {
        let mut c = Cursor::from(start);

        loop {
            budget.tick()?;
            if c.year > self.last_year {
                return Err(budget.exhausted());
            }

            let year = u32::try_from(c.year).unwrap_or(0);
            match self.year.next_value(year) {
                None => return Err(budget.exhausted()),
                Some(y) if y != year => {
                    c = Cursor::start_of_year(y as i32);
                    continue;
                }
                Some(_) => {}
            }

            match self.month.next_value(c.month) {
                None => {
                    c.roll_year();
                    continue;
                }
                Some(m) if m != c.month => {
                    c.month = m;
                    c.reset_below_month();
                }
                Some(_) => {}
            }

            let date = NaiveDate::from_ymd_opt(c.year, c.month, c.day)
                .ok_or_else(|| budget.exhausted())?;
            if !self.day_matches(date) {
                c.roll_day();
                continue;
            }

            match self.hour.next_value(c.hour) {
                None => {
                    c.roll_day();
                    continue;
                }
                Some(h) if h != c.hour => {
                    c.hour = h;
                    c.minute = 0;
                    c.second = 0;
                }
                Some(_) => {}
            }

            match self.minute.next_value(c.minute) {
                None => {
                    c.roll_hour();
                    continue;
                }
                Some(m) if m != c.minute => {
                    c.minute = m;
                    c.second = 0;
                }
                Some(_) => {}
            }

            match self.second.next_value(c.second) {
                None => {
                    c.roll_minute();
                    continue;
                }
                Some(s) => c.second = s,
            }

            return c.to_naive().ok_or_else(|| budget.exhausted());
        }
    }
}

/// Mutable wall-clock components. Always a valid calendar date.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
}

impl Cursor {
    fn from(t: NaiveDateTime) -> Self {
        Self {
            year: t.year(),
            month: t.month(),
            day: t.day(),
            hour: t.hour(),
            minute: t.minute(),
            second: t.second(),
        }
    }

    fn start_of_year(year: i32) -> Self {
        Self {
            year,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }

    fn to_naive(self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?
            .and_hms_opt(self.hour, self.minute, self.second)
    }

    fn reset_below_month(&mut self) {
        self.day = 1;
        self.hour = 0;
        self.minute = 0;
        self.second = 0;
    }

    fn roll_year(&mut self) {
        *self = Self::start_of_year(self.year + 1);
    }

    fn roll_month(&mut self) {
        if self.month >= 12 {
            self.roll_year();
        } else {
            self.month += 1;
            self.reset_below_month();
        }
    }

    fn roll_day(&mut self) {
        if self.day >= days_in_month(self.year, self.month) {
            self.roll_month();
        } else {
            self.day += 1;
            self.hour = 0;
            self.minute = 0;
            self.second = 0;
        }
    }

    fn roll_hour(&mut self) {
        if self.hour >= 23 {
            self.roll_day();
        } else {
            self.hour += 1;
            self.minute = 0;
            self.second = 0;
        }
    }

    fn roll_minute(&mut self) {
        if self.minute >= 59 {
            self.roll_hour();
        } else {
            self.minute += 1;
            self.second = 0;
        }
    }
}
