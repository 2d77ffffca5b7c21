//! Multi-dialect cron expression engine.
//!
//! ```text
//! raw string ──► normalize ──► canonical fields ──► parse_field ──► ParsedSchedule
//!                                                                      │
//!                    describe ◄────────────────────────────────────────┤
//!                                                                      ▼
//!                                                   next_runs / RunIter (timezone-aware)
//! ```
//!
//! - [`normalize`]: dialect detection, `cron(...)` unwrapping, `@` macros
//! - [`field`]: per-field parsing into value sets and day rules
//! - [`schedule`]: [`parse_cron`] and the immutable [`ParsedSchedule`]
//! - [`calculator`]: next fire times, eager or lazy
//! - [`describe`]: structured, localizable description tokens

pub mod calculator;
pub mod describe;
pub mod field;
pub mod hash;
pub mod normalize;
pub mod schedule;
pub mod timezone;

pub use calculator::{compute_next_runs, next_runs, next_runs_lazy, RunIter, RunOptions, RunQuery};
pub use describe::{describe, Description, DescriptionToken};
pub use field::{parse_field, DayRule, FieldContext, FieldShape, FieldSpec};
pub use normalize::{normalize, NormalizedExpression, Warning};
pub use schedule::{parse_cron, ParsedSchedule};
pub use timezone::{resolve_timezone, validate_timezone};

pub use ck_domain::{ComputeError, CronDialect, FieldKind, ParseError};
