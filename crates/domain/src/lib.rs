//! Shared vocabulary for the cronkit crates: dialects, field kinds, the
//! error taxonomy, configuration and structured trace events.

pub mod config;
pub mod dialect;
pub mod error;
pub mod field;
pub mod trace;

pub use dialect::{CronDialect, DayCombination, DialectPolicy, WeekdayNumbering};
pub use error::{ComputeError, Error, ParseError, Result};
pub use field::{FieldDomain, FieldKind};
