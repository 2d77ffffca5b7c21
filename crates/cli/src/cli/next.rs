//! `cronkit next`: list upcoming fire times.

use std::fmt::Write;

use anyhow::Context;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use ck_domain::config::Config;
use ck_domain::{ComputeError, CronDialect, ParseError};
use ck_engine::{compute_next_runs, parse_cron, ParsedSchedule, RunOptions};

use super::{report_compute_error, report_parse_error, resolve_dialect, wants_json};

#[derive(Debug)]
pub struct NextArgs {
    pub expression: String,
    pub dialect: Option<CronDialect>,
    pub tz: Option<String>,
    pub count: Option<usize>,
    pub from: Option<String>,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct NextOutput {
    expression: String,
    dialect: CronDialect,
    timezone: String,
    from: DateTime<Utc>,
    runs: Vec<String>,
}

/// What a `next` request produced, before anything is printed.
#[derive(Debug)]
enum Outcome {
    Runs {
        schedule: ParsedSchedule,
        timezone: String,
        from: DateTime<Utc>,
        runs: Vec<DateTime<Tz>>,
    },
    ParseFailed(ParseError),
    ComputeFailed(ComputeError),
}

/// Returns `Ok(false)` when the expression could not be parsed or has no
/// upcoming fire times.
pub fn run(config: &Config, args: NextArgs) -> anyhow::Result<bool> {
    let json = wants_json(config, args.json);
    match evaluate(config, &args, Utc::now())? {
        Outcome::ParseFailed(e) => {
            report_parse_error(&args.expression, &e, json);
            Ok(false)
        }
        Outcome::ComputeFailed(e) => {
            report_compute_error(&args.expression, &e, json);
            Ok(false)
        }
        Outcome::Runs {
            schedule,
            timezone,
            from,
            runs,
        } => {
            if json {
                let output = to_output(&schedule, timezone, from, &runs);
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                for warning in schedule.warnings() {
                    eprintln!("warning: {warning}");
                }
                for dt in &runs {
                    println!("{}", format_run(dt, &config.output.datetime_format));
                }
            }
            Ok(true)
        }
    }
}

/// `now` is the start instant when `--from` is absent. A malformed `--from`
/// is a usage error rather than an outcome.
fn evaluate(config: &Config, args: &NextArgs, now: DateTime<Utc>) -> anyhow::Result<Outcome> {
    let schedule = match parse_cron(&args.expression, resolve_dialect(config, args.dialect)) {
        Ok(s) => s,
        Err(e) => return Ok(Outcome::ParseFailed(e)),
    };

    let from = match args.from.as_deref() {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("--from '{raw}' is not an RFC 3339 timestamp"))?
            .with_timezone(&Utc),
        None => now,
    };
    let timezone = pick_timezone(config, &schedule, args.tz.as_deref()).to_owned();
    let count = config.engine.effective_count(args.count);

    let options = RunOptions::new(from, timezone.as_str(), count)
        .with_max_iterations(config.engine.max_iterations);
    Ok(match compute_next_runs(&schedule, &options) {
        Ok(runs) => Outcome::Runs {
            schedule,
            timezone,
            from,
            runs,
        },
        Err(e) => Outcome::ComputeFailed(e),
    })
}

fn to_output(
    schedule: &ParsedSchedule,
    timezone: String,
    from: DateTime<Utc>,
    runs: &[DateTime<Tz>],
) -> NextOutput {
    NextOutput {
        expression: schedule.expression().to_owned(),
        dialect: schedule.dialect(),
        timezone,
        from,
        runs: runs.iter().map(|dt| dt.to_rfc3339()).collect(),
    }
}

/// `--tz`, then a `CRON_TZ=` prefix, then the configured default.
fn pick_timezone<'a>(config: &'a Config, schedule: &'a ParsedSchedule, flag: Option<&'a str>) -> &'a str {
    flag.or(schedule.timezone_hint())
        .unwrap_or(config.engine.default_timezone.as_str())
}

/// Falls back to RFC 3339 when `pattern` is not a valid strftime string.
fn format_run(dt: &DateTime<Tz>, pattern: &str) -> String {
    let mut out = String::new();
    match write!(out, "{}", dt.format(pattern)) {
        Ok(()) => out,
        Err(_) => dt.to_rfc3339(),
    }
}
