use chrono::{DateTime, TimeZone, Utc};

use ck_engine::{
    compute_next_runs, describe, next_runs, parse_cron, ComputeError, CronDialect, FieldKind,
    ParseError, RunIter, RunOptions, Warning,
};

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

fn rfc3339<T: chrono::TimeZone>(runs: &[DateTime<T>]) -> Vec<String>
where
    T::Offset: std::fmt::Display,
{
    runs.iter().map(|dt| dt.to_rfc3339()).collect()
}

// ── Parsing ───────────────────────────────────────────────────────

#[test]
fn unix_round_trip() {
    for expr in [
        "0 0 * * *",
        "*/5 * * * *",
        "0 9-17 * * 1-5",
        "15,45 */2 1 JAN-JUN MON",
    ] {
        let schedule = parse_cron(expr, CronDialect::Unix).unwrap();
        assert_eq!(schedule.canonical(), expr);
        let again = parse_cron(&schedule.canonical(), CronDialect::Unix).unwrap();
        assert_eq!(again.fields(), schedule.fields());
    }
}

#[test]
fn auto_parse_is_idempotent() {
    for expr in ["@weekly", "0 0 12 ? * MON", "H H * * *", "0 0 * * * *", "cron(0 12 * * ? *)"] {
        assert_eq!(
            parse_cron(expr, CronDialect::Auto).unwrap(),
            parse_cron(expr, CronDialect::Auto).unwrap()
        );
    }
}

#[test]
fn jenkins_hash_is_deterministic() {
    let a = parse_cron("H H * * *", CronDialect::Jenkins).unwrap();
    let b = parse_cron("H H * * *", CronDialect::Auto).unwrap();
    assert_eq!(b.dialect(), CronDialect::Jenkins);
    assert_eq!(a.field(FieldKind::Minute), b.field(FieldKind::Minute));
    assert_eq!(a.field(FieldKind::Hour), b.field(FieldKind::Hour));

    let from = utc(2024, 1, 1, 0, 0);
    assert_eq!(
        next_runs(&a, from, "UTC", 3).unwrap(),
        next_runs(&b, from, "UTC", 3).unwrap()
    );
}

#[test]
fn daily_macro_resolves_to_unix() {
    let schedule = parse_cron("@daily", CronDialect::Auto).unwrap();
    assert_eq!(schedule.dialect(), CronDialect::Unix);
    assert_eq!(schedule.canonical(), "0 0 * * *");
    assert!(schedule
        .warnings()
        .iter()
        .any(|w| matches!(w, Warning::MacroExpanded { .. })));
}

#[test]
fn aws_wrapper() {
    let ok = parse_cron("cron(0 12 * * ? *)", CronDialect::Aws).unwrap();
    assert_eq!(ok.dialect(), CronDialect::Aws);
    assert!(ok.field(FieldKind::Second).is_none());
    assert!(ok.field(FieldKind::Year).is_some());

    let err = parse_cron("cron(0 12 * * * *)", CronDialect::Aws).unwrap_err();
    assert!(matches!(err, ParseError::DialectConflict { dialect: CronDialect::Aws, .. }));
}

#[test]
fn errors_name_the_offending_field() {
    let err = parse_cron("0 25 * * *", CronDialect::Unix).unwrap_err();
    assert_eq!(err.field(), Some(FieldKind::Hour));
    assert!(err.to_string().contains("hour"));

    let err = parse_cron("0 0 * *", CronDialect::Unix).unwrap_err();
    assert!(matches!(err, ParseError::FieldCount { found: 4, .. }));
    assert_eq!(err.field(), None);
}

// ── Computation ───────────────────────────────────────────────────

#[test]
fn quarter_hours_during_business_hours() {
    let schedule = parse_cron("*/15 9-17 * * MON-FRI", CronDialect::Unix).unwrap();
    let runs = next_runs(&schedule, utc(2024, 1, 1, 9, 0), "UTC", 3).unwrap();
    assert_eq!(
        rfc3339(&runs),
        vec![
            "2024-01-01T09:00:00+00:00",
            "2024-01-01T09:15:00+00:00",
            "2024-01-01T09:30:00+00:00",
        ]
    );
}

#[test]
fn or_versus_exclusive_day_semantics() {
    let from = utc(2024, 1, 2, 0, 0);

    // unix: the 1st of the month OR any Monday
    let unix = parse_cron("0 0 1 * MON", CronDialect::Unix).unwrap();
    let runs = next_runs(&unix, from, "UTC", 1).unwrap();
    assert_eq!(rfc3339(&runs), vec!["2024-01-08T00:00:00+00:00"]);

    // quartz: only the 1st of the month
    let quartz = parse_cron("0 0 0 1 * ?", CronDialect::Quartz).unwrap();
    let runs = next_runs(&quartz, from, "UTC", 1).unwrap();
    assert_eq!(rfc3339(&runs), vec!["2024-02-01T00:00:00+00:00"]);
}

#[test]
fn output_is_strictly_increasing() {
    for (expr, dialect) in [
        ("*/7 * * * *", CronDialect::Unix),
        ("*/13 * * * * *", CronDialect::UnixSeconds),
        ("0 0/20 * ? * MON-FRI", CronDialect::Quartz),
        ("H/10 * * * *", CronDialect::Jenkins),
    ] {
        let schedule = parse_cron(expr, dialect).unwrap();
        let runs = next_runs(&schedule, utc(2024, 3, 9, 22, 0), "America/New_York", 50).unwrap();
        assert_eq!(runs.len(), 50, "{expr}");
        assert!(runs.windows(2).all(|w| w[0] < w[1]), "{expr}");
    }
}

#[test]
fn february_thirtieth_is_unsatisfiable() {
    let schedule = parse_cron("0 0 0 30 2 ?", CronDialect::Quartz).unwrap();
    let err = next_runs(&schedule, utc(2024, 1, 1, 0, 0), "UTC", 1).unwrap_err();
    assert!(matches!(err, ComputeError::Unsatisfiable { .. }));
}

#[test]
fn iteration_limit_is_configurable() {
    let schedule = parse_cron("0 0 29 2 *", CronDialect::Unix).unwrap();
    let options = RunOptions::new(utc(2024, 3, 1, 0, 0), "UTC", 1).with_max_iterations(10);
    assert!(matches!(
        compute_next_runs(&schedule, &options),
        Err(ComputeError::Unsatisfiable { .. })
    ));
    let options = options.with_max_iterations(10_000);
    assert_eq!(compute_next_runs(&schedule, &options).unwrap().len(), 1);
}

#[test]
fn new_york_dst_transitions() {
    let schedule = parse_cron("30 2 * * *", CronDialect::Unix).unwrap();
    let runs = next_runs(&schedule, utc(2024, 3, 9, 12, 0), "America/New_York", 2).unwrap();
    assert_eq!(
        rfc3339(&runs),
        vec!["2024-03-11T02:30:00-04:00", "2024-03-12T02:30:00-04:00"]
    );

    let schedule = parse_cron("0 * * * *", CronDialect::Unix).unwrap();
    let runs = next_runs(&schedule, utc(2024, 11, 3, 4, 30), "America/New_York", 3).unwrap();
    assert_eq!(
        rfc3339(&runs),
        vec![
            "2024-11-03T01:00:00-04:00",
            "2024-11-03T02:00:00-05:00",
            "2024-11-03T03:00:00-05:00",
        ]
    );
}

#[test]
fn timezone_prefix_is_usable() {
    let schedule = parse_cron("CRON_TZ=Asia/Tokyo 0 9 * * *", CronDialect::Auto).unwrap();
    let tz = schedule.timezone_hint().unwrap();
    let runs = next_runs(&schedule, utc(2024, 1, 1, 0, 0), tz, 1).unwrap();
    assert_eq!(rfc3339(&runs), vec!["2024-01-01T09:00:00+09:00"]);
}

#[test]
fn resume_continues_a_previous_listing() {
    let schedule = parse_cron("0 0 0 ? * 6L", CronDialect::Quartz).unwrap();
    let first = next_runs(&schedule, utc(2024, 1, 1, 0, 0), "Europe/Paris", 4).unwrap();

    let last = first[1];
    let resumed: Vec<_> = RunIter::resume_after(&schedule, last)
        .take(2)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(resumed, first[2..].to_vec());
}

#[test]
fn description_matches_schedule() {
    let schedule = parse_cron("*/15 9-17 * * MON-FRI", CronDialect::Unix).unwrap();
    assert_eq!(
        describe(&schedule).to_string(),
        "every 15 minutes, during hours 9 through 17, on Monday through Friday"
    );
}
