//! `cronkit parse`: show how an expression was understood.

use ck_domain::config::Config;
use ck_domain::CronDialect;
use ck_engine::{parse_cron, FieldSpec, ParsedSchedule};

use super::{report_parse_error, resolve_dialect, wants_json};

/// Returns `Ok(false)` when the expression could not be parsed.
pub fn run(
    config: &Config,
    expression: &str,
    dialect: Option<CronDialect>,
    json: bool,
) -> anyhow::Result<bool> {
    let json = wants_json(config, json);
    let schedule = match parse_cron(expression, resolve_dialect(config, dialect)) {
        Ok(s) => s,
        Err(e) => {
            report_parse_error(expression, &e, json);
            return Ok(false);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&schedule)?);
    } else {
        print!("{}", render(&schedule));
    }
    Ok(true)
}

fn render(schedule: &ParsedSchedule) -> String {
    let mut out = format!(
        "dialect:   {}\ncanonical: {}\n",
        schedule.dialect(),
        schedule.canonical()
    );
    if let Some(tz) = schedule.timezone_hint() {
        out.push_str(&format!("timezone:  {tz}\n"));
    }
    out.push('\n');
    for field in schedule.fields() {
        out.push_str(&format!(
            "{:<13} {:<12} {}\n",
            field.field().name(),
            field.raw(),
            field_summary(field)
        ));
    }
    for warning in schedule.warnings() {
        out.push_str(&format!("\nwarning: {warning}"));
    }
    if !schedule.warnings().is_empty() {
        out.push('\n');
    }
    out
}

fn field_summary(field: &FieldSpec) -> String {
    if field.is_question() {
        return "(no specific value)".into();
    }
    let mut parts: Vec<String> = Vec::new();
    if !field.values().is_empty() {
        let values: Vec<String> = field.values().iter().map(u32::to_string).collect();
        parts.push(values.join(","));
    }
    parts.extend(field.rules().iter().map(|r| format!("{r:?}")));
    parts.join(" + ")
}
