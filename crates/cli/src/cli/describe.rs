//! `cronkit describe`: explain an expression.

use ck_domain::config::Config;
use ck_domain::CronDialect;
use ck_engine::{describe, parse_cron};

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

    let description = describe(&schedule);
    if json {
        let body = serde_json::json!({
            "expression": schedule.expression(),
            "dialect": schedule.dialect(),
            "text": description.to_string(),
            "tokens": description.tokens,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!("{description}");
    }
    Ok(true)
}
