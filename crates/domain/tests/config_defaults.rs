use ck_domain::config::{Config, OutputFormat};
use ck_domain::CronDialect;

#[test]
fn empty_file_uses_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config.engine.default_dialect, CronDialect::Auto);
    assert_eq!(config.engine.default_timezone, "UTC");
    assert_eq!(config.engine.max_iterations, 10_000);
    assert_eq!(config.output.format, OutputFormat::Text);
    assert_eq!(config.observability.log_filter, "warn");
}

#[test]
fn engine_section_parses() {
    let toml_str = r#"
[engine]
default_dialect = "quartz"
default_timezone = "Europe/Berlin"
default_count = 10
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.engine.default_dialect, CronDialect::Quartz);
    assert_eq!(config.engine.default_timezone, "Europe/Berlin");
    assert_eq!(config.engine.default_count, 10);
    assert_eq!(config.engine.max_count, 1000);
    assert!(config.validate().is_empty());
}

#[test]
fn output_and_observability_sections_parse() {
    let toml_str = r#"
[output]
format = "json"

[observability]
log_filter = "debug"
json_logs = true
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.output.format, OutputFormat::Json);
    assert!(config.observability.json_logs);
}

#[test]
fn unknown_dialect_is_rejected() {
    let toml_str = r#"
[engine]
default_dialect = "crontab"
"#;
    assert!(toml::from_str::<Config>(toml_str).is_err());
}

#[test]
fn show_roundtrips_through_toml() {
    let config = Config::default();
    let rendered = toml::to_string_pretty(&config).unwrap();
    let back: Config = toml::from_str(&rendered).unwrap();
    assert_eq!(back.engine.default_count, config.engine.default_count);
    assert_eq!(back.output.datetime_format, config.output.datetime_format);
}
