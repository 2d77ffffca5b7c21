use serde::Serialize;

use crate::dialect::CronDialect;

/// Structured trace events emitted across the cronkit crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    ScheduleParsed {
        dialect: CronDialect,
        requested: CronDialect,
        fields: usize,
        warnings: usize,
    },
    ScheduleRejected {
        requested: CronDialect,
        error: String,
    },
    RunsComputed {
        timezone: String,
        requested: usize,
        produced: usize,
        iterations: usize,
    },
    SearchExhausted {
        timezone: String,
        iterations: usize,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "ck_event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_event_tag() {
        let ev = TraceEvent::RunsComputed {
            timezone: "UTC".into(),
            requested: 3,
            produced: 3,
            iterations: 12,
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["event"], "RunsComputed");
        assert_eq!(json["produced"], 3);
    }
}
