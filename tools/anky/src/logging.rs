use crate::errors::AnkyError;
use crate::gate::GateDecision;
use crate::storage::StoredSession;
use crate::types::ReconstructedSession;
use serde::Serialize;
use serde_json::{json, Value};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct JsonlLogger {
    pub path: PathBuf,
    pub max_payload_bytes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEvent<'a> {
    pub level: &'a str,
    pub event_type: &'a str,
    pub payload: Value,
}

impl JsonlLogger {
    pub fn new(path: impl AsRef<Path>, max_payload_bytes: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            max_payload_bytes,
        }
    }

    pub fn append(&self, event: &LogEvent<'_>) -> Result<(), AnkyError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| AnkyError::Io(e.to_string()))?;
        }
        let truncated = truncate_json(event.payload.clone(), self.max_payload_bytes);
        let line = serde_json::to_string(&LogEvent {
            level: event.level,
            event_type: event.event_type,
            payload: truncated,
        })
        .map_err(|e| AnkyError::Io(e.to_string()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| AnkyError::Io(e.to_string()))?;
        file.write_all(line.as_bytes())
            .map_err(|e| AnkyError::Io(e.to_string()))?;
        file.write_all(b"\n")
            .map_err(|e| AnkyError::Io(e.to_string()))?;
        Ok(())
    }

    pub fn append_all(&self, events: &[LogEvent<'_>]) -> Result<(), AnkyError> {
        for event in events {
            self.append(event)?;
        }
        Ok(())
    }
}

/// Events describing one parse: a summary, then one warning per dropped line.
pub fn session_events(session: &ReconstructedSession) -> Vec<LogEvent<'static>> {
    let mut events = vec![LogEvent {
        level: "info",
        event_type: "session_parsed",
        payload: json!({
            "user_id": session.header.user_id,
            "session_id": session.header.session_id,
            "summary": session.summary(),
        }),
    }];
    events.extend(session.anomalies.iter().map(|anomaly| LogEvent {
        level: "warn",
        event_type: "line_skipped",
        payload: json!({
            "session_id": session.header.session_id,
            "line_index": anomaly.line_index,
            "reason": anomaly.kind.as_str(),
            "raw": anomaly.raw,
        }),
    }));
    events
}

pub fn gate_event(session_id: &str, decision: &GateDecision) -> LogEvent<'static> {
    LogEvent {
        level: "info",
        event_type: "gate_decision",
        payload: json!({
            "session_id": session_id,
            "gate": decision,
        }),
    }
}

pub fn saved_event(stored: &StoredSession) -> LogEvent<'static> {
    LogEvent {
        level: "info",
        event_type: "transcript_saved",
        payload: json!({
            "user_id": stored.header.user_id,
            "session_id": stored.header.session_id,
            "path": stored.transcript_path.display().to_string(),
        }),
    }
}

pub fn structured_fallback_line(session_id: &str, stage: &str, message: &str) -> String {
    format!(
        "session_id={session_id} stage={stage} message={}",
        message.replace('\n', "\\n")
    )
}

fn truncate_json(value: Value, max_bytes: usize) -> Value {
    let rendered = serde_json::to_string(&value).unwrap_or_default();
    if rendered.len() <= max_bytes {
        return value;
    }
    let mut cut = max_bytes.saturating_sub(3);
    while !rendered.is_char_boundary(cut) {
        cut -= 1;
    }
    Value::String(format!("{}...", &rendered[..cut]))
}

#[cfg(test)]
mod tests {
    use super::{gate_event, session_events, structured_fallback_line, JsonlLogger, LogEvent};
    use crate::config::{GateConfig, ReplayConfig};
    use crate::gate::evaluate;
    use crate::transcript::parse_session;
    use serde_json::json;

    #[test]
    fn logger_truncates_large_payloads_and_writes_jsonl() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("logs").join("run.jsonl");
        let logger = JsonlLogger::new(&path, 20);

        logger
            .append(&LogEvent {
                level: "info",
                event_type: "session_parsed",
                payload: json!({"text": "abcdefghijklmnopqrstuvwxyz"}),
            })
            .expect("append");

        let text = std::fs::read_to_string(&path).expect("read");
        assert!(text.contains("\"event_type\":\"session_parsed\""));
        assert!(text.contains("..."));
    }

    #[test]
    fn truncation_never_splits_a_character() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("run.jsonl");
        let logger = JsonlLogger::new(&path, 12);
        logger
            .append(&LogEvent {
                level: "info",
                event_type: "x",
                payload: json!("ಅಆಇಈಉಊ"),
            })
            .expect("append");
        let line = std::fs::read_to_string(&path).expect("read");
        let parsed: serde_json::Value = serde_json::from_str(line.trim()).expect("json line");
        assert!(parsed["payload"].as_str().expect("string").ends_with("..."));
    }

    #[test]
    fn one_warning_per_skipped_line() {
        let session = parse_session(
            "u\ns\np\nt\na 0.1\nbroken\nb nope\n",
            &ReplayConfig::default(),
        )
        .expect("parse");
        let events = session_events(&session);
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].event_type, "session_parsed");
        assert_eq!(events[0].payload["summary"]["keystroke_count"], 1);
        assert_eq!(events[1].payload["reason"], "missing_delimiter");
        assert_eq!(events[1].payload["line_index"], 5);
        assert_eq!(events[2].payload["reason"], "unparsable_delay");
        assert!(events[1..].iter().all(|event| event.level == "warn"));
    }

    #[test]
    fn gate_event_carries_decision() {
        let event = gate_event("s", &evaluate(100, &GateConfig::default()));
        assert_eq!(event.payload["gate"]["decision"], "too_short");
        assert_eq!(event.payload["gate"]["missing"], 380);
    }

    #[test]
    fn fallback_line_is_deterministic() {
        let line = structured_fallback_line("s1", "gate", "hello\nworld");
        assert_eq!(line, "session_id=s1 stage=gate message=hello\\nworld");
    }
}
