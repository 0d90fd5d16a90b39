use crate::ankyverse::translate_to_ankyverse;
use crate::errors::AnkyError;
use crate::gate::GateDecision;
use crate::types::{Keystroke, LineAnomaly, ReconstructedSession, SessionHeader, SessionSummary};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Everything the orchestration layer needs from one parsed transcript.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport<'a> {
    pub header: &'a SessionHeader,
    pub summary: SessionSummary,
    pub gate: GateDecision,
    pub ankyverse_session_id: String,
    pub text: &'a str,
    pub text_sha256: String,
    pub keystrokes: &'a [Keystroke],
    pub anomalies: &'a [LineAnomaly],
}

impl<'a> SessionReport<'a> {
    pub fn new(session: &'a ReconstructedSession, gate: GateDecision) -> Self {
        Self {
            header: &session.header,
            summary: session.summary(),
            gate,
            ankyverse_session_id: translate_to_ankyverse(&session.header.session_id),
            text: session.text(),
            text_sha256: sha256_hex(session.text()),
            keystrokes: &session.keystrokes,
            anomalies: &session.anomalies,
        }
    }

    pub fn to_json(&self) -> Result<String, AnkyError> {
        serde_json::to_string_pretty(self).map_err(|e| AnkyError::Report(e.to_string()))
    }

    /// Stable one-fact-per-line rendering for terminals and shell pipelines.
    pub fn to_lines(&self) -> Vec<String> {
        let summary = &self.summary;
        vec![
            format!(
                "session user={} session={} ankyverse={}",
                self.header.user_id, self.header.session_id, self.ankyverse_session_id
            ),
            format!("prompt {}", self.header.prompt),
            format!(
                "replay keystrokes={} text_len={} words={} delay_ms={} elapsed_s={} skipped={}",
                summary.keystroke_count,
                summary.text_len,
                summary.words_written,
                summary.total_delay_millis,
                summary.elapsed_seconds,
                summary.anomaly_count
            ),
            match self.gate {
                GateDecision::Qualifies { elapsed, threshold } => {
                    format!("gate qualifies elapsed_s={elapsed} threshold_s={threshold}")
                }
                GateDecision::TooShort {
                    elapsed,
                    threshold,
                    missing,
                } => format!(
                    "gate too_short elapsed_s={elapsed} threshold_s={threshold} missing_s={missing}"
                ),
            },
            format!("text_sha256 {}", self.text_sha256),
        ]
    }
}

pub fn sha256_hex(text: &str) -> String {
    Sha256::digest(text.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
