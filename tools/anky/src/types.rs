use serde::{Deserialize, Serialize};

pub const BACKSPACE_LABEL: &str = "Backspace";
pub const ENTER_LABEL: &str = "Enter";
pub const SPACE_LABEL: &str = " ";

/// A key as recorded by the client keystroke logger. Literal keys are opaque
/// labels and may span several characters (paste-like insertions).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Key {
    Backspace,
    Enter,
    Space,
    Literal(String),
}

impl Key {
    pub fn from_label(label: &str) -> Self {
        match label {
            BACKSPACE_LABEL => Self::Backspace,
            ENTER_LABEL => Self::Enter,
            SPACE_LABEL => Self::Space,
            other => Self::Literal(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Backspace => BACKSPACE_LABEL,
            Self::Enter => ENTER_LABEL,
            Self::Space => SPACE_LABEL,
            Self::Literal(value) => value,
        }
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        match value.as_str() {
            BACKSPACE_LABEL | ENTER_LABEL | SPACE_LABEL => Self::from_label(&value),
            _ => Self::Literal(value),
        }
    }
}

impl From<Key> for String {
    fn from(value: Key) -> Self {
        match value {
            Key::Literal(label) => label,
            other => other.label().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keystroke {
    pub key: Key,
    /// Time since the previous keystroke (or session start), truncated to ms.
    pub delay_millis: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHeader {
    pub user_id: String,
    pub session_id: String,
    pub prompt: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnomalyKind {
    MissingDelimiter,
    UnparsableDelay(String),
    OutOfRangeDelay(String),
}

impl AnomalyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingDelimiter => "missing_delimiter",
            Self::UnparsableDelay(_) => "unparsable_delay",
            Self::OutOfRangeDelay(_) => "out_of_range_delay",
        }
    }
}

/// A keystroke line that was dropped during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAnomaly {
    /// 0-based index into the raw transcript lines.
    pub line_index: usize,
    pub kind: AnomalyKind,
    pub raw: String,
}

/// Result of replaying one transcript. Only `transcript::parse_session`
/// builds these, so `text` always equals the replay of `keystrokes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconstructedSession {
    pub header: SessionHeader,
    pub keystrokes: Vec<Keystroke>,
    pub total_delay_millis: u64,
    pub elapsed_seconds: u64,
    pub anomalies: Vec<LineAnomaly>,
    text: String,
}

impl ReconstructedSession {
    pub(crate) fn new(
        header: SessionHeader,
        keystrokes: Vec<Keystroke>,
        total_delay_millis: u64,
        elapsed_seconds: u64,
        anomalies: Vec<LineAnomaly>,
    ) -> Self {
        let text = crate::replay::replay_text(&keystrokes);
        Self {
            header,
            keystrokes,
            total_delay_millis,
            elapsed_seconds,
            anomalies,
            text,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            keystroke_count: self.keystrokes.len(),
            text_len: self.text.len(),
            words_written: crate::replay::words_written(&self.text),
            total_delay_millis: self.total_delay_millis,
            elapsed_seconds: self.elapsed_seconds,
            anomaly_count: self.anomalies.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub keystroke_count: usize,
    /// Byte length of the reconstructed text.
    pub text_len: usize,
    pub words_written: usize,
    pub total_delay_millis: u64,
    pub elapsed_seconds: u64,
    pub anomaly_count: usize,
}
