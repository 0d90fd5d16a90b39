use crate::config::GateConfig;
use serde::Serialize;

/// Whether a session ran long enough to be turned into an Anky.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GateDecision {
    Qualifies { elapsed: u64, threshold: u64 },
    TooShort { elapsed: u64, threshold: u64, missing: u64 },
}

impl GateDecision {
    pub fn qualifies(&self) -> bool {
        matches!(self, Self::Qualifies { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Qualifies { .. } => "qualifies",
            Self::TooShort { .. } => "too_short",
        }
    }
}

pub fn evaluate(elapsed_seconds: u64, config: &GateConfig) -> GateDecision {
    let threshold = config.min_elapsed_seconds;
    if elapsed_seconds >= threshold {
        GateDecision::Qualifies {
            elapsed: elapsed_seconds,
            threshold,
        }
    } else {
        GateDecision::TooShort {
            elapsed: elapsed_seconds,
            threshold,
            missing: threshold - elapsed_seconds,
        }
    }
}
