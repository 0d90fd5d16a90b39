use thiserror::Error;

/// Structural transcript failure. Per-line problems never surface here; they
/// are recorded as anomalies on the reconstructed session instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("transcript has {found} lines, at least 4 header lines are required")]
    TooFewLines { found: usize },
}

#[derive(Debug, Error)]
pub enum AnkyError {
    #[error("io error: {0}")]
    Io(String),
    #[error("config parse error: {0}")]
    ConfigParse(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("cli error: {0}")]
    Cli(String),
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
    #[error("report error: {0}")]
    Report(String),
    #[error("transcript error: {0}")]
    Transcript(#[source] ParseError),
}

impl From<ParseError> for AnkyError {
    fn from(value: ParseError) -> Self {
        Self::Transcript(value)
    }
}
