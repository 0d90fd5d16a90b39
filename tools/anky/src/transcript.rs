//! Transcript parsing.
//!
//! A transcript is newline-separated: four header lines (user id, session id,
//! prompt, start timestamp) followed by one `<key> <delay-seconds>` line per
//! keystroke. A space keystroke has no visible label, so the client writes it
//! as `"  <delay>"`: a leading space plus the separator, two spaces in total.
//!
//! The space rule is positional and ambiguous (`" x 0.5"` also matches it and
//! is then dropped for its unparsable delay). It is kept as-is because the
//! existing keystroke logger depends on it; an explicit delimiter would need a
//! versioned transcript format.

use crate::config::ReplayConfig;
use crate::errors::ParseError;
use crate::replay::elapsed_seconds;
use crate::types::{AnomalyKind, Key, Keystroke, LineAnomaly, ReconstructedSession, SessionHeader};

pub const HEADER_LINES: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Blank,
    Keystroke(Keystroke),
    Anomaly(AnomalyKind),
}

pub fn parse_header(transcript: &str) -> Result<SessionHeader, ParseError> {
    let lines = transcript.split('\n').collect::<Vec<_>>();
    header_from_lines(&lines)
}

fn header_from_lines(lines: &[&str]) -> Result<SessionHeader, ParseError> {
    if lines.len() < HEADER_LINES {
        return Err(ParseError::TooFewLines { found: lines.len() });
    }
    Ok(SessionHeader {
        user_id: lines[0].trim().to_string(),
        session_id: lines[1].trim().to_string(),
        prompt: lines[2].trim().to_string(),
        timestamp: lines[3].trim().to_string(),
    })
}

/// Parses a raw transcript into header, keystrokes, replayed text and elapsed
/// time. Lines that cannot be read as keystrokes are dropped and listed in
/// `anomalies`; only a missing header fails the parse.
pub fn parse_session(
    transcript: &str,
    config: &ReplayConfig,
) -> Result<ReconstructedSession, ParseError> {
    let lines = transcript.split('\n').collect::<Vec<_>>();
    let header = header_from_lines(&lines)?;

    let mut keystrokes = Vec::new();
    let mut anomalies = Vec::new();
    let mut total_delay_millis = 0u64;

    for (line_index, line) in lines.iter().enumerate().skip(HEADER_LINES) {
        match parse_keystroke_line(line) {
            LineOutcome::Blank => {}
            LineOutcome::Keystroke(keystroke) => {
                total_delay_millis = total_delay_millis.saturating_add(keystroke.delay_millis);
                keystrokes.push(keystroke);
            }
            LineOutcome::Anomaly(kind) => anomalies.push(LineAnomaly {
                line_index,
                kind,
                raw: (*line).to_string(),
            }),
        }
    }

    let elapsed = elapsed_seconds(total_delay_millis, config);
    Ok(ReconstructedSession::new(
        header,
        keystrokes,
        total_delay_millis,
        elapsed,
        anomalies,
    ))
}

/// Classifies a single keystroke line. The line is used untrimmed: leading
/// spaces decide whether it is a space keystroke.
pub fn parse_keystroke_line(line: &str) -> LineOutcome {
    if line.is_empty() {
        return LineOutcome::Blank;
    }

    let (key, delay) = if is_space_keystroke(line) {
        (Key::Space, line.trim())
    } else {
        let Some(split) = line.rfind(' ') else {
            return LineOutcome::Anomaly(AnomalyKind::MissingDelimiter);
        };
        let prefix = &line[..split];
        let label = prefix.trim();
        // "   0.5": more than one leading space still means the space key.
        let key = if label.is_empty() && !prefix.is_empty() && prefix.bytes().all(|b| b == b' ') {
            Key::Space
        } else {
            Key::from_label(label)
        };
        (key, line[split + 1..].trim())
    };

    match parse_delay_millis(delay) {
        Ok(delay_millis) => LineOutcome::Keystroke(Keystroke { key, delay_millis }),
        Err(kind) => LineOutcome::Anomaly(kind),
    }
}

fn is_space_keystroke(line: &str) -> bool {
    line.starts_with(' ') && line.bytes().filter(|b| *b == b' ').count() == 2
}

/// Decimal seconds to whole milliseconds, truncating.
pub fn parse_delay_millis(value: &str) -> Result<u64, AnomalyKind> {
    let seconds = value
        .parse::<f64>()
        .map_err(|_| AnomalyKind::UnparsableDelay(value.to_string()))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(AnomalyKind::OutOfRangeDelay(value.to_string()));
    }
    Ok((seconds * 1000.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::{parse_delay_millis, parse_header, parse_keystroke_line, LineOutcome};
    use crate::errors::ParseError;
    use crate::types::{AnomalyKind, Key, Keystroke};

    fn keystroke(key: Key, delay_millis: u64) -> LineOutcome {
        LineOutcome::Keystroke(Keystroke { key, delay_millis })
    }

    #[test]
    fn general_lines_split_on_last_space() {
        assert_eq!(
            parse_keystroke_line("a 0.25"),
            keystroke(Key::Literal("a".to_string()), 250)
        );
        assert_eq!(parse_keystroke_line("Enter 1"), keystroke(Key::Enter, 1000));
        assert_eq!(
            parse_keystroke_line("Backspace 0.1"),
            keystroke(Key::Backspace, 100)
        );
        assert_eq!(
            parse_keystroke_line("hello world 0.5"),
            keystroke(Key::Literal("hello world".to_string()), 500)
        );
    }

    #[test]
    fn two_space_line_is_a_space_keystroke() {
        assert_eq!(parse_keystroke_line("  0.5"), keystroke(Key::Space, 500));
    }

    #[test]
    fn wider_space_run_is_still_a_space_keystroke() {
        assert_eq!(parse_keystroke_line("   0.5"), keystroke(Key::Space, 500));
    }

    #[test]
    fn space_rule_swallows_leading_space_key_lines() {
        assert_eq!(
            parse_keystroke_line(" x 0.5"),
            LineOutcome::Anomaly(AnomalyKind::UnparsableDelay("x 0.5".to_string()))
        );
    }

    #[test]
    fn single_leading_space_yields_empty_literal() {
        assert_eq!(
            parse_keystroke_line(" 0.5"),
            keystroke(Key::Literal(String::new()), 500)
        );
    }

    #[test]
    fn missing_delimiter_and_blank_lines() {
        assert_eq!(parse_keystroke_line(""), LineOutcome::Blank);
        assert_eq!(
            parse_keystroke_line("abc"),
            LineOutcome::Anomaly(AnomalyKind::MissingDelimiter)
        );
        assert_eq!(
            parse_keystroke_line("\r"),
            LineOutcome::Anomaly(AnomalyKind::MissingDelimiter)
        );
    }

    #[test]
    fn crlf_line_endings_are_trimmed_from_the_delay() {
        assert_eq!(
            parse_keystroke_line("a 0.2\r"),
            keystroke(Key::Literal("a".to_string()), 200)
        );
    }

    #[test]
    fn delay_parsing_truncates_and_rejects_out_of_range() {
        assert_eq!(parse_delay_millis("0.0019"), Ok(1));
        assert_eq!(parse_delay_millis("2"), Ok(2000));
        assert_eq!(parse_delay_millis("1e-1"), Ok(100));
        assert_eq!(
            parse_delay_millis("notanumber"),
            Err(AnomalyKind::UnparsableDelay("notanumber".to_string()))
        );
        assert_eq!(
            parse_delay_millis(""),
            Err(AnomalyKind::UnparsableDelay(String::new()))
        );
        assert_eq!(
            parse_delay_millis("-0.5"),
            Err(AnomalyKind::OutOfRangeDelay("-0.5".to_string()))
        );
        assert_eq!(
            parse_delay_millis("NaN"),
            Err(AnomalyKind::OutOfRangeDelay("NaN".to_string()))
        );
        assert_eq!(
            parse_delay_millis("inf"),
            Err(AnomalyKind::OutOfRangeDelay("inf".to_string()))
        );
    }

    #[test]
    fn header_fields_are_trimmed() {
        let header = parse_header("  u1 \n s1\n\tprompt here \n2024-01-01\n").expect("header");
        assert_eq!(header.user_id, "u1");
        assert_eq!(header.session_id, "s1");
        assert_eq!(header.prompt, "prompt here");
        assert_eq!(header.timestamp, "2024-01-01");
    }

    #[test]
    fn trailing_newline_counts_as_an_empty_fourth_line() {
        let header = parse_header("u\ns\np\n").expect("header");
        assert_eq!(header.timestamp, "");
        assert_eq!(
            parse_header("u\ns\np"),
            Err(ParseError::TooFewLines { found: 3 })
        );
    }
}
