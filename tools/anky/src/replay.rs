use crate::config::ReplayConfig;
use crate::types::{Key, Keystroke};

/// Folds keystrokes into the final text. Backspace removes one `char`, so the
/// buffer stays valid UTF-8 even after deleting a multi-byte character.
pub fn replay_text(keystrokes: &[Keystroke]) -> String {
    let mut text = String::new();
    for keystroke in keystrokes {
        match &keystroke.key {
            Key::Backspace => {
                text.pop();
            }
            Key::Enter => text.push('\n'),
            Key::Space => text.push(' '),
            Key::Literal(value) => text.push_str(value),
        }
    }
    text
}

pub fn elapsed_seconds(total_delay_millis: u64, config: &ReplayConfig) -> u64 {
    if let Some(fixed) = config.elapsed_override_seconds {
        return fixed;
    }
    (total_delay_millis / 1000).saturating_add(config.base_offset_seconds)
}

pub fn words_written(text: &str) -> usize {
    text.split_whitespace().count()
}
