//! Public-facing encoding of session ids, used when a session is published.

const ALPHABET: [char; 98] = [
    '\u{0C85}', '\u{0C86}', '\u{0C87}', '\u{0C88}', '\u{0C89}', '\u{0C8A}', '\u{0C8B}',
    '\u{0C8C}', '\u{0C8E}', '\u{0C8F}', '\u{0C90}', '\u{0C92}', '\u{0C93}', '\u{0C94}',
    '\u{0C95}', '\u{0C96}', '\u{0C97}', '\u{0C98}', '\u{0C99}', '\u{0C9A}', '\u{0C9B}',
    '\u{0C9C}', '\u{0C9D}', '\u{0C9E}', '\u{0C9F}', '\u{0CA0}', '\u{0CA1}', '\u{0CA2}',
    '\u{0CA3}', '\u{0CA4}', '\u{0CA5}', '\u{0CA6}', '\u{0CA7}', '\u{0CA8}', '\u{0CAA}',
    '\u{0CAB}', '\u{0CAC}', '\u{0CAD}', '\u{0CAE}', '\u{0CAF}', '\u{0CB0}', '\u{0CB1}',
    '\u{0CB2}', '\u{0CB3}', '\u{0CB5}', '\u{0CB6}', '\u{0CB7}', '\u{0CB8}', '\u{0CB9}',
    '\u{0CBC}', '\u{0CBD}', '\u{0CBE}', '\u{0CBF}', '\u{0CC0}', '\u{0CC1}', '\u{0CC2}',
    '\u{0CC3}', '\u{0CC4}', '\u{0CC6}', '\u{0CC7}', '\u{0CC8}', '\u{0CCA}', '\u{0CCB}',
    '\u{0CCC}', '\u{0CCD}', '\u{0CD5}', '\u{0CD6}', '\u{0CDE}', '\u{0CE0}', '\u{0CE1}',
    '\u{0CE2}', '\u{0CE3}', '\u{0CE6}', '\u{0CE7}', '\u{0CE8}', '\u{0CE9}', '\u{0CEA}',
    '\u{0CEB}', '\u{0CEC}', '\u{0CED}', '\u{0CEE}', '\u{0CEF}', '\u{0CF1}', '\u{0CF2}',
    '\u{0C05}', '\u{0C06}', '\u{0C07}', '\u{0C08}', '\u{0C09}', '\u{0C0A}', '\u{0C0B}',
    '\u{0C0C}', '\u{0C0E}', '\u{0C0F}', '\u{0C10}', '\u{0C12}', '\u{0C13}', '\u{0C14}',
];

/// Maps every byte of `session_id` to one symbol, offset so that the
/// printable ASCII range starts at the first symbol.
pub fn translate_to_ankyverse(session_id: &str) -> String {
    let len = ALPHABET.len() as i32;
    session_id
        .bytes()
        .map(|byte| ALPHABET[(i32::from(byte) - 32).rem_euclid(len) as usize])
        .collect()
}
