//! Formatting-code stripping.
//!
//! Footer text carries two-character formatting codes: a section sign
//! followed by a color (`0-9`, `a-f`) or style (`k-o`, `r`) character.

/// The character that introduces a formatting code.
pub const FORMAT_MARKER: char = '§';

const fn is_format_code(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), '0'..='9' | 'a'..='f' | 'k'..='o' | 'r')
}

/// Remove every formatting code from `text`.
///
/// A marker not followed by a code character is kept as-is.
pub fn strip_formatting(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == FORMAT_MARKER && chars.peek().is_some_and(|next| is_format_code(*next)) {
            chars.next();
            continue;
        }
        out.push(c);
    }
    out
}
