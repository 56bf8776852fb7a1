//! Whitespace and punctuation cleanup for text extracted from market pages.

/// Collapses whitespace runs (including non-breaking spaces) to a single
/// space, trims both ends and rewrites en/em dashes to `-`.
///
/// The output is a fixed point: `clean_text(&clean_text(s)) == clean_text(s)`.
#[must_use]
pub fn clean_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() || ch == '\u{00a0}' {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        match ch {
            '\u{2013}' | '\u{2014}' => out.push('-'),
            other => out.push(other),
        }
    }
    out
}
