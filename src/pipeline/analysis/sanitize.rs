// Clean raw email text before it is sent to the model.
// Strips invisible characters, signatures, and links, then collapses whitespace.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum email length sent to the model (characters).
pub const MAX_EMAIL_LENGTH: usize = 50_000;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("valid regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Prepare an email body for analysis.
///
/// Steps, in order: drop invisible and control characters, cut everything
/// from a signature delimiter line (`--`, `-- `, `-----`) to the end, remove
/// `http(s)://` links, collapse all whitespace runs to one space, and cap
/// the result at [`MAX_EMAIL_LENGTH`] characters.
pub fn clean_email_text(raw: &str) -> String {
    let visible = remove_invisible_chars(raw);
    let unsigned = strip_signature(&visible);
    let unlinked = URL_RE.replace_all(unsigned, "");
    let collapsed = WHITESPACE_RE.replace_all(&unlinked, " ");
    truncate_chars(collapsed.trim(), MAX_EMAIL_LENGTH)
}

/// Remove zero-width, bidi-control, and other control characters.
/// Keeps space, newline, tab, and carriage return.
fn remove_invisible_chars(text: &str) -> String {
    text.chars()
        .filter(|c| {
            if matches!(*c, ' ' | '\n' | '\t' | '\r') {
                return true;
            }
            if matches!(
                *c,
                '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2060}'..='\u{2064}' | '\u{FEFF}'
            ) {
                return false;
            }
            !c.is_control()
        })
        .collect()
}

/// Everything before the first line made only of two or more dashes.
fn strip_signature(text: &str) -> &str {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim();
        if trimmed.len() >= 2 && trimmed.chars().all(|c| c == '-') {
            return &text[..offset];
        }
        offset += line.len();
    }
    text
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            tracing::debug!(max_chars, "Email text truncated");
            text[..byte_idx].to_string()
        }
        None => text.to_string(),
    }
}
