//! Text normalization helpers shared by the readers and the graph builder.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());
static DECORATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{1F300}-\u{1FAFF}\u{2600}-\u{27BF}]").unwrap());

/// Collapse whitespace runs to single spaces and trim the ends.
pub fn clean_whitespace(s: &str) -> String {
    WHITESPACE_RE.replace_all(s, " ").trim().to_string()
}

/// Ascii-only slug: accents stripped, lowercased, runs of any other
/// character collapsed to a single dash.
pub fn slugify(text: &str) -> String {
    let stripped: String = text.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    let lower = stripped.to_lowercase();
    SLUG_RE.replace_all(&lower, "-").trim_matches('-').to_string()
}

/// Strip decorative symbols (emoji and dingbat ranges) and trim
/// surrounding spaces and dash characters.
pub fn strip_decorations(s: &str) -> String {
    DECORATION_RE
        .replace_all(s, "")
        .trim_matches([' ', '-', '\u{2013}', '\u{2014}'])
        .to_string()
}

/// Title casing with Python `str.title` semantics: uppercase every
/// letter that follows a non-letter, lowercase the rest. Hyphenated
/// names keep each segment capitalized.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

/// Whether a token counts as an upper-case word: at least one letter
/// and no lowercase ones.
pub fn is_upper_token(token: &str) -> bool {
    token.chars().any(|c| c.is_alphabetic()) && !token.chars().any(|c| c.is_lowercase())
}
