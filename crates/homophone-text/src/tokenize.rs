//! Word extraction

use regex::Regex;
use std::sync::OnceLock;

static WORD_RE: OnceLock<Regex> = OnceLock::new();

/// Split `text` into its ASCII word runs (`[A-Za-z0-9_]+`).
///
/// Case is preserved; an empty or word-less input yields no tokens.
pub fn tokenize(text: &str) -> Vec<&str> {
    let re = WORD_RE.get_or_init(|| Regex::new(r"[A-Za-z0-9_]+").unwrap());
    re.find_iter(text).map(|m| m.as_str()).collect()
}
