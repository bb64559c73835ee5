//! Metaphone phonetic keys
//!
//! The encoder lowercases the word, collapses doubled letters and then runs an
//! ordered table of rewrite rules. Sounds that later rules must not touch are
//! written as uppercase markers (`X` for "sh", `0` for "th"), which survive
//! the final uppercasing unchanged.

use regex::Regex;
use std::sync::OnceLock;

static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();

const RULE_TABLE: &[(&str, &str)] = &[
    // silent leading letters
    (r"^[gkp](n)", "$1"),
    (r"^a(e)", "$1"),
    (r"^w(r)", "$1"),
    (r"mb$", "m"),
    // c
    (r"tch", "ch"),
    (r"ck", "k"),
    (r"sch", "sk"),
    (r"ch", "X"),
    (r"cia", "Xia"),
    (r"c([eiy])", "s$1"),
    (r"c", "k"),
    // d
    (r"dg([eiy])", "j$1"),
    (r"d", "t"),
    // g
    (r"^gh", "g"),
    (r"gh([^aeiou])", "$1"),
    (r"gh", "f"),
    (r"g(n|ned)$", "$1"),
    (r"g([eiy])", "j$1"),
    (r"g", "k"),
    (r"ph", "f"),
    (r"([aeiou])h([^aeiou]|$)", "$1$2"),
    (r"q", "k"),
    // s, x, t
    (r"sh", "X"),
    (r"si([ao])", "Xi$1"),
    (r"^x", "s"),
    (r"x", "ks"),
    (r"ti([ao])", "Xi$1"),
    (r"th", "0"),
    // v, w, y, z
    (r"v", "f"),
    (r"^wh", "w"),
    (r"w([^aeiou]|$)", "$1"),
    (r"y([^aeiou]|$)", "$1"),
    (r"z", "s"),
];

fn rules() -> &'static [(Regex, &'static str)] {
    RULES.get_or_init(|| {
        RULE_TABLE
            .iter()
            .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), *replacement))
            .collect()
    })
}

/// Encode `word` into its metaphone key.
///
/// Spelling variants that sound alike share a key ("night" and "knight" both
/// encode to `NT`). Digits and underscores pass through.
pub fn metaphone(word: &str) -> String {
    let mut key = collapse_doubles(&word.to_lowercase());

    for (re, replacement) in rules() {
        if re.is_match(&key) {
            key = re.replace_all(&key, *replacement).into_owned();
        }
    }

    drop_vowels(&key).to_uppercase()
}

/// Collapse runs of a repeated letter, except `c` ("accept" keeps both).
fn collapse_doubles(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut prev = None;
    for ch in word.chars() {
        if prev == Some(ch) && ch != 'c' {
            continue;
        }
        out.push(ch);
        prev = Some(ch);
    }
    out
}

/// Vowels only count at the start of a word.
fn drop_vowels(word: &str) -> String {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    std::iter::once(first)
        .chain(chars.filter(|c| !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')))
        .collect()
}
