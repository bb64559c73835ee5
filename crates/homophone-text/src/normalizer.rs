//! The canonicalization pipeline: words -> stopwords -> stems -> phonetic keys

use crate::phonetic::metaphone;
use crate::stopwords::Stopwords;
use crate::tokenize::tokenize;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// Turns free text into canonical index tokens.
pub struct Normalizer {
    stopwords: Stopwords,
    stemmer: Stemmer,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::english()
    }
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer")
            .field("stopwords", &self.stopwords.len())
            .finish_non_exhaustive()
    }
}

impl Normalizer {
    pub fn english() -> Self {
        Self {
            stopwords: Stopwords::english(),
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    pub fn with_stopwords(mut self, stopwords: Stopwords) -> Self {
        self.stopwords = stopwords;
        self
    }

    pub fn strip_stopwords<'a>(&self, tokens: &[&'a str]) -> Vec<&'a str> {
        self.stopwords.strip(tokens)
    }

    /// Stem each token. Tokens are lowercased first, the stemmer only knows
    /// lowercase suffixes.
    pub fn stem(&self, tokens: &[&str]) -> Vec<String> {
        tokens
            .iter()
            .map(|token| self.stemmer.stem(&token.to_lowercase()).into_owned())
            .collect()
    }

    /// Run the full pipeline over `text`.
    ///
    /// With `allow_duplicates` every occurrence is kept, which is what the
    /// indexer counts frequencies from. Without it the result holds each key
    /// once, in first-seen order.
    pub fn canonicalize(&self, text: &str, allow_duplicates: bool) -> Vec<String> {
        let words = tokenize(text);
        let stems = self.stem(&self.strip_stopwords(&words));

        let mut seen = HashSet::new();
        let mut keys = Vec::with_capacity(stems.len());
        for stem in &stems {
            let key = metaphone(stem);
            // Words made only of silent letters ("wh", "yy") have no key.
            if key.is_empty() {
                continue;
            }
            if allow_duplicates || seen.insert(key.clone()) {
                keys.push(key);
            }
        }
        keys
    }
}

/// Count how often each token occurs.
pub fn count_tokens<S: AsRef<str>>(tokens: &[S]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for token in tokens {
        *counts.entry(token.as_ref().to_string()).or_insert(0) += 1;
    }
    counts
}

/// Map each word to its phonetic key.
pub fn phonetic_map<S: AsRef<str>>(words: &[S]) -> HashMap<String, String> {
    words
        .iter()
        .map(|word| (word.as_ref().to_string(), metaphone(word.as_ref())))
        .collect()
}
