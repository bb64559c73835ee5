//! Text normalization: word extraction, stopwords, stemming and metaphone keys

mod normalizer;
mod phonetic;
mod stopwords;
mod tokenize;

pub use normalizer::{Normalizer, count_tokens, phonetic_map};
pub use phonetic::metaphone;
pub use stopwords::Stopwords;
pub use tokenize::tokenize;
