//! Posting data model

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Identifier of an indexed document.
///
/// Integer and string ids are distinct: `1` and `"1"` name different
/// documents. Integers order before strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocId {
    Int(i64),
    Text(String),
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

/// Parses integers as [`DocId::Int`], anything else as [`DocId::Text`].
impl FromStr for DocId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<i64>()
            .map(Self::Int)
            .unwrap_or_else(|_| Self::Text(s.to_string())))
    }
}

impl From<i64> for DocId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<i32> for DocId {
    fn from(id: i32) -> Self {
        Self::Int(id.into())
    }
}

impl From<u32> for DocId {
    fn from(id: u32) -> Self {
        Self::Int(id.into())
    }
}

impl From<&str> for DocId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for DocId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

impl From<&DocId> for DocId {
    fn from(id: &DocId) -> Self {
        id.clone()
    }
}

/// One `(token, doc)` entry of the inverted index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub token: String,
    pub doc_id: DocId,
    /// Occurrences of `token` in the document when it was indexed.
    pub frequency: u64,
}

impl Posting {
    pub fn new(token: impl Into<String>, doc_id: impl Into<DocId>, frequency: u64) -> Self {
        Self {
            token: token.into(),
            doc_id: doc_id.into(),
            frequency,
        }
    }
}

/// One group produced by an aggregation.
///
/// `matched` and `score` are `None` when the pipeline's projection dropped
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub doc_id: DocId,
    pub matched: Option<u64>,
    pub score: Option<u64>,
}

/// Score ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "asc", alias = "ascending")]
    Ascending,
    #[default]
    #[serde(rename = "desc", alias = "descending")]
    Descending,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort direction `{0}` (expected asc, desc, 1 or -1)")]
pub struct ParseDirectionError(String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" | "1" => Ok(Self::Ascending),
            "desc" | "descending" | "-1" => Ok(Self::Descending),
            other => Err(ParseDirectionError(other.to_string())),
        }
    }
}

/// `1` is ascending, every other number descending.
impl From<i64> for Direction {
    fn from(value: i64) -> Self {
        if value == 1 {
            Self::Ascending
        } else {
            Self::Descending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_id_parse() {
        assert_eq!("42".parse::<DocId>().unwrap(), DocId::Int(42));
        assert_eq!("-7".parse::<DocId>().unwrap(), DocId::Int(-7));
        assert_eq!(
            "post-42".parse::<DocId>().unwrap(),
            DocId::Text("post-42".to_string())
        );
    }

    #[test]
    fn test_doc_id_int_and_text_differ() {
        assert_ne!(DocId::from(1), DocId::from("1"));
        assert!(DocId::from(999) < DocId::from("a"));
    }

    #[test]
    fn test_doc_id_serde_untagged() {
        assert_eq!(serde_json::to_string(&DocId::from(3)).unwrap(), "3");
        assert_eq!(serde_json::to_string(&DocId::from("x")).unwrap(), "\"x\"");
        let parsed: DocId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(parsed, DocId::from("abc"));
    }

    #[test]
    fn test_direction_aliases() {
        assert_eq!("asc".parse::<Direction>().unwrap(), Direction::Ascending);
        assert_eq!("Ascending".parse::<Direction>().unwrap(), Direction::Ascending);
        assert_eq!("1".parse::<Direction>().unwrap(), Direction::Ascending);
        assert_eq!("desc".parse::<Direction>().unwrap(), Direction::Descending);
        assert_eq!("-1".parse::<Direction>().unwrap(), Direction::Descending);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_direction_from_number() {
        assert_eq!(Direction::from(1), Direction::Ascending);
        assert_eq!(Direction::from(-1), Direction::Descending);
        assert_eq!(Direction::from(0), Direction::Descending);
        assert_eq!(Direction::default(), Direction::Descending);
    }
}
