//! Query builder
//!
//! Setters normalize their input and return the builder, so options chain:
//!
//! ```ignore
//! let hits = search
//!     .query("quick fox")
//!     .combine(CombineMode::Or)
//!     .between(0, 10)
//!     .min(2)
//!     .execute()
//!     .await?;
//! ```
//!
//! Terminal operations take the builder by value; what runs is exactly the
//! options accumulated up to that call.

use crate::engine;
use crate::error::Result;
use crate::search::Search;
use homophone_store::{Direction, DocId, Projection};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// How the tokens of a multi-word query combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CombineMode {
    /// Every distinct token must occur in the document.
    #[default]
    #[serde(rename = "and", alias = "intersect")]
    And,
    /// Any token is enough.
    #[serde(rename = "or", alias = "union")]
    Or,
}

impl fmt::Display for CombineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::And => "and",
            Self::Or => "or",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown query type `{0}` (expected and, or, intersect or union)")]
pub struct ParseCombineModeError(String);

impl FromStr for CombineMode {
    type Err = ParseCombineModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "and" | "intersect" => Ok(Self::And),
            "or" | "union" => Ok(Self::Or),
            other => Err(ParseCombineModeError(other.to_string())),
        }
    }
}

/// The settled options of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub combine: CombineMode,
    /// `None` leaves result order to the store.
    pub sort: Option<Direction>,
    /// Zero-based offset into the sorted results.
    pub start: usize,
    /// Exclusive end of the window; `None` is unbounded.
    pub stop: Option<usize>,
    pub min_score: Option<u64>,
    pub max_score: Option<u64>,
    pub include: Option<Vec<DocId>>,
    pub exclude: Option<Vec<DocId>>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            combine: CombineMode::And,
            sort: Some(Direction::Descending),
            start: 0,
            stop: None,
            min_score: None,
            max_score: None,
            include: None,
            exclude: None,
        }
    }
}

/// A scored match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    pub id: DocId,
    pub score: u64,
}

/// Scores are whole numbers; negatives and zero mean "no bound".
fn score_bound(value: i64) -> Option<u64> {
    u64::try_from(value).ok().filter(|v| *v > 0)
}

fn id_set<I, D>(ids: I) -> Option<Vec<DocId>>
where
    I: IntoIterator<Item = D>,
    D: Into<DocId>,
{
    let ids: Vec<DocId> = ids.into_iter().map(Into::into).collect();
    (!ids.is_empty()).then_some(ids)
}

/// A pending query against one [`Search`] namespace.
#[derive(Debug, Clone)]
pub struct Query {
    search: Search,
    text: String,
    options: QueryOptions,
}

impl Query {
    pub(crate) fn new(search: Search, text: String) -> Self {
        Self {
            search,
            text,
            options: QueryOptions::default(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    pub fn combine(mut self, mode: CombineMode) -> Self {
        self.options.combine = mode;
        self
    }

    pub fn sort(mut self, direction: Direction) -> Self {
        self.options.sort = Some(direction);
        self
    }

    /// Leave result order to the store.
    pub fn unsorted(mut self) -> Self {
        self.options.sort = None;
        self
    }

    /// Keep results `start..stop` of the sorted set. A `stop` of `None` keeps
    /// everything from `start` on; a `stop` at or before `start` keeps nothing,
    /// so `between(0, 0)` is an empty page rather than an unbounded one. Pass
    /// `None` for "no upper bound".
    pub fn between(mut self, start: usize, stop: impl Into<Option<usize>>) -> Self {
        self.options.start = start;
        self.options.stop = stop.into();
        self
    }

    /// Drop results scoring below `score`. Zero or negative clears the bound.
    pub fn min(mut self, score: i64) -> Self {
        self.options.min_score = score_bound(score);
        self
    }

    /// Drop results scoring above `score`. Zero or negative clears the bound.
    pub fn max(mut self, score: i64) -> Self {
        self.options.max_score = score_bound(score);
        self
    }

    /// Only consider these documents. An empty set clears the restriction.
    pub fn include<I, D>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<DocId>,
    {
        self.options.include = id_set(ids);
        self
    }

    /// Never return these documents. An empty set clears the restriction.
    pub fn exclude<I, D>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<DocId>,
    {
        self.options.exclude = id_set(ids);
        self
    }

    /// Run the query, returning ordered hits with their scores.
    pub async fn execute(self) -> Result<Vec<Hit>> {
        let projection = Projection {
            matched: false,
            score: true,
        };
        let rows = engine::run(&self.search, &self.text, &self.options, None, projection).await?;
        Ok(rows
            .into_iter()
            .map(|row| Hit {
                id: row.doc_id,
                score: row.score.unwrap_or(0),
            })
            .collect())
    }

    /// Run the query, returning only the ordered ids.
    pub async fn ids(self) -> Result<Vec<DocId>> {
        let projection = Projection {
            matched: false,
            score: false,
        };
        let rows = engine::run(&self.search, &self.text, &self.options, None, projection).await?;
        Ok(rows.into_iter().map(|row| row.doc_id).collect())
    }

    /// Run the query, returning each id's score.
    pub async fn scores(self) -> Result<HashMap<DocId, u64>> {
        Ok(self
            .execute()
            .await?
            .into_iter()
            .map(|hit| (hit.id, hit.score))
            .collect())
    }

    /// Score of a single document, `0` when it does not match.
    ///
    /// Sorting, windowing, score bounds and include/exclude sets do not
    /// apply to a single-document lookup.
    pub async fn score(self, id: impl Into<DocId>) -> Result<u64> {
        let id = id.into();
        let projection = Projection {
            matched: false,
            score: true,
        };
        let rows =
            engine::run(&self.search, &self.text, &self.options, Some(&id), projection).await?;
        Ok(rows.first().and_then(|row| row.score).unwrap_or(0))
    }

    /// Whether `id` matches the query.
    pub async fn matches(self, id: impl Into<DocId>) -> Result<bool> {
        Ok(self.score(id).await? > 0)
    }
}
