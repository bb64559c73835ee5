//! Aggregation pipelines over postings
//!
//! A pipeline always runs its stages in one fixed order:
//! match -> group -> having -> sort -> skip -> limit -> project.
//! [`Pipeline::new`] rejects any other arrangement, so stores can translate a
//! pipeline stage by stage without reordering.

use crate::types::{Direction, DocId, Posting, ResultRow};
use crate::{Error, Result};
use std::collections::BTreeMap;

/// Selects the postings that enter grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingFilter {
    /// Postings must carry one of these tokens.
    pub tokens: Vec<String>,
    /// Restrict to a single document.
    pub doc: Option<DocId>,
    /// Only these documents.
    pub include: Option<Vec<DocId>>,
    /// Never these documents.
    pub exclude: Option<Vec<DocId>>,
}

impl PostingFilter {
    pub fn matches(&self, posting: &Posting) -> bool {
        self.tokens.iter().any(|token| *token == posting.token)
            && self.doc.as_ref().is_none_or(|doc| *doc == posting.doc_id)
            && self
                .include
                .as_ref()
                .is_none_or(|ids| ids.contains(&posting.doc_id))
            && self
                .exclude
                .as_ref()
                .is_none_or(|ids| !ids.contains(&posting.doc_id))
    }
}

/// Constraints on grouped rows. All bounds are inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupFilter {
    pub min_matched: Option<u64>,
    pub min_score: Option<u64>,
    pub max_score: Option<u64>,
}

impl GroupFilter {
    pub fn is_empty(&self) -> bool {
        self.min_matched.is_none() && self.min_score.is_none() && self.max_score.is_none()
    }

    pub fn accepts(&self, matched: u64, score: u64) -> bool {
        self.min_matched.is_none_or(|min| matched >= min)
            && self.min_score.is_none_or(|min| score >= min)
            && self.max_score.is_none_or(|max| score <= max)
    }
}

/// Which aggregate columns survive into the result rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    pub matched: bool,
    pub score: bool,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            matched: true,
            score: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Match(PostingFilter),
    /// Group by document, counting postings and summing frequencies.
    Group,
    Having(GroupFilter),
    /// Order by score. Ties are broken by ascending document id.
    Sort(Direction),
    Skip(u64),
    Limit(u64),
    Project(Projection),
}

impl Stage {
    fn rank(&self) -> u8 {
        match self {
            Self::Match(_) => 0,
            Self::Group => 1,
            Self::Having(_) => 2,
            Self::Sort(_) => 3,
            Self::Skip(_) => 4,
            Self::Limit(_) => 5,
            Self::Project(_) => 6,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Match(_) => "match",
            Self::Group => "group",
            Self::Having(_) => "having",
            Self::Sort(_) => "sort",
            Self::Skip(_) => "skip",
            Self::Limit(_) => "limit",
            Self::Project(_) => "project",
        }
    }
}

/// A validated, ordered list of stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new(stages: Vec<Stage>) -> Result<Self> {
        match stages.as_slice() {
            [Stage::Match(_), Stage::Group, ..] => {}
            _ => {
                return Err(Error::InvalidPipeline(
                    "a pipeline must start with match then group".to_string(),
                ));
            }
        }

        for pair in stages.windows(2) {
            if pair[0].rank() >= pair[1].rank() {
                return Err(Error::InvalidPipeline(format!(
                    "stage `{}` cannot follow `{}`",
                    pair[1].name(),
                    pair[0].name()
                )));
            }
        }

        Ok(Self { stages })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn filter(&self) -> &PostingFilter {
        match &self.stages[0] {
            Stage::Match(filter) => filter,
            _ => unreachable!("validated in Pipeline::new"),
        }
    }

    pub fn having(&self) -> Option<&GroupFilter> {
        self.stages.iter().find_map(|stage| match stage {
            Stage::Having(filter) => Some(filter),
            _ => None,
        })
    }

    pub fn sort(&self) -> Option<Direction> {
        self.stages.iter().find_map(|stage| match stage {
            Stage::Sort(direction) => Some(*direction),
            _ => None,
        })
    }

    pub fn skip(&self) -> Option<u64> {
        self.stages.iter().find_map(|stage| match stage {
            Stage::Skip(n) => Some(*n),
            _ => None,
        })
    }

    pub fn limit(&self) -> Option<u64> {
        self.stages.iter().find_map(|stage| match stage {
            Stage::Limit(n) => Some(*n),
            _ => None,
        })
    }

    pub fn projection(&self) -> Projection {
        self.stages
            .iter()
            .find_map(|stage| match stage {
                Stage::Project(projection) => Some(*projection),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Run the pipeline over an in-memory set of postings.
    pub fn evaluate<'a>(&self, postings: impl IntoIterator<Item = &'a Posting>) -> Vec<ResultRow> {
        let filter = self.filter();

        // BTreeMap keeps groups in ascending doc order, which is the tie-break
        // order the stable sort below preserves.
        let mut groups: BTreeMap<&DocId, (u64, u64)> = BTreeMap::new();
        for posting in postings.into_iter().filter(|p| filter.matches(p)) {
            let group = groups.entry(&posting.doc_id).or_insert((0, 0));
            group.0 += 1;
            group.1 += posting.frequency;
        }

        let mut rows: Vec<(&DocId, u64, u64)> = groups
            .into_iter()
            .map(|(doc, (matched, score))| (doc, matched, score))
            .collect();

        if let Some(having) = self.having() {
            rows.retain(|(_, matched, score)| having.accepts(*matched, *score));
        }

        match self.sort() {
            Some(Direction::Ascending) => rows.sort_by_key(|(_, _, score)| *score),
            Some(Direction::Descending) => rows.sort_by(|a, b| b.2.cmp(&a.2)),
            None => {}
        }

        let skip = self.skip().unwrap_or(0) as usize;
        let limit = self.limit().map_or(usize::MAX, |n| n as usize);
        let projection = self.projection();

        rows.into_iter()
            .skip(skip)
            .take(limit)
            .map(|(doc, matched, score)| ResultRow {
                doc_id: doc.clone(),
                matched: projection.matched.then_some(matched),
                score: projection.score.then_some(score),
            })
            .collect()
    }
}
