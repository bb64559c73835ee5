//! Translates query options into a store pipeline and runs it

use crate::error::{Error, Operation, Result};
use crate::query::{CombineMode, QueryOptions};
use crate::search::Search;
use homophone_store::{
    DocId, GroupFilter, Pipeline, PostingFilter, Projection, ResultRow, Stage,
};

/// Build the pipeline for `tokens`.
///
/// A `lookup` restricts matching to one document and drops sorting, the
/// window, score bounds and include/exclude sets. The AND threshold still
/// applies to it.
pub(crate) fn build_pipeline(
    tokens: Vec<String>,
    options: &QueryOptions,
    lookup: Option<&DocId>,
    projection: Projection,
) -> homophone_store::Result<Pipeline> {
    let min_matched = match options.combine {
        CombineMode::And => Some(tokens.len() as u64),
        CombineMode::Or => None,
    };

    let mut stages = Vec::with_capacity(7);
    match lookup {
        Some(doc) => {
            stages.push(Stage::Match(PostingFilter {
                tokens,
                doc: Some(doc.clone()),
                include: None,
                exclude: None,
            }));
            stages.push(Stage::Group);
            let having = GroupFilter {
                min_matched,
                ..GroupFilter::default()
            };
            if !having.is_empty() {
                stages.push(Stage::Having(having));
            }
        }
        None => {
            stages.push(Stage::Match(PostingFilter {
                tokens,
                doc: None,
                include: options.include.clone(),
                exclude: options.exclude.clone(),
            }));
            stages.push(Stage::Group);
            let having = GroupFilter {
                min_matched,
                min_score: options.min_score,
                max_score: options.max_score,
            };
            if !having.is_empty() {
                stages.push(Stage::Having(having));
            }
            if let Some(direction) = options.sort {
                stages.push(Stage::Sort(direction));
            }
            if options.start > 0 {
                stages.push(Stage::Skip(options.start as u64));
            }
            if let Some(stop) = options.stop {
                stages.push(Stage::Limit(stop.saturating_sub(options.start) as u64));
            }
        }
    }
    stages.push(Stage::Project(projection));

    Pipeline::new(stages)
}

/// Whether the window can only ever be empty.
fn empty_window(options: &QueryOptions) -> bool {
    options.stop.is_some_and(|stop| stop <= options.start)
}

pub(crate) async fn run(
    search: &Search,
    text: &str,
    options: &QueryOptions,
    lookup: Option<&DocId>,
    projection: Projection,
) -> Result<Vec<ResultRow>> {
    let tokens = search.normalizer().canonicalize(text, false);
    if tokens.is_empty() {
        tracing::debug!(key = search.key(), "query has no searchable tokens");
        return Ok(Vec::new());
    }
    if lookup.is_none() && empty_window(options) {
        tracing::debug!(
            key = search.key(),
            start = options.start,
            stop = ?options.stop,
            "query window is empty"
        );
        return Ok(Vec::new());
    }

    let token_count = tokens.len();
    let pipeline = build_pipeline(tokens, options, lookup, projection)
        .map_err(|e| Error::store(Operation::Query, search.key(), e))?;

    search.ready(Operation::Query).await?;
    let rows = search
        .store()
        .aggregate(search.key(), &pipeline)
        .await
        .map_err(|e| Error::store(Operation::Query, search.key(), e))?;

    tracing::debug!(
        key = search.key(),
        tokens = token_count,
        combine = %options.combine,
        rows = rows.len(),
        "query complete"
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use homophone_store::Direction;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn names(pipeline: &Pipeline) -> Vec<&'static str> {
        pipeline
            .stages()
            .iter()
            .map(|stage| match stage {
                Stage::Match(_) => "match",
                Stage::Group => "group",
                Stage::Having(_) => "having",
                Stage::Sort(_) => "sort",
                Stage::Skip(_) => "skip",
                Stage::Limit(_) => "limit",
                Stage::Project(_) => "project",
            })
            .collect()
    }

    #[test]
    fn test_default_pipeline() {
        let pipeline = build_pipeline(
            tokens(&["KK", "FKS"]),
            &QueryOptions::default(),
            None,
            Projection::default(),
        )
        .unwrap();

        assert_eq!(names(&pipeline), ["match", "group", "having", "sort", "project"]);
        assert_eq!(pipeline.having().and_then(|h| h.min_matched), Some(2));
        assert_eq!(pipeline.sort(), Some(Direction::Descending));
        assert_eq!(pipeline.filter().tokens, tokens(&["KK", "FKS"]));
    }

    #[test]
    fn test_or_unsorted_has_no_having() {
        let options = QueryOptions {
            combine: CombineMode::Or,
            sort: None,
            ..QueryOptions::default()
        };
        let pipeline =
            build_pipeline(tokens(&["KK"]), &options, None, Projection::default()).unwrap();
        assert_eq!(names(&pipeline), ["match", "group", "project"]);
    }

    #[test]
    fn test_window_and_bounds() {
        let options = QueryOptions {
            start: 2,
            stop: Some(5),
            min_score: Some(3),
            max_score: Some(9),
            include: Some(vec![DocId::from(1)]),
            exclude: Some(vec![DocId::from(2)]),
            ..QueryOptions::default()
        };
        let pipeline =
            build_pipeline(tokens(&["KK"]), &options, None, Projection::default()).unwrap();

        assert_eq!(pipeline.skip(), Some(2));
        assert_eq!(pipeline.limit(), Some(3));
        let having = pipeline.having().unwrap();
        assert_eq!(having.min_score, Some(3));
        assert_eq!(having.max_score, Some(9));
        assert_eq!(pipeline.filter().include, Some(vec![DocId::from(1)]));
        assert_eq!(pipeline.filter().exclude, Some(vec![DocId::from(2)]));
    }

    #[test]
    fn test_stop_without_start_limits() {
        let options = QueryOptions {
            stop: Some(10),
            ..QueryOptions::default()
        };
        let pipeline =
            build_pipeline(tokens(&["KK"]), &options, None, Projection::default()).unwrap();
        assert_eq!(pipeline.skip(), None);
        assert_eq!(pipeline.limit(), Some(10));
    }

    #[test]
    fn test_lookup_ignores_listing_options() {
        let options = QueryOptions {
            start: 1,
            stop: Some(3),
            min_score: Some(100),
            max_score: Some(200),
            include: Some(vec![DocId::from(7)]),
            exclude: Some(vec![DocId::from(1)]),
            ..QueryOptions::default()
        };
        let doc = DocId::from(1);
        let pipeline = build_pipeline(
            tokens(&["KK", "FKS"]),
            &options,
            Some(&doc),
            Projection::default(),
        )
        .unwrap();

        assert_eq!(names(&pipeline), ["match", "group", "having", "project"]);
        assert_eq!(pipeline.filter().doc, Some(doc));
        assert_eq!(pipeline.filter().include, None);
        assert_eq!(pipeline.filter().exclude, None);
        let having = pipeline.having().unwrap();
        assert_eq!(having.min_matched, Some(2));
        assert_eq!(having.min_score, None);
        assert_eq!(having.max_score, None);
    }

    #[test]
    fn test_empty_window() {
        let mut options = QueryOptions::default();
        assert!(!empty_window(&options));
        options.start = 3;
        options.stop = Some(3);
        assert!(empty_window(&options));
        options.stop = Some(4);
        assert!(!empty_window(&options));
    }
}
