use clap::{Args, Parser, Subcommand};
use homophone_core::{CombineMode, Direction, DocId};
use std::convert::Infallible;
use std::path::PathBuf;

/// Numeric ids become integer ids, anything else a string id.
fn parse_doc_id(value: &str) -> Result<DocId, Infallible> {
    value.parse()
}

#[derive(Parser)]
#[command(name = "homophone")]
#[command(version)]
#[command(about = "Phonetic full-text search backed by SQLite")]
pub struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database (overrides config and HOMOPHONE_DB)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Index namespace (overrides config and HOMOPHONE_NAMESPACE)
    #[arg(long, global = true)]
    pub namespace: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Index a document
    Index {
        #[arg(value_parser = parse_doc_id)]
        id: DocId,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Remove a document
    Remove {
        #[arg(value_parser = parse_doc_id)]
        id: DocId,
    },

    /// Search the index
    Query(QueryArgs),

    /// Print one document's score for a query
    Score {
        #[arg(value_parser = parse_doc_id)]
        id: DocId,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Print version information
    Version,
}

#[derive(Args, Debug, Default)]
pub struct QueryArgs {
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,

    /// and/intersect or or/union
    #[arg(long = "type")]
    pub combine: Option<CombineMode>,

    /// asc or desc
    #[arg(long)]
    pub sort: Option<Direction>,

    #[arg(long, default_value_t = 0)]
    pub start: usize,

    /// Exclusive end of the result window
    #[arg(long)]
    pub stop: Option<usize>,

    /// Minimum score; 0 or less is unbounded
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub min: i64,

    /// Maximum score; 0 or less is unbounded
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub max: i64,

    #[arg(long, num_args = 1.., value_parser = parse_doc_id)]
    pub include: Vec<DocId>,

    #[arg(long, num_args = 1.., value_parser = parse_doc_id)]
    pub exclude: Vec<DocId>,

    /// Print id/score pairs instead of bare ids
    #[arg(long)]
    pub scores: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_version() {
        let cli = Cli::try_parse_from(["homophone", "version"]);
        assert!(cli.is_ok());
        assert!(matches!(cli.unwrap().command, Commands::Version));
    }

    #[test]
    fn test_cli_parse_index() {
        let cli = Cli::try_parse_from(["homophone", "index", "42", "quick", "brown", "fox"]).unwrap();
        if let Commands::Index { id, text } = cli.command {
            assert_eq!(id, DocId::Int(42));
            assert_eq!(text, ["quick", "brown", "fox"]);
        } else {
            panic!("Expected Index command");
        }
    }

    #[test]
    fn test_cli_parse_string_id() {
        let cli = Cli::try_parse_from(["homophone", "remove", "post-7"]).unwrap();
        assert!(matches!(cli.command, Commands::Remove { id: DocId::Text(ref s) } if s == "post-7"));
    }

    #[test]
    fn test_cli_numeric_ids_are_integers() {
        let cli = Cli::try_parse_from(["homophone", "score", "10", "quick", "fox"]).unwrap();
        let Commands::Score { id, .. } = cli.command else {
            panic!("Expected Score command");
        };
        assert_eq!(id, DocId::Int(10));
        assert!(DocId::Int(9) < id);

        let cli = Cli::try_parse_from(["homophone", "query", "fox", "--include", "3", "x"])
            .unwrap();
        let Commands::Query(args) = cli.command else {
            panic!("Expected Query command");
        };
        assert_eq!(args.include, [DocId::Int(3), DocId::from("x")]);
    }

    #[tokio::test]
    async fn test_cli_indexed_id_is_found_by_integer() {
        use homophone_core::{Client, MemoryStore};
        use std::sync::Arc;

        let cli = Cli::try_parse_from(["homophone", "index", "7", "quick", "fox"]).unwrap();
        let Commands::Index { id, text } = cli.command else {
            panic!("Expected Index command");
        };
        let search = Client::new(Arc::new(MemoryStore::new()))
            .search("posts")
            .unwrap();
        search.index(&text.join(" "), id).await.unwrap();

        assert_eq!(search.query("quick fox").score(7).await.unwrap(), 2);
    }

    #[test]
    fn test_cli_index_needs_text() {
        assert!(Cli::try_parse_from(["homophone", "index", "1"]).is_err());
    }

    #[test]
    fn test_cli_parse_query_options() {
        let cli = Cli::try_parse_from([
            "homophone", "query", "quick", "fox", "--type", "union", "--sort", "asc", "--start",
            "2", "--stop", "4", "--min", "3", "--exclude", "1", "b", "--scores",
        ])
        .unwrap();
        let Commands::Query(args) = cli.command else {
            panic!("Expected Query command");
        };
        assert_eq!(args.text, ["quick", "fox"]);
        assert_eq!(args.combine, Some(CombineMode::Or));
        assert_eq!(args.sort, Some(Direction::Ascending));
        assert_eq!(args.start, 2);
        assert_eq!(args.stop, Some(4));
        assert_eq!(args.min, 3);
        assert_eq!(args.max, 0);
        assert_eq!(args.exclude, [DocId::Int(1), DocId::from("b")]);
        assert!(args.include.is_empty());
        assert!(args.scores);
    }

    #[test]
    fn test_cli_rejects_unknown_type() {
        assert!(Cli::try_parse_from(["homophone", "query", "fox", "--type", "xor"]).is_err());
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::try_parse_from([
            "homophone", "query", "fox", "--db", "/tmp/x.db", "--namespace", "posts",
        ])
        .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
        assert_eq!(cli.namespace.as_deref(), Some("posts"));
        assert!(cli.config.is_none());
    }
}
