//! SQLite posting store
//!
//! Each namespace gets its own table `postings:<key>` with columns
//! `(token, doc_id, score)`. `doc_id` has no declared type, so integer and
//! text ids keep their storage class and never compare equal.

use crate::pipeline::Pipeline;
use crate::types::{Direction, DocId, Posting, ResultRow};
use crate::{PostingStore, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Value, ValueRef};
use rusqlite::{Connection, ToSql, Transaction, params, params_from_iter};
use std::path::Path;
use std::sync::Arc;

impl ToSql for DocId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Int(id) => ToSqlOutput::from(*id),
            Self::Text(id) => ToSqlOutput::from(id.as_str()),
        })
    }
}

impl FromSql for DocId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Integer(id) => Ok(Self::Int(id)),
            ValueRef::Text(_) => value.as_str().map(|id| Self::Text(id.to_string())),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

fn doc_value(id: &DocId) -> Value {
    match id {
        DocId::Int(id) => Value::Integer(*id),
        DocId::Text(id) => Value::Text(id.clone()),
    }
}

/// Table name for `key`, unquoted.
fn table_name(key: &str) -> String {
    format!("postings:{key}")
}

fn index_name(key: &str) -> String {
    format!("postings:{key}:token_doc")
}

fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// A [`PostingStore`] backed by one SQLite database.
///
/// Statements run on tokio's blocking pool; the connection is shared behind a
/// mutex, so calls are serialized.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Number of posting rows stored under `key`.
    pub async fn count(&self, key: &str) -> Result<u64> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            if !object_exists(conn, "table", &table_name(&key))? {
                return Ok(0);
            }
            let sql = format!("SELECT COUNT(*) FROM {}", quote(&table_name(&key)));
            let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock();
            f(&mut conn)
        })
        .await?
    }
}

fn object_exists(conn: &Connection, kind: &str, name: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = ?1 AND name = ?2",
        params![kind, name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn create_table(tx: &Transaction<'_>, key: &str) -> Result<()> {
    tx.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS {} (
                token TEXT NOT NULL,
                doc_id NOT NULL,
                score INTEGER NOT NULL
            )",
            quote(&table_name(key))
        ),
        [],
    )?;
    Ok(())
}

/// Merge rows written before the unique index existed, then create it.
fn create_unique_index(tx: &Transaction<'_>, key: &str) -> Result<()> {
    let table = quote(&table_name(key));
    tx.execute_batch(&format!(
        "CREATE TEMP TABLE homophone_fold AS
            SELECT token, doc_id, SUM(score) AS score FROM {table} GROUP BY token, doc_id;
         DELETE FROM {table};
         INSERT INTO {table} (token, doc_id, score) SELECT token, doc_id, score FROM homophone_fold;
         DROP TABLE temp.homophone_fold;
         CREATE UNIQUE INDEX {index} ON {table} (token, doc_id);",
        index = quote(&index_name(key)),
    ))?;
    Ok(())
}

/// Translate a pipeline into a single statement plus its parameters.
fn compile(key: &str, pipeline: &Pipeline) -> (String, Vec<Value>) {
    let filter = pipeline.filter();
    let mut values = Vec::new();

    let placeholders = |n: usize| vec!["?"; n].join(", ");

    let mut sql = format!(
        "SELECT doc_id, COUNT(*) AS matched, SUM(score) AS total FROM {} WHERE token IN ({})",
        quote(&table_name(key)),
        placeholders(filter.tokens.len())
    );
    values.extend(filter.tokens.iter().cloned().map(Value::Text));

    if let Some(doc) = &filter.doc {
        sql.push_str(" AND doc_id = ?");
        values.push(doc_value(doc));
    }
    if let Some(include) = &filter.include {
        sql.push_str(&format!(" AND doc_id IN ({})", placeholders(include.len())));
        values.extend(include.iter().map(doc_value));
    }
    if let Some(exclude) = &filter.exclude {
        sql.push_str(&format!(" AND doc_id NOT IN ({})", placeholders(exclude.len())));
        values.extend(exclude.iter().map(doc_value));
    }

    sql.push_str(" GROUP BY doc_id");

    if let Some(having) = pipeline.having().filter(|h| !h.is_empty()) {
        let mut clauses = Vec::new();
        if let Some(min) = having.min_matched {
            clauses.push("COUNT(*) >= ?");
            values.push(Value::Integer(min as i64));
        }
        if let Some(min) = having.min_score {
            clauses.push("SUM(score) >= ?");
            values.push(Value::Integer(min as i64));
        }
        if let Some(max) = having.max_score {
            clauses.push("SUM(score) <= ?");
            values.push(Value::Integer(max as i64));
        }
        sql.push_str(" HAVING ");
        sql.push_str(&clauses.join(" AND "));
    }

    match pipeline.sort() {
        Some(Direction::Ascending) => sql.push_str(" ORDER BY total ASC, doc_id ASC"),
        Some(Direction::Descending) => sql.push_str(" ORDER BY total DESC, doc_id ASC"),
        None => {}
    }

    match (pipeline.limit(), pipeline.skip()) {
        (Some(limit), skip) => {
            sql.push_str(" LIMIT ? OFFSET ?");
            values.push(Value::Integer(limit as i64));
            values.push(Value::Integer(skip.unwrap_or(0) as i64));
        }
        (None, Some(skip)) => {
            sql.push_str(" LIMIT -1 OFFSET ?");
            values.push(Value::Integer(skip as i64));
        }
        (None, None) => {}
    }

    (sql, values)
}

#[async_trait]
impl PostingStore for SqliteStore {
    async fn ensure_unique_constraint(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            create_table(&tx, &key)?;
            if !object_exists(&tx, "index", &index_name(&key))? {
                create_unique_index(&tx, &key)?;
                tracing::debug!(key = %key, "created unique index on (token, doc_id)");
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn insert_postings(&self, key: &str, postings: Vec<Posting>) -> Result<()> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            create_table(&tx, &key)?;

            let table = quote(&table_name(&key));
            let sql = if object_exists(&tx, "index", &index_name(&key))? {
                format!(
                    "INSERT INTO {table} (token, doc_id, score) VALUES (?1, ?2, ?3)
                     ON CONFLICT (token, doc_id) DO UPDATE SET score = score + excluded.score"
                )
            } else {
                format!("INSERT INTO {table} (token, doc_id, score) VALUES (?1, ?2, ?3)")
            };

            {
                let mut stmt = tx.prepare(&sql)?;
                for posting in &postings {
                    let frequency = posting.frequency as i64;
                    stmt.execute(params![posting.token, posting.doc_id, frequency])?;
                }
            }

            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn delete_postings(&self, key: &str, doc_id: &DocId) -> Result<u64> {
        let key = key.to_string();
        let doc_id = doc_id.clone();
        self.with_conn(move |conn| {
            if !object_exists(conn, "table", &table_name(&key))? {
                return Ok(0);
            }
            let removed = conn.execute(
                &format!("DELETE FROM {} WHERE doc_id = ?1", quote(&table_name(&key))),
                params![doc_id],
            )?;
            Ok(removed as u64)
        })
        .await
    }

    async fn aggregate(&self, key: &str, pipeline: &Pipeline) -> Result<Vec<ResultRow>> {
        let key = key.to_string();
        let (sql, values) = compile(&key, pipeline);
        let projection = pipeline.projection();
        self.with_conn(move |conn| {
            if !object_exists(conn, "table", &table_name(&key))? {
                return Ok(Vec::new());
            }
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values), |row| {
                let matched: i64 = row.get(1)?;
                let total: i64 = row.get(2)?;
                Ok(ResultRow {
                    doc_id: row.get(0)?,
                    matched: projection.matched.then_some(matched as u64),
                    score: projection.score.then_some(total as u64),
                })
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(Into::into)
        })
        .await
    }
}
