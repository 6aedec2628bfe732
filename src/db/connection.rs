use async_trait::async_trait;
use serde_json::Value;

use crate::db::error::DbError;

/// A single bound query argument. Values always travel separately from the
/// SQL text so the text itself never changes shape.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

/// One result row, keyed by column name.
pub type Row = serde_json::Map<String, Value>;

/// A connection leased from a pool. Dropping it returns the connection to
/// the pool that issued it, on every exit path.
#[async_trait]
pub trait DbConnection: Send {
    async fn query(&mut self, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>, DbError>;
}

/// The pool capability consumed by repositories. `acquire` may block until
/// a connection frees up or the pool's own timeout fires.
#[async_trait]
pub trait Database: Send + Sync {
    async fn acquire(&self) -> Result<Box<dyn DbConnection>, DbError>;
}
