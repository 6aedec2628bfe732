use std::sync::Arc;

use crate::db::connection::{Database, Row, SqlParam};
use crate::db::error::DbError;
use crate::db::global::shared_database;

const GET_BOOK_BY_NAME: &str = "SELECT * FROM books WHERE name = $1";

/// Repository over the `books` table. Stateless aside from the shared
/// database handle it holds.
pub struct BookRepository {
    db: Arc<dyn Database>,
}

impl BookRepository {
    /// Builds a repository on top of the global database handle,
    /// constructing the handle if this is the first access.
    pub async fn new() -> Result<Self, DbError> {
        let db = shared_database().await?;
        Ok(BookRepository { db })
    }

    /// Builds a repository over an explicitly provided database. This is
    /// the seam tests use to substitute a fake pool.
    pub fn with_database(db: Arc<dyn Database>) -> Self {
        BookRepository { db }
    }

    /// Fetches every book whose name matches exactly. The name is always
    /// sent as a bound parameter, never spliced into the query text. An
    /// unmatched name yields an empty vec, not an error.
    pub async fn get_book_by_name(&self, name: &str) -> Result<Vec<Row>, DbError> {
        if name.is_empty() {
            return Err(DbError::Query(anyhow::anyhow!(
                "book name must not be empty"
            )));
        }

        let mut conn = self.db.acquire().await?;

        let params = [SqlParam::Text(name.to_string())];
        let rows = conn.query(GET_BOOK_BY_NAME, &params).await?;
        // `conn` drops here on both the success and the error path above,
        // returning the connection to the pool.

        Ok(rows)
    }
}
