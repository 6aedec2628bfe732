use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bookstore::db::{Database, DbConnection, DbError, Row, SqlParam};
use serde_json::Value;

/// One statement as a leased connection saw it: the raw SQL text and the
/// separately bound parameters.
#[derive(Debug, Clone)]
pub struct RecordedQuery {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

/// In-memory stand-in for the Postgres pool. Hands out connections over a
/// fixed set of rows, records every statement, and counts leases so tests
/// can assert that every connection goes back.
pub struct FakeDatabase {
    books: Vec<Row>,
    queries: Arc<Mutex<Vec<RecordedQuery>>>,
    leased: Arc<AtomicUsize>,
    acquires: AtomicUsize,
    fail_queries: bool,
    exhausted: bool,
}

impl FakeDatabase {
    pub fn new(books: Vec<Row>) -> Self {
        FakeDatabase {
            books,
            queries: Arc::new(Mutex::new(Vec::new())),
            leased: Arc::new(AtomicUsize::new(0)),
            acquires: AtomicUsize::new(0),
            fail_queries: false,
            exhausted: false,
        }
    }

    /// Every query on a leased connection fails.
    pub fn failing(books: Vec<Row>) -> Self {
        FakeDatabase {
            fail_queries: true,
            ..FakeDatabase::new(books)
        }
    }

    /// Every acquire fails, as an exhausted pool would.
    pub fn exhausted() -> Self {
        FakeDatabase {
            exhausted: true,
            ..FakeDatabase::new(Vec::new())
        }
    }

    /// Connections currently held by callers.
    pub fn leased(&self) -> usize {
        self.leased.load(Ordering::SeqCst)
    }

    /// Total number of successful acquires so far.
    pub fn acquires(&self) -> usize {
        self.acquires.load(Ordering::SeqCst)
    }

    pub fn recorded_queries(&self) -> Vec<RecordedQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn book(name: &str, author: &str) -> Row {
        let mut row = Row::new();
        row.insert("name".to_string(), Value::from(name));
        row.insert("author".to_string(), Value::from(author));
        row
    }
}

#[async_trait]
impl Database for FakeDatabase {
    async fn acquire(&self) -> Result<Box<dyn DbConnection>, DbError> {
        if self.exhausted {
            return Err(DbError::Acquire(anyhow::anyhow!(
                "pool exhausted: no connection became available"
            )));
        }

        self.acquires.fetch_add(1, Ordering::SeqCst);
        self.leased.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(FakeConnection {
            books: self.books.clone(),
            queries: self.queries.clone(),
            leased: self.leased.clone(),
            fail_queries: self.fail_queries,
        }))
    }
}

struct FakeConnection {
    books: Vec<Row>,
    queries: Arc<Mutex<Vec<RecordedQuery>>>,
    leased: Arc<AtomicUsize>,
    fail_queries: bool,
}

#[async_trait]
impl DbConnection for FakeConnection {
    async fn query(&mut self, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>, DbError> {
        self.queries.lock().unwrap().push(RecordedQuery {
            sql: sql.to_string(),
            params: params.to_vec(),
        });

        if self.fail_queries {
            return Err(DbError::Query(anyhow::anyhow!("forced query failure")));
        }

        // Emulate the fixed name lookup: match rows whose `name` column
        // equals the first bound text parameter.
        let Some(SqlParam::Text(name)) = params.first() else {
            return Ok(Vec::new());
        };

        Ok(self
            .books
            .iter()
            .filter(|row| row.get("name").and_then(Value::as_str) == Some(name))
            .cloned()
            .collect())
    }
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        self.leased.fetch_sub(1, Ordering::SeqCst);
    }
}
