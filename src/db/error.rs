use thiserror::Error;

/// Errors surfaced by the database layer. Nothing is retried or swallowed
/// here; callers own any retry policy.
#[derive(Debug, Error)]
pub enum DbError {
    /// Invalid pool sizing or connection parameters. Raised before any
    /// connection attempt is made.
    #[error("invalid database configuration: {0}")]
    Configuration(String),

    /// The connection pool could not be initialized.
    #[error("failed to initialize connection pool")]
    Construction(#[source] anyhow::Error),

    /// The pool was exhausted or acquisition timed out.
    #[error("failed to acquire a connection from the pool")]
    Acquire(#[source] anyhow::Error),

    /// Query execution failed. The borrowed connection is still returned
    /// to the pool.
    #[error("query execution failed")]
    Query(#[source] anyhow::Error),
}
