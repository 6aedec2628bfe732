pub mod client;
pub mod connection;
pub mod error;
pub mod global;

pub use client::PostgresDb;
pub use connection::{Database, DbConnection, Row, SqlParam};
pub use error::DbError;
pub use global::shared_database;
