use async_trait::async_trait;
use log::{info, warn};
use serde_json::Value;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::Row as _;
use sqlx::{Column, PgPool, Postgres, TypeInfo};

use crate::config::DatabaseSettings;
use crate::db::connection::{Database, DbConnection, Row, SqlParam};
use crate::db::error::DbError;

/// Owns the Postgres connection pool. Exactly one of these exists per
/// process when reached through [`crate::db::shared_database`]; direct
/// construction stays available for dependency injection.
pub struct PostgresDb {
    pool: PgPool,
}

impl PostgresDb {
    pub async fn new(settings: &DatabaseSettings) -> Result<Self, DbError> {
        settings.validate()?;

        let options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .username(&settings.user)
            .password(&settings.password)
            .database(&settings.dbname);

        let pool = PgPoolOptions::new()
            .min_connections(settings.min_connections)
            .max_connections(settings.max_connections)
            .connect_with(options)
            .await
            .map_err(|err| DbError::Construction(err.into()))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|err| DbError::Construction(err.into()))?;

        info!(
            "Successfully created connection pool ({}..{} connections)",
            settings.min_connections, settings.max_connections
        );

        Ok(PostgresDb { pool })
    }
}

#[async_trait]
impl Database for PostgresDb {
    async fn acquire(&self) -> Result<Box<dyn DbConnection>, DbError> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|err| DbError::Acquire(err.into()))?;

        Ok(Box::new(PgPooledConnection { conn }))
    }
}

/// A leased pool connection. Dropping it hands the connection back to the
/// pool; sqlx discards it instead if it was deemed unhealthy.
struct PgPooledConnection {
    conn: PoolConnection<Postgres>,
}

#[async_trait]
impl DbConnection for PgPooledConnection {
    async fn query(&mut self, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>, DbError> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = match param {
                SqlParam::Text(v) => query.bind(v.clone()),
                SqlParam::Int(v) => query.bind(*v),
                SqlParam::Float(v) => query.bind(*v),
                SqlParam::Bool(v) => query.bind(*v),
                SqlParam::Null => query.bind(Option::<String>::None),
            };
        }

        let rows = query
            .fetch_all(&mut *self.conn)
            .await
            .map_err(|err| DbError::Query(err.into()))?;

        rows.iter().map(decode_row).collect()
    }
}

fn decode_row(row: &PgRow) -> Result<Row, DbError> {
    let mut out = Row::new();

    for (idx, column) in row.columns().iter().enumerate() {
        let value = decode_column(row, idx, column.type_info().name())
            .map_err(|err| DbError::Query(err.into()))?;
        out.insert(column.name().to_string(), value);
    }

    Ok(out)
}

fn decode_column(row: &PgRow, idx: usize, type_name: &str) -> Result<Value, sqlx::Error> {
    let value = match type_name {
        "TEXT" | "VARCHAR" | "CHAR" | "BPCHAR" | "NAME" => {
            row.try_get::<Option<String>, _>(idx)?.map(Value::from)
        }
        "INT2" => row.try_get::<Option<i16>, _>(idx)?.map(Value::from),
        "INT4" => row.try_get::<Option<i32>, _>(idx)?.map(Value::from),
        "INT8" => row.try_get::<Option<i64>, _>(idx)?.map(Value::from),
        "FLOAT4" => row.try_get::<Option<f32>, _>(idx)?.map(Value::from),
        "FLOAT8" => row.try_get::<Option<f64>, _>(idx)?.map(Value::from),
        "BOOL" => row.try_get::<Option<bool>, _>(idx)?.map(Value::from),
        "JSON" | "JSONB" => row.try_get::<Option<Value>, _>(idx)?,
        other => {
            warn!("column type {other} has no JSON mapping, returning null");
            None
        }
    };

    Ok(value.unwrap_or(Value::Null))
}
