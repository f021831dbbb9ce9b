use crate::{
    error::{ConnectorError, DbError},
    sql::{params::bind_all, row::to_row_data},
};
use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt, stream::BoxStream};
use model::{core::value::Value, records::row::RowData};
use planner::{
    compiler::{CompiledStatement, count::COUNT_COLUMN},
    query::dialect::DialectKind,
};
use sqlx::{AnyPool, any::AnyPoolOptions};
use tracing::{debug, info};

/// Runs compiled statements and streams the resulting records.
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    /// Forward-only stream of records. Dropping the stream cancels the fetch.
    fn fetch<'a>(&'a self, stmt: &'a CompiledStatement) -> BoxStream<'a, Result<RowData, DbError>>;

    async fn fetch_all(&self, stmt: &CompiledStatement) -> Result<Vec<RowData>, DbError> {
        self.fetch(stmt).try_collect().await
    }

    /// Runs a statement produced by `compile_count` and returns the count.
    async fn fetch_count(&self, stmt: &CompiledStatement) -> Result<i64, DbError> {
        let row = self
            .fetch(stmt)
            .try_next()
            .await?
            .ok_or_else(|| DbError::NoRows(stmt.sql.clone()))?;
        row.get_value(COUNT_COLUMN)
            .as_i64()
            .ok_or_else(|| DbError::InvalidCount(stmt.sql.clone()))
    }
}

/// Maps a connection string onto the dialect its database speaks.
pub fn dialect_for_url(url: &str) -> Result<DialectKind, ConnectorError> {
    let scheme = url.split(':').next().unwrap_or_default();
    match scheme {
        "postgres" | "postgresql" => Ok(DialectKind::Postgres),
        "mysql" | "mariadb" => Ok(DialectKind::MySql),
        "sqlite" => Ok(DialectKind::Sqlite),
        _ => Err(ConnectorError::UnsupportedUrl(url.to_string())),
    }
}

#[derive(Clone)]
pub struct SqlxExecutor {
    pool: AnyPool,
    dialect: DialectKind,
}

impl SqlxExecutor {
    pub async fn connect(url: &str) -> Result<Self, ConnectorError> {
        sqlx::any::install_default_drivers();
        let dialect = dialect_for_url(url)?;

        // Every connection to an in-memory SQLite database opens a new,
        // empty database, so the pool must hold on to exactly one.
        let options = if url.contains(":memory:") || url.contains("mode=memory") {
            AnyPoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            AnyPoolOptions::new()
        };

        let pool = options.connect(url).await?;
        info!(dialect = %dialect, "connected");
        Ok(Self { pool, dialect })
    }

    pub fn dialect(&self) -> DialectKind {
        self.dialect
    }

    /// Executes a statement without reading rows, returning rows affected.
    pub async fn execute(&self, sql: &str) -> Result<u64, DbError> {
        let result = sqlx::query(sql).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    pub async fn execute_with(&self, sql: &str, params: &[Value]) -> Result<u64, DbError> {
        let result = bind_all(sqlx::query(sql), params).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl StatementExecutor for SqlxExecutor {
    fn fetch<'a>(&'a self, stmt: &'a CompiledStatement) -> BoxStream<'a, Result<RowData, DbError>> {
        debug!(sql = %stmt.sql, params = stmt.params.len(), "fetching");
        let entity = stmt.entity.as_str();
        bind_all(sqlx::query(&stmt.sql), &stmt.params)
            .fetch(&self.pool)
            .map(move |row| to_row_data(&row?, entity))
            .boxed()
    }
}
