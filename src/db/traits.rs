//! Core trait for SQL execution.

use async_trait::async_trait;
use tokio_postgres::types::ToSql;
use tokio_postgres::Row;

use crate::error::AppError;

/// Executes parameterized SQL against PostgreSQL.
///
/// Implemented by both the pooled client (auto-commit per statement) and
/// the explicit transaction wrapper, so repository operations can run in
/// either context. Parameters are always bound via the extended query
/// protocol, never interpolated into the SQL text.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Executes a query and returns all result rows.
    async fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, AppError>;

    /// Executes a query expected to return at most one row.
    async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, AppError>;

    /// Executes a statement and returns the number of rows affected.
    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64, AppError>;

    /// Executes a batch of statements without parameters.
    ///
    /// Use this for DDL (CREATE TABLE, CREATE INDEX) in migrations.
    async fn batch(&self, sql: &str) -> Result<(), AppError>;
}
