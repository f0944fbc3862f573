//! Versioned schema migrations with version tracking.
//!
//! Each migration runs in its own transaction and records its version in
//! the `schema_version` table, so `run_migrations` is idempotent: a
//! second run applies nothing.

mod m001_schema;
mod m002_merge_logs;

use futures::future::BoxFuture;

use crate::db::{Db, SqlExecutor};
use crate::error::AppError;

pub use m001_schema::M001Schema;
pub use m002_merge_logs::M002MergeLogs;

/// A single schema migration.
///
/// Uses BoxFuture to avoid `'static` requirements from `#[async_trait]`.
pub trait Migration: Send + Sync {
    fn id(&self) -> &'static str;
    fn version(&self) -> u32;
    fn description(&self) -> &'static str;
    fn up<'a>(&'a self, db: &'a dyn SqlExecutor) -> BoxFuture<'a, Result<(), AppError>>;
}

/// All migrations, in version order.
pub fn registry() -> Vec<Box<dyn Migration>> {
    vec![Box::new(M001Schema), Box::new(M002MergeLogs)]
}

/// Result of running migrations.
#[derive(Debug, Clone)]
pub struct MigrationResult {
    pub previous_version: u32,
    pub current_version: u32,
    pub applied_migrations: Vec<String>,
}

/// Run all pending migrations.
///
/// Creates the `schema_version` tracking table if needed, then applies
/// every migration above the recorded version, each in its own
/// transaction together with the version bump.
pub async fn run_migrations(db: &Db) -> Result<MigrationResult, AppError> {
    db.batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            id INT PRIMARY KEY,
            version INT NOT NULL
        )",
    )
    .await?;

    let previous_version = current_version(db).await?;
    let mut version = previous_version;
    let mut applied = Vec::new();

    for migration in registry() {
        if migration.version() <= version {
            continue;
        }

        tracing::info!(
            "applying migration {} (v{}): {}",
            migration.id(),
            migration.version(),
            migration.description()
        );

        let txn = db.begin().await?;
        let result = migration.up(&txn).await;
        match result {
            Ok(()) => {
                let new_version = migration.version() as i32;
                txn.execute(
                    "INSERT INTO schema_version (id, version) VALUES (1, $1)
                     ON CONFLICT (id) DO UPDATE SET version = EXCLUDED.version",
                    &[&new_version],
                )
                .await?;
                txn.commit().await?;
            }
            Err(e) => {
                tracing::error!("migration {} failed: {}", migration.id(), e);
                txn.rollback().await?;
                return Err(e);
            }
        }

        version = migration.version();
        applied.push(migration.id().to_string());
    }

    Ok(MigrationResult {
        previous_version,
        current_version: version,
        applied_migrations: applied,
    })
}

/// Read the recorded schema version, defaulting to 0 on a fresh database.
async fn current_version(db: &Db) -> Result<u32, AppError> {
    let row = db
        .query_opt("SELECT version FROM schema_version WHERE id = 1", &[])
        .await?;

    Ok(row
        .map(|r| r.try_get::<_, i32>("version"))
        .transpose()?
        .unwrap_or(0) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_versions_strictly_increasing() {
        let migrations = registry();
        assert!(!migrations.is_empty());
        for window in migrations.windows(2) {
            assert!(
                window[0].version() < window[1].version(),
                "{} must precede {}",
                window[0].id(),
                window[1].id()
            );
        }
    }

    #[test]
    fn test_registry_ids_unique() {
        let migrations = registry();
        let mut ids: Vec<_> = migrations.iter().map(|m| m.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), migrations.len());
    }
}
