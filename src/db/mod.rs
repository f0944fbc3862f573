//! Database access layer.
//!
//! Provides connection pooling and explicit transactions over PostgreSQL:
//!
//! - [`SqlExecutor`] - executes parameterized SQL (implemented by both the
//!   pooled client and an open transaction)
//! - [`Db`] - connection pool handle; each call runs in its own implicit
//!   transaction
//! - [`PgTransaction`] - explicit transaction, committed or rolled back
//!   exactly once
//!
//! # Usage
//!
//! ```ignore
//! use kindred::db::{Db, SqlExecutor};
//!
//! let db = Db::connect("postgresql://localhost/kindred").await?;
//!
//! // Auto-commit query
//! let rows = db.query("SELECT id FROM entities", &[]).await?;
//!
//! // Explicit transaction
//! let txn = db.begin().await?;
//! txn.execute("DELETE FROM entities WHERE id = $1", &[&id]).await?;
//! txn.commit().await?;
//! ```

mod client;
mod traits;

pub use client::{Db, PgTransaction};
pub use traits::SqlExecutor;
