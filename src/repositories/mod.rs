//! Data access layer for the registry tables.
//!
//! Repositories provide a clean abstraction over SQL queries, using the
//! `FromContext` derive macro for dependency injection. Operations that
//! participate in the merge transaction are also exposed as associated
//! functions over any [`crate::db::SqlExecutor`], so the same SQL runs
//! both auto-commit and inside an explicit transaction.

mod category;
mod document;
mod entity;
mod merge_log;

pub use category::CategoryRepository;
pub use document::DocumentRepository;
pub use entity::{validate_merge_fields, EntityRepository};
pub use merge_log::MergeLogRepository;
