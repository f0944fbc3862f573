//! Category model for entity classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named tag usable by many entities.
///
/// Membership lives in the `entity_categories` join table; an entity can
/// carry any number of categories and a category any number of entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier (ULID).
    pub id: String,
    /// Category name (unique).
    pub name: String,
    /// Optional description of what this category groups.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
