//! Entity model representing the records subject to deduplication.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use ulid::Ulid;

/// A contact or organization record.
///
/// Entities are the unit of deduplication: the duplicate finder scores
/// pairs of them and the merge coordinator folds one into another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier (ULID).
    pub id: String,
    /// Display name (person or organization).
    pub name: String,
    /// Contact email. Unique at the schema level.
    pub email: String,
    /// Free-form phone number, if known.
    pub phone: Option<String>,
    /// Identifier in an upstream system, if any.
    pub external_reference: Option<String>,
    /// Open key-value bag for caller-defined attributes.
    pub metadata: Map<String, JsonValue>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a new entity.
#[derive(Debug, Clone, Default)]
pub struct NewEntity {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub external_reference: Option<String>,
    pub metadata: Map<String, JsonValue>,
}

/// Generates a new ULID string.
pub fn generate_ulid() -> String {
    Ulid::new().to_string()
}
