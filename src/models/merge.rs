//! Merge audit log model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Immutable audit record of a completed merge.
///
/// Created exactly once per merge, inside the merge transaction. The
/// duplicate entity row is deleted in the same transaction, so this log
/// (with its snapshots) is the only remaining trace of it. Logs are never
/// updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeLog {
    /// Unique identifier (ULID).
    pub id: String,
    /// Entity that absorbed the duplicate. Still exists after the merge.
    pub primary_entity_id: String,
    /// Entity that was deleted by the merge.
    pub duplicate_entity_id: String,
    /// The field-override map applied to the primary entity.
    pub merged_fields: Map<String, JsonValue>,
    /// Pre-merge snapshot of the primary entity's fields.
    pub primary_snapshot: JsonValue,
    /// Pre-merge snapshot of the duplicate entity's fields.
    pub duplicate_snapshot: JsonValue,
    /// Optional operator note.
    pub note: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a new merge log row.
#[derive(Debug, Clone)]
pub struct NewMergeLog {
    pub primary_entity_id: String,
    pub duplicate_entity_id: String,
    pub merged_fields: Map<String, JsonValue>,
    pub primary_snapshot: JsonValue,
    pub duplicate_snapshot: JsonValue,
    pub note: Option<String>,
}
