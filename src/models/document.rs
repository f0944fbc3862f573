//! Document record model for generated-document ownership tracking.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// A generated-document record owned by an entity.
///
/// Rendering itself happens in an external service; the registry only
/// tracks which entity owns each record so merges can repoint ownership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Unique identifier (ULID).
    pub id: String,
    /// Owning entity.
    pub entity_id: String,
    /// Template the document was rendered from.
    pub template_id: Option<String>,
    /// Rendering lifecycle state.
    pub status: DocumentStatus,
    /// Data the document was (or will be) rendered with.
    pub payload: Map<String, JsonValue>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a new document record.
#[derive(Debug, Clone)]
pub struct NewDocumentRecord {
    pub entity_id: String,
    pub template_id: Option<String>,
    pub payload: Map<String, JsonValue>,
}

/// Rendering lifecycle state of a document record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Processing => "processing",
            DocumentStatus::Completed => "completed",
            DocumentStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DocumentStatus::Pending),
            "processing" => Ok(DocumentStatus::Processing),
            "completed" => Ok(DocumentStatus::Completed),
            "failed" => Ok(DocumentStatus::Failed),
            other => Err(format!("unknown document status: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            DocumentStatus::Pending,
            DocumentStatus::Processing,
            DocumentStatus::Completed,
            DocumentStatus::Failed,
        ] {
            assert_eq!(status.to_string().parse::<DocumentStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!("archived".parse::<DocumentStatus>().is_err());
    }
}
