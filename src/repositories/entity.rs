//! Entity repository for CRUD operations on the entities table.

use serde_json::{Map, Value as JsonValue};
use tokio_postgres::types::ToSql;
use tokio_postgres::Row;

use crate::context::Context;
use crate::db::{Db, SqlExecutor};
use crate::di::FromContext;
use crate::error::AppError;
use crate::models::{generate_ulid, Entity, NewEntity};

/// Column list shared by every entity query so rows always decode the same way.
const ENTITY_COLUMNS: &str =
    "id, name, email, phone, external_reference, metadata, created_at, updated_at";

/// Repository for entity CRUD operations.
#[derive(FromContext, Clone)]
pub struct EntityRepository {
    db: Db,
}

impl EntityRepository {
    /// Create a new entity.
    pub async fn create(&self, new: NewEntity) -> Result<Entity, AppError> {
        let id = generate_ulid();
        let metadata = JsonValue::Object(new.metadata);

        let row = self
            .db
            .query_opt(
                &format!(
                    "INSERT INTO entities (id, name, email, phone, external_reference, metadata)
                     VALUES ($1, $2, $3, $4, $5, $6)
                     RETURNING {ENTITY_COLUMNS}"
                ),
                &[
                    &id,
                    &new.name,
                    &new.email,
                    &new.phone,
                    &new.external_reference,
                    &metadata,
                ],
            )
            .await?
            .ok_or_else(|| AppError::Internal("INSERT .. RETURNING produced no row".into()))?;

        Self::row_to_entity(&row)
    }

    /// Find an entity by ID.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Entity>, AppError> {
        Self::find_by_id_in(&self.db, id).await
    }

    /// Load every entity, oldest first.
    ///
    /// This is the snapshot the duplicate finder scores over. The full
    /// scan is intentional - the pairing pass is O(n²) over this list and
    /// is only suitable for operational CRM-scale datasets.
    pub async fn list_all(&self) -> Result<Vec<Entity>, AppError> {
        let rows = self
            .db
            .query(
                &format!("SELECT {ENTITY_COLUMNS} FROM entities ORDER BY created_at, id"),
                &[],
            )
            .await?;

        rows.iter().map(Self::row_to_entity).collect()
    }

    /// Apply a partial field update to an entity.
    pub async fn update(
        &self,
        id: &str,
        fields: &Map<String, JsonValue>,
    ) -> Result<Entity, AppError> {
        Self::update_in(&self.db, id, fields)
            .await?
            .ok_or_else(|| AppError::EntityNotFound(id.to_string()))
    }

    /// Delete an entity by ID.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let deleted = Self::delete_in(&self.db, id).await?;
        if deleted == 0 {
            return Err(AppError::EntityNotFound(id.to_string()));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Executor-scoped operations (shared with the merge transaction)
    // ------------------------------------------------------------------

    /// Find an entity by ID on the given executor.
    pub async fn find_by_id_in(
        db: &dyn SqlExecutor,
        id: &str,
    ) -> Result<Option<Entity>, AppError> {
        let row = db
            .query_opt(
                &format!("SELECT {ENTITY_COLUMNS} FROM entities WHERE id = $1"),
                &[&id],
            )
            .await?;

        row.as_ref().map(Self::row_to_entity).transpose()
    }

    /// Find an entity by ID, taking a row-level lock for the duration of
    /// the surrounding transaction.
    ///
    /// Serializes concurrent merges naming this entity: a second merge
    /// blocks here until the first commits, then observes the row as
    /// updated or already deleted.
    pub async fn find_for_update_in(
        db: &dyn SqlExecutor,
        id: &str,
    ) -> Result<Option<Entity>, AppError> {
        let row = db
            .query_opt(
                &format!("SELECT {ENTITY_COLUMNS} FROM entities WHERE id = $1 FOR UPDATE"),
                &[&id],
            )
            .await?;

        row.as_ref().map(Self::row_to_entity).transpose()
    }

    /// Apply a partial field update on the given executor.
    ///
    /// `fields` maps mutable column names to replacement values; unknown
    /// names or mistyped values are rejected with a validation error. An
    /// empty map issues no UPDATE and returns the row as-is.
    pub async fn update_in(
        db: &dyn SqlExecutor,
        id: &str,
        fields: &Map<String, JsonValue>,
    ) -> Result<Option<Entity>, AppError> {
        let update = EntityUpdate::try_from_fields(fields)?;
        if update.is_empty() {
            return Self::find_by_id_in(db, id).await;
        }

        let sql = format!(
            "UPDATE entities SET {}, updated_at = now() WHERE id = ${} RETURNING {ENTITY_COLUMNS}",
            update.set_clauses.join(", "),
            update.params.len() + 1,
        );

        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::with_capacity(update.params.len() + 1);
        for param in &update.params {
            params.push(param.as_sql());
        }
        params.push(&id);

        let row = db.query_opt(&sql, &params).await?;
        row.as_ref().map(Self::row_to_entity).transpose()
    }

    /// Delete an entity on the given executor. Returns the rows deleted.
    pub async fn delete_in(db: &dyn SqlExecutor, id: &str) -> Result<u64, AppError> {
        db.execute("DELETE FROM entities WHERE id = $1", &[&id]).await
    }

    /// Convert a row to an Entity.
    fn row_to_entity(row: &Row) -> Result<Entity, AppError> {
        let metadata: JsonValue = row.try_get("metadata")?;

        Ok(Entity {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            external_reference: row.try_get("external_reference")?,
            metadata: metadata.as_object().cloned().unwrap_or_default(),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Validate a field-override map without issuing any SQL.
///
/// Used by the merge coordinator to reject unknown or mistyped fields
/// before its transaction opens.
pub fn validate_merge_fields(fields: &Map<String, JsonValue>) -> Result<(), AppError> {
    EntityUpdate::try_from_fields(fields).map(|_| ())
}

/// A prepared SET list for a partial entity update.
///
/// Validates the field map against the known mutable columns before any
/// SQL is issued, so a bad override map fails before a transaction opens.
#[derive(Debug)]
pub(crate) struct EntityUpdate {
    set_clauses: Vec<String>,
    params: Vec<SqlParam>,
}

/// Owned parameter value with a known SQL type.
#[derive(Debug)]
enum SqlParam {
    Text(String),
    NullableText(Option<String>),
    Json(JsonValue),
}

impl SqlParam {
    fn as_sql(&self) -> &(dyn ToSql + Sync) {
        match self {
            SqlParam::Text(s) => s,
            SqlParam::NullableText(s) => s,
            SqlParam::Json(v) => v,
        }
    }
}

impl EntityUpdate {
    pub(crate) fn try_from_fields(fields: &Map<String, JsonValue>) -> Result<Self, AppError> {
        let mut set_clauses = Vec::with_capacity(fields.len());
        let mut params = Vec::with_capacity(fields.len());

        for (key, value) in fields {
            let param = match key.as_str() {
                "name" | "email" => match value {
                    JsonValue::String(s) => SqlParam::Text(s.clone()),
                    _ => {
                        return Err(AppError::Validation(format!(
                            "field '{}' must be a string",
                            key
                        )))
                    }
                },
                "phone" | "external_reference" => match value {
                    JsonValue::String(s) => SqlParam::NullableText(Some(s.clone())),
                    JsonValue::Null => SqlParam::NullableText(None),
                    _ => {
                        return Err(AppError::Validation(format!(
                            "field '{}' must be a string or null",
                            key
                        )))
                    }
                },
                "metadata" => match value {
                    JsonValue::Object(_) => SqlParam::Json(value.clone()),
                    _ => {
                        return Err(AppError::Validation(
                            "field 'metadata' must be an object".to_string(),
                        ))
                    }
                },
                other => {
                    return Err(AppError::Validation(format!(
                        "unknown merge field: {}",
                        other
                    )))
                }
            };

            set_clauses.push(format!("{} = ${}", key, params.len() + 1));
            params.push(param);
        }

        Ok(Self { set_clauses, params })
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.set_clauses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(pairs: &[(&str, JsonValue)]) -> Map<String, JsonValue> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_update_plan_known_fields() {
        let update = EntityUpdate::try_from_fields(&fields(&[
            ("email", json!("merged@example.com")),
            ("name", json!("Merged Name")),
            ("phone", json!(null)),
        ]))
        .unwrap();

        assert!(!update.is_empty());
        // serde_json::Map iterates in key order, so clause numbering is stable
        assert_eq!(
            update.set_clauses,
            vec!["email = $1", "name = $2", "phone = $3"]
        );
        assert_eq!(update.params.len(), 3);
    }

    #[test]
    fn test_update_plan_empty_map() {
        let update = EntityUpdate::try_from_fields(&Map::new()).unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn test_update_plan_rejects_unknown_field() {
        let err = EntityUpdate::try_from_fields(&fields(&[("id", json!("forged"))])).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err =
            EntityUpdate::try_from_fields(&fields(&[("is_admin", json!(true))])).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_update_plan_rejects_mistyped_values() {
        let err = EntityUpdate::try_from_fields(&fields(&[("name", json!(42))])).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = EntityUpdate::try_from_fields(&fields(&[("email", json!(null))])).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err =
            EntityUpdate::try_from_fields(&fields(&[("metadata", json!("oops"))])).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_update_plan_accepts_metadata_object() {
        let update = EntityUpdate::try_from_fields(&fields(&[(
            "metadata",
            json!({"company": "Acme", "tier": 2}),
        )]))
        .unwrap();
        assert_eq!(update.set_clauses, vec!["metadata = $1"]);
    }
}
