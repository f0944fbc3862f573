//! Category repository for categories and the entity_categories link table.

use tokio_postgres::Row;

use crate::context::Context;
use crate::db::{Db, SqlExecutor};
use crate::di::FromContext;
use crate::error::AppError;
use crate::models::{generate_ulid, Category};

const CATEGORY_COLUMNS: &str = "id, name, description, created_at, updated_at";

/// Repository for category CRUD and entity-category links.
#[derive(FromContext, Clone)]
pub struct CategoryRepository {
    db: Db,
}

impl CategoryRepository {
    /// Create a new category.
    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category, AppError> {
        let id = generate_ulid();

        let row = self
            .db
            .query_opt(
                &format!(
                    "INSERT INTO categories (id, name, description)
                     VALUES ($1, $2, $3)
                     RETURNING {CATEGORY_COLUMNS}"
                ),
                &[&id, &name, &description],
            )
            .await?
            .ok_or_else(|| AppError::Internal("INSERT .. RETURNING produced no row".into()))?;

        Self::row_to_category(&row)
    }

    /// Find a category by ID.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Category>, AppError> {
        let row = self
            .db
            .query_opt(
                &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"),
                &[&id],
            )
            .await?;

        row.as_ref().map(Self::row_to_category).transpose()
    }

    /// List all categories by name.
    pub async fn list(&self) -> Result<Vec<Category>, AppError> {
        let rows = self
            .db
            .query(
                &format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name"),
                &[],
            )
            .await?;

        rows.iter().map(Self::row_to_category).collect()
    }

    /// Category IDs currently linked to an entity.
    pub async fn links_for(&self, entity_id: &str) -> Result<Vec<String>, AppError> {
        Self::links_for_in(&self.db, entity_id).await
    }

    /// Link an entity to a category. A link that already exists is a
    /// no-op, not an error.
    pub async fn add_link(&self, entity_id: &str, category_id: &str) -> Result<(), AppError> {
        Self::add_link_in(&self.db, entity_id, category_id).await
    }

    /// Remove a single entity-category link.
    pub async fn remove_link(&self, entity_id: &str, category_id: &str) -> Result<(), AppError> {
        self.db
            .execute(
                "DELETE FROM entity_categories WHERE entity_id = $1 AND category_id = $2",
                &[&entity_id, &category_id],
            )
            .await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Executor-scoped operations (shared with the merge transaction)
    // ------------------------------------------------------------------

    /// Category IDs linked to an entity, on the given executor.
    pub async fn links_for_in(
        db: &dyn SqlExecutor,
        entity_id: &str,
    ) -> Result<Vec<String>, AppError> {
        let rows = db
            .query(
                "SELECT category_id FROM entity_categories WHERE entity_id = $1",
                &[&entity_id],
            )
            .await?;

        rows.iter()
            .map(|row| row.try_get("category_id").map_err(AppError::from))
            .collect()
    }

    /// Idempotent link insert on the given executor.
    pub async fn add_link_in(
        db: &dyn SqlExecutor,
        entity_id: &str,
        category_id: &str,
    ) -> Result<(), AppError> {
        db.execute(
            "INSERT INTO entity_categories (entity_id, category_id)
             VALUES ($1, $2)
             ON CONFLICT (entity_id, category_id) DO NOTHING",
            &[&entity_id, &category_id],
        )
        .await?;
        Ok(())
    }

    /// Remove every link belonging to an entity. Returns the rows deleted.
    pub async fn remove_all_links_in(
        db: &dyn SqlExecutor,
        entity_id: &str,
    ) -> Result<u64, AppError> {
        db.execute(
            "DELETE FROM entity_categories WHERE entity_id = $1",
            &[&entity_id],
        )
        .await
    }

    /// Convert a row to a Category.
    fn row_to_category(row: &Row) -> Result<Category, AppError> {
        Ok(Category {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
