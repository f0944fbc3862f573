//! Merge coordinator: folds a duplicate entity into a primary entity.
//!
//! The merge is the only writer in this subsystem and always writes
//! through one atomic transaction: field overrides on the primary,
//! document ownership reassignment, category link reconciliation, the
//! audit log insert, and the duplicate delete all commit together or not
//! at all.

use serde_json::{Map, Value as JsonValue};

use crate::context::Context;
use crate::db::{Db, PgTransaction};
use crate::di::FromContext;
use crate::error::AppError;
use crate::models::{Entity, NewMergeLog};
use crate::repositories::{
    CategoryRepository, DocumentRepository, EntityRepository, MergeLogRepository,
};

/// Parameters for merging a duplicate entity into a primary one.
#[derive(Debug, Clone)]
pub struct MergeInput {
    /// Entity that survives the merge.
    pub primary_id: String,
    /// Entity that is deleted by the merge.
    pub duplicate_id: String,
    /// Field overrides applied to the primary entity. May be empty.
    pub merged_fields: Map<String, JsonValue>,
    /// Categories to additionally link to the primary entity. Links the
    /// primary already has are kept; none are removed.
    pub category_ids: Option<Vec<String>>,
    /// Optional operator note recorded in the merge log.
    pub note: Option<String>,
}

/// Service coordinating the transactional entity merge.
#[derive(FromContext, Clone)]
pub struct MergeService {
    db: Db,
    entity_repo: EntityRepository,
}

impl MergeService {
    /// Merge the duplicate entity into the primary entity.
    ///
    /// Preconditions are checked before the transaction opens, in order:
    /// the ids differ, the primary exists, the duplicate exists. The
    /// transactional body then re-verifies both rows under `FOR UPDATE`
    /// locks, so a concurrent merge naming either entity serializes
    /// behind this one and fails with `EntityNotFound` once the duplicate
    /// row is gone.
    ///
    /// Returns the post-merge primary entity. On any failure the whole
    /// transaction rolls back; the duplicate is never deleted partially.
    pub async fn merge(&self, input: MergeInput) -> Result<Entity, AppError> {
        if input.primary_id == input.duplicate_id {
            return Err(AppError::SelfMerge);
        }

        self.entity_repo
            .find_by_id(&input.primary_id)
            .await?
            .ok_or_else(|| AppError::EntityNotFound(format!("primary entity {}", input.primary_id)))?;

        self.entity_repo
            .find_by_id(&input.duplicate_id)
            .await?
            .ok_or_else(|| {
                AppError::EntityNotFound(format!("duplicate entity {}", input.duplicate_id))
            })?;

        // Reject a malformed override map before any transaction opens.
        crate::repositories::validate_merge_fields(&input.merged_fields)?;

        let txn = self.db.begin().await?;
        match Self::merge_in(&txn, &input).await {
            Ok(entity) => {
                txn.commit().await?;
                tracing::info!(
                    primary = %input.primary_id,
                    duplicate = %input.duplicate_id,
                    "merged entities"
                );
                Ok(entity)
            }
            Err(err) => {
                txn.rollback().await?;
                Err(Self::classify_failure(err, &input))
            }
        }
    }

    /// The transactional merge body. Every step runs on the open
    /// transaction; the caller commits or rolls back.
    async fn merge_in(txn: &PgTransaction, input: &MergeInput) -> Result<Entity, AppError> {
        // Lock both rows in deterministic order so two concurrent merges
        // over the same entities cannot deadlock.
        let mut ids = [input.primary_id.as_str(), input.duplicate_id.as_str()];
        ids.sort_unstable();

        let mut locked: [Option<Entity>; 2] = [None, None];
        for (slot, id) in locked.iter_mut().zip(ids) {
            *slot = EntityRepository::find_for_update_in(txn, id).await?;
        }

        let take = |wanted: &str| -> Option<Entity> {
            locked
                .iter()
                .flatten()
                .find(|e| e.id == wanted)
                .cloned()
        };

        let primary = take(&input.primary_id).ok_or_else(|| {
            AppError::EntityNotFound(format!("primary entity {}", input.primary_id))
        })?;
        let duplicate = take(&input.duplicate_id).ok_or_else(|| {
            AppError::EntityNotFound(format!("duplicate entity {}", input.duplicate_id))
        })?;

        let primary_snapshot = serde_json::to_value(&primary)
            .map_err(|e| AppError::Internal(format!("failed to snapshot entity: {}", e)))?;
        let duplicate_snapshot = serde_json::to_value(&duplicate)
            .map_err(|e| AppError::Internal(format!("failed to snapshot entity: {}", e)))?;

        // 1. Apply the override map to the primary and read it back.
        let updated = EntityRepository::update_in(txn, &input.primary_id, &input.merged_fields)
            .await?
            .ok_or_else(|| {
                AppError::EntityNotFound(format!("primary entity {}", input.primary_id))
            })?;

        // 2. Repoint every document owned by the duplicate.
        let reassigned =
            DocumentRepository::reassign_owner_in(txn, &input.duplicate_id, &input.primary_id)
                .await?;
        tracing::debug!(count = reassigned, "reassigned documents");

        // 3. Additively link requested categories to the primary.
        if let Some(category_ids) = &input.category_ids {
            let existing = CategoryRepository::links_for_in(txn, &input.primary_id).await?;
            for category_id in category_ids {
                if !existing.contains(category_id) {
                    CategoryRepository::add_link_in(txn, &input.primary_id, category_id).await?;
                }
            }
        }

        // 4. Drop every category link the duplicate held.
        CategoryRepository::remove_all_links_in(txn, &input.duplicate_id).await?;

        // 5. Record the merge before the duplicate row disappears.
        MergeLogRepository::insert_in(
            txn,
            NewMergeLog {
                primary_entity_id: input.primary_id.clone(),
                duplicate_entity_id: input.duplicate_id.clone(),
                merged_fields: input.merged_fields.clone(),
                primary_snapshot,
                duplicate_snapshot,
                note: input.note.clone(),
            },
        )
        .await?;

        // 6. Delete the duplicate entity.
        EntityRepository::delete_in(txn, &input.duplicate_id).await?;

        Ok(updated)
    }

    /// Map a failed transaction body onto the caller-facing taxonomy.
    ///
    /// Domain errors raised inside the body (a participant vanished under
    /// lock, a bad override value) keep their kind; datastore failures
    /// are logged in full and reported as a generic transaction failure.
    fn classify_failure(err: AppError, input: &MergeInput) -> AppError {
        match err {
            err @ (AppError::EntityNotFound(_)
            | AppError::CategoryNotFound(_)
            | AppError::Validation(_)
            | AppError::SelfMerge) => err,
            other => {
                tracing::error!(
                    primary = %input.primary_id,
                    duplicate = %input.duplicate_id,
                    error = %other,
                    "merge transaction failed, rolled back"
                );
                AppError::Transaction("merge was rolled back".to_string())
            }
        }
    }
}
