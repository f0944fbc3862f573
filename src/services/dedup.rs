//! Duplicate finder: ranks candidate duplicate pairs by composite score.
//!
//! Read-only. Every query fetches a fresh snapshot of all entities and
//! scores pairs in memory; nothing is cached or persisted. The pairing
//! pass is O(n²) in the number of entities, which is acceptable at
//! operational CRM scale but is the scaling limit of this design.

use std::sync::Arc;

use crate::config::Config;
use crate::context::Context;
use crate::di::FromContext;
use crate::error::AppError;
use crate::models::{DuplicatePair, Entity};
use crate::repositories::EntityRepository;
use crate::services::{Page, PageRequest};
use crate::similarity::score_pair;

/// Service for finding candidate duplicate entities.
#[derive(FromContext, Clone)]
pub struct DedupService {
    entity_repo: EntityRepository,
    config: Arc<Config>,
}

impl DedupService {
    /// Rank every entity pair scoring at or above the threshold.
    ///
    /// Pairs are unordered: each pair appears once, in descending score
    /// order, ties broken by enumeration order over the snapshot.
    pub async fn find_all(
        &self,
        threshold: Option<f64>,
        page: PageRequest,
    ) -> Result<Page<DuplicatePair>, AppError> {
        let threshold = self.resolve_threshold(threshold)?;
        page.validate()?;

        let entities = self.entity_repo.list_all().await?;
        let pairs = rank_pairs(&entities, threshold, None);

        tracing::debug!(
            entities = entities.len(),
            candidates = pairs.len(),
            threshold,
            "scored duplicate pairs"
        );

        Ok(Page::slice(pairs, page))
    }

    /// Rank duplicates of one entity against every other entity.
    ///
    /// Fails with `EntityNotFound` if the entity does not exist. The
    /// target entity is always `entity_a` of each returned pair.
    pub async fn find_for_entity(
        &self,
        entity_id: &str,
        threshold: Option<f64>,
        page: PageRequest,
    ) -> Result<Page<DuplicatePair>, AppError> {
        let threshold = self.resolve_threshold(threshold)?;
        page.validate()?;

        let entities = self.entity_repo.list_all().await?;
        if !entities.iter().any(|e| e.id == entity_id) {
            return Err(AppError::EntityNotFound(entity_id.to_string()));
        }

        let pairs = rank_pairs(&entities, threshold, Some(entity_id));
        Ok(Page::slice(pairs, page))
    }

    /// Resolve the effective threshold, defaulting from config.
    fn resolve_threshold(&self, threshold: Option<f64>) -> Result<f64, AppError> {
        let threshold = threshold.unwrap_or(self.config.dedup.threshold);
        if !(0.0..=1.0).contains(&threshold) || threshold.is_nan() {
            return Err(AppError::Validation(format!(
                "threshold must be between 0 and 1, got {}",
                threshold
            )));
        }
        Ok(threshold)
    }
}

/// Score every unordered entity pair and rank the candidates.
///
/// With `focus` set, only pairs containing that entity are scored, and
/// the focused entity is normalized into the `entity_a` slot. The sort
/// is stable, so equal scores keep their enumeration order.
fn rank_pairs(entities: &[Entity], threshold: f64, focus: Option<&str>) -> Vec<DuplicatePair> {
    let mut pairs = Vec::new();

    for (i, a) in entities.iter().enumerate() {
        for b in &entities[i + 1..] {
            let pair = match focus {
                None => score_pair(a, b),
                Some(id) if a.id == id => score_pair(a, b),
                Some(id) if b.id == id => score_pair(b, a),
                Some(_) => continue,
            };

            if pair.composite_score >= threshold {
                pairs.push(pair);
            }
        }
    }

    pairs.sort_by(|x, y| y.composite_score.total_cmp(&x.composite_score));
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::Map;

    fn entity(id: &str, name: &str, email: &str, phone: Option<&str>) -> Entity {
        Entity {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.map(str::to_string),
            external_reference: None,
            metadata: Map::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_entities() -> Vec<Entity> {
        vec![
            entity("e1", "John Doe", "john@example.com", Some("+1-555-0123")),
            entity("e2", "Jon Doe", "john@example.com", Some("+1 (555) 0123")),
            entity("e3", "Acme Corp", "sales@acme.test", None),
            entity("e4", "Acme Corporation", "sales@acme.test", None),
            entity("e5", "Zorp Ltd", "zorp@zorp.test", None),
        ]
    }

    #[test]
    fn test_rank_pairs_sorted_descending() {
        let pairs = rank_pairs(&sample_entities(), 0.3, None);
        assert!(!pairs.is_empty());
        for window in pairs.windows(2) {
            assert!(window[0].composite_score >= window[1].composite_score);
        }
    }

    #[test]
    fn test_rank_pairs_respects_threshold() {
        let pairs = rank_pairs(&sample_entities(), 0.7, None);
        assert!(pairs.iter().all(|p| p.composite_score >= 0.7));
    }

    #[test]
    fn test_rank_pairs_no_self_and_no_duplicates() {
        let pairs = rank_pairs(&sample_entities(), 0.0, None);

        // C(5, 2) unordered pairs, each exactly once
        assert_eq!(pairs.len(), 10);
        for pair in &pairs {
            assert_ne!(pair.entity_a.id, pair.entity_b.id);
        }

        let mut keys: Vec<(String, String)> = pairs
            .iter()
            .map(|p| {
                let (a, b) = (p.entity_a.id.clone(), p.entity_b.id.clone());
                if a < b { (a, b) } else { (b, a) }
            })
            .collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 10);
    }

    #[test]
    fn test_rank_pairs_focus_restricts_and_normalizes() {
        let pairs = rank_pairs(&sample_entities(), 0.0, Some("e2"));

        assert_eq!(pairs.len(), 4);
        for pair in &pairs {
            assert_eq!(pair.entity_a.id, "e2");
            assert_ne!(pair.entity_b.id, "e2");
        }
    }

    #[test]
    fn test_rank_pairs_stable_ties_keep_enumeration_order() {
        // Two disjoint clusters with identical internal scores
        let entities = vec![
            entity("a1", "Aaa", "a@x.test", None),
            entity("a2", "Aaa", "a@x.test", None),
            entity("b1", "Bbb", "b@x.test", None),
            entity("b2", "Bbb", "b@x.test", None),
        ];

        let pairs = rank_pairs(&entities, 0.7, None);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].composite_score, pairs[1].composite_score);
        // (a1, a2) enumerates before (b1, b2)
        assert_eq!(pairs[0].entity_a.id, "a1");
        assert_eq!(pairs[1].entity_a.id, "b1");
    }

    #[test]
    fn test_exact_duplicate_tops_ranking() {
        let pairs = rank_pairs(&sample_entities(), 0.5, None);
        // e1/e2 share email and normalized phone and have near-equal names
        let top = &pairs[0];
        assert_eq!(top.entity_a.id, "e1");
        assert_eq!(top.entity_b.id, "e2");
        assert!(top.email_match);
        assert!(top.phone_match);
        assert!(top.composite_score > 0.9);
    }
}
