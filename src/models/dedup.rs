//! Candidate duplicate pair produced by the duplicate finder.

use serde::Serialize;

use super::Entity;

/// A scored pair of entities suspected to be duplicates.
///
/// Computed on every query and never persisted; the composite score is a
/// weighted sum of name similarity (0.40), email match (0.35), and phone
/// match (0.25).
#[derive(Debug, Clone, Serialize)]
pub struct DuplicatePair {
    pub entity_a: Entity,
    pub entity_b: Entity,
    /// Case-insensitive edit-distance similarity of the two names, in [0, 1].
    pub name_similarity: f64,
    /// Whether the emails match case-insensitively.
    pub email_match: bool,
    /// Whether both phones normalize to the same non-empty digit string.
    pub phone_match: bool,
    /// Weighted composite score, in [0, 1].
    pub composite_score: f64,
}
