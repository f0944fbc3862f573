//! Seed command handler: loads a small demo dataset.

use color_eyre::Result;
use serde_json::{json, Map};

use crate::di::FromRef;
use crate::models::{NewDocumentRecord, NewEntity};
use crate::repositories::{CategoryRepository, DocumentRepository, EntityRepository};

use super::App;

impl App {
    /// Insert a handful of demo entities, categories, and documents,
    /// including one obvious duplicate pair for `kindred duplicates`.
    pub async fn run_seed(&self) -> Result<()> {
        let ctx = self.context().await?;
        let entities = EntityRepository::from_ref(&ctx);
        let categories = CategoryRepository::from_ref(&ctx);
        let documents = DocumentRepository::from_ref(&ctx);

        let financial = categories
            .create(
                "Financial Services",
                Some("Banking, insurance, and capital markets clients"),
            )
            .await?;
        let consulting = categories
            .create("Consulting", Some("Strategy and advisory clients"))
            .await?;

        let nikolai = entities
            .create(NewEntity {
                name: "Nikolai Romanov".to_string(),
                email: "nikolai@example.com".to_string(),
                phone: Some("+1-202-555-0119".to_string()),
                external_reference: None,
                metadata: object(json!({"company": "Nikolai Holdings"})),
            })
            .await?;

        // Near-duplicate of the entity above: same phone, one-letter name drift
        let nicolai = entities
            .create(NewEntity {
                name: "Nicolai Romanov".to_string(),
                email: "n.romanov@example.com".to_string(),
                phone: Some("+1 (202) 555-0119".to_string()),
                external_reference: Some("legacy-crm-4411".to_string()),
                metadata: Map::new(),
            })
            .await?;

        let ava = entities
            .create(NewEntity {
                name: "Ava Consulting Group".to_string(),
                email: "ops@avaconsulting.io".to_string(),
                phone: Some("+1-415-555-0192".to_string()),
                external_reference: None,
                metadata: object(json!({"website": "https://avaconsulting.io"})),
            })
            .await?;

        categories.add_link(&nikolai.id, &financial.id).await?;
        categories.add_link(&nicolai.id, &financial.id).await?;
        categories.add_link(&ava.id, &consulting.id).await?;

        documents
            .create(NewDocumentRecord {
                entity_id: nikolai.id.clone(),
                template_id: None,
                payload: object(json!({"doc": "welcome letter"})),
            })
            .await?;
        documents
            .create(NewDocumentRecord {
                entity_id: nicolai.id.clone(),
                template_id: None,
                payload: object(json!({"doc": "annual statement"})),
            })
            .await?;

        tracing::info!(
            "Seeded 3 entities ({} / {} are near-duplicates), 2 categories, 2 documents",
            nikolai.id,
            nicolai.id
        );

        Ok(())
    }
}

/// Unwrap a `json!` object literal into a metadata map.
fn object(value: serde_json::Value) -> Map<String, serde_json::Value> {
    value.as_object().cloned().unwrap_or_default()
}
