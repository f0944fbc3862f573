//! Duplicates command handler.

use color_eyre::Result;

use crate::di::FromRef;
use crate::services::{DedupService, PageRequest};

use super::App;

impl App {
    /// Rank candidate duplicate pairs and print them.
    pub async fn run_duplicates(
        &self,
        threshold: Option<f64>,
        entity: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<()> {
        let ctx = self.context().await?;
        let dedup = DedupService::from_ref(&ctx);
        let page_request = PageRequest { limit, offset };

        let page = match entity {
            Some(entity_id) => {
                dedup
                    .find_for_entity(entity_id, threshold, page_request)
                    .await?
            }
            None => dedup.find_all(threshold, page_request).await?,
        };

        if page.data.is_empty() {
            println!("No candidate duplicates found.");
            return Ok(());
        }

        println!(
            "{} candidate pair(s), showing {} (offset {}):",
            page.total,
            page.data.len(),
            offset
        );
        for pair in &page.data {
            let mut signals = Vec::new();
            if pair.email_match {
                signals.push("email");
            }
            if pair.phone_match {
                signals.push("phone");
            }
            println!(
                "  {:.3}  {} <{}>  ~  {} <{}>  [name {:.2}{}{}]",
                pair.composite_score,
                pair.entity_a.name,
                pair.entity_a.id,
                pair.entity_b.name,
                pair.entity_b.id,
                pair.name_similarity,
                if signals.is_empty() { "" } else { ", " },
                signals.join("+"),
            );
        }

        Ok(())
    }
}
