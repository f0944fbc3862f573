//! Merge command handler.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::{Map, Value as JsonValue};

use crate::di::FromRef;
use crate::services::{MergeInput, MergeService};

use super::App;

impl App {
    /// Merge a duplicate entity into a primary entity.
    pub async fn run_merge(
        &self,
        primary: &str,
        duplicate: &str,
        set: &[String],
        categories: &[String],
        note: Option<&str>,
    ) -> Result<()> {
        let merged_fields = parse_field_overrides(set)?;

        let ctx = self.context().await?;
        let merge = MergeService::from_ref(&ctx);

        let entity = merge
            .merge(MergeInput {
                primary_id: primary.to_string(),
                duplicate_id: duplicate.to_string(),
                merged_fields,
                category_ids: if categories.is_empty() {
                    None
                } else {
                    Some(categories.to_vec())
                },
                note: note.map(str::to_string),
            })
            .await?;

        println!("Merged {} into {}:", duplicate, primary);
        println!("{}", serde_json::to_string_pretty(&entity)?);

        Ok(())
    }
}

/// Parse `field=value` overrides; values are JSON when they parse as
/// JSON, otherwise plain strings.
fn parse_field_overrides(set: &[String]) -> Result<Map<String, JsonValue>> {
    let mut fields = Map::new();
    for pair in set {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| eyre!("expected FIELD=VALUE, got '{}'", pair))?;
        let value = serde_json::from_str(value)
            .unwrap_or_else(|_| JsonValue::String(value.to_string()));
        fields.insert(key.to_string(), value);
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field_overrides() {
        let fields = parse_field_overrides(&[
            "name=Acme Corp".to_string(),
            "phone=null".to_string(),
            r#"metadata={"tier": 2}"#.to_string(),
        ])
        .unwrap();

        assert_eq!(fields["name"], JsonValue::String("Acme Corp".to_string()));
        assert_eq!(fields["phone"], JsonValue::Null);
        assert!(fields["metadata"].is_object());
    }

    #[test]
    fn test_parse_field_overrides_rejects_bare_value() {
        assert!(parse_field_overrides(&["nonsense".to_string()]).is_err());
    }
}
