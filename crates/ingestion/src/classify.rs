//! Source-identity classification via ordered keyword rules.

use std::collections::HashMap;

use serde::Deserialize;

use geo_common::{CatalogError, CatalogResult};

/// One substring rule: if `keyword` occurs in the lowercased source
/// identity, the dataset belongs to `category`.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRule {
    pub keyword: String,
    pub category: String,
}

/// Maps a source identity to a category by the first matching rule.
///
/// The rule list is an explicit ordered sequence; order it
/// most-specific-first, because the first match wins. Identities matching
/// no rule fall into the default category.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<CategoryRule>,
    default_category: String,
}

/// On-disk rules file shape.
#[derive(Debug, Deserialize)]
struct RulesFile {
    #[serde(default)]
    default: Option<String>,
    rules: Vec<CategoryRule>,
}

impl Classifier {
    /// Build a classifier from an ordered rule list and the stock default
    /// category.
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        Self {
            rules,
            default_category: "Other".to_string(),
        }
    }

    /// Parse a YAML rules file. Rules keep file order.
    pub fn from_yaml(text: &str) -> CatalogResult<Self> {
        let file: RulesFile = serde_yaml::from_str(text).map_err(|e| {
            CatalogError::ConfigurationError(format!("Invalid category rules: {}", e))
        })?;

        let mut classifier = Self::new(file.rules);
        if let Some(default) = file.default {
            classifier.default_category = default;
        }
        Ok(classifier)
    }

    /// The compiled-in rule set.
    pub fn default_rules() -> Vec<CategoryRule> {
        let rule = |keyword: &str, category: &str| CategoryRule {
            keyword: keyword.to_string(),
            category: category.to_string(),
        };
        vec![
            rule("dem", "Digital Elevation Model"),
            rule("slope", "Slope Analysis"),
            rule("satellite", "Satellite Imagery"),
        ]
    }

    /// Name of the fallback category.
    pub fn default_category(&self) -> &str {
        &self.default_category
    }

    /// Pure classification: first rule whose keyword occurs in the
    /// lowercased identity wins; unmatched identities get the default
    /// category. `None` only when the mapped name is absent from the
    /// category table, which is a configuration problem, not a data one.
    pub fn classify(
        &self,
        source_identity: &str,
        categories: &HashMap<String, i32>,
    ) -> Option<i32> {
        let lowered = source_identity.to_lowercase();

        let name = self
            .rules
            .iter()
            .find(|rule| lowered.contains(&rule.keyword.to_lowercase()))
            .map(|rule| rule.category.as_str())
            .unwrap_or(&self.default_category);

        categories.get(name).copied()
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Self::default_rules())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category_table() -> HashMap<String, i32> {
        [
            ("Digital Elevation Model", 1),
            ("Slope Analysis", 2),
            ("Satellite Imagery", 3),
            ("Other", 4),
        ]
        .into_iter()
        .map(|(name, id)| (name.to_string(), id))
        .collect()
    }

    #[test]
    fn test_keyword_match() {
        let classifier = Classifier::default();
        let table = category_table();
        assert_eq!(classifier.classify("/data/dem/tile1.tif", &table), Some(1));
        assert_eq!(classifier.classify("/data/SLOPE/x.tif", &table), Some(2));
        assert_eq!(
            classifier.classify("drive/Satellite Imagery/scene.tif", &table),
            Some(3)
        );
    }

    #[test]
    fn test_unmatched_falls_back_to_default() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.classify("/data/unknown/x.tif", &category_table()),
            Some(4)
        );
    }

    #[test]
    fn test_first_match_wins() {
        let classifier = Classifier::new(vec![
            CategoryRule {
                keyword: "dem".to_string(),
                category: "Digital Elevation Model".to_string(),
            },
            CategoryRule {
                keyword: "slope".to_string(),
                category: "Slope Analysis".to_string(),
            },
        ]);
        // Identity matches both rules; the earlier one decides
        assert_eq!(
            classifier.classify("/data/dem/slope_tile.tif", &category_table()),
            Some(1)
        );
    }

    #[test]
    fn test_deterministic() {
        let classifier = Classifier::default();
        let table = category_table();
        let first = classifier.classify("/data/dem/tile1.tif", &table);
        for _ in 0..10 {
            assert_eq!(classifier.classify("/data/dem/tile1.tif", &table), first);
        }
    }

    #[test]
    fn test_missing_default_category_is_none() {
        let classifier = Classifier::default();
        let mut table = category_table();
        table.remove("Other");
        assert_eq!(classifier.classify("/data/unknown/x.tif", &table), None);
    }

    #[test]
    fn test_yaml_rules_keep_file_order() {
        let yaml = r#"
default: Other
rules:
  - keyword: hillshade
    category: Slope Analysis
  - keyword: dem
    category: Digital Elevation Model
"#;
        let classifier = Classifier::from_yaml(yaml).unwrap();
        // "hillshade" appears before "dem" in the file, so it wins on a
        // path containing both
        assert_eq!(
            classifier.classify("/data/dem/hillshade.tif", &category_table()),
            Some(2)
        );
    }

    #[test]
    fn test_invalid_yaml_is_configuration_error() {
        let err = Classifier::from_yaml("rules: [not a rule]").unwrap_err();
        assert!(matches!(err, CatalogError::ConfigurationError(_)));
    }
}
