//! Language table
//!
//! The meta-pattern, usage instructions, category descriptions and the 36
//! sequences. A copy is embedded in the binary; a JSON or YAML file with the
//! same shape can replace it.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::corpus::{Category, MetaPattern, Sequence, UsageInstructions};
use crate::error::{PatternError, Result};

const BUILTIN_TABLE: &str = include_str!("../../data/language.json");

/// Category text from the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryText {
    pub name: Category,
    pub description: String,
    #[serde(default)]
    pub process: String,
    /// Size range the category works at
    #[serde(default)]
    pub scale: String,
    #[serde(default)]
    pub focus: String,
    #[serde(default)]
    pub purpose: String,
    /// Place of the category within the whole language
    #[serde(default)]
    pub role: String,
}

/// Everything the builder needs besides the pattern pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageTable {
    pub meta_pattern: MetaPattern,
    #[serde(default)]
    pub usage_instructions: UsageInstructions,
    pub categories: Vec<CategoryText>,
    pub sequences: Vec<Sequence>,
}

impl LanguageTable {
    /// The table shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_TABLE)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    /// Load `path` when given, otherwise the builtin table
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let table: LanguageTable = serde_json::from_str(content)?;
        table.normalized()
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let table: LanguageTable = serde_yaml::from_str(content)?;
        table.normalized()
    }

    /// Fill default descriptions and reject duplicate sequence ids
    fn normalized(mut self) -> Result<Self> {
        let mut ids = std::collections::HashSet::new();
        for sequence in &mut self.sequences {
            if !ids.insert(sequence.id) {
                return Err(PatternError::InvalidData(format!(
                    "duplicate sequence id {}",
                    sequence.id
                )));
            }
            if sequence.description.is_empty() {
                sequence.description = Sequence::default_description(sequence.id, &sequence.heading);
            }
            if sequence.emergent_phenomena.is_empty() {
                sequence.emergent_phenomena =
                    format!("Emergent phenomena from {}", sequence.heading.to_lowercase());
            }
        }
        Ok(self)
    }

    /// Description and process text for a category
    pub fn category_text(&self, category: Category) -> Option<&CategoryText> {
        self.categories.iter().find(|c| c.name == category)
    }

    /// Sequences belonging to a category, in table order
    pub fn sequences_in(&self, category: Category) -> impl Iterator<Item = &Sequence> {
        self.sequences.iter().filter(move |s| s.category == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let table = LanguageTable::builtin().unwrap();
        assert_eq!(table.sequences.len(), 36);
        assert_eq!(table.categories.len(), 3);
        assert_eq!(table.meta_pattern.number, 0);
        assert_eq!(table.sequences_in(Category::Towns).count(), 15);
        assert_eq!(table.sequences_in(Category::Buildings).count(), 13);
        assert_eq!(table.sequences_in(Category::Construction).count(), 8);

        let first = &table.sequences[0];
        assert_eq!(first.patterns, vec![1]);
        assert_eq!(first.description, "Sequence 1 focuses on regions instead of countries");
    }

    #[test]
    fn test_builtin_sequences_stay_in_category() {
        let table = LanguageTable::builtin().unwrap();
        for sequence in &table.sequences {
            let range = sequence.category.range();
            assert!(
                sequence.patterns.iter().all(|n| range.contains(n)),
                "sequence {} leaves its category",
                sequence.id
            );
        }
    }

    #[test]
    fn test_yaml_table() {
        let yaml = r#"
meta_pattern:
  name: Pattern Language
categories:
  - name: Towns
    description: Towns and communities
sequences:
  - id: 1
    heading: Regions instead of countries
    category: Towns
    patterns: [1, 2]
"#;
        let table = LanguageTable::from_yaml_str(yaml).unwrap();
        assert_eq!(table.sequences[0].patterns, vec![1, 2]);
        assert_eq!(
            table.sequences[0].emergent_phenomena,
            "Emergent phenomena from regions instead of countries"
        );
        assert!(table.category_text(Category::Buildings).is_none());
    }

    #[test]
    fn test_duplicate_sequence_ids_rejected() {
        let json = r#"{
            "meta_pattern": {"name": "Pattern Language"},
            "categories": [],
            "sequences": [
                {"id": 1, "heading": "A", "category": "Towns", "patterns": [1]},
                {"id": 1, "heading": "B", "category": "Towns", "patterns": [2]}
            ]
        }"#;
        assert!(LanguageTable::from_json_str(json).is_err());
    }
}
