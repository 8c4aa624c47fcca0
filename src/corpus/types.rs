//! Corpus Types
//!
//! Data structures matching the generated JSON files
//! (`pattern_language_generated.json`, `pattern_sequences.json`,
//! `category_<name>.json`). Records are validated once when loaded so the
//! rest of the crate can rely on typed fields instead of defensive lookups.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::ops::RangeInclusive;
use std::path::Path;
use std::str::FromStr;

use crate::error::{PatternError, Result};

/// Number of patterns in the language
pub const PATTERN_COUNT: u16 = 253;

/// Highest confidence level (two asterisks: a true invariant)
pub const MAX_ASTERISKS: u8 = 2;

/// Scale-based grouping of patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Towns,
    Buildings,
    Construction,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Towns, Category::Buildings, Category::Construction];

    /// Pattern numbers belonging to this category
    pub fn range(&self) -> RangeInclusive<u16> {
        match self {
            Category::Towns => 1..=94,
            Category::Buildings => 95..=204,
            Category::Construction => 205..=PATTERN_COUNT,
        }
    }

    pub fn pattern_range(&self) -> PatternRange {
        let range = self.range();
        PatternRange {
            start: *range.start(),
            end: *range.end(),
        }
    }

    /// Classify a pattern number, `None` outside 1..=253
    pub fn for_number(number: u16) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|category| category.range().contains(&number))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Towns => "Towns",
            Category::Buildings => "Buildings",
            Category::Construction => "Construction",
        }
    }

    /// File name of the per-category JSON output
    pub fn file_name(&self) -> String {
        format!("category_{}.json", self.as_str().to_lowercase())
    }
}

impl FromStr for Category {
    type Err = PatternError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "towns" | "town" => Ok(Category::Towns),
            "buildings" | "building" => Ok(Category::Buildings),
            "construction" => Ok(Category::Construction),
            _ => Err(PatternError::UnknownCategory(s.to_string())),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed range of pattern numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRange {
    pub start: u16,
    pub end: u16,
}

impl PatternRange {
    pub fn contains(&self, number: u16) -> bool {
        (self.start..=self.end).contains(&number)
    }
}

/// One problem/solution design unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    /// Stable identifier (`apl<number>`); numeric ids are accepted on load
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    /// Ordinal position, 1..=253
    pub number: u16,
    /// Title, uppercase by convention
    pub name: String,
    /// Explicit category; derived from `number` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Author's confidence that the pattern is a true invariant (0-2)
    #[serde(default, alias = "confidence")]
    pub asterisks: u8,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub context: String,
    #[serde(default)]
    pub problem: String,
    #[serde(default)]
    pub solution: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub discussion: String,
    #[serde(default)]
    pub preceding_patterns: Vec<u16>,
    #[serde(default)]
    pub following_patterns: Vec<u16>,
}

impl Pattern {
    pub fn new(number: u16, name: impl Into<String>) -> Self {
        Self {
            id: Self::id_for(number),
            number,
            name: name.into(),
            category: None,
            asterisks: 0,
            context: String::new(),
            problem: String::new(),
            solution: String::new(),
            discussion: String::new(),
            preceding_patterns: vec![],
            following_patterns: vec![],
        }
    }

    /// Identifier used for a pattern number
    pub fn id_for(number: u16) -> String {
        format!("apl{}", number)
    }

    /// Explicit category, falling back to the number range
    pub fn category(&self) -> Option<Category> {
        self.category.or_else(|| Category::for_number(self.number))
    }

    /// Whether `number` is a direct neighbour in either direction
    pub fn is_connected_to(&self, number: u16) -> bool {
        self.following_patterns.contains(&number) || self.preceding_patterns.contains(&number)
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => format!("apl{}", n),
    })
}

/// Author-defined ordered grouping of patterns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    pub id: u16,
    pub heading: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    pub patterns: Vec<u16>,
    #[serde(default)]
    pub emergent_phenomena: String,
}

impl Sequence {
    /// Description used when the table does not provide one
    pub fn default_description(id: u16, heading: &str) -> String {
        format!("Sequence {} focuses on {}", id, heading.to_lowercase())
    }
}

/// Category with its sequences (`category_<name>.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub name: Category,
    pub description: String,
    #[serde(default)]
    pub process: String,
    pub pattern_range: PatternRange,
    #[serde(default)]
    pub sequences: Vec<Sequence>,
}

/// Pattern 0: the language itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaPattern {
    #[serde(default)]
    pub number: u16,
    pub name: String,
    #[serde(default)]
    pub asterisks: u8,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub problem_summary: String,
    #[serde(default)]
    pub problem_details: String,
    #[serde(default)]
    pub solution: String,
    #[serde(default)]
    pub diagram: String,
    #[serde(default)]
    pub connections: String,
    #[serde(default)]
    pub preceding_patterns: Vec<u16>,
    #[serde(default)]
    pub following_patterns: Vec<u16>,
}

/// Meaning of each asterisk level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternHierarchies {
    pub two_asterisks: String,
    pub one_asterisk: String,
    pub no_asterisks: String,
}

/// How a reader is meant to work with the language
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageInstructions {
    #[serde(default)]
    pub how_to_use: Vec<String>,
    #[serde(default)]
    pub choosing_language: Vec<String>,
    #[serde(default)]
    pub pattern_hierarchies: PatternHierarchies,
}

/// `pattern_sequences.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequencesFile {
    pub sequences: Vec<Sequence>,
}

/// Complete generated document (`pattern_language_generated.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternLanguage {
    pub meta_pattern: MetaPattern,
    pub categories: Vec<CategoryEntry>,
    pub sequences: Vec<Sequence>,
    #[serde(default)]
    pub patterns: Vec<Pattern>,
    #[serde(default)]
    pub usage_instructions: UsageInstructions,
}

impl PatternLanguage {
    /// Load, normalize and validate a generated document
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut language: PatternLanguage = serde_json::from_reader(reader)?;
        language.normalize();
        language.validate()?;
        Ok(language)
    }

    /// Parse from a JSON string (same checks as `from_json`)
    pub fn from_json_str(content: &str) -> Result<Self> {
        let mut language: PatternLanguage = serde_json::from_str(content)?;
        language.normalize();
        language.validate()?;
        Ok(language)
    }

    /// Write as pretty JSON, replacing the file wholesale
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_pretty_json(path, self)
    }

    /// Fill identifiers that were left out of the source file
    fn normalize(&mut self) {
        for pattern in &mut self.patterns {
            if pattern.id.is_empty() {
                pattern.id = Pattern::id_for(pattern.number);
            }
        }
    }

    /// Enforce the record invariants: numbers in 1..=253 and unique,
    /// ids unique, asterisks at most 2
    pub fn validate(&self) -> Result<()> {
        let mut numbers = HashSet::new();
        let mut ids = HashSet::new();

        for pattern in &self.patterns {
            if !(1..=PATTERN_COUNT).contains(&pattern.number) {
                return Err(PatternError::NumberOutOfRange(pattern.number as u32));
            }
            if pattern.asterisks > MAX_ASTERISKS {
                return Err(PatternError::InvalidData(format!(
                    "pattern {} has {} asterisks",
                    pattern.id, pattern.asterisks
                )));
            }
            if !numbers.insert(pattern.number) {
                return Err(PatternError::InvalidData(format!(
                    "duplicate pattern number {}",
                    pattern.number
                )));
            }
            if !ids.insert(pattern.id.as_str()) {
                return Err(PatternError::InvalidData(format!(
                    "duplicate pattern id {}",
                    pattern.id
                )));
            }
        }

        Ok(())
    }

    /// Look up a pattern by id
    pub fn find(&self, id: &str) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.id == id)
    }

    pub fn find_by_number(&self, number: u16) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.number == number)
    }

    pub fn category(&self, name: Category) -> Option<&CategoryEntry> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn sequence(&self, id: u16) -> Option<&Sequence> {
        self.sequences.iter().find(|s| s.id == id)
    }

    /// Sequences that contain a pattern number
    pub fn sequences_containing(&self, number: u16) -> Vec<&Sequence> {
        self.sequences
            .iter()
            .filter(|s| s.patterns.contains(&number))
            .collect()
    }
}

/// Serialize any value as pretty JSON with a trailing newline
pub fn write_pretty_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
