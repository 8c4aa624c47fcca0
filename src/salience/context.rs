//! Query context and score types

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// What the caller is currently working on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternContext {
    /// Pattern ids in focus (`apl12`)
    #[serde(default)]
    pub focus_patterns: BTreeSet<String>,
    /// Category name, matched case-insensitively
    #[serde(default)]
    pub current_category: Option<String>,
    #[serde(default)]
    pub current_sequence: Option<String>,
    /// Free-text keywords, matched case-insensitively against pattern words
    #[serde(default)]
    pub keywords: BTreeSet<String>,
    /// physical, social, conceptual or individual
    #[serde(default)]
    pub domain: Option<String>,
    /// town, building or construction
    #[serde(default)]
    pub scale: Option<String>,
}

impl PatternContext {
    pub fn with_focus<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.focus_patterns.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.current_category = Some(category.into());
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords.extend(keywords.into_iter().map(Into::into));
        self
    }

    /// Keywords lowercased for comparison with extracted pattern words
    pub(crate) fn normalized_keywords(&self) -> BTreeSet<String> {
        self.keywords.iter().map(|k| k.trim().to_lowercase()).collect()
    }
}

/// Relevance of one pattern in a context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalienceScore {
    pub pattern_id: String,
    pub score: f64,
    /// Human-readable contributions, in scoring order
    pub reasons: Vec<String>,
}

impl SalienceScore {
    pub fn new(pattern_id: impl Into<String>, score: f64, reasons: Vec<String>) -> Self {
        Self {
            pattern_id: pattern_id.into(),
            score,
            reasons,
        }
    }
}
