//! Salience engine
//!
//! Holds the loaded corpus and per-pattern features computed once at
//! construction. Scoring is a plain weighted sum:
//!
//! | contribution                          | weight            |
//! |---------------------------------------|-------------------|
//! | pattern is in the focus set           | +10               |
//! | category matches the context          | +5                |
//! | shared keyword                        | +2 each           |
//! | follows / precedes a focus pattern    | +3 / +2 per focus |
//! | centrality                            | ×0.5              |
//! | asterisks                             | ×1.5              |

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::context::{PatternContext, SalienceScore};
use crate::corpus::{Category, Pattern, PatternLanguage, PATTERN_COUNT};
use crate::error::Result;

/// Words of four or more characters
static KEYWORD_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w{4,}\b").unwrap());

/// Label used for patterns without a category
pub const UNKNOWN_CATEGORY: &str = "Unknown";

const FOCUS_WEIGHT: f64 = 10.0;
const CATEGORY_WEIGHT: f64 = 5.0;
const KEYWORD_WEIGHT: f64 = 2.0;
const FOLLOWS_FOCUS_WEIGHT: f64 = 3.0;
const PRECEDES_FOCUS_WEIGHT: f64 = 2.0;
const CENTRALITY_WEIGHT: f64 = 0.5;
const ASTERISK_WEIGHT: f64 = 1.5;
const MAX_CENTRALITY: f64 = 5.0;

/// Precomputed scoring inputs for one pattern
#[derive(Debug, Clone, PartialEq)]
pub struct PatternFeatures {
    pub keywords: HashSet<String>,
    pub centrality: f64,
    pub category: Option<Category>,
}

impl PatternFeatures {
    fn from_pattern(pattern: &Pattern) -> Self {
        Self {
            keywords: extract_keywords(pattern),
            centrality: centrality(pattern),
            category: pattern.category(),
        }
    }

    pub fn category_name(&self) -> &'static str {
        self.category.map(|c| c.as_str()).unwrap_or(UNKNOWN_CATEGORY)
    }
}

/// Lowercased 4+ character words from name, problem and solution
pub fn extract_keywords(pattern: &Pattern) -> HashSet<String> {
    let text = format!("{} {} {}", pattern.problem, pattern.solution, pattern.name).to_lowercase();
    KEYWORD_PATTERN
        .find_iter(&text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Degree, confidence and position in the language, capped at 5.0
pub fn centrality(pattern: &Pattern) -> f64 {
    let degree = (pattern.preceding_patterns.len() + pattern.following_patterns.len()) as f64;
    let position = (PATTERN_COUNT as f64 - pattern.number as f64) / PATTERN_COUNT as f64;
    let value = degree / 10.0 + pattern.asterisks as f64 * 0.5 + position;
    value.min(MAX_CENTRALITY)
}

/// Read-only scoring engine over a loaded corpus
#[derive(Debug, Clone)]
pub struct SalienceEngine {
    patterns: Vec<Pattern>,
    features: Vec<PatternFeatures>,
    index: HashMap<String, usize>,
}

impl SalienceEngine {
    /// Build the engine; later duplicates of an id are ignored
    pub fn new(patterns: Vec<Pattern>) -> Self {
        let mut index = HashMap::with_capacity(patterns.len());
        let mut kept = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            if !index.contains_key(&pattern.id) {
                index.insert(pattern.id.clone(), kept.len());
                kept.push(pattern);
            }
        }

        let features = kept.iter().map(PatternFeatures::from_pattern).collect();
        debug!(patterns = kept.len(), "computed pattern features");

        Self {
            patterns: kept,
            features,
            index,
        }
    }

    /// Load a generated language document
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let language = PatternLanguage::from_json(path)?;
        Ok(Self::new(language.patterns))
    }

    /// Patterns in load order
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Pattern> {
        self.index.get(id).map(|&i| &self.patterns[i])
    }

    pub fn features(&self, id: &str) -> Option<&PatternFeatures> {
        self.index.get(id).map(|&i| &self.features[i])
    }

    pub(crate) fn entry(&self, id: &str) -> Option<(&Pattern, &PatternFeatures)> {
        self.index
            .get(id)
            .map(|&i| (&self.patterns[i], &self.features[i]))
    }

    /// Category label of a pattern, `Unknown` when absent or not loaded
    pub fn category_name(&self, id: &str) -> &'static str {
        self.features(id)
            .map(|f| f.category_name())
            .unwrap_or(UNKNOWN_CATEGORY)
    }

    /// Patterns per category label, sorted by label
    pub fn category_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for features in &self.features {
            *counts.entry(features.category_name()).or_insert(0) += 1;
        }
        counts
    }

    /// Score one pattern against a context
    pub fn compute_salience(&self, pattern_id: &str, context: &PatternContext) -> SalienceScore {
        let Some((pattern, features)) = self.entry(pattern_id) else {
            return SalienceScore::new(pattern_id, 0.0, vec!["Pattern not found".to_string()]);
        };

        let mut score = 0.0;
        let mut reasons = Vec::new();

        if context.focus_patterns.contains(pattern_id) {
            score += FOCUS_WEIGHT;
            reasons.push("In focus set".to_string());
        }

        if let Some(category) = &context.current_category {
            if features.category_name().eq_ignore_ascii_case(category.trim()) {
                score += CATEGORY_WEIGHT;
                reasons.push(format!("Matches category: {}", category));
            }
        }

        let keywords = context.normalized_keywords();
        if !keywords.is_empty() {
            let overlap = keywords
                .iter()
                .filter(|k| features.keywords.contains(k.as_str()))
                .count();
            if overlap > 0 {
                score += overlap as f64 * KEYWORD_WEIGHT;
                reasons.push(format!("Keyword overlap: {} matches", overlap));
            }
        }

        for focus_id in &context.focus_patterns {
            let Some(focus) = self.get(focus_id) else {
                continue;
            };
            if focus.following_patterns.contains(&pattern.number) {
                score += FOLLOWS_FOCUS_WEIGHT;
                reasons.push(format!("Follows focus pattern {}", focus_id));
            }
            if focus.preceding_patterns.contains(&pattern.number) {
                score += PRECEDES_FOCUS_WEIGHT;
                reasons.push(format!("Precedes focus pattern {}", focus_id));
            }
        }

        let centrality_boost = features.centrality * CENTRALITY_WEIGHT;
        score += centrality_boost;
        if centrality_boost > 1.0 {
            reasons.push(format!("High centrality: {:.2}", features.centrality));
        }

        let importance_boost = pattern.asterisks as f64 * ASTERISK_WEIGHT;
        score += importance_boost;
        if importance_boost > 0.0 {
            reasons.push(format!("Importance: {} asterisks", pattern.asterisks));
        }

        SalienceScore::new(pattern_id, score, reasons)
    }

    /// Score every pattern, drop non-positive scores and return the top
    /// `limit` by descending score. Ties keep corpus order.
    pub fn rank_patterns_by_salience(
        &self,
        context: &PatternContext,
        limit: usize,
    ) -> Vec<SalienceScore> {
        let mut scores: Vec<SalienceScore> = self
            .patterns
            .iter()
            .map(|p| self.compute_salience(&p.id, context))
            .filter(|s| s.score > 0.0)
            .collect();

        scores.sort_by(|a, b| b.score.total_cmp(&a.score));
        scores.truncate(limit);
        scores
    }

    /// Similarity of two patterns in 0.0..=1.0.
    ///
    /// +0.3 for the same category, up to +0.4 for shared keywords (0.1 each)
    /// and +0.3 when `second` is a direct neighbour of `first`. Unknown ids
    /// score 0.
    pub fn pattern_similarity(&self, first: &str, second: &str) -> f64 {
        let (Some((p1, f1)), Some((p2, f2))) = (self.entry(first), self.entry(second)) else {
            return 0.0;
        };

        let mut similarity = 0.0;

        if f1.category == f2.category {
            similarity += 0.3;
        }

        let common = f1.keywords.intersection(&f2.keywords).count();
        if common > 0 {
            similarity += (common as f64 / 10.0).min(0.4);
        }

        if p1.is_connected_to(p2.number) {
            similarity += 0.3;
        }

        similarity.min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(number: u16, name: &str, asterisks: u8) -> Pattern {
        let mut p = Pattern::new(number, name);
        p.asterisks = asterisks;
        p
    }

    fn engine() -> SalienceEngine {
        let mut regions = pattern(1, "INDEPENDENT REGIONS", 2);
        regions.problem = "Metropolitan regions will not come to balance".to_string();
        regions.following_patterns = vec![2];

        let mut towns = pattern(2, "THE DISTRIBUTION OF TOWNS", 2);
        towns.problem = "Population distribution across regions".to_string();
        towns.preceding_patterns = vec![1];
        towns.following_patterns = vec![3];

        let mut fingers = pattern(3, "CITY COUNTRY FINGERS", 2);
        fingers.preceding_patterns = vec![2];

        let room = pattern(190, "CEILING HEIGHT VARIETY", 0);

        SalienceEngine::new(vec![regions, towns, fingers, room])
    }

    #[test]
    fn test_keywords() {
        let mut p = Pattern::new(12, "COMMUNITY OF 7000");
        p.problem = "Individuals have no effective voice".to_string();
        let keywords = extract_keywords(&p);
        assert!(keywords.contains("community"));
        assert!(keywords.contains("7000"));
        assert!(keywords.contains("voice"));
        assert!(!keywords.contains("have"));
        assert!(!keywords.contains("no"));
    }

    #[test]
    fn test_centrality() {
        let mut p = pattern(1, "INDEPENDENT REGIONS", 2);
        p.following_patterns = vec![2, 3];
        let expected = 0.2 + 1.0 + 252.0 / 253.0;
        assert!((centrality(&p) - expected).abs() < 1e-9);

        let mut hub = pattern(1, "HUB", 2);
        hub.following_patterns = (2..60).collect();
        assert_eq!(centrality(&hub), 5.0);
    }

    #[test]
    fn test_unknown_pattern_scores_zero() {
        let score = engine().compute_salience("apl999", &PatternContext::default());
        assert_eq!(score.score, 0.0);
        assert_eq!(score.reasons, vec!["Pattern not found"]);
    }

    #[test]
    fn test_salience_components() {
        let engine = engine();
        let base = engine.compute_salience("apl2", &PatternContext::default());

        let context = PatternContext::default()
            .with_focus(["apl1"])
            .with_category("towns")
            .with_keywords(["Regions", "distribution", "absent"]);
        let scored = engine.compute_salience("apl2", &context);

        // category +5, two keywords +4, follows apl1 +3
        assert!((scored.score - base.score - 12.0).abs() < 1e-9);
        assert!(scored.reasons.contains(&"Follows focus pattern apl1".to_string()));
        assert!(scored.reasons.contains(&"Keyword overlap: 2 matches".to_string()));
    }

    #[test]
    fn test_network_bonus_accumulates_per_focus() {
        let engine = engine();
        let context = PatternContext::default().with_focus(["apl1", "apl3"]);
        let base = engine.compute_salience("apl2", &PatternContext::default());
        let scored = engine.compute_salience("apl2", &context);
        // follows apl1 (+3) and precedes apl3 (+2)
        assert!((scored.score - base.score - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_focus_never_lowers_score() {
        let engine = engine();
        let context = PatternContext::default().with_keywords(["regions"]);
        for p in engine.patterns() {
            let without = engine.compute_salience(&p.id, &context).score;
            let with = engine
                .compute_salience(&p.id, &context.clone().with_focus([p.id.clone()]))
                .score;
            assert!(with >= without + FOCUS_WEIGHT - 1e-9);
        }
    }

    #[test]
    fn test_ranking() {
        let engine = engine();
        let context = PatternContext::default().with_focus(["apl3"]);
        let ranked = engine.rank_patterns_by_salience(&context, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].pattern_id, "apl3");
        assert!(ranked[0].score >= ranked[1].score);

        let all = engine.rank_patterns_by_salience(&PatternContext::default(), 100);
        assert_eq!(all.len(), 4);
        assert!(all.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_similarity() {
        let engine = engine();
        // same category, shared "regions", connected
        assert!((engine.pattern_similarity("apl1", "apl2") - 0.7).abs() < 1e-9);
        assert_eq!(engine.pattern_similarity("apl1", "apl190"), 0.0);
        assert_eq!(engine.pattern_similarity("apl1", "missing"), 0.0);
        assert!(engine.pattern_similarity("apl1", "apl3") >= 0.3);
    }

    #[test]
    fn test_category_counts() {
        let counts = engine().category_counts();
        assert_eq!(counts.get("Towns"), Some(&3));
        assert_eq!(counts.get("Buildings"), Some(&1));
        assert_eq!(counts.get("Construction"), None);
    }
}
