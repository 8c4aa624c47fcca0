//! Emergence tracking
//!
//! Mean similarity of consecutive patterns in a sequence, boosted by half
//! again when the sequence spans more than one category.

use serde::{Deserialize, Serialize};

use super::engine::SalienceEngine;

/// Scores above this count as emergence
pub const EMERGENCE_THRESHOLD: f64 = 0.5;

const CROSS_CATEGORY_BOOST: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergenceReport {
    pub emergence_detected: bool,
    pub emergence_score: f64,
    /// Mean similarity of consecutive pairs
    pub sequence_coherence: f64,
    /// Category labels in order of first appearance
    pub categories_involved: Vec<String>,
    pub sequence_length: usize,
    pub interpretation: String,
}

/// Describe an emergence score in words
pub fn interpret_emergence(score: f64, category_count: usize) -> String {
    if score < 0.3 {
        "Low emergence: Patterns weakly related".to_string()
    } else if score < 0.5 {
        "Moderate emergence: Patterns forming loose connections".to_string()
    } else if score < 0.7 {
        "High emergence: Patterns forming coherent gestalt".to_string()
    } else {
        let scales = if category_count > 1 {
            " across multiple scales"
        } else {
            ""
        };
        format!("Very high emergence: Strong synergistic gestalt{}", scales)
    }
}

impl SalienceEngine {
    /// Measure how coherently an ordered sequence of patterns hangs together.
    /// Sequences shorter than two never show emergence.
    pub fn track_emergence(&self, pattern_sequence: &[String]) -> EmergenceReport {
        let mut categories_involved: Vec<String> = Vec::new();
        for id in pattern_sequence {
            let name = self.category_name(id);
            if !categories_involved.iter().any(|c| c == name) {
                categories_involved.push(name.to_string());
            }
        }

        if pattern_sequence.len() < 2 {
            return EmergenceReport {
                emergence_detected: false,
                emergence_score: 0.0,
                sequence_coherence: 0.0,
                categories_involved,
                sequence_length: pattern_sequence.len(),
                interpretation: "Insufficient patterns: at least two are needed".to_string(),
            };
        }

        let coherences: Vec<f64> = pattern_sequence
            .windows(2)
            .map(|pair| self.pattern_similarity(&pair[0], &pair[1]))
            .collect();
        let coherence = coherences.iter().sum::<f64>() / coherences.len() as f64;

        let mut score = coherence;
        if categories_involved.len() > 1 {
            score *= CROSS_CATEGORY_BOOST;
        }

        EmergenceReport {
            emergence_detected: score > EMERGENCE_THRESHOLD,
            emergence_score: score,
            sequence_coherence: coherence,
            interpretation: interpret_emergence(score, categories_involved.len()),
            categories_involved,
            sequence_length: pattern_sequence.len(),
        }
    }
}
