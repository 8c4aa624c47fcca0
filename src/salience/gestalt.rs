//! Gestalt detection
//!
//! Greedy single-pass grouping: each unvisited pattern seeds a cluster and
//! pulls in every later unvisited pattern similar enough to the seed.
//! Members are never compared with each other and clusters are never merged.

use serde::{Deserialize, Serialize};

use super::engine::SalienceEngine;

/// Default similarity threshold
pub const DEFAULT_GESTALT_THRESHOLD: f64 = 0.6;

/// A group of patterns similar to a common seed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestaltCluster {
    /// Seed first, then members in input order
    pub patterns: Vec<String>,
    pub size: usize,
    /// Mean similarity over ordered member pairs
    pub coherence: f64,
}

impl SalienceEngine {
    /// Cluster `pattern_ids` by similarity to a seed.
    ///
    /// A pattern joins a seed's cluster when its similarity is at least
    /// `threshold`. Singletons are dropped; clusters are returned largest
    /// first, ties in discovery order.
    pub fn detect_gestalt_patterns(&self, pattern_ids: &[String], threshold: f64) -> Vec<GestaltCluster> {
        let n = pattern_ids.len();
        if n < 2 {
            return Vec::new();
        }

        let similarity: Vec<Vec<f64>> = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| {
                        if i == j {
                            1.0
                        } else {
                            self.pattern_similarity(&pattern_ids[i], &pattern_ids[j])
                        }
                    })
                    .collect()
            })
            .collect();

        // first index of each id, so repeated ids share one row
        let position = |id: &str| pattern_ids.iter().position(|p| p == id).unwrap_or(0);

        let mut visited = vec![false; n];
        let mut clusters = Vec::new();

        for i in 0..n {
            if visited[i] || pattern_ids[..i].contains(&pattern_ids[i]) {
                continue;
            }
            visited[i] = true;
            let mut members = vec![i];

            for j in 0..n {
                if visited[j] || pattern_ids[..j].contains(&pattern_ids[j]) {
                    continue;
                }
                if similarity[i][j] >= threshold {
                    visited[j] = true;
                    members.push(j);
                }
            }

            if members.len() < 2 {
                continue;
            }

            let ids: Vec<String> = members.iter().map(|&m| pattern_ids[m].clone()).collect();
            let mut total = 0.0;
            let mut pairs = 0usize;
            for a in &ids {
                for b in &ids {
                    if a != b {
                        total += similarity[position(a)][position(b)];
                        pairs += 1;
                    }
                }
            }

            clusters.push(GestaltCluster {
                size: ids.len(),
                patterns: ids,
                coherence: if pairs > 0 { total / pairs as f64 } else { 0.0 },
            });
        }

        clusters.sort_by(|a, b| b.size.cmp(&a.size));
        clusters
    }
}

#[cfg(test)]
mod tests {
    use crate::corpus::Pattern;
    use crate::salience::SalienceEngine;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn engine() -> SalienceEngine {
        let mut a = Pattern::new(1, "INDEPENDENT REGIONS");
        a.following_patterns = vec![2];
        let mut b = Pattern::new(2, "DISTRIBUTION OF TOWNS");
        b.preceding_patterns = vec![1];
        b.following_patterns = vec![3];
        let mut c = Pattern::new(3, "CITY COUNTRY FINGERS");
        c.preceding_patterns = vec![2];
        let d = Pattern::new(150, "A PLACE TO WAIT");
        let e = Pattern::new(151, "SMALL MEETING ROOMS");
        SalienceEngine::new(vec![a, b, c, d, e])
    }

    #[test]
    fn test_fewer_than_two_ids() {
        assert!(engine().detect_gestalt_patterns(&ids(&["apl1"]), 0.5).is_empty());
        assert!(engine().detect_gestalt_patterns(&[], 0.5).is_empty());
    }

    #[test]
    fn test_seed_grouping_is_not_transitive() {
        let engine = engine();
        // apl1~apl2 is 0.6 (category + connection); apl1~apl3 only 0.3
        let clusters = engine.detect_gestalt_patterns(&ids(&["apl1", "apl2", "apl3"]), 0.6);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].patterns, ids(&["apl1", "apl2"]));
        assert_eq!(clusters[0].size, 2);
        assert!((clusters[0].coherence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let engine = engine();
        let clusters = engine.detect_gestalt_patterns(&ids(&["apl150", "apl151"]), 0.3);
        assert_eq!(clusters.len(), 1);
        let clusters = engine.detect_gestalt_patterns(&ids(&["apl150", "apl151"]), 0.31);
        assert!(clusters.is_empty());
    }

    #[test]
    fn test_clusters_sorted_and_bounded() {
        let engine = engine();
        let input = ids(&["apl150", "apl151", "apl1", "apl2", "apl3", "missing"]);
        let clusters = engine.detect_gestalt_patterns(&input, 0.3);

        assert_eq!(clusters[0].patterns, ids(&["apl1", "apl2", "apl3"]));
        assert_eq!(clusters[1].patterns, ids(&["apl150", "apl151"]));
        for cluster in &clusters {
            assert!(cluster.size >= 2);
            assert!(cluster.size <= input.len());
        }
    }

    #[test]
    fn test_repeated_ids_counted_once() {
        let engine = engine();
        let clusters = engine.detect_gestalt_patterns(&ids(&["apl1", "apl1", "apl2"]), 0.6);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].patterns, ids(&["apl1", "apl2"]));
    }
}
