//! Salience, gestalt and emergence scoring
//!
//! Heuristic relevance ranking over a loaded corpus. The engine is built once
//! and only read afterwards, so it can be shared behind an `Arc`.

pub mod context;
pub mod emergence;
pub mod engine;
pub mod gestalt;

pub use context::{PatternContext, SalienceScore};
pub use emergence::{interpret_emergence, EmergenceReport, EMERGENCE_THRESHOLD};
pub use engine::{centrality, extract_keywords, PatternFeatures, SalienceEngine, UNKNOWN_CATEGORY};
pub use gestalt::{GestaltCluster, DEFAULT_GESTALT_THRESHOLD};
