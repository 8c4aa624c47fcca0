//! Route handlers

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::error::{ApiError, ApiResult};
use super::state::AppState;
use crate::corpus::{Pattern, PATTERN_COUNT};
use crate::salience::PatternContext;

const DEFAULT_PATTERN_LIMIT: usize = 50;
const MAX_SALIENCE_LIMIT: usize = 100;

// ============================================================================
// Request and response bodies
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct PatternResponse {
    pub id: String,
    pub number: u16,
    pub name: String,
    pub asterisks: u8,
    pub problem: String,
    pub solution: String,
    pub category: String,
    pub preceding_patterns: Vec<u16>,
    pub following_patterns: Vec<u16>,
}

impl PatternResponse {
    fn new(pattern: &Pattern, category: &str) -> Self {
        Self {
            id: pattern.id.clone(),
            number: pattern.number,
            name: pattern.name.clone(),
            asterisks: pattern.asterisks,
            problem: pattern.problem.clone(),
            solution: pattern.solution.clone(),
            category: category.to_string(),
            preceding_patterns: pattern.preceding_patterns.clone(),
            following_patterns: pattern.following_patterns.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListPatternsQuery {
    pub category: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SalienceRequest {
    #[serde(default)]
    pub focus_patterns: Vec<String>,
    pub current_category: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub domain: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SalienceResponse {
    pub pattern_id: String,
    pub score: f64,
    pub reasons: Vec<String>,
    pub pattern_name: String,
}

#[derive(Debug, Deserialize)]
pub struct GestaltRequest {
    pub pattern_ids: Vec<String>,
    pub threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct EmergenceRequest {
    pub pattern_sequence: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PatternRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GestaltResponse {
    pub patterns: Vec<PatternRef>,
    pub size: usize,
    pub coherence: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GestaltListResponse {
    pub clusters_found: usize,
    pub gestalts: Vec<GestaltResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EmergenceResponse {
    pub sequence: Vec<PatternRef>,
    pub emergence_detected: bool,
    pub emergence_score: f64,
    pub sequence_coherence: f64,
    pub categories_involved: Vec<String>,
    pub interpretation: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub pattern_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryCount>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub engine_loaded: bool,
    pub pattern_count: usize,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Pattern Language API",
        "version": crate::VERSION,
        "endpoints": {
            "/patterns": "List all patterns",
            "/patterns/{id}": "Get a specific pattern",
            "/salience": "Compute pattern salience",
            "/gestalt": "Detect gestalt patterns",
            "/emergence": "Track emergence in a sequence",
            "/categories": "List pattern categories",
            "/health": "Health check",
        }
    }))
}

pub async fn list_patterns(
    State(state): State<AppState>,
    Query(query): Query<ListPatternsQuery>,
) -> ApiResult<Json<Vec<PatternResponse>>> {
    let limit = query.limit.unwrap_or(DEFAULT_PATTERN_LIMIT);
    if !(1..=PATTERN_COUNT as usize).contains(&limit) {
        return Err(ApiError::unprocessable(format!(
            "limit must be between 1 and {}",
            PATTERN_COUNT
        )));
    }

    let engine = &state.engine;
    let patterns = engine
        .patterns()
        .iter()
        .map(|p| (p, engine.category_name(&p.id)))
        .filter(|(_, category)| {
            query
                .category
                .as_deref()
                .is_none_or(|wanted| wanted.eq_ignore_ascii_case(category))
        })
        .take(limit)
        .map(|(p, category)| PatternResponse::new(p, category))
        .collect();

    Ok(Json(patterns))
}

pub async fn get_pattern(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PatternResponse>> {
    let pattern = state
        .engine
        .get(&id)
        .ok_or_else(|| ApiError::not_found(format!("Pattern {} not found", id)))?;
    Ok(Json(PatternResponse::new(
        pattern,
        state.engine.category_name(&id),
    )))
}

pub async fn compute_salience(
    State(state): State<AppState>,
    Json(request): Json<SalienceRequest>,
) -> ApiResult<Json<Vec<SalienceResponse>>> {
    let limit = request.limit.unwrap_or(state.salience_limit);
    if !(1..=MAX_SALIENCE_LIMIT).contains(&limit) {
        return Err(ApiError::unprocessable(format!(
            "limit must be between 1 and {}",
            MAX_SALIENCE_LIMIT
        )));
    }

    let context = PatternContext {
        domain: request.domain,
        current_category: request.current_category,
        ..PatternContext::default()
    }
    .with_focus(request.focus_patterns)
    .with_keywords(request.keywords);

    let engine = &state.engine;
    let scores = engine.rank_patterns_by_salience(&context, limit);
    debug!(results = scores.len(), "computed salience");

    Ok(Json(
        scores
            .into_iter()
            .map(|s| SalienceResponse {
                pattern_name: engine.get(&s.pattern_id).map(|p| p.name.clone()).unwrap_or_default(),
                pattern_id: s.pattern_id,
                score: s.score,
                reasons: s.reasons,
            })
            .collect(),
    ))
}

pub async fn detect_gestalt(
    State(state): State<AppState>,
    Json(request): Json<GestaltRequest>,
) -> ApiResult<Json<GestaltListResponse>> {
    let threshold = request.threshold.unwrap_or(state.gestalt_threshold);
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ApiError::unprocessable("threshold must be between 0 and 1"));
    }
    let refs = pattern_refs(&state, &request.pattern_ids)?;
    debug!(patterns = refs.len(), threshold, "detecting gestalts");

    let gestalts: Vec<GestaltResponse> = state
        .engine
        .detect_gestalt_patterns(&request.pattern_ids, threshold)
        .into_iter()
        .map(|cluster| GestaltResponse {
            patterns: cluster
                .patterns
                .iter()
                .map(|id| pattern_ref(&state, id))
                .collect(),
            size: cluster.size,
            coherence: cluster.coherence,
        })
        .collect();

    Ok(Json(GestaltListResponse {
        clusters_found: gestalts.len(),
        gestalts,
    }))
}

pub async fn track_emergence(
    State(state): State<AppState>,
    Json(request): Json<EmergenceRequest>,
) -> ApiResult<Json<EmergenceResponse>> {
    let sequence = pattern_refs(&state, &request.pattern_sequence)?;
    let report = state.engine.track_emergence(&request.pattern_sequence);

    Ok(Json(EmergenceResponse {
        sequence,
        emergence_detected: report.emergence_detected,
        emergence_score: report.emergence_score,
        sequence_coherence: report.sequence_coherence,
        categories_involved: report.categories_involved,
        interpretation: report.interpretation,
    }))
}

pub async fn list_categories(State(state): State<AppState>) -> Json<CategoriesResponse> {
    let counts: BTreeMap<&str, usize> = state.engine.category_counts();
    Json(CategoriesResponse {
        categories: counts
            .into_iter()
            .map(|(name, pattern_count)| CategoryCount {
                name: name.to_string(),
                pattern_count,
            })
            .collect(),
    })
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        engine_loaded: true,
        pattern_count: state.engine.len(),
    })
}

/// Resolve ids to references, failing on the first unknown one
fn pattern_refs(state: &AppState, ids: &[String]) -> ApiResult<Vec<PatternRef>> {
    ids.iter()
        .map(|id| {
            if state.engine.contains(id) {
                Ok(pattern_ref(state, id))
            } else {
                Err(ApiError::unknown_pattern(id))
            }
        })
        .collect()
}

fn pattern_ref(state: &AppState, id: &str) -> PatternRef {
    PatternRef {
        id: id.to_string(),
        name: state
            .engine
            .get(id)
            .map(|p| p.name.clone())
            .unwrap_or_default(),
    }
}
