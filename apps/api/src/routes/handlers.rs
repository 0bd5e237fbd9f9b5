use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::analysis::gap_consolidator::recent_gap_insights;
use crate::errors::AppError;
use crate::models::analysis::RecentGapInsights;
use crate::models::job::{JobRow, SearchRow};
use crate::models::preferences::Preferences;
use crate::pipeline::orchestrator::{run_search, SearchOutcome};
use crate::state::AppState;
use crate::store::{jobs, searches, users};

const RECENT_WINDOW_DAYS: i64 = 7;

#[derive(Deserialize)]
pub struct SearchRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub preferences: Preferences,
}

/// POST /api/v1/search
pub async fn handle_search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchOutcome>, AppError> {
    if req
        .preferences
        .target_roles
        .iter()
        .all(|role| role.trim().is_empty())
    {
        return Err(AppError::Validation(
            "target_roles must contain at least one role".to_string(),
        ));
    }

    let outcome = run_search(&state, req.user_id, req.preferences).await?;
    Ok(Json(outcome))
}

/// A completed pipeline run served from the result cache, or the persisted
/// record when the cache entry has expired. The stored form carries the rows
/// in their match-count ranking but no similarity scores — those exist only
/// for the run that produced them.
#[derive(Serialize)]
#[serde(untagged)]
pub enum GetSearchResponse {
    Cached(SearchOutcome),
    Stored {
        search: SearchRow,
        jobs: Vec<JobRow>,
    },
}

/// GET /api/v1/search/:search_id
pub async fn handle_get_search(
    State(state): State<AppState>,
    Path(search_id): Path<i64>,
) -> Result<Json<GetSearchResponse>, AppError> {
    if let Some(outcome) = state.cache.get(search_id) {
        return Ok(Json(GetSearchResponse::Cached(outcome)));
    }

    let search = searches::fetch_search(&state.db, search_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Search {search_id} not found")))?;
    let jobs = jobs::fetch_jobs_for_search(&state.db, search_id).await?;

    Ok(Json(GetSearchResponse::Stored { search, jobs }))
}

/// GET /api/v1/insights/recent-gaps/:user_id
pub async fn handle_recent_gaps(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<RecentGapInsights>, AppError> {
    let profile_text = users::fetch_profile(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No profile found for user {user_id}")))?;

    let since = Utc::now() - Duration::days(RECENT_WINDOW_DAYS);
    let recent = searches::fetch_searches_since(&state.db, user_id, since).await?;

    let insights = recent_gap_insights(state.generator.as_ref(), &profile_text, &recent).await;
    Ok(Json(insights))
}

/// GET /api/v1/users/:user_id/searches
pub async fn handle_list_searches(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<SearchRow>>, AppError> {
    let history = searches::fetch_searches_for_user(&state.db, user_id).await?;
    Ok(Json(history))
}

#[derive(Deserialize)]
pub struct ProfileUpdateRequest {
    pub resumes: Vec<String>,
    #[serde(default)]
    pub titles: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// PUT /api/v1/users/:user_id/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<ProfileUpdateRequest>,
) -> Result<Json<Value>, AppError> {
    if req.resumes.iter().all(|text| text.trim().is_empty()) {
        return Err(AppError::Validation(
            "resumes must contain at least one non-empty document".to_string(),
        ));
    }

    users::update_profile(&state.db, user_id, &req.resumes, &req.titles, &req.skills).await?;
    Ok(Json(json!({ "status": "ok", "user_id": user_id })))
}
