//! Pipeline orchestrator — runs one search request end to end:
//!
//!   PREP (listings + query, concurrently) → PERSIST → REINDEX → SEARCH →
//!   HYDRATE → ANALYZE (fan-out) → RESPOND
//!
//! The backbone stages are mandatory: any failure aborts the request with a
//! stage-identifying error. Only the per-job analysis tasks and the gap
//! consolidation are best-effort.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::fit_analyzer::{analyze_top_jobs, DEFAULT_ANALYZE_TOP_K};
use crate::analysis::gap_consolidator::consolidate_search_gaps;
use crate::errors::AppError;
use crate::listings::{build_title_filter, map_type_filter};
use crate::matching::keyword_matcher::{filter_listings, DEFAULT_MIN_SKILL_MATCHES};
use crate::matching::query_composer::compose_query;
use crate::matching::skill_expander::expand_skills;
use crate::models::analysis::{ConsolidatedGaps, FitAnalysis};
use crate::models::job::{AnalyzedJob, HydratedJob, MatchedListing};
use crate::models::preferences::Preferences;
use crate::pipeline::{hydrator, index_sync, searcher};
use crate::state::AppState;
use crate::store::{jobs, searches, users};

/// The completed result of one pipeline run. Cached by search id and
/// serialized as the search response body.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub search_id: i64,
    pub query: String,
    pub results: Vec<AnalyzedJob>,
    pub total_results: usize,
    pub consolidated_gaps: Option<ConsolidatedGaps>,
}

pub async fn run_search(
    state: &AppState,
    user_id: Uuid,
    preferences: Preferences,
) -> Result<SearchOutcome, AppError> {
    // PREP: listings fetch+match and query composition share no data, so
    // they run concurrently. Either failure aborts.
    let matched_task = fetch_and_match(state, &preferences);
    let query_task = compose_for_user(state, user_id, &preferences);
    let (matched, (profile_text, query)) = tokio::try_join!(matched_task, query_task)?;

    info!(
        "Matched {} listings for user {user_id}, query: {query}",
        matched.len()
    );

    // PERSIST
    let search_id = searches::insert_search(&state.db, user_id, &query, &preferences).await?;
    jobs::insert_matched_listings(&state.db, search_id, &matched).await?;

    // REINDEX: the namespace mirrors the full jobs table, not this search.
    let all_rows = jobs::fetch_all_jobs(&state.db).await?;
    index_sync::sync_records(state.index.as_ref(), &state.config.vector_namespace, &all_rows)
        .await?;

    // SEARCH + HYDRATE
    let hits = searcher::search_jobs(
        state.index.as_ref(),
        &state.config.vector_namespace,
        &query,
        searcher::DEFAULT_TOP_K,
    )
    .await?;
    let hydrated = hydrator::hydrate(&state.db, &hits).await?;

    // ANALYZE: best-effort fan-out over the top-K.
    let analyses = analyze_top_jobs(
        Arc::clone(&state.generator),
        &profile_text,
        &hydrated,
        DEFAULT_ANALYZE_TOP_K,
    )
    .await;
    let results = merge_analyses(hydrated, analyses);

    let consolidated = consolidate_search_gaps(state.generator.as_ref(), &results).await;
    let consolidated_gaps = if consolidated.top_gaps.is_empty() {
        None
    } else {
        Some(consolidated)
    };

    let gaps_value = consolidated_gaps
        .as_ref()
        .and_then(|gaps| serde_json::to_value(gaps).ok());
    searches::complete_search(&state.db, search_id, gaps_value.as_ref()).await?;

    let outcome = SearchOutcome {
        search_id,
        query,
        total_results: results.len(),
        results,
        consolidated_gaps,
    };
    state.cache.insert(search_id, outcome.clone());

    info!(
        "Search {search_id} complete: {} results returned",
        outcome.total_results
    );
    Ok(outcome)
}

/// Every hydrated job appears in the output, in hit order. Jobs the analyze
/// stage produced nothing for (outside top-K, task lost) carry the default.
pub fn merge_analyses(
    hydrated: Vec<HydratedJob>,
    mut analyses: HashMap<i64, FitAnalysis>,
) -> Vec<AnalyzedJob> {
    hydrated
        .into_iter()
        .map(|job| {
            let analysis = analyses.remove(&job.job.id).unwrap_or_default();
            AnalyzedJob {
                hydrated: job,
                analysis,
            }
        })
        .collect()
}

async fn fetch_and_match(
    state: &AppState,
    preferences: &Preferences,
) -> Result<Vec<MatchedListing>, AppError> {
    let title_filter = build_title_filter(&preferences.target_roles);
    let type_filter = map_type_filter(preferences.job_type.as_deref());

    let listings = state
        .listings
        .search(&title_filter, &preferences.preferred_location, type_filter)
        .await
        .map_err(|e| AppError::UpstreamListings(format!("PREP listings fetch failed: {e}")))?;

    if listings.is_empty() {
        warn!("Listings source returned no postings for {title_filter}");
    }

    let expanded = expand_skills(state.generator.as_ref(), &preferences.primary_skills).await;
    Ok(filter_listings(listings, &expanded, DEFAULT_MIN_SKILL_MATCHES))
}

async fn compose_for_user(
    state: &AppState,
    user_id: Uuid,
    preferences: &Preferences,
) -> Result<(String, String), AppError> {
    let profile_text = users::fetch_profile(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No profile found for user {user_id}")))?;

    let query = compose_query(state.generator.as_ref(), &profile_text, preferences).await?;
    Ok((profile_text, query))
}
