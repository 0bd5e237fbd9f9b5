//! Rehydrates vector hits into full job rows while preserving the ranking
//! the index produced.

use std::collections::HashMap;

use sqlx::PgPool;
use tracing::warn;

use crate::errors::AppError;
use crate::models::job::{HydratedJob, JobRow};
use crate::store::jobs;
use crate::vector_index::SearchHit;

const VECTOR_ID_PREFIX: &str = "job_";

/// Vector ids encode the job row's primary key, e.g. `job_42`.
pub fn vector_id(job_id: i64) -> String {
    format!("{VECTOR_ID_PREFIX}{job_id}")
}

/// Inverse of [`vector_id`]. `None` for ids that do not carry the prefix or
/// a numeric key — those hits are dropped, not fatal.
pub fn parse_job_id(hit_id: &str) -> Option<i64> {
    hit_id.strip_prefix(VECTOR_ID_PREFIX)?.parse().ok()
}

/// Joins hit ids to their rows, keeping the hits' ranking order. Hits with
/// unparseable ids or no matching row are skipped.
pub fn order_by_hits(hits: &[SearchHit], rows: Vec<JobRow>) -> Vec<HydratedJob> {
    let mut by_id: HashMap<i64, JobRow> = rows.into_iter().map(|r| (r.id, r)).collect();

    hits.iter()
        .filter_map(|hit| {
            let job_id = match parse_job_id(&hit.id) {
                Some(id) => id,
                None => {
                    warn!("Dropping hit with malformed vector id '{}'", hit.id);
                    return None;
                }
            };
            match by_id.remove(&job_id) {
                Some(row) => Some(HydratedJob::new(row, hit.score)),
                None => {
                    warn!("Hit '{}' has no matching job row; index may be stale", hit.id);
                    None
                }
            }
        })
        .collect()
}

/// Fetches the rows behind the hits in one query, then restores hit order.
pub async fn hydrate(pool: &PgPool, hits: &[SearchHit]) -> Result<Vec<HydratedJob>, AppError> {
    let ids: Vec<i64> = hits.iter().filter_map(|h| parse_job_id(&h.id)).collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = jobs::fetch_jobs_by_ids(pool, &ids).await?;
    Ok(order_by_hits(hits, rows))
}
