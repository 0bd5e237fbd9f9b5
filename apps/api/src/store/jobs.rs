use sqlx::PgPool;
use tracing::info;

use crate::models::job::{JobRow, MatchedListing};

/// Persists matched listings as immutable job rows under a search record.
/// Returns the number of rows inserted.
pub async fn insert_matched_listings(
    pool: &PgPool,
    search_id: i64,
    matched: &[MatchedListing],
) -> Result<usize, sqlx::Error> {
    for item in matched {
        let matched_terms = serde_json::to_value(&item.matched_terms)
            .unwrap_or_else(|_| serde_json::json!({}));

        sqlx::query(
            r#"
            INSERT INTO matched_jobs
                (search_id, title, company, location, description, url,
                 date_posted, job_type, matched_terms, match_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(search_id)
        .bind(&item.listing.title)
        .bind(&item.listing.company)
        .bind(&item.listing.location)
        .bind(&item.listing.description)
        .bind(&item.listing.url)
        .bind(&item.listing.date_posted)
        .bind(&item.listing.job_type)
        .bind(&matched_terms)
        .bind(item.match_count as i32)
        .execute(pool)
        .await?;
    }

    info!("Inserted {} matched jobs for search {search_id}", matched.len());
    Ok(matched.len())
}

/// Fetches every persisted job row, across all searches. The vector index
/// mirrors this full table, not a single search's slice.
pub async fn fetch_all_jobs(pool: &PgPool) -> Result<Vec<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM matched_jobs ORDER BY id ASC")
        .fetch_all(pool)
        .await
}

/// Fetches one search's persisted rows in their stored ranking
/// (match_count desc, insertion order for ties).
pub async fn fetch_jobs_for_search(
    pool: &PgPool,
    search_id: i64,
) -> Result<Vec<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>(
        "SELECT * FROM matched_jobs WHERE search_id = $1 ORDER BY match_count DESC, id ASC",
    )
    .bind(search_id)
    .fetch_all(pool)
    .await
}

/// Bulk-fetches job rows by id in one query. Row order is whatever the store
/// returns — callers re-order by hit order themselves.
pub async fn fetch_jobs_by_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM matched_jobs WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await
}
