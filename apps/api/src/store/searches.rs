use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::job::SearchRow;
use crate::models::preferences::Preferences;

/// Creates the search record for one pipeline invocation and returns its id.
/// The record starts incomplete; `complete_search` flips the flag after the
/// gap summary is stored.
pub async fn insert_search(
    pool: &PgPool,
    user_id: Uuid,
    query: &str,
    preferences: &Preferences,
) -> Result<i64, sqlx::Error> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO job_searches
            (user_id, query, target_roles, primary_skills, location, job_type, is_complete)
        VALUES ($1, $2, $3, $4, $5, $6, FALSE)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(query)
    .bind(preferences.target_roles.join(", "))
    .bind(preferences.primary_skills.join(", "))
    .bind(&preferences.preferred_location)
    .bind(preferences.job_type.as_deref().unwrap_or(""))
    .fetch_one(pool)
    .await?;

    info!("Created search record {id} for user {user_id}");
    Ok(id)
}

/// Stores the per-search consolidated gap blob (if any) and marks the record
/// complete.
pub async fn complete_search(
    pool: &PgPool,
    search_id: i64,
    consolidated_gaps: Option<&Value>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE job_searches SET consolidated_gaps = $2, is_complete = TRUE WHERE id = $1",
    )
    .bind(search_id)
    .bind(consolidated_gaps)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn fetch_search(pool: &PgPool, search_id: i64) -> Result<Option<SearchRow>, sqlx::Error> {
    sqlx::query_as::<_, SearchRow>("SELECT * FROM job_searches WHERE id = $1")
        .bind(search_id)
        .fetch_optional(pool)
        .await
}

/// Returns a user's full search history, newest first.
pub async fn fetch_searches_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<SearchRow>, sqlx::Error> {
    sqlx::query_as::<_, SearchRow>(
        "SELECT * FROM job_searches WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Returns a user's search records created since the cutoff, newest first.
pub async fn fetch_searches_since(
    pool: &PgPool,
    user_id: Uuid,
    since: DateTime<Utc>,
) -> Result<Vec<SearchRow>, sqlx::Error> {
    sqlx::query_as::<_, SearchRow>(
        r#"
        SELECT * FROM job_searches
        WHERE user_id = $1 AND created_at >= $2
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(since)
    .fetch_all(pool)
    .await
}
