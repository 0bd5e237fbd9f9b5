use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

/// Fetches the user's profile text: the latest user record's resume
/// extractions joined into one opaque string. Returns `None` when the user
/// has no record or no uploaded resumes.
pub async fn fetch_profile(pool: &PgPool, user_id: Uuid) -> Result<Option<String>, sqlx::Error> {
    let resumes: Option<Vec<String>> = sqlx::query_scalar(
        "SELECT resumes FROM users WHERE user_id = $1 ORDER BY id DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(resumes.and_then(|texts| {
        if texts.is_empty() {
            None
        } else {
            Some(texts.join(" "))
        }
    }))
}

/// Replaces the user's stored resume extractions, titles, and skills with a
/// new record. Profile history is append-only; `fetch_profile` reads the
/// latest record.
pub async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    resumes: &[String],
    titles: &[String],
    skills: &[String],
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (user_id, resumes, titles, skills) VALUES ($1, $2, $3, $4)",
    )
    .bind(user_id)
    .bind(resumes)
    .bind(titles)
    .bind(skills)
    .execute(pool)
    .await?;

    info!("Stored profile update for user {user_id}");
    Ok(())
}
