use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::analysis::FitAnalysis;

/// A job posting as returned by the external listings source.
/// Not persisted until it passes the keyword filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawListing {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub company_url: String,
    #[serde(default)]
    pub location: String,
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub date_posted: String,
    #[serde(default)]
    pub job_type: String,
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub remote: bool,
}

/// A raw listing that cleared the keyword threshold, annotated with which
/// related terms matched per skill. Ranked by `match_count` desc.
#[derive(Debug, Clone, Serialize)]
pub struct MatchedListing {
    #[serde(flatten)]
    pub listing: RawListing,
    /// skill → related terms that occurred in the description.
    pub matched_terms: HashMap<String, Vec<String>>,
    /// Total term matches summed across skills (not distinct skills).
    pub match_count: usize,
}

/// A matched listing persisted under a search record. Immutable once created;
/// `id` is the stable key the vector index derives `"job_<id>"` from.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: i64,
    pub search_id: i64,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub url: String,
    pub date_posted: String,
    pub job_type: String,
    pub matched_terms: Value,
    pub match_count: i32,
    pub created_at: DateTime<Utc>,
}

/// A vector-search hit joined back to its full relational row.
/// Order always follows the hit order, never store order.
#[derive(Debug, Clone, Serialize)]
pub struct HydratedJob {
    #[serde(flatten)]
    pub job: JobRow,
    pub similarity_score: f32,
    /// similarity_score × 100, rounded to one decimal.
    pub match_percentage: f64,
}

impl HydratedJob {
    pub fn new(job: JobRow, similarity_score: f32) -> Self {
        let match_percentage = (similarity_score as f64 * 1000.0).round() / 10.0;
        Self {
            job,
            similarity_score,
            match_percentage,
        }
    }
}

/// Final response item: a hydrated job plus its fit analysis. Jobs outside
/// the analyzed top-K (or whose analysis failed) carry the empty default.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzedJob {
    #[serde(flatten)]
    pub hydrated: HydratedJob,
    pub analysis: FitAnalysis,
}

/// One pipeline invocation, persisted before the matched listings are stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SearchRow {
    pub id: i64,
    pub user_id: Uuid,
    pub query: String,
    pub target_roles: String,
    pub primary_skills: String,
    pub location: String,
    pub job_type: String,
    pub consolidated_gaps: Option<Value>,
    pub is_complete: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_row() -> JobRow {
        JobRow {
            id: 1,
            search_id: 1,
            title: "Backend Engineer".to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            description: "Rust and Postgres".to_string(),
            url: String::new(),
            date_posted: String::new(),
            job_type: "Full-time".to_string(),
            matched_terms: serde_json::json!({}),
            match_count: 4,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_match_percentage_rounds_to_one_decimal() {
        let hydrated = HydratedJob::new(make_row(), 0.87654);
        assert_eq!(hydrated.match_percentage, 87.7);
    }

    #[test]
    fn test_match_percentage_exact_score() {
        let hydrated = HydratedJob::new(make_row(), 0.5);
        assert_eq!(hydrated.match_percentage, 50.0);
    }
}
