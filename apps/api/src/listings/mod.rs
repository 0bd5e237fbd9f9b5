//! External job-listings source — a LinkedIn-style active-jobs REST API.
//!
//! The upstream payload is loosely shaped (lists that are sometimes strings,
//! derived fields that may be absent), so mapping is tolerant: every field
//! falls back to an empty default rather than failing the listing.

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::job::RawListing;

#[derive(Debug, Error)]
pub enum ListingsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// The listings-source seam. Carried in `AppState` as `Arc<dyn ListingsSource>`.
#[async_trait]
pub trait ListingsSource: Send + Sync {
    async fn search(
        &self,
        title_filter: &str,
        location_filter: &str,
        type_filter: &str,
    ) -> Result<Vec<RawListing>, ListingsError>;
}

/// Joins target roles into the API's title filter: a single role is quoted
/// as-is, multiple roles are OR-combined.
pub fn build_title_filter(target_roles: &[String]) -> String {
    if target_roles.len() > 1 {
        target_roles
            .iter()
            .map(|r| format!("\"{r}\""))
            .collect::<Vec<_>>()
            .join(" OR ")
    } else {
        format!("\"{}\"", target_roles.first().map(String::as_str).unwrap_or_default())
    }
}

/// Maps a user-facing job type to the API's type filter. Unknown or absent
/// types default to full-time.
pub fn map_type_filter(job_type: Option<&str>) -> &'static str {
    match job_type.map(|t| t.to_lowercase()).as_deref() {
        Some("part-time") => "PART_TIME",
        Some("contract") => "CONTRACTOR",
        Some("internship") => "INTERN",
        Some("temporary") => "TEMPORARY",
        Some("volunteer") => "VOLUNTEER",
        _ => "FULL_TIME",
    }
}

/// HTTP client for the listings API, authenticated with a gateway key header.
#[derive(Clone)]
pub struct HttpListingsSource {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpListingsSource {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl ListingsSource for HttpListingsSource {
    async fn search(
        &self,
        title_filter: &str,
        location_filter: &str,
        type_filter: &str,
    ) -> Result<Vec<RawListing>, ListingsError> {
        let url = format!("{}/active-jb-7d", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .query(&[
                ("limit", "50"),
                ("offset", "0"),
                ("title_filter", title_filter),
                ("location_filter", location_filter),
                ("type_filter", type_filter),
                ("description_type", "text"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Listings API returned {status}: {message}");
            return Err(ListingsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: Vec<Value> = response.json().await?;
        let listings: Vec<RawListing> = payload.iter().map(map_listing).collect();
        debug!("Listings API returned {} postings", listings.len());
        Ok(listings)
    }
}

/// Normalizes one upstream posting into our standard listing shape.
pub fn map_listing(job: &Value) -> RawListing {
    let str_field = |key: &str| job.get(key).and_then(Value::as_str).unwrap_or_default();

    // employment_type arrives as a list of strings, occasionally a bare string.
    let job_type = match job.get("employment_type") {
        Some(Value::Array(types)) => types
            .first()
            .and_then(Value::as_str)
            .unwrap_or("Full-time")
            .to_string(),
        Some(Value::String(t)) => t.clone(),
        _ => "Full-time".to_string(),
    };

    // locations_derived entries are either {city, admin, country} objects or
    // plain strings.
    let location = job
        .get("locations_derived")
        .and_then(Value::as_array)
        .and_then(|locs| locs.first())
        .map(|first| match first {
            Value::Object(parts) => ["city", "admin", "country"]
                .iter()
                .filter_map(|k| parts.get(*k).and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join(", "),
            other => other.as_str().unwrap_or_default().to_string(),
        })
        .unwrap_or_default();

    let remote = job
        .get("remote_derived")
        .and_then(Value::as_bool)
        .unwrap_or_else(|| str_field("location_type") == "TELECOMMUTE");

    RawListing {
        title: str_field("title").to_string(),
        company: str_field("organization").to_string(),
        company_url: str_field("organization_url").to_string(),
        location,
        description: str_field("description_text").to_string(),
        url: str_field("url").to_string(),
        date_posted: prettify_date(str_field("date_posted")),
        job_type,
        salary: str_field("salary").to_string(),
        remote,
    }
}

/// Reformats an ISO timestamp as "Month DD, YYYY"; anything unparseable is
/// kept verbatim.
fn prettify_date(date_posted: &str) -> String {
    if date_posted.trim().is_empty() {
        return String::new();
    }
    match DateTime::parse_from_rfc3339(&date_posted.replace('Z', "+00:00")) {
        Ok(parsed) => parsed.format("%B %d, %Y").to_string(),
        Err(_) => date_posted.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_title_filter_single_role() {
        let roles = vec!["Backend Engineer".to_string()];
        assert_eq!(build_title_filter(&roles), "\"Backend Engineer\"");
    }

    #[test]
    fn test_build_title_filter_multiple_roles_or_combined() {
        let roles = vec!["Backend Engineer".to_string(), "SRE".to_string()];
        assert_eq!(
            build_title_filter(&roles),
            "\"Backend Engineer\" OR \"SRE\""
        );
    }

    #[test]
    fn test_map_type_filter_known_and_unknown() {
        assert_eq!(map_type_filter(Some("Contract")), "CONTRACTOR");
        assert_eq!(map_type_filter(Some("gig")), "FULL_TIME");
        assert_eq!(map_type_filter(None), "FULL_TIME");
    }

    #[test]
    fn test_map_listing_full_payload() {
        let payload = json!({
            "title": "Platform Engineer",
            "organization": "Acme",
            "organization_url": "https://acme.example",
            "description_text": "Rust, Kafka, Kubernetes",
            "url": "https://jobs.example/123",
            "date_posted": "2026-08-20T09:00:00Z",
            "employment_type": ["Full-time"],
            "locations_derived": [{"city": "Berlin", "country": "Germany"}],
            "remote_derived": true
        });
        let listing = map_listing(&payload);
        assert_eq!(listing.title, "Platform Engineer");
        assert_eq!(listing.company, "Acme");
        assert_eq!(listing.location, "Berlin, Germany");
        assert_eq!(listing.job_type, "Full-time");
        assert_eq!(listing.date_posted, "August 20, 2026");
        assert!(listing.remote);
    }

    #[test]
    fn test_map_listing_sparse_payload_defaults() {
        let payload = json!({"title": "Data Engineer"});
        let listing = map_listing(&payload);
        assert_eq!(listing.company, "");
        assert_eq!(listing.location, "");
        assert_eq!(listing.job_type, "Full-time");
        assert!(!listing.remote);
    }

    #[test]
    fn test_prettify_date_keeps_unparseable_text() {
        assert_eq!(prettify_date("3 days ago"), "3 days ago");
        assert_eq!(prettify_date(""), "");
    }
}
