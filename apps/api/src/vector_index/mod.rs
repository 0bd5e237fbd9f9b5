//! Vector index client — keeps all vector-store concerns behind one seam.
//!
//! The index embeds record text server-side, so the API speaks plain text in
//! and `(id, score)` hits out. Components depend on the [`VectorIndex`] trait;
//! the concrete [`HttpVectorIndex`] talks to a Pinecone-style REST data plane.
//! The index is eventually consistent: an upsert is not immediately visible
//! to search, which is why `describe_stats` exists (see `pipeline::index_sync`).

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The embedding-indexed representation of a persisted job. `id` is always
/// `"job_<row id>"` so hits can be resolved back to relational rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    /// The text the index embeds — the job description.
    pub text: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    pub job_type: String,
    pub date_posted: String,
}

/// One ranked search result. Ordering is significant and must survive every
/// downstream join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
}

#[derive(Debug, Clone, Default)]
pub struct NamespaceStats {
    pub vector_count: usize,
}

/// The vector index seam. Carried in `AppState` as `Arc<dyn VectorIndex>`.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn upsert(&self, namespace: &str, records: &[VectorRecord]) -> Result<(), IndexError>;

    /// Removes every vector in the namespace. Must be idempotent when the
    /// namespace does not exist.
    async fn delete_all(&self, namespace: &str) -> Result<(), IndexError>;

    /// Nearest-neighbor search over the namespace, ranked by descending
    /// similarity.
    async fn search(
        &self,
        namespace: &str,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchHit>, IndexError>;

    async fn describe_stats(&self, namespace: &str) -> Result<NamespaceStats, IndexError>;
}

// ────────────────────────────────────────────────────────────────────────────
// HTTP implementation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: SearchQuery<'a>,
    fields: [&'static str; 2],
}

#[derive(Debug, Serialize)]
struct SearchQuery<'a> {
    inputs: SearchInputs<'a>,
    top_k: usize,
}

#[derive(Debug, Serialize)]
struct SearchInputs<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: SearchResult,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_score")]
    score: f32,
}

#[derive(Debug, Serialize)]
struct DeleteAllRequest<'a> {
    #[serde(rename = "deleteAll")]
    delete_all: bool,
    namespace: &'a str,
}

#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(default)]
    namespaces: HashMap<String, NamespaceStatsBody>,
}

#[derive(Debug, Deserialize)]
struct NamespaceStatsBody {
    #[serde(rename = "vectorCount")]
    vector_count: usize,
}

/// Pinecone-style REST client with server-side text embedding.
#[derive(Clone)]
pub struct HttpVectorIndex {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpVectorIndex {
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

    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response, IndexError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(IndexError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl VectorIndex for HttpVectorIndex {
    async fn upsert(&self, namespace: &str, records: &[VectorRecord]) -> Result<(), IndexError> {
        // The data plane takes newline-delimited JSON, one record per line.
        let mut body = String::new();
        for record in records {
            body.push_str(&serde_json::to_string(record)?);
            body.push('\n');
        }

        let url = format!("{}/records/namespaces/{}/upsert", self.base_url, namespace);
        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .header("content-type", "application/x-ndjson")
            .body(body)
            .send()
            .await?;
        self.check(response).await?;

        debug!("Upserted {} records into namespace '{namespace}'", records.len());
        Ok(())
    }

    async fn delete_all(&self, namespace: &str) -> Result<(), IndexError> {
        let url = format!("{}/vectors/delete", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&DeleteAllRequest {
                delete_all: true,
                namespace,
            })
            .send()
            .await?;

        // A missing namespace means there is nothing to delete.
        if response.status().as_u16() == 404 {
            debug!("Namespace '{namespace}' absent, nothing to delete");
            return Ok(());
        }
        self.check(response).await?;
        Ok(())
    }

    async fn search(
        &self,
        namespace: &str,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchHit>, IndexError> {
        let url = format!("{}/records/namespaces/{}/search", self.base_url, namespace);
        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&SearchRequest {
                query: SearchQuery {
                    inputs: SearchInputs { text: query },
                    top_k,
                },
                fields: ["_id", "_score"],
            })
            .send()
            .await?;
        let response = self.check(response).await?;

        let parsed: SearchResponse = response.json().await?;
        Ok(parsed
            .result
            .hits
            .into_iter()
            .map(|h| SearchHit {
                id: h.id,
                score: h.score,
            })
            .collect())
    }

    async fn describe_stats(&self, namespace: &str) -> Result<NamespaceStats, IndexError> {
        let url = format!("{}/describe_index_stats", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        let response = self.check(response).await?;

        let parsed: StatsResponse = response.json().await?;
        Ok(parsed
            .namespaces
            .get(namespace)
            .map(|s| NamespaceStats {
                vector_count: s.vector_count,
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_hits_deserialize_in_order() {
        let json = r#"{
            "result": {
                "hits": [
                    {"_id": "job_7", "_score": 0.91},
                    {"_id": "job_3", "_score": 0.84}
                ]
            }
        }"#;
        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.result.hits[0].id, "job_7");
        assert_eq!(parsed.result.hits[1].id, "job_3");
        assert!(parsed.result.hits[0].score > parsed.result.hits[1].score);
    }

    #[test]
    fn test_stats_response_missing_namespace_defaults_to_zero() {
        let json = r#"{"namespaces": {"other": {"vectorCount": 12}}}"#;
        let parsed: StatsResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.namespaces.get("job-list").is_none());
    }
}
