use tracing::{debug, warn};

use crate::errors::AppError;
use crate::vector_index::{SearchHit, VectorIndex};

pub const DEFAULT_TOP_K: usize = 10;

/// Runs the composed query against the vector namespace and returns the
/// ranked hit list. An empty result is valid — the namespace may hold
/// nothing that resembles the query.
pub async fn search_jobs(
    index: &dyn VectorIndex,
    namespace: &str,
    query: &str,
    top_k: usize,
) -> Result<Vec<SearchHit>, AppError> {
    let hits = index
        .search(namespace, query, top_k)
        .await
        .map_err(|e| AppError::UpstreamIndex(format!("SEARCH failed: {e}")))?;

    if hits.is_empty() {
        warn!("Vector search returned no hits in '{namespace}'");
    } else {
        debug!("Vector search returned {} hits", hits.len());
    }
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::index_sync::tests::{make_row, InMemoryIndex};
    use crate::pipeline::index_sync::sync_records;

    #[tokio::test]
    async fn test_search_ranks_by_similarity() {
        let index = InMemoryIndex::default();
        let rows = vec![
            make_row(1, "senior rust engineer building backend services"),
            make_row(2, "marketing coordinator"),
            make_row(3, "rust developer"),
        ];
        sync_records(&index, "job-list", &rows).await.unwrap();

        let hits = search_jobs(&index, "job-list", "rust backend engineer", 10)
            .await
            .unwrap();

        assert_eq!(hits[0].id, "job_1");
        assert!(hits[0].score >= hits[1].score);
    }

    #[tokio::test]
    async fn test_search_respects_top_k() {
        let index = InMemoryIndex::default();
        let rows: Vec<_> = (1..=15).map(|i| make_row(i, "rust work")).collect();
        sync_records(&index, "job-list", &rows).await.unwrap();

        let hits = search_jobs(&index, "job-list", "rust", DEFAULT_TOP_K)
            .await
            .unwrap();
        assert_eq!(hits.len(), DEFAULT_TOP_K);
    }

    #[tokio::test]
    async fn test_search_empty_namespace_yields_no_hits() {
        let index = InMemoryIndex::default();
        let hits = search_jobs(&index, "job-list", "anything", 10).await.unwrap();
        assert!(hits.is_empty());
    }
}
