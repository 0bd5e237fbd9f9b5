//! Vector index sync — makes the namespace an exact mirror of the full
//! persisted-jobs table: wipe, validate, batch upsert, then wait until the
//! index confirms the new vectors are visible.
//!
//! KNOWN HAZARD: the namespace is one mutable resource shared by every
//! request. A wipe-then-reload here is visible to concurrent searches, which
//! can observe a transiently empty or partial index. Hardening options
//! (generation-tagged namespaces with an atomic swap, or diff-based upserts
//! keyed by job id) are recorded in DESIGN.md.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::models::job::JobRow;
use crate::pipeline::hydrator::vector_id;
use crate::vector_index::{VectorIndex, VectorRecord};

const UPSERT_BATCH_SIZE: usize = 96;
const CONSISTENCY_POLL_ATTEMPTS: u32 = 10;
const CONSISTENCY_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Used when stats polling itself fails — one bounded wait, then proceed.
const CONSISTENCY_FALLBACK_WAIT: Duration = Duration::from_secs(5);

#[derive(Debug, PartialEq)]
pub struct SyncReport {
    pub upserted: usize,
    pub skipped: usize,
}

/// Converts job rows to vector records, skipping (and counting) rows that
/// cannot be embedded. A row without a description has nothing to embed.
pub fn build_records(rows: &[JobRow]) -> (Vec<VectorRecord>, usize) {
    let mut records = Vec::with_capacity(rows.len());
    let mut skipped = 0;

    for row in rows {
        if row.description.trim().is_empty() {
            warn!("Skipping job {} in sync: empty description", row.id);
            skipped += 1;
            continue;
        }
        records.push(VectorRecord {
            id: vector_id(row.id),
            text: row.description.clone(),
            title: row.title.clone(),
            company: row.company.clone(),
            location: row.location.clone(),
            url: row.url.clone(),
            job_type: row.job_type.clone(),
            date_posted: row.date_posted.clone(),
        });
    }

    (records, skipped)
}

/// Mirrors `rows` into the namespace and returns only after the index
/// reports the expected vector count (or the bounded wait elapses).
pub async fn sync_records(
    index: &dyn VectorIndex,
    namespace: &str,
    rows: &[JobRow],
) -> Result<SyncReport, AppError> {
    index
        .delete_all(namespace)
        .await
        .map_err(|e| AppError::UpstreamIndex(format!("REINDEX namespace wipe failed: {e}")))?;

    let (records, skipped) = build_records(rows);
    if records.is_empty() {
        info!("No valid jobs to sync into '{namespace}' ({skipped} skipped)");
        return Ok(SyncReport {
            upserted: 0,
            skipped,
        });
    }

    for batch in records.chunks(UPSERT_BATCH_SIZE) {
        index
            .upsert(namespace, batch)
            .await
            .map_err(|e| AppError::UpstreamIndex(format!("REINDEX upsert failed: {e}")))?;
    }

    wait_for_consistency(index, namespace, records.len()).await;

    info!(
        "Synced {} jobs into '{namespace}' ({skipped} skipped)",
        records.len()
    );
    Ok(SyncReport {
        upserted: records.len(),
        skipped,
    })
}

/// The index is eventually consistent: poll the namespace vector count until
/// it reaches the upserted total. If polling itself fails, fall back to one
/// bounded wait — premature search against a stale namespace returns empty
/// results, which is worse than the delay.
async fn wait_for_consistency(index: &dyn VectorIndex, namespace: &str, expected: usize) {
    for attempt in 0..CONSISTENCY_POLL_ATTEMPTS {
        match index.describe_stats(namespace).await {
            Ok(stats) if stats.vector_count >= expected => {
                debug!(
                    "Namespace '{namespace}' consistent after {attempt} polls ({} vectors)",
                    stats.vector_count
                );
                return;
            }
            Ok(stats) => {
                debug!(
                    "Namespace '{namespace}' at {}/{expected} vectors, polling again",
                    stats.vector_count
                );
            }
            Err(e) => {
                warn!("Stats poll failed ({e}); falling back to bounded wait");
                tokio::time::sleep(CONSISTENCY_FALLBACK_WAIT).await;
                return;
            }
        }
        tokio::time::sleep(CONSISTENCY_POLL_INTERVAL).await;
    }
    warn!(
        "Namespace '{namespace}' still below {expected} vectors after \
         {CONSISTENCY_POLL_ATTEMPTS} polls; proceeding"
    );
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::vector_index::{IndexError, NamespaceStats, SearchHit};

    /// In-memory index: immediately consistent, scores hits by how many query
    /// words appear in the record text.
    #[derive(Default)]
    pub struct InMemoryIndex {
        pub vectors: Mutex<HashMap<String, VectorRecord>>,
    }

    #[async_trait]
    impl VectorIndex for InMemoryIndex {
        async fn upsert(
            &self,
            _namespace: &str,
            records: &[VectorRecord],
        ) -> Result<(), IndexError> {
            let mut vectors = self.vectors.lock().unwrap();
            for record in records {
                vectors.insert(record.id.clone(), record.clone());
            }
            Ok(())
        }

        async fn delete_all(&self, _namespace: &str) -> Result<(), IndexError> {
            self.vectors.lock().unwrap().clear();
            Ok(())
        }

        async fn search(
            &self,
            _namespace: &str,
            query: &str,
            top_k: usize,
        ) -> Result<Vec<SearchHit>, IndexError> {
            let query_words: Vec<String> =
                query.to_lowercase().split_whitespace().map(String::from).collect();
            let vectors = self.vectors.lock().unwrap();
            let mut hits: Vec<SearchHit> = vectors
                .values()
                .map(|record| {
                    let text = record.text.to_lowercase();
                    let overlap = query_words.iter().filter(|w| text.contains(*w)).count();
                    SearchHit {
                        id: record.id.clone(),
                        score: overlap as f32 / query_words.len().max(1) as f32,
                    }
                })
                .collect();
            // Deterministic: score desc, then id for ties.
            hits.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap()
                    .then_with(|| a.id.cmp(&b.id))
            });
            hits.truncate(top_k);
            Ok(hits)
        }

        async fn describe_stats(&self, _namespace: &str) -> Result<NamespaceStats, IndexError> {
            Ok(NamespaceStats {
                vector_count: self.vectors.lock().unwrap().len(),
            })
        }
    }

    pub fn make_row(id: i64, description: &str) -> JobRow {
        JobRow {
            id,
            search_id: 1,
            title: format!("Job {id}"),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            description: description.to_string(),
            url: String::new(),
            date_posted: String::new(),
            job_type: "Full-time".to_string(),
            matched_terms: serde_json::json!({}),
            match_count: 3,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_build_records_skips_and_counts_invalid_rows() {
        let rows = vec![
            make_row(1, "rust services"),
            make_row(2, "   "),
            make_row(3, "python pipelines"),
        ];
        let (records, skipped) = build_records(&rows);
        assert_eq!(records.len(), 2);
        assert_eq!(skipped, 1);
        assert_eq!(records[0].id, "job_1");
        assert_eq!(records[1].id, "job_3");
    }

    #[tokio::test]
    async fn test_sync_mirrors_rows_into_namespace() {
        let index = InMemoryIndex::default();
        let rows = vec![make_row(1, "rust"), make_row(2, "go")];

        let report = sync_records(&index, "job-list", &rows).await.unwrap();
        assert_eq!(report, SyncReport { upserted: 2, skipped: 0 });
        assert_eq!(index.vectors.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_sync_is_idempotent_for_unchanged_data() {
        let index = InMemoryIndex::default();
        let rows = vec![
            make_row(1, "rust backend services"),
            make_row(2, "python data pipelines"),
            make_row(3, "go networking"),
        ];

        sync_records(&index, "job-list", &rows).await.unwrap();
        let first = index.search("job-list", "rust backend", 10).await.unwrap();

        sync_records(&index, "job-list", &rows).await.unwrap();
        let second = index.search("job-list", "rust backend", 10).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_sync_replaces_stale_vectors() {
        let index = InMemoryIndex::default();
        sync_records(&index, "job-list", &[make_row(9, "old role")])
            .await
            .unwrap();

        sync_records(&index, "job-list", &[make_row(1, "new role")])
            .await
            .unwrap();

        let vectors = index.vectors.lock().unwrap();
        assert_eq!(vectors.len(), 1);
        assert!(vectors.contains_key("job_1"));
    }
}
