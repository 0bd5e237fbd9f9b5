//! Per-job fit analysis — the fan-out stage. The top-K hydrated jobs are
//! analyzed concurrently; any single failure (call error, schema violation,
//! timeout, panic) degrades that one job to the empty default analysis and
//! never aborts the request.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::analysis::prompts::{FIT_ANALYSIS_PROMPT_TEMPLATE, FIT_ANALYSIS_SYSTEM};
use crate::llm_client::{parse_json_response, CompletionOptions, TextGenerator};
use crate::models::analysis::FitAnalysis;
use crate::models::job::{HydratedJob, JobRow};

pub const DEFAULT_ANALYZE_TOP_K: usize = 5;
const TASK_TIMEOUT: Duration = Duration::from_secs(60);
const PROFILE_PREFIX_CHARS: usize = 3000;
const DESCRIPTION_PREFIX_CHARS: usize = 4000;

/// Analyzes one job against the profile. Infallible by contract: every
/// failure path returns the empty default.
pub async fn analyze_job_fit(
    generator: &dyn TextGenerator,
    profile_text: &str,
    job: &JobRow,
) -> FitAnalysis {
    // Nothing to compare against; don't spend a generative call.
    if job.title.trim().is_empty() || job.description.trim().is_empty() {
        debug!("Skipping analysis for job {}: missing title or description", job.id);
        return FitAnalysis::default();
    }

    let prompt = FIT_ANALYSIS_PROMPT_TEMPLATE
        .replace("{resume_text}", &truncate_chars(profile_text, PROFILE_PREFIX_CHARS))
        .replace("{job_title}", &job.title)
        .replace(
            "{job_description}",
            &truncate_chars(&job.description, DESCRIPTION_PREFIX_CHARS),
        );

    let options = CompletionOptions {
        json_mode: true,
        max_tokens: 500,
        temperature: 0.3,
    };

    let raw = match generator.complete(FIT_ANALYSIS_SYSTEM, &prompt, options).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Fit analysis call failed for job {}: {e}", job.id);
            return FitAnalysis::default();
        }
    };

    match parse_json_response::<FitAnalysis>(&raw) {
        Ok(analysis) => analysis,
        Err(e) => {
            warn!("Fit analysis output for job {} failed validation: {e}", job.id);
            FitAnalysis::default()
        }
    }
}

/// Fans out analysis over the first `top_k` jobs and collects results keyed
/// by job id. Jobs whose task times out or panics simply have no entry —
/// the merge step fills in the default.
pub async fn analyze_top_jobs(
    generator: Arc<dyn TextGenerator>,
    profile_text: &str,
    jobs: &[HydratedJob],
    top_k: usize,
) -> HashMap<i64, FitAnalysis> {
    let mut set = JoinSet::new();

    for hydrated in jobs.iter().take(top_k) {
        let generator = Arc::clone(&generator);
        let profile = profile_text.to_string();
        let row = hydrated.job.clone();
        set.spawn(async move {
            let analysis =
                match tokio::time::timeout(TASK_TIMEOUT, analyze_job_fit(generator.as_ref(), &profile, &row))
                    .await
                {
                    Ok(analysis) => analysis,
                    Err(_) => {
                        warn!("Fit analysis for job {} timed out", row.id);
                        FitAnalysis::default()
                    }
                };
            (row.id, analysis)
        });
    }

    let mut analyses = HashMap::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((job_id, analysis)) => {
                analyses.insert(job_id, analysis);
            }
            Err(e) => warn!("Fit analysis task aborted: {e}"),
        }
    }
    analyses
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::llm_client::LlmError;
    use crate::pipeline::index_sync::tests::make_row;

    pub const VALID_ANALYSIS_JSON: &str = r#"{
        "missing_skills": [
            {"skill": "Kubernetes", "learn_time_estimate": "2-4 weeks, 2 hours per day"}
        ],
        "resume_suggestions": {"highlight": ["Terraform migration"], "consider_removing": []}
    }"#;

    /// Returns a canned response, except for prompts containing a poison
    /// marker, which fail. Counts invocations.
    pub struct CannedAnalyzer {
        pub response: String,
        pub poison: Option<String>,
        pub calls: AtomicUsize,
    }

    impl CannedAnalyzer {
        pub fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                poison: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_poison(response: &str, poison: &str) -> Self {
            Self {
                response: response.to_string(),
                poison: Some(poison.to_string()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for CannedAnalyzer {
        async fn complete(
            &self,
            _system: &str,
            prompt: &str,
            _options: CompletionOptions,
        ) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(poison) = &self.poison {
                if prompt.contains(poison.as_str()) {
                    return Err(LlmError::EmptyContent);
                }
            }
            Ok(self.response.clone())
        }
    }

    #[tokio::test]
    async fn test_analyze_job_fit_parses_valid_output() {
        let generator = CannedAnalyzer::new(VALID_ANALYSIS_JSON);
        let row = make_row(1, "We need Kubernetes experience");

        let analysis = analyze_job_fit(&generator, "resume text", &row).await;
        assert_eq!(analysis.missing_skills[0].skill, "Kubernetes");
    }

    #[tokio::test]
    async fn test_empty_description_skips_without_calling_generator() {
        let generator = CannedAnalyzer::new(VALID_ANALYSIS_JSON);
        let row = make_row(1, "   ");

        let analysis = analyze_job_fit(&generator, "resume text", &row).await;
        assert!(analysis.is_empty());
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_schema_violation_degrades_to_default() {
        // Valid JSON, but missing the required resume_suggestions key.
        let generator = CannedAnalyzer::new(r#"{"missing_skills": []}"#);
        let row = make_row(1, "description");

        let analysis = analyze_job_fit(&generator, "resume text", &row).await;
        assert_eq!(analysis, FitAnalysis::default());
    }

    #[tokio::test]
    async fn test_non_json_output_degrades_to_default() {
        let generator = CannedAnalyzer::new("I'd be happy to analyze this job!");
        let row = make_row(1, "description");

        let analysis = analyze_job_fit(&generator, "resume text", &row).await;
        assert_eq!(analysis, FitAnalysis::default());
    }

    #[tokio::test]
    async fn test_fan_out_covers_only_top_k() {
        let generator: Arc<dyn TextGenerator> = Arc::new(CannedAnalyzer::new(VALID_ANALYSIS_JSON));
        let jobs: Vec<HydratedJob> = (1..=8)
            .map(|i| HydratedJob::new(make_row(i, "description"), 0.5))
            .collect();

        let analyses = analyze_top_jobs(generator, "resume", &jobs, DEFAULT_ANALYZE_TOP_K).await;
        assert_eq!(analyses.len(), 5);
        assert!(analyses.contains_key(&1));
        assert!(!analyses.contains_key(&6));
    }
}
