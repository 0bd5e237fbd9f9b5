//! Gap consolidation — two synthesis modes over fit analyses.
//!
//! Per-search: the missing skills found across one search's analyzed jobs are
//! merged into the three most impactful gaps and persisted on the search
//! record. Recency: a user's last week of search records is synthesized into
//! the top five cross-search focus skills. Both modes are best-effort and degrade to the empty value rather
//! than failing the caller.

use serde_json::Value;
use tracing::{debug, warn};

use crate::analysis::prompts::{
    GAP_CONSOLIDATE_PROMPT_TEMPLATE, GAP_CONSOLIDATE_SYSTEM, RECENT_GAPS_PROMPT_TEMPLATE,
    RECENT_GAPS_SYSTEM,
};
use crate::llm_client::{parse_json_response, CompletionOptions, TextGenerator};
use crate::models::analysis::{ConsolidatedGaps, GapInsight, RecentGapInsights};
use crate::models::job::AnalyzedJob;
use crate::models::job::SearchRow;

/// Lists every missing skill across the analyzed jobs, one line per skill
/// under its job title. `None` when no job produced a non-empty analysis —
/// there is nothing to consolidate and no call should be made.
pub fn summarize_gaps(jobs: &[AnalyzedJob]) -> Option<String> {
    let mut lines = Vec::new();
    for job in jobs {
        if job.analysis.missing_skills.is_empty() {
            continue;
        }
        lines.push(format!("{} at {}:", job.hydrated.job.title, job.hydrated.job.company));
        for gap in &job.analysis.missing_skills {
            lines.push(format!("- {} ({})", gap.skill, gap.learn_time_estimate));
        }
    }
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Consolidates one search's skill gaps into a ranked top list.
pub async fn consolidate_search_gaps(
    generator: &dyn TextGenerator,
    jobs: &[AnalyzedJob],
) -> ConsolidatedGaps {
    let summary = match summarize_gaps(jobs) {
        Some(summary) => summary,
        None => {
            debug!("No skill gaps to consolidate");
            return ConsolidatedGaps::default();
        }
    };

    let prompt = GAP_CONSOLIDATE_PROMPT_TEMPLATE.replace("{gaps_summary}", &summary);
    let options = CompletionOptions {
        json_mode: true,
        max_tokens: 600,
        temperature: 0.3,
    };

    let raw = match generator.complete(GAP_CONSOLIDATE_SYSTEM, &prompt, options).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Gap consolidation call failed: {e}");
            return ConsolidatedGaps::default();
        }
    };

    match parse_json_response::<ConsolidatedGaps>(&raw) {
        Ok(gaps) => gaps,
        Err(e) => {
            warn!("Gap consolidation output failed validation: {e}");
            ConsolidatedGaps::default()
        }
    }
}

/// One line per recent search: roles, query, and any stored consolidated
/// gaps. Pure so the prompt content is testable.
pub fn summarize_recent_searches(searches: &[SearchRow]) -> String {
    searches
        .iter()
        .map(|search| {
            let mut line = format!(
                "Roles: {}; query: \"{}\"",
                search.target_roles, search.query
            );
            if let Some(gaps) = &search.consolidated_gaps {
                if let Some(entries) = gaps.get("top_gaps").and_then(Value::as_array) {
                    let skills: Vec<&str> = entries
                        .iter()
                        .filter_map(|e| e.get("skill").and_then(Value::as_str))
                        .collect();
                    if !skills.is_empty() {
                        line.push_str(&format!("; gaps found: {}", skills.join(", ")));
                    }
                }
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Synthesizes cross-search focus skills from the user's recent searches.
/// Items that fail validation are dropped individually; a fully malformed
/// output degrades to the empty value.
pub async fn recent_gap_insights(
    generator: &dyn TextGenerator,
    profile_text: &str,
    searches: &[SearchRow],
) -> RecentGapInsights {
    if searches.is_empty() {
        return RecentGapInsights::default();
    }

    let prompt = RECENT_GAPS_PROMPT_TEMPLATE
        .replace("{resume_text}", profile_text)
        .replace("{recent_summary}", &summarize_recent_searches(searches));
    let options = CompletionOptions {
        json_mode: true,
        max_tokens: 1200,
        temperature: 0.5,
    };

    let raw = match generator.complete(RECENT_GAPS_SYSTEM, &prompt, options).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Recent-gap insights call failed: {e}");
            return RecentGapInsights::default();
        }
    };

    let value = match parse_json_response::<Value>(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("Recent-gap insights output was not JSON: {e}");
            return RecentGapInsights::default();
        }
    };

    let top_overall_gaps = value
        .get("top_overall_gaps")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match serde_json::from_value::<GapInsight>(item.clone()) {
                    Ok(insight) => Some(insight),
                    Err(e) => {
                        warn!("Dropping malformed gap insight: {e}");
                        None
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    RecentGapInsights { top_overall_gaps }
}
