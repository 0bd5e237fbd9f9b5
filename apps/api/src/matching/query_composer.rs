//! Query composition — profile text plus preferences distilled into one
//! natural-language query for the vector search. This stage is on the
//! mandatory critical path: failure aborts the request.

use tracing::info;

use crate::errors::AppError;
use crate::llm_client::{CompletionOptions, TextGenerator};
use crate::matching::prompts::{QUERY_COMPOSE_PROMPT_TEMPLATE, QUERY_COMPOSE_SYSTEM};
use crate::models::preferences::Preferences;

/// Profile text is truncated to this prefix to bound prompt cost.
const PROFILE_PREFIX_CHARS: usize = 3000;

pub async fn compose_query(
    generator: &dyn TextGenerator,
    profile_text: &str,
    preferences: &Preferences,
) -> Result<String, AppError> {
    let prompt = QUERY_COMPOSE_PROMPT_TEMPLATE
        .replace("{resume_text}", &truncate_chars(profile_text, PROFILE_PREFIX_CHARS))
        .replace("{target_roles}", &preferences.target_roles.join(", "))
        .replace("{primary_skills}", &preferences.primary_skills.join(", "))
        .replace("{location}", &preferences.preferred_location)
        .replace("{job_type}", preferences.job_type.as_deref().unwrap_or(""))
        .replace(
            "{additional_preferences}",
            preferences.additional_preferences.as_deref().unwrap_or(""),
        );

    let options = CompletionOptions {
        json_mode: false,
        max_tokens: 300,
        temperature: 0.3,
    };

    let query = generator
        .complete(QUERY_COMPOSE_SYSTEM, &prompt, options)
        .await
        .map_err(|e| AppError::UpstreamGeneration(format!("query composition failed: {e}")))?
        .trim()
        .to_string();

    info!("Composed search query: {query}");
    Ok(query)
}

/// Truncates on a char boundary, never mid-codepoint.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_bounds_long_text() {
        let long = "a".repeat(5000);
        assert_eq!(truncate_chars(&long, PROFILE_PREFIX_CHARS).len(), 3000);
    }

    #[test]
    fn test_truncate_chars_keeps_short_text() {
        assert_eq!(truncate_chars("resume", 3000), "resume");
    }

    #[test]
    fn test_truncate_chars_respects_multibyte_boundaries() {
        let text = "é".repeat(10);
        assert_eq!(truncate_chars(&text, 5).chars().count(), 5);
    }
}
