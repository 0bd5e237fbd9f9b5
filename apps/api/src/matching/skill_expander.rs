//! Skill expansion — turns raw skill names into synonym/abbreviation term
//! sets via one generative call.
//!
//! Expansion is best-effort: any generation or parse failure degrades to the
//! identity map, never failing the search.

use std::collections::HashMap;

use tracing::warn;

use crate::llm_client::{parse_json_response, CompletionOptions, TextGenerator};
use crate::matching::prompts::{SKILL_EXPAND_PROMPT_TEMPLATE, SKILL_EXPAND_SYSTEM};

/// skill → ordered related terms. Invariants, enforced by normalization:
/// the first term equals the skill verbatim, and no later term is a
/// case-insensitive substring of the skill name.
pub type ExpandedSkillMap = HashMap<String, Vec<String>>;

/// Expands each skill into 10-15 related terms the keyword matcher can scan
/// for. Falls back to `{skill: [skill]}` on any failure.
pub async fn expand_skills(
    generator: &dyn TextGenerator,
    skills: &[String],
) -> ExpandedSkillMap {
    if skills.is_empty() {
        return HashMap::new();
    }

    let prompt = SKILL_EXPAND_PROMPT_TEMPLATE.replace("{skills}", &skills.join(", "));
    let options = CompletionOptions {
        json_mode: true,
        max_tokens: 1024,
        temperature: 0.3,
    };

    let raw = match generator.complete(SKILL_EXPAND_SYSTEM, &prompt, options).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Skill expansion call failed, falling back to identity map: {e}");
            return identity_map(skills);
        }
    };

    match parse_json_response::<HashMap<String, Vec<String>>>(&raw) {
        Ok(expanded) => normalize_expansion(skills, expanded),
        Err(e) => {
            warn!("Skill expansion output unparseable, falling back to identity map: {e}");
            identity_map(skills)
        }
    }
}

fn identity_map(skills: &[String]) -> ExpandedSkillMap {
    skills
        .iter()
        .map(|s| (s.clone(), vec![s.clone()]))
        .collect()
}

/// Enforces the term-list invariants on model output. The skill itself always
/// leads (case preserved, inserted if the model dropped it); later terms that
/// merely restate a fragment of the skill name are removed, as are duplicates.
fn normalize_expansion(
    skills: &[String],
    mut expanded: HashMap<String, Vec<String>>,
) -> ExpandedSkillMap {
    let mut normalized = HashMap::with_capacity(skills.len());

    for skill in skills {
        let skill_lower = skill.to_lowercase();
        let model_terms = expanded.remove(skill).unwrap_or_default();

        let mut terms = vec![skill.clone()];
        let mut seen = vec![skill_lower.clone()];

        for term in model_terms {
            let term = term.trim().to_string();
            if term.is_empty() {
                continue;
            }
            let term_lower = term.to_lowercase();
            if skill_lower.contains(&term_lower) || seen.contains(&term_lower) {
                continue;
            }
            seen.push(term_lower);
            terms.push(term);
        }

        normalized.insert(skill.clone(), terms);
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::llm_client::LlmError;

    struct CannedGenerator(Result<String, ()>);

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn complete(
            &self,
            _system: &str,
            _prompt: &str,
            _options: CompletionOptions,
        ) -> Result<String, LlmError> {
            self.0.clone().map_err(|_| LlmError::EmptyContent)
        }
    }

    fn skills(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_term_is_skill_verbatim_case_preserved() {
        let expanded = HashMap::from([(
            "PyTorch".to_string(),
            vec!["pytorch".to_string(), "torch".to_string(), "deep learning".to_string()],
        )]);
        let normalized = normalize_expansion(&skills(&["PyTorch"]), expanded);
        let terms = &normalized["PyTorch"];
        assert_eq!(terms[0], "PyTorch");
        // "pytorch" and "torch" are substrings of the skill name; only the
        // genuine synonym survives.
        assert_eq!(terms[1..], ["deep learning".to_string()]);
    }

    #[test]
    fn test_substring_fragments_of_skill_are_dropped() {
        let expanded = HashMap::from([(
            "Python".to_string(),
            vec![
                "Python".to_string(),
                "py".to_string(),
                "Django".to_string(),
                "PYTHON".to_string(),
            ],
        )]);
        let normalized = normalize_expansion(&skills(&["Python"]), expanded);
        assert_eq!(
            normalized["Python"],
            vec!["Python".to_string(), "Django".to_string()]
        );
    }

    #[test]
    fn test_abbreviation_expansions_are_kept() {
        let expanded = HashMap::from([(
            "ELK".to_string(),
            vec![
                "ELK".to_string(),
                "Elasticsearch".to_string(),
                "Logstash".to_string(),
                "Kibana".to_string(),
            ],
        )]);
        let normalized = normalize_expansion(&skills(&["ELK"]), expanded);
        assert_eq!(normalized["ELK"].len(), 4);
        assert_eq!(normalized["ELK"][0], "ELK");
    }

    #[test]
    fn test_skill_missing_from_model_output_gets_identity_entry() {
        let normalized = normalize_expansion(&skills(&["SQL"]), HashMap::new());
        assert_eq!(normalized["SQL"], vec!["SQL".to_string()]);
    }

    #[test]
    fn test_duplicate_terms_deduplicated_case_insensitively() {
        let expanded = HashMap::from([(
            "SQL".to_string(),
            vec![
                "PostgreSQL".to_string(),
                "postgresql".to_string(),
                "MySQL".to_string(),
            ],
        )]);
        let normalized = normalize_expansion(&skills(&["SQL"]), expanded);
        assert_eq!(
            normalized["SQL"],
            vec![
                "SQL".to_string(),
                "PostgreSQL".to_string(),
                "MySQL".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_generation_failure_falls_back_to_identity_map() {
        let generator = CannedGenerator(Err(()));
        let expanded = expand_skills(&generator, &skills(&["Rust", "Go"])).await;
        assert_eq!(expanded["Rust"], vec!["Rust".to_string()]);
        assert_eq!(expanded["Go"], vec!["Go".to_string()]);
    }

    #[tokio::test]
    async fn test_unparseable_output_falls_back_to_identity_map() {
        let generator = CannedGenerator(Ok("I could not produce JSON, sorry.".to_string()));
        let expanded = expand_skills(&generator, &skills(&["Rust"])).await;
        assert_eq!(expanded["Rust"], vec!["Rust".to_string()]);
    }
}
