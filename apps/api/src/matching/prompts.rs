// All LLM prompt constants for the matching module.

/// System prompt for skill expansion — enforces JSON-only output.
pub const SKILL_EXPAND_SYSTEM: &str =
    "You are a job-search assistant expanding skill names into related terms \
    that appear in job descriptions.";

/// Skill expansion prompt template. Replace `{skills}` before sending.
pub const SKILL_EXPAND_PROMPT_TEMPLATE: &str = r#"For each of these skills, provide 10-15 related terms that might appear in job descriptions:
{skills}

Rules:
1. The first term must be the skill itself, exactly as written.
2. Include abbreviations and expansions of the skill (e.g. "ELK" covers Elasticsearch, Logstash, Kibana).
3. Later terms must not repeat the skill name or fragments of it.
4. Each term must be distinct.

Return a JSON object where each skill is a key with an array of related terms:
{"Skill Name": ["Skill Name", "related term", "..."]}"#;

/// System prompt for search-query composition.
pub const QUERY_COMPOSE_SYSTEM: &str =
    "You are a job search expert that creates optimized search queries.";

/// Query composition prompt template.
/// Replace: {resume_text}, {target_roles}, {primary_skills}, {location},
///          {job_type}, {additional_preferences}
pub const QUERY_COMPOSE_PROMPT_TEMPLATE: &str = r#"Given a job seeker's resume and preferences, create an optimized search query.

Resume text: {resume_text}

Job preferences:
- Target roles: {target_roles}
- Primary skills: {primary_skills}
- Location: {location}
- Job type: {job_type}
- Additional preferences: {additional_preferences}

Create a concise, relevant search query that captures the essential requirements and preferences.
Focus on key skills, experience level, and job requirements that match the resume.
Return only the query text, nothing else."#;
