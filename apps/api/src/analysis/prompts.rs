// All LLM prompt constants for the analysis module.

/// System prompt for per-job fit analysis — enforces JSON-only output.
pub const FIT_ANALYSIS_SYSTEM: &str =
    "You are a career coach comparing a candidate's resume against a job \
    description to find skill gaps and resume tailoring opportunities.";

/// Fit analysis prompt template.
/// Replace: {resume_text}, {job_title}, {job_description}
pub const FIT_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Compare this resume against the job posting below.

Resume: {resume_text}

Job title: {job_title}
Job description: {job_description}

Identify:
1. Around 3 skills the job requires that the resume does not show, each with a realistic learning-time estimate (e.g. "2-4 weeks, 2 hours per day") and, where useful, an example project or certification.
2. 2-3 resume items worth highlighting for this job, and 1-2 items worth removing.
Any list may be empty if nothing applies.

Return a JSON object with exactly this shape:
{"missing_skills": [{"skill": "...", "learn_time_estimate": "...", "example": "..."}], "resume_suggestions": {"highlight": ["..."], "consider_removing": ["..."]}}"#;

/// System prompt for per-search gap consolidation.
pub const GAP_CONSOLIDATE_SYSTEM: &str =
    "You are a career coach summarizing skill gaps across several job matches \
    into one prioritized list.";

/// Gap consolidation prompt template. Replace `{gaps_summary}`.
pub const GAP_CONSOLIDATE_PROMPT_TEMPLATE: &str = r#"These skill gaps were found while comparing one candidate against their top job matches:

{gaps_summary}

Merge duplicates and near-duplicates, then rank by how often each gap appears and how central it is to the roles. Return the 3 most impactful gaps, each with a single synthesized learning-time estimate.

Return a JSON object with exactly this shape:
{"top_gaps": [{"skill": "...", "learn_time_estimate": "..."}]}"#;

/// System prompt for cross-search recent-gap insights.
pub const RECENT_GAPS_SYSTEM: &str =
    "You are a career coach advising a job seeker on which skills to develop \
    next, based on their recent job searches.";

/// Recent-gap insights prompt template.
/// Replace: {resume_text}, {recent_summary}
pub const RECENT_GAPS_PROMPT_TEMPLATE: &str = r#"A job seeker ran these searches over the last week:

{recent_summary}

Their resume: {resume_text}

Synthesize the five skills that would most improve their fit for the roles they keep searching for. For each skill give a learning-time estimate, a short reason grounded in their searches, and where useful an example project or certification.

Return a JSON object with exactly this shape:
{"top_overall_gaps": [{"skill": "...", "learn_time_estimate": "...", "reason": "...", "example_project_certification": "..."}]}"#;
