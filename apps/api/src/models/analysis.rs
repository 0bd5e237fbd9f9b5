use serde::{Deserialize, Serialize};

/// Per-job gap and tailoring analysis generated for the top-K search results.
///
/// `Default` is the documented empty terminal state: a job whose analysis
/// failed, timed out, or was skipped still appears in the response carrying
/// this default. Both top-level keys are required on decode — an output
/// missing either is a schema violation and falls back to the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FitAnalysis {
    pub missing_skills: Vec<MissingSkill>,
    pub resume_suggestions: ResumeSuggestions,
}

impl FitAnalysis {
    pub fn is_empty(&self) -> bool {
        self.missing_skills.is_empty()
            && self.resume_suggestions.highlight.is_empty()
            && self.resume_suggestions.consider_removing.is_empty()
    }
}

/// One skill present in the job description but absent from the profile,
/// with a free-text learning-time estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingSkill {
    pub skill: String,
    pub learn_time_estimate: String,
    /// Example project or certification to close the gap, when suggested.
    #[serde(default)]
    pub example: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeSuggestions {
    #[serde(default)]
    pub highlight: Vec<String>,
    #[serde(default)]
    pub consider_removing: Vec<String>,
}

/// Top gaps consolidated across one search's analyses. Persisted as a JSON
/// blob on the search record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedGaps {
    pub top_gaps: Vec<GapEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapEntry {
    pub skill: String,
    pub learn_time_estimate: String,
}

/// Cross-search focus skills from the recency mode: the user's last-7-days
/// searches synthesized into the top five skills to develop, with a
/// user-facing rationale per skill.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecentGapInsights {
    pub top_overall_gaps: Vec<GapInsight>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapInsight {
    pub skill: String,
    pub learn_time_estimate: String,
    pub reason: String,
    #[serde(default)]
    pub example_project_certification: Option<String>,
}
