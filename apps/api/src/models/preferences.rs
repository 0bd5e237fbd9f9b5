use serde::{Deserialize, Serialize};

/// Request-scoped job-search preferences, combined with the stored profile
/// text to drive both the keyword pipeline and query composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    pub target_roles: Vec<String>,
    #[serde(default)]
    pub primary_skills: Vec<String>,
    #[serde(default)]
    pub preferred_location: String,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub additional_preferences: Option<String>,
}
