pub mod keyword_matcher;
pub mod prompts;
pub mod query_composer;
pub mod skill_expander;
