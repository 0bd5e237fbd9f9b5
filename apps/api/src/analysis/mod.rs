pub mod fit_analyzer;
pub mod gap_consolidator;
mod prompts;
