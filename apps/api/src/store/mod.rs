//! Typed sqlx queries for the job, search, and user tables. No business
//! logic lives here — ordering and ranking decisions belong to the pipeline.

pub mod jobs;
pub mod searches;
pub mod users;
