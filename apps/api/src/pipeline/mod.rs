pub mod hydrator;
pub mod index_sync;
pub mod orchestrator;
pub mod searcher;
