use std::sync::Arc;

use sqlx::PgPool;

use crate::cache::SearchCache;
use crate::config::Config;
use crate::listings::ListingsSource;
use crate::llm_client::TextGenerator;
use crate::pipeline::orchestrator::SearchOutcome;
use crate::vector_index::VectorIndex;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// External services hang off trait objects so the pipeline can run against
/// deterministic stand-ins in tests. The result cache lives here too — it is
/// injected, bounded, and owned by the process, never a global.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub generator: Arc<dyn TextGenerator>,
    pub index: Arc<dyn VectorIndex>,
    pub listings: Arc<dyn ListingsSource>,
    pub cache: Arc<SearchCache<SearchOutcome>>,
    pub config: Config,
}
