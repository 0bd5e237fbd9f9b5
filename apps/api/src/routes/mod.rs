pub mod handlers;
pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/search", post(handlers::handle_search))
        .route("/api/v1/search/:search_id", get(handlers::handle_get_search))
        .route(
            "/api/v1/insights/recent-gaps/:user_id",
            get(handlers::handle_recent_gaps),
        )
        .route(
            "/api/v1/users/:user_id/searches",
            get(handlers::handle_list_searches),
        )
        .route(
            "/api/v1/users/:user_id/profile",
            put(handlers::handle_update_profile),
        )
        .with_state(state)
}
