pub mod models;
pub mod property;
pub mod rating;

// Re-exports
pub use models::*;

use axum::{Router, routing::get};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Liveness text for `GET /`; answers even while storage is down.
pub async fn root_handler() -> &'static str {
    "api working fine!"
}

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .merge(property::routes())
        .merge(rating::routes())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
