use crate::api::models::AppState;
use crate::api::rating::handlers::*;
use axum::{
    Router,
    routing::{delete, post},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ratings", post(add_rating_handler).get(reviewer_ratings_handler))
        .route("/ratings/{id}", delete(delete_rating_handler))
}
