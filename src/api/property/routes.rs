use crate::api::models::AppState;
use crate::api::property::handlers::*;
use axum::{
    Router,
    routing::{get, post},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        // Both paths create; existing clients use either one.
        .route("/property", post(add_property_handler).get(owner_properties_handler))
        .route("/properties", post(add_property_handler))
        .route("/all-properties", get(all_properties_handler))
        .route("/latest-properties", get(latest_properties_handler))
        .route(
            "/property/{id}",
            get(get_property_handler)
                .delete(delete_property_handler)
                .patch(update_property_handler),
        )
}
