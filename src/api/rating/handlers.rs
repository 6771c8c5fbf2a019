use crate::api::models::*;
use crate::storage::{DeleteResult, Document, FindQuery, InsertResult, parse_id};
use axum::{
    Json,
    extract::{Path, Query, rejection::JsonRejection},
};
use tracing::info;

pub async fn add_rating_handler(
    Ready(db): Ready,
    body: Result<Json<Document>, JsonRejection>,
) -> Result<Json<InsertResult>, AppError> {
    const ROUTE: &str = "POST /ratings";
    const FAILED: &str = "Failed to add rating";

    let Json(rating) = body.map_err(AppError::body(ROUTE, FAILED))?;
    let result = db
        .ratings
        .insert_one(rating)
        .await
        .map_err(AppError::storage(ROUTE, FAILED))?;

    info!(id = %result.inserted_id, "Rating added");
    Ok(Json(result))
}

pub async fn reviewer_ratings_handler(
    Ready(db): Ready,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<Document>>, AppError> {
    let Some(email) = query.email() else {
        return Ok(Json(Vec::new()));
    };

    let ratings = db
        .ratings
        .find(FindQuery::matching(REVIEWER_EMAIL, email))
        .await
        .map_err(AppError::storage("GET /ratings", "Failed to fetch ratings"))?;

    Ok(Json(ratings))
}

pub async fn delete_rating_handler(
    Ready(db): Ready,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, AppError> {
    const ROUTE: &str = "DELETE /ratings/{id}";
    const FAILED: &str = "Failed to delete rating";

    let id = parse_id(&id).map_err(AppError::storage(ROUTE, FAILED))?;
    let result = db
        .ratings
        .delete_by_id(id)
        .await
        .map_err(AppError::storage(ROUTE, FAILED))?;

    info!(%id, deleted = result.deleted_count, "Rating deleted");
    Ok(Json(result))
}
