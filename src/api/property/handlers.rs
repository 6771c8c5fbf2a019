use crate::api::models::*;
use crate::storage::{DeleteResult, Document, FindQuery, InsertResult, UpdateResult, parse_id};
use axum::{
    Json,
    extract::{MatchedPath, Path, Query, rejection::JsonRejection},
};
use tracing::info;

/// Serves both create paths; failures are logged under the path that matched.
pub async fn add_property_handler(
    Ready(db): Ready,
    path: MatchedPath,
    body: Result<Json<Document>, JsonRejection>,
) -> Result<Json<InsertResult>, AppError> {
    const FAILED: &str = "Failed to add property";
    let route = format!("POST {}", path.as_str());

    let Json(property) = body.map_err(AppError::body(route.as_str(), FAILED))?;
    let result = db
        .properties
        .insert_one(property)
        .await
        .map_err(AppError::storage(route, FAILED))?;

    info!(id = %result.inserted_id, "Property added");
    Ok(Json(result))
}

pub async fn all_properties_handler(Ready(db): Ready) -> Result<Json<Vec<Document>>, AppError> {
    let properties = db
        .properties
        .find(FindQuery::all().newest_first(POSTED_DATE))
        .await
        .map_err(AppError::storage("GET /all-properties", "Failed to fetch properties"))?;

    Ok(Json(properties))
}

pub async fn latest_properties_handler(Ready(db): Ready) -> Result<Json<Vec<Document>>, AppError> {
    let properties = db
        .properties
        .find(FindQuery::all().newest_first(POSTED_DATE).limit(LATEST_LIMIT))
        .await
        .map_err(AppError::storage(
            "GET /latest-properties",
            "Failed to fetch latest properties",
        ))?;

    Ok(Json(properties))
}

/// Responds with `null` when nothing matches.
pub async fn get_property_handler(
    Ready(db): Ready,
    Path(id): Path<String>,
) -> Result<Json<Option<Document>>, AppError> {
    const ROUTE: &str = "GET /property/{id}";
    const FAILED: &str = "Failed to fetch property";

    let id = parse_id(&id).map_err(AppError::storage(ROUTE, FAILED))?;
    let property = db
        .properties
        .find_by_id(id)
        .await
        .map_err(AppError::storage(ROUTE, FAILED))?;

    Ok(Json(property))
}

pub async fn owner_properties_handler(
    Ready(db): Ready,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<Document>>, AppError> {
    let Some(email) = query.email() else {
        return Ok(Json(Vec::new()));
    };

    let properties = db
        .properties
        .find(FindQuery::matching(OWNER_EMAIL, email))
        .await
        .map_err(AppError::storage("GET /property", "Failed to fetch user properties"))?;

    Ok(Json(properties))
}

pub async fn delete_property_handler(
    Ready(db): Ready,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, AppError> {
    const ROUTE: &str = "DELETE /property/{id}";
    const FAILED: &str = "Failed to delete property";

    let id = parse_id(&id).map_err(AppError::storage(ROUTE, FAILED))?;
    let result = db
        .properties
        .delete_by_id(id)
        .await
        .map_err(AppError::storage(ROUTE, FAILED))?;

    info!(%id, deleted = result.deleted_count, "Property deleted");
    Ok(Json(result))
}

/// Sets only the supplied fields; everything else on the document is kept.
pub async fn update_property_handler(
    Ready(db): Ready,
    Path(id): Path<String>,
    body: Result<Json<Document>, JsonRejection>,
) -> Result<Json<UpdateResult>, AppError> {
    const ROUTE: &str = "PATCH /property/{id}";
    const FAILED: &str = "Failed to update property";

    let id = parse_id(&id).map_err(AppError::storage(ROUTE, FAILED))?;
    let Json(fields) = body.map_err(AppError::body(ROUTE, FAILED))?;
    let result = db
        .properties
        .update_by_id(id, fields)
        .await
        .map_err(AppError::storage(ROUTE, FAILED))?;

    info!(
        %id,
        matched = result.matched_count,
        modified = result.modified_count,
        "Property updated"
    );
    Ok(Json(result))
}
