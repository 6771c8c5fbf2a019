use crate::storage::{Collections, StorageContext, StoreError};
use axum::{
    Json,
    extract::{FromRequestParts, rejection::JsonRejection},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

/// Field the owner filter matches on
pub const OWNER_EMAIL: &str = "owner_email";
/// Field properties are ordered by, newest first
pub const POSTED_DATE: &str = "postedDate";
/// Field the reviewer filter matches on
pub const REVIEWER_EMAIL: &str = "reviewerEmail";

/// How many properties the latest listing returns
pub const LATEST_LIMIT: i64 = 6;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<StorageContext>,
}

impl AppState {
    pub fn new(storage: Arc<StorageContext>) -> Self {
        Self { storage }
    }
}

/// `?email=` filter shared by the owner and reviewer listings
#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

impl EmailQuery {
    /// The email to filter on; absent or blank means the listing matches nothing.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.trim().is_empty())
    }
}

/// Collections handed to a handler once storage is ready.
///
/// Extracting this is the readiness guard: a request arriving before the
/// database connection completes is rejected before the handler runs.
pub struct Ready(pub Collections);

impl FromRequestParts<AppState> for Ready {
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state
            .storage
            .collections()
            .cloned()
            .map(Ready)
            .ok_or(AppError::NotReady)
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database not initialized")]
    NotReady,

    /// A storage call failed; only `message` reaches the caller.
    #[error("{message}")]
    Storage {
        route: String,
        message: &'static str,
        #[source]
        source: StoreError,
    },

    /// The request body was not a JSON object; reported like a storage failure.
    #[error("{message}")]
    Body {
        route: String,
        message: &'static str,
        #[source]
        source: JsonRejection,
    },
}

impl AppError {
    pub const NOT_READY_CODE: &'static str = "DB_NOT_INITIALIZED";

    pub fn storage(
        route: impl Into<String>,
        message: &'static str,
    ) -> impl FnOnce(StoreError) -> Self {
        let route = route.into();
        move |source| AppError::Storage {
            route,
            message,
            source,
        }
    }

    pub fn body(
        route: impl Into<String>,
        message: &'static str,
    ) -> impl FnOnce(JsonRejection) -> Self {
        let route = route.into();
        move |source| AppError::Body {
            route,
            message,
            source,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match self {
            AppError::NotReady => ErrorResponse {
                message: AppError::NotReady.to_string(),
                code: Some(AppError::NOT_READY_CODE),
            },
            AppError::Storage {
                route,
                message,
                source,
            } => {
                error!(route = %route, error = %source, "{}", message);
                ErrorResponse {
                    message: message.to_string(),
                    code: None,
                }
            }
            AppError::Body {
                route,
                message,
                source,
            } => {
                error!(route = %route, error = %source, "{}: unreadable body", message);
                ErrorResponse {
                    message: message.to_string(),
                    code: None,
                }
            }
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
