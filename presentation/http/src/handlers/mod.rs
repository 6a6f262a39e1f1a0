//! HTTP request handlers

pub mod edge;
pub mod graph;
pub mod health;
pub mod vertex;

use crate::ApiError;
use axum::http::Uri;

/// Fallback for paths no route matches
pub async fn unknown_path(uri: Uri) -> ApiError {
    ApiError::UnknownPath(uri.path().to_string())
}
