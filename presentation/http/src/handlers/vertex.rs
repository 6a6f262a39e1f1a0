//! Vertex handlers

use axum::extract::{Path, State};
use graph_gateway_core::prelude::*;
use serde_json::Value;
use tracing::{debug, info};

use crate::{ApiError, ApiResponse, AppState, CollectionPath, DocumentPath, JsonBody, Payload};

/// POST /:graph/vertex/:collection
pub async fn create_vertex(
    State(state): State<AppState>,
    Path(path): Path<CollectionPath>,
    JsonBody(body): JsonBody<Value>,
) -> Result<ApiResponse<DocumentMeta>, ApiError> {
    let target = CollectionRef::vertex(path.graph, path.collection);
    let body = Document::try_from(body)?;

    debug!("Creating vertex in {}", target);
    let meta = state.module.save_vertex(&target, body).await?;

    info!("Created vertex {} in graph {}", meta.id, target.graph);
    Ok(ApiResponse::ok(Payload::Vertex(meta)))
}

/// GET /:graph/vertex/:collection/:key
pub async fn get_vertex(
    State(state): State<AppState>,
    Path(path): Path<DocumentPath>,
) -> Result<ApiResponse<Document>, ApiError> {
    debug!("Loading vertex {}/{} from graph {}", path.collection, path.key, path.graph);

    let document = state.module.document(&path.vertex(), &path.key).await?;
    Ok(ApiResponse::ok(Payload::Vertex(document)))
}

/// PUT /:graph/vertex/:collection/:key
pub async fn replace_vertex(
    State(state): State<AppState>,
    Path(path): Path<DocumentPath>,
    JsonBody(body): JsonBody<Value>,
) -> Result<ApiResponse<DocumentMeta>, ApiError> {
    let body = Document::try_from(body)?;

    let meta = state.module.replace(&path.vertex(), &path.key, body).await?;

    info!("Replaced vertex {} in graph {}", meta.id, path.graph);
    Ok(ApiResponse::ok(Payload::Vertex(meta)))
}

/// PATCH /:graph/vertex/:collection/:key
pub async fn update_vertex(
    State(state): State<AppState>,
    Path(path): Path<DocumentPath>,
    JsonBody(body): JsonBody<Value>,
) -> Result<ApiResponse<DocumentMeta>, ApiError> {
    let body = Document::try_from(body)?;

    let meta = state.module.update(&path.vertex(), &path.key, body).await?;

    info!("Updated vertex {} in graph {}", meta.id, path.graph);
    Ok(ApiResponse::ok(Payload::Vertex(meta)))
}

/// DELETE /:graph/vertex/:collection/:key
///
/// Edges pointing at or away from the vertex are removed with it.
pub async fn delete_vertex(
    State(state): State<AppState>,
    Path(path): Path<DocumentPath>,
) -> Result<ApiResponse<bool>, ApiError> {
    let removed = state.module.remove(&path.vertex(), &path.key).await?;

    info!("Deleted vertex {}/{} from graph {}", path.collection, path.key, path.graph);
    Ok(ApiResponse::ok(Payload::Vertex(removed)))
}
