//! Edge definition and edge handlers

use axum::extract::{Path, State};
use graph_gateway_core::prelude::*;
use serde_json::Value;
use tracing::{debug, info};

use crate::{ApiError, ApiResponse, AppState, CollectionPath, DocumentPath, JsonBody, Payload};

/// Pull `_from` and `_to` out of an edge body; both must be non-empty strings
pub fn edge_endpoints(body: &Document) -> Result<(String, String), GraphError> {
    let endpoint = |name: &str| body.str_attribute(name).filter(|value| !value.is_empty());

    match (endpoint("_from"), endpoint("_to")) {
        (Some(from), Some(to)) => Ok((from.to_string(), to.to_string())),
        _ => Err(GraphError::InvalidEdge("edge body needs _from and _to".to_string())),
    }
}

/// POST /:graph/edge
pub async fn create_edge_definition(
    State(state): State<AppState>,
    Path(graph): Path<String>,
    JsonBody(definition): JsonBody<EdgeDefinition>,
) -> Result<ApiResponse<GraphInfo>, ApiError> {
    debug!("Adding edge definition {} to graph {}", definition.collection, graph);

    let info = state.module.extend_edge_definitions(&graph, definition).await?;
    Ok(ApiResponse::ok(Payload::Graph(info)))
}

/// POST /:graph/edge/:collection
pub async fn create_edge(
    State(state): State<AppState>,
    Path(path): Path<CollectionPath>,
    JsonBody(body): JsonBody<Value>,
) -> Result<ApiResponse<DocumentMeta>, ApiError> {
    let target = CollectionRef::edge(path.graph, path.collection);
    let body = Document::try_from(body)?;
    let (from, to) = edge_endpoints(&body)?;

    debug!("Creating edge {} -> {} in {}", from, to, target);
    let meta = state.module.save_edge(&target, &from, &to, body).await?;

    info!("Created edge {} in graph {}", meta.id, target.graph);
    Ok(ApiResponse::ok(Payload::Edge(meta)))
}

/// GET /:graph/edge/:collection/:key
pub async fn get_edge(
    State(state): State<AppState>,
    Path(path): Path<DocumentPath>,
) -> Result<ApiResponse<Document>, ApiError> {
    debug!("Loading edge {}/{} from graph {}", path.collection, path.key, path.graph);

    let document = state.module.document(&path.edge(), &path.key).await?;
    Ok(ApiResponse::ok(Payload::Edge(document)))
}

/// PUT /:graph/edge/:collection/:key; `_from` and `_to` in the body are ignored
pub async fn replace_edge(
    State(state): State<AppState>,
    Path(path): Path<DocumentPath>,
    JsonBody(body): JsonBody<Value>,
) -> Result<ApiResponse<DocumentMeta>, ApiError> {
    let body = Document::try_from(body)?;

    let meta = state.module.replace(&path.edge(), &path.key, body).await?;

    info!("Replaced edge {} in graph {}", meta.id, path.graph);
    Ok(ApiResponse::ok(Payload::Edge(meta)))
}

/// PATCH /:graph/edge/:collection/:key; `_from` and `_to` in the body are ignored
pub async fn update_edge(
    State(state): State<AppState>,
    Path(path): Path<DocumentPath>,
    JsonBody(body): JsonBody<Value>,
) -> Result<ApiResponse<DocumentMeta>, ApiError> {
    let body = Document::try_from(body)?;

    let meta = state.module.update(&path.edge(), &path.key, body).await?;

    info!("Updated edge {} in graph {}", meta.id, path.graph);
    Ok(ApiResponse::ok(Payload::Edge(meta)))
}

/// DELETE /:graph/edge/:collection/:key
pub async fn delete_edge(
    State(state): State<AppState>,
    Path(path): Path<DocumentPath>,
) -> Result<ApiResponse<bool>, ApiError> {
    let removed = state.module.remove(&path.edge(), &path.key).await?;

    info!("Deleted edge {}/{} from graph {}", path.collection, path.key, path.graph);
    Ok(ApiResponse::ok(Payload::Edge(removed)))
}
