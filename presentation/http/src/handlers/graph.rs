//! Graph handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use graph_gateway_core::prelude::*;
use tracing::{debug, info};

use crate::{ApiError, ApiResponse, AppState, CreateGraphRequest, DropGraphParams, JsonBody, Payload, QueryParams};

/// GET /
pub async fn list_graphs(State(state): State<AppState>) -> Result<ApiResponse<Vec<GraphInfo>>, ApiError> {
    let graphs = state.module.list_graphs().await?;
    debug!("Listing {} graphs", graphs.len());
    Ok(ApiResponse::ok(Payload::Graphs(graphs)))
}

/// POST /
pub async fn create_graph(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateGraphRequest>,
) -> Result<ApiResponse<GraphInfo>, ApiError> {
    let graph = state
        .module
        .create_graph(&request.name, request.edge_definitions)
        .await?;

    info!("Created graph {}", graph.name);
    Ok(ApiResponse::with_status(StatusCode::CREATED, Payload::Graph(graph)))
}

/// GET /:graph
pub async fn get_graph(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<ApiResponse<GraphInfo>, ApiError> {
    let graph = state.module.graph(&name).await?;
    Ok(ApiResponse::ok(Payload::Graph(graph)))
}

/// DELETE /:graph
pub async fn drop_graph(
    State(state): State<AppState>,
    Path(name): Path<String>,
    QueryParams(params): QueryParams<DropGraphParams>,
) -> Result<ApiResponse<()>, ApiError> {
    state.module.drop_graph(&name, params.drop_collections).await?;

    info!("Dropped graph {} (drop_collections: {})", name, params.drop_collections);
    Ok(ApiResponse::empty())
}
