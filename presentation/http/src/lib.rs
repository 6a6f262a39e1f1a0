//! HTTP presentation layer for the graph gateway
//!
//! Serves vertices, edges, edge definitions and graphs of a [`GraphModule`]
//! below a configurable mount point. Every response body is a JSON envelope:
//! `{"error": false, "code": 200, "vertex": {...}}` on success and
//! `{"error": true, "code": 404, "errorNum": 1202, "errorMessage": "..."}`
//! on failure. Older gharial clients expect `{"code": 404, "error": "..."}`
//! with the message under `error`; this envelope moves it to `errorMessage`
//! and keeps `error` a boolean.

use async_trait::async_trait;
use axum::{
    http::{header, HeaderValue, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use graph_gateway_core::prelude::*;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

mod extract;
mod handlers;
mod middleware;
mod models;

pub use extract::{JsonBody, QueryParams};
pub use handlers::edge::edge_endpoints;
pub use handlers::health::HealthStatus;
pub use models::*;

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Server bind address
    pub bind_address: SocketAddr,
    /// Path prefix for the graph routes
    pub mount_path: String,
    /// Enable CORS
    pub enable_cors: bool,
    /// Request timeout in seconds
    pub request_timeout: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 8529)),
            mount_path: "/_api/gharial".to_string(),
            enable_cors: true,
            request_timeout: 30,
        }
    }
}

/// HTTP presentation adapter
pub struct GraphGatewayHttp {
    config: HttpConfig,
    shutdown: CancellationToken,
}

impl GraphGatewayHttp {
    /// Create a new HTTP adapter
    pub fn new(config: HttpConfig) -> Self {
        Self {
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Build the Axum router with all routes
    pub fn build_router(&self, module: Arc<dyn GraphModule>) -> Router {
        router(module, &self.config)
    }
}

/// Build the full router for `module`: graph routes under the mount path,
/// the health check, middleware and the JSON fallback for unknown paths
pub fn router(module: Arc<dyn GraphModule>, config: &HttpConfig) -> Router {
    let state = AppState { module };

    let graph_routes = Router::new()
        // Graphs
        .route("/", get(handlers::graph::list_graphs).post(handlers::graph::create_graph))
        .route("/:graph", get(handlers::graph::get_graph).delete(handlers::graph::drop_graph))

        // Vertices
        .route("/:graph/vertex/:collection", post(handlers::vertex::create_vertex))
        .route(
            "/:graph/vertex/:collection/:key",
            get(handlers::vertex::get_vertex)
                .put(handlers::vertex::replace_vertex)
                .patch(handlers::vertex::update_vertex)
                .delete(handlers::vertex::delete_vertex),
        )

        // Edge definitions and edges
        .route("/:graph/edge", post(handlers::edge::create_edge_definition))
        .route("/:graph/edge/:collection", post(handlers::edge::create_edge))
        .route(
            "/:graph/edge/:collection/:key",
            get(handlers::edge::get_edge)
                .put(handlers::edge::replace_edge)
                .patch(handlers::edge::update_edge)
                .delete(handlers::edge::delete_edge),
        );

    let router = Router::new().route("/_admin/health", get(handlers::health::health_check));

    let mount = config.mount_path.trim_end_matches('/');
    let router = if mount.is_empty() {
        router.merge(graph_routes)
    } else if mount.starts_with('/') {
        router.nest(mount, graph_routes)
    } else {
        router.nest(&format!("/{}", mount), graph_routes)
    };

    let timeout = Duration::from_secs(config.request_timeout);
    let mut router = router
        .fallback(handlers::unknown_path)
        .with_state(state)
        .layer(from_fn_with_state(timeout, middleware::request_timeout))
        .layer(from_fn(middleware::request_logging));

    if config.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

#[async_trait]
impl PresentationAdapter for GraphGatewayHttp {
    async fn start(&self, module: Arc<dyn GraphModule>) -> Result<(), PresentationError> {
        info!("Starting graph gateway on {}", self.config.bind_address);

        let router = self.build_router(module);

        let listener = tokio::net::TcpListener::bind(&self.config.bind_address)
            .await
            .map_err(|e| PresentationError::StartupFailed(format!("Failed to bind to {}: {}", self.config.bind_address, e)))?;

        info!(
            "Graph gateway listening on {} (graphs under {})",
            self.config.bind_address, self.config.mount_path
        );

        let shutdown = self.shutdown.clone();
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                info!("Graph gateway shutdown requested");
            })
            .await
            .map_err(|e| PresentationError::StartupFailed(format!("Server error: {}", e)))?;

        Ok(())
    }

    async fn stop(&self) -> Result<(), PresentationError> {
        info!("Stopping graph gateway");
        self.shutdown.cancel();
        Ok(())
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub module: Arc<dyn GraphModule>,
}

/// Success envelope. The payload is flattened under its name, e.g. `vertex`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub error: bool,
    pub code: u16,
    #[serde(flatten)]
    pub payload: Option<Payload<T>>,
    /// Revision of the payload, sent as `ETag`
    #[serde(skip)]
    pub etag: Option<String>,
}

impl<T: Revision> ApiResponse<T> {
    pub fn ok(payload: Payload<T>) -> Self {
        Self::with_status(StatusCode::OK, payload)
    }

    pub fn with_status(status: StatusCode, payload: Payload<T>) -> Self {
        let etag = payload.inner().revision().map(str::to_owned);
        Self {
            error: false,
            code: status.as_u16(),
            payload: Some(payload),
            etag,
        }
    }
}

impl ApiResponse<()> {
    /// Envelope without payload
    pub fn empty() -> Self {
        Self {
            error: false,
            code: StatusCode::OK.as_u16(),
            payload: None,
            etag: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::OK);
        let etag = self.etag.as_deref().and_then(|rev| HeaderValue::from_str(rev).ok());

        let mut response = (status, Json(self)).into_response();
        if let Some(etag) = etag {
            response.headers_mut().insert(header::ETAG, etag);
        }
        response
    }
}

/// Error envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: bool,
    pub code: u16,
    #[serde(rename = "errorNum")]
    pub error_num: u32,
    #[serde(rename = "errorMessage")]
    pub error_message: String,
}

/// Everything a handler can fail with
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("{0}")]
    BadBody(String),

    #[error("unknown path")]
    UnknownPath(String),

    #[error("request timed out")]
    Timeout(Duration),

    #[error("{0}")]
    Unavailable(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Graph(e) => status_for(e),
            ApiError::BadBody(_) => StatusCode::BAD_REQUEST,
            ApiError::UnknownPath(_) => StatusCode::NOT_FOUND,
            ApiError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn error_num(&self) -> u32 {
        match self {
            ApiError::Graph(e) => e.error_num(),
            ApiError::BadBody(_) => 600,
            other => u32::from(other.status().as_u16()),
        }
    }

    pub fn body(&self) -> ApiErrorBody {
        ApiErrorBody {
            error: true,
            code: self.status().as_u16(),
            error_num: self.error_num(),
            error_message: self.to_string(),
        }
    }
}

/// Map graph module errors to HTTP status codes
pub fn status_for(error: &GraphError) -> StatusCode {
    match error {
        GraphError::DocumentNotFound(_)
        | GraphError::CollectionNotFound(_)
        | GraphError::GraphNotFound(_)
        | GraphError::VertexCollectionNotInGraph(_)
        | GraphError::EdgeCollectionNotInGraph(_) => StatusCode::NOT_FOUND,

        GraphError::DuplicateGraph(_) | GraphError::UniqueConstraintViolated(_) => StatusCode::CONFLICT,

        GraphError::DocumentHandleBad(_)
        | GraphError::IllegalName(_)
        | GraphError::CollectionTypeInvalid(_)
        | GraphError::DocumentKeyBad(_)
        | GraphError::DocumentTypeInvalid
        | GraphError::InvalidEdge(_)
        | GraphError::EdgeCollectionMultiUse(_)
        | GraphError::EdgeCollectionUsedInOtherGraph(_)
        | GraphError::MissingGraphName
        | GraphError::MalformedEdgeDefinition(_) => StatusCode::BAD_REQUEST,

        GraphError::ResourceLimit(_) | GraphError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = self.body();
        let detail = match &self {
            ApiError::Graph(e) => e.detail().map(str::to_owned),
            ApiError::UnknownPath(path) => Some(path.clone()),
            ApiError::Timeout(limit) => Some(format!("{:?}", limit)),
            ApiError::BadBody(_) | ApiError::Unavailable(_) => None,
        };

        if self.status().is_server_error() {
            error!("API error: {} {} - {} ({:?})", body.code, body.error_num, body.error_message, detail);
        } else {
            warn!("API error: {} {} - {} ({:?})", body.code, body.error_num, body.error_message, detail);
        }

        (self.status(), Json(body)).into_response()
    }
}
