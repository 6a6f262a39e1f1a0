//! Core traits: the graph module seam and the presentation adapter

use crate::errors::{GraphError, PresentationError};
use crate::types::{CollectionRef, Document, DocumentMeta, EdgeDefinition, GraphInfo};
use async_trait::async_trait;
use std::sync::Arc;

/// A backend that owns graphs, their collections and documents.
///
/// Every collection operation resolves `target.graph` first and fails with
/// [`GraphError::GraphNotFound`] when it does not exist, then checks the
/// collection belongs to the graph in the role given by `target.kind`.
#[async_trait]
pub trait GraphModule: Send + Sync {
    /// Load a graph descriptor by name
    async fn graph(&self, name: &str) -> Result<GraphInfo, GraphError>;

    /// All graph descriptors, ordered by name
    async fn list_graphs(&self) -> Result<Vec<GraphInfo>, GraphError>;

    /// Create a graph, creating missing collections along the way
    async fn create_graph(&self, name: &str, edge_definitions: Vec<EdgeDefinition>) -> Result<GraphInfo, GraphError>;

    /// Drop a graph; with `drop_collections` also drop collections no other graph uses
    async fn drop_graph(&self, name: &str, drop_collections: bool) -> Result<(), GraphError>;

    /// Add an edge definition to an existing graph
    async fn extend_edge_definitions(&self, graph: &str, definition: EdgeDefinition) -> Result<GraphInfo, GraphError>;

    /// Store a new vertex
    async fn save_vertex(&self, target: &CollectionRef, body: Document) -> Result<DocumentMeta, GraphError>;

    /// Store a new edge between the documents `from` and `to`
    async fn save_edge(&self, target: &CollectionRef, from: &str, to: &str, body: Document) -> Result<DocumentMeta, GraphError>;

    /// Load a document by key
    async fn document(&self, target: &CollectionRef, key: &str) -> Result<Document, GraphError>;

    /// Replace all client attributes of a document
    async fn replace(&self, target: &CollectionRef, key: &str, body: Document) -> Result<DocumentMeta, GraphError>;

    /// Merge client attributes into a document
    async fn update(&self, target: &CollectionRef, key: &str, body: Document) -> Result<DocumentMeta, GraphError>;

    /// Remove a document. Removing a vertex also removes its edges.
    async fn remove(&self, target: &CollectionRef, key: &str) -> Result<bool, GraphError>;

    /// Test that the backend is usable
    async fn health_check(&self) -> Result<(), GraphError>;
}

/// Trait for presentation adapters (network transport layers)
#[async_trait]
pub trait PresentationAdapter: Send + Sync {
    /// Serve requests against `module` until stopped
    async fn start(&self, module: Arc<dyn GraphModule>) -> Result<(), PresentationError>;

    /// Stop the presentation adapter gracefully
    async fn stop(&self) -> Result<(), PresentationError>;
}
