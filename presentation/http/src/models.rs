//! Request and response models for the HTTP routes

use graph_gateway_core::prelude::*;
use serde::{Deserialize, Serialize};

/// Named payload of the success envelope
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Payload<T> {
    Vertex(T),
    Edge(T),
    Graph(T),
    Graphs(T),
    Health(T),
}

impl<T> Payload<T> {
    pub fn inner(&self) -> &T {
        match self {
            Payload::Vertex(inner)
            | Payload::Edge(inner)
            | Payload::Graph(inner)
            | Payload::Graphs(inner)
            | Payload::Health(inner) => inner,
        }
    }
}

/// Payloads that may carry a document revision for the `ETag` header
pub trait Revision {
    fn revision(&self) -> Option<&str> {
        None
    }
}

impl Revision for DocumentMeta {
    fn revision(&self) -> Option<&str> {
        Some(&self.rev)
    }
}

impl Revision for Document {
    fn revision(&self) -> Option<&str> {
        self.rev()
    }
}

impl Revision for bool {}

impl Revision for GraphInfo {}

impl Revision for Vec<GraphInfo> {}

/// Path of a collection inside a graph
#[derive(Debug, Deserialize)]
pub struct CollectionPath {
    pub graph: String,
    pub collection: String,
}

/// Path of a single document inside a graph
#[derive(Debug, Deserialize)]
pub struct DocumentPath {
    pub graph: String,
    pub collection: String,
    pub key: String,
}

impl DocumentPath {
    pub fn vertex(&self) -> CollectionRef {
        CollectionRef::vertex(self.graph.as_str(), self.collection.as_str())
    }

    pub fn edge(&self) -> CollectionRef {
        CollectionRef::edge(self.graph.as_str(), self.collection.as_str())
    }
}

/// Body of `POST /`
#[derive(Debug, Deserialize)]
pub struct CreateGraphRequest {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "edgeDefinitions", default)]
    pub edge_definitions: Vec<EdgeDefinition>,
}

/// Query string of `DELETE /:graph`
#[derive(Debug, Deserialize)]
pub struct DropGraphParams {
    #[serde(rename = "dropCollections", default = "default_drop_collections")]
    pub drop_collections: bool,
}

fn default_drop_collections() -> bool {
    true
}

impl Default for DropGraphParams {
    fn default() -> Self {
        Self {
            drop_collections: default_drop_collections(),
        }
    }
}
