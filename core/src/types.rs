//! Core data types for the graph gateway

use crate::errors::GraphError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

/// Attribute names owned by the store rather than the client
pub const SYSTEM_ATTRIBUTES: [&str; 5] = ["_id", "_key", "_rev", "_from", "_to"];

const MAX_KEY_LENGTH: usize = 254;
const MAX_COLLECTION_NAME_LENGTH: usize = 64;

/// Check a document key: 1-254 characters from the allowed key alphabet
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= MAX_KEY_LENGTH
        && key.chars().all(|c| {
            c.is_ascii_alphanumeric() || "_-:.@()+,=;$!*'%".contains(c)
        })
}

/// Check a collection name: a letter followed by letters, digits, `_` or `-`
pub fn is_valid_collection_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    name.len() <= MAX_COLLECTION_NAME_LENGTH
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// A JSON object stored in a collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(name.into(), value)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    /// Get a string attribute, `None` when absent or not a string
    pub fn str_attribute(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn key(&self) -> Option<&str> {
        self.str_attribute("_key")
    }

    pub fn rev(&self) -> Option<&str> {
        self.str_attribute("_rev")
    }

    pub fn from_id(&self) -> Option<&str> {
        self.str_attribute("_from")
    }

    pub fn to_id(&self) -> Option<&str> {
        self.str_attribute("_to")
    }

    /// Drop every system attribute, leaving only client data
    pub fn without_system_attributes(mut self) -> Self {
        for name in SYSTEM_ATTRIBUTES {
            self.0.remove(name);
        }
        self
    }

    /// Merge `patch` into this document. Nested objects merge recursively,
    /// everything else (including `null`) overwrites.
    pub fn merge(&mut self, patch: Document) {
        merge_objects(&mut self.0, patch.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn merge_objects(target: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (name, value) in patch {
        match (target.get_mut(&name), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge_objects(existing, incoming);
            }
            (_, value) => {
                target.insert(name, value);
            }
        }
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Document {
    type Error = GraphError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(GraphError::DocumentTypeInvalid),
        }
    }
}

/// Identity attributes returned by write operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_rev")]
    pub rev: String,
    #[serde(rename = "_oldRev", skip_serializing_if = "Option::is_none", default)]
    pub old_rev: Option<String>,
}

impl DocumentMeta {
    pub fn new(handle: &DocumentHandle, rev: impl Into<String>) -> Self {
        Self {
            id: handle.to_string(),
            key: handle.key.clone(),
            rev: rev.into(),
            old_rev: None,
        }
    }

    pub fn with_old_rev(mut self, old_rev: impl Into<String>) -> Self {
        self.old_rev = Some(old_rev.into());
        self
    }
}

/// A `"<collection>/<key>"` reference to a document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentHandle {
    pub collection: String,
    pub key: String,
}

impl DocumentHandle {
    pub fn new(collection: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            key: key.into(),
        }
    }

    /// Parse a handle such as `persons/alice`
    pub fn parse(handle: &str) -> Result<Self, GraphError> {
        match handle.split_once('/') {
            Some((collection, key))
                if is_valid_collection_name(collection) && is_valid_key(key) =>
            {
                Ok(Self::new(collection, key))
            }
            _ => Err(GraphError::DocumentHandleBad(handle.to_string())),
        }
    }
}

impl fmt::Display for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.key)
    }
}

/// Binds an edge collection to the vertex collections its edges may connect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDefinition {
    #[serde(default)]
    pub collection: String,
    #[serde(default)]
    pub from: BTreeSet<String>,
    #[serde(default)]
    pub to: BTreeSet<String>,
}

impl EdgeDefinition {
    pub fn new<F, T>(collection: impl Into<String>, from: F, to: T) -> Self
    where
        F: IntoIterator,
        F::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self {
            collection: collection.into(),
            from: from.into_iter().map(Into::into).collect(),
            to: to.into_iter().map(Into::into).collect(),
        }
    }

    /// Check the definition is complete and every name is legal
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.collection.is_empty() || self.from.is_empty() || self.to.is_empty() {
            return Err(GraphError::MalformedEdgeDefinition(format!(
                "edge definition for '{}' needs a collection and non-empty from/to sets",
                self.collection
            )));
        }
        let names = std::iter::once(&self.collection)
            .chain(self.from.iter())
            .chain(self.to.iter());
        for name in names {
            if !is_valid_collection_name(name) {
                return Err(GraphError::IllegalName(name.clone()));
            }
        }
        Ok(())
    }

    /// Every vertex collection mentioned on either side
    pub fn vertex_collections(&self) -> impl Iterator<Item = &String> {
        self.from.union(&self.to)
    }
}

/// A named graph and its edge definitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphInfo {
    pub name: String,
    #[serde(rename = "edgeDefinitions", default)]
    pub edge_definitions: Vec<EdgeDefinition>,
}

impl GraphInfo {
    pub fn new(name: impl Into<String>, edge_definitions: Vec<EdgeDefinition>) -> Self {
        Self {
            name: name.into(),
            edge_definitions,
        }
    }

    /// Look up the definition of an edge collection
    pub fn definition(&self, edge_collection: &str) -> Option<&EdgeDefinition> {
        self.edge_definitions
            .iter()
            .find(|def| def.collection == edge_collection)
    }

    pub fn edge_collections(&self) -> BTreeSet<&str> {
        self.edge_definitions
            .iter()
            .map(|def| def.collection.as_str())
            .collect()
    }

    pub fn vertex_collections(&self) -> BTreeSet<&str> {
        self.edge_definitions
            .iter()
            .flat_map(|def| def.vertex_collections())
            .map(String::as_str)
            .collect()
    }

    /// Whether the graph has a collection of the given kind with this name
    pub fn contains(&self, kind: CollectionKind, collection: &str) -> bool {
        match kind {
            CollectionKind::Vertex => self.vertex_collections().contains(collection),
            CollectionKind::Edge => self.definition(collection).is_some(),
        }
    }
}

/// Role a collection plays inside a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Vertex,
    Edge,
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionKind::Vertex => write!(f, "vertex"),
            CollectionKind::Edge => write!(f, "edge"),
        }
    }
}

/// A collection addressed through a graph, e.g. `social` / vertex `persons`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRef {
    pub graph: String,
    pub collection: String,
    pub kind: CollectionKind,
}

impl CollectionRef {
    pub fn vertex(graph: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            graph: graph.into(),
            collection: collection.into(),
            kind: CollectionKind::Vertex,
        }
    }

    pub fn edge(graph: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            graph: graph.into(),
            collection: collection.into(),
            kind: CollectionKind::Edge,
        }
    }

    /// Handle of the document with `key` in this collection
    pub fn handle(&self, key: impl Into<String>) -> DocumentHandle {
        DocumentHandle::new(self.collection.clone(), key)
    }

    /// Error raised when this collection is not part of its graph
    pub fn not_in_graph(&self) -> GraphError {
        let detail = format!("{} in graph {}", self.collection, self.graph);
        match self.kind {
            CollectionKind::Vertex => GraphError::VertexCollectionNotInGraph(detail),
            CollectionKind::Edge => GraphError::EdgeCollectionNotInGraph(detail),
        }
    }
}

impl fmt::Display for CollectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.graph, self.kind, self.collection)
    }
}
