//! In-memory implementation of GraphModule for testing and development

use async_trait::async_trait;
use graph_gateway_core::prelude::*;
use graph_gateway_core::types::{is_valid_key, SYSTEM_ATTRIBUTES};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Configuration for the in-memory graph module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InMemoryConfig {
    /// Maximum number of documents across all collections
    pub max_documents: Option<usize>,
    /// Whether to enable verbose logging
    pub verbose: bool,
}

impl Default for InMemoryConfig {
    fn default() -> Self {
        Self {
            max_documents: Some(1_000_000),
            verbose: false,
        }
    }
}

/// Storage type of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CollectionType {
    Document,
    Edge,
}

#[derive(Debug)]
struct Collection {
    kind: CollectionType,
    documents: BTreeMap<String, Document>,
}

impl Collection {
    fn new(kind: CollectionType) -> Self {
        Self {
            kind,
            documents: BTreeMap::new(),
        }
    }
}

/// In-memory data store
#[derive(Debug, Default)]
struct MemoryStore {
    collections: HashMap<String, Collection>,
    /// Graph name -> edge definitions, in insertion order
    graphs: BTreeMap<String, Vec<EdgeDefinition>>,
    /// Source of generated keys and revisions
    tick: u64,
}

impl MemoryStore {
    fn next_tick(&mut self) -> String {
        self.tick += 1;
        self.tick.to_string()
    }

    fn graph_info(&self, name: &str) -> Result<GraphInfo, GraphError> {
        self.graphs
            .get(name)
            .map(|defs| GraphInfo::new(name, defs.clone()))
            .ok_or_else(|| GraphError::GraphNotFound(name.to_string()))
    }

    /// Resolve a collection through its graph
    fn resolve(&self, target: &CollectionRef) -> Result<GraphInfo, GraphError> {
        let graph = self.graph_info(&target.graph)?;
        if !graph.contains(target.kind, &target.collection) {
            return Err(target.not_in_graph());
        }
        if !self.collections.contains_key(&target.collection) {
            return Err(GraphError::CollectionNotFound(target.collection.clone()));
        }
        Ok(graph)
    }

    fn collection(&self, name: &str) -> Result<&Collection, GraphError> {
        self.collections
            .get(name)
            .ok_or_else(|| GraphError::CollectionNotFound(name.to_string()))
    }

    fn collection_mut(&mut self, name: &str) -> Result<&mut Collection, GraphError> {
        self.collections
            .get_mut(name)
            .ok_or_else(|| GraphError::CollectionNotFound(name.to_string()))
    }

    fn contains_document(&self, handle: &DocumentHandle) -> bool {
        self.collections
            .get(&handle.collection)
            .map_or(false, |c| c.documents.contains_key(&handle.key))
    }

    fn document_count(&self) -> usize {
        self.collections.values().map(|c| c.documents.len()).sum()
    }

    fn check_capacity(&self, max_documents: Option<usize>) -> Result<(), GraphError> {
        match max_documents {
            Some(max) if self.document_count() >= max => Err(GraphError::ResourceLimit(format!(
                "Maximum document limit ({}) reached",
                max
            ))),
            _ => Ok(()),
        }
    }

    /// Take the client `_key` out of `body` or generate a fresh one
    fn assign_key(&mut self, collection: &str, body: &mut Document) -> Result<String, GraphError> {
        match body.remove("_key") {
            Some(Value::String(key)) => {
                if !is_valid_key(&key) {
                    return Err(GraphError::DocumentKeyBad(key));
                }
                if self.collection(collection)?.documents.contains_key(&key) {
                    return Err(GraphError::UniqueConstraintViolated(format!("{}/{}", collection, key)));
                }
                Ok(key)
            }
            Some(other) => Err(GraphError::DocumentKeyBad(other.to_string())),
            None => loop {
                let key = self.next_tick();
                if !self.collection(collection)?.documents.contains_key(&key) {
                    break Ok(key);
                }
            },
        }
    }

    /// Insert a new document; `system` holds `_from`/`_to` for edges
    fn insert(
        &mut self,
        collection: &str,
        mut body: Document,
        system: &[(&str, &str)],
    ) -> Result<DocumentMeta, GraphError> {
        let key = self.assign_key(collection, &mut body)?;
        let rev = self.next_tick();
        let handle = DocumentHandle::new(collection, key);

        let mut document = body.without_system_attributes();
        document.insert("_id", Value::String(handle.to_string()));
        document.insert("_key", Value::String(handle.key.clone()));
        document.insert("_rev", Value::String(rev.clone()));
        for (name, value) in system {
            document.insert(*name, Value::String((*value).to_string()));
        }

        self.collection_mut(collection)?
            .documents
            .insert(handle.key.clone(), document);
        Ok(DocumentMeta::new(&handle, rev))
    }

    /// Rewrite an existing document; `apply` builds the new client attributes
    fn rewrite<F>(&mut self, handle: &DocumentHandle, apply: F) -> Result<DocumentMeta, GraphError>
    where
        F: FnOnce(&Document) -> Document,
    {
        if !self.contains_document(handle) {
            return Err(GraphError::DocumentNotFound(handle.to_string()));
        }
        let rev = self.next_tick();
        let existing = self
            .collection_mut(&handle.collection)?
            .documents
            .get_mut(&handle.key)
            .ok_or_else(|| GraphError::DocumentNotFound(handle.to_string()))?;

        let old_rev = existing.rev().unwrap_or_default().to_string();
        let mut document = apply(existing).without_system_attributes();
        for name in SYSTEM_ATTRIBUTES {
            if let Some(value) = existing.get(name) {
                document.insert(name, value.clone());
            }
        }
        document.insert("_rev", Value::String(rev.clone()));
        *existing = document;

        Ok(DocumentMeta::new(handle, rev).with_old_rev(old_rev))
    }

    /// Remove every edge whose `_from` or `_to` is `vertex_id`
    fn remove_connected_edges(&mut self, vertex_id: &str) -> usize {
        let mut removed = 0;
        for collection in self.collections.values_mut() {
            if collection.kind != CollectionType::Edge {
                continue;
            }
            let before = collection.documents.len();
            collection
                .documents
                .retain(|_, edge| edge.from_id() != Some(vertex_id) && edge.to_id() != Some(vertex_id));
            removed += before - collection.documents.len();
        }
        removed
    }

    /// Validate `additions` against the graph's `existing` definitions,
    /// every other graph, and the types of already existing collections
    fn check_definitions(
        &self,
        graph: &str,
        existing: &[EdgeDefinition],
        additions: &[EdgeDefinition],
    ) -> Result<(), GraphError> {
        let mut edge_collections: BTreeSet<&str> =
            existing.iter().map(|def| def.collection.as_str()).collect();

        for def in additions {
            def.validate()?;

            if !edge_collections.insert(def.collection.as_str()) {
                return Err(GraphError::EdgeCollectionMultiUse(def.collection.clone()));
            }

            let conflicting = self
                .graphs
                .iter()
                .filter(|(name, _)| name.as_str() != graph)
                .flat_map(|(name, defs)| defs.iter().map(move |d| (name, d)))
                .find(|(_, other)| other.collection == def.collection && *other != def);
            if let Some((other_graph, _)) = conflicting {
                return Err(GraphError::EdgeCollectionUsedInOtherGraph(format!(
                    "{} is defined differently in graph {}",
                    def.collection, other_graph
                )));
            }
        }

        let vertex_collections: BTreeSet<&str> = existing
            .iter()
            .chain(additions)
            .flat_map(|def| def.vertex_collections())
            .map(String::as_str)
            .collect();

        if let Some(name) = edge_collections.intersection(&vertex_collections).next() {
            return Err(GraphError::CollectionTypeInvalid(format!(
                "{} is used both as edge and vertex collection",
                name
            )));
        }

        let expected = edge_collections
            .iter()
            .map(|name| (*name, CollectionType::Edge))
            .chain(vertex_collections.iter().map(|name| (*name, CollectionType::Document)));
        for (name, kind) in expected {
            if let Some(collection) = self.collections.get(name) {
                if collection.kind != kind {
                    return Err(GraphError::CollectionTypeInvalid(name.to_string()));
                }
            }
        }

        Ok(())
    }

    fn ensure_collections(&mut self, definitions: &[EdgeDefinition]) {
        for def in definitions {
            self.collections
                .entry(def.collection.clone())
                .or_insert_with(|| Collection::new(CollectionType::Edge));
            for name in def.vertex_collections() {
                self.collections
                    .entry(name.clone())
                    .or_insert_with(|| Collection::new(CollectionType::Document));
            }
        }
    }

    fn collections_in_use(&self) -> BTreeSet<String> {
        self.graphs
            .values()
            .flatten()
            .flat_map(|def| std::iter::once(&def.collection).chain(def.vertex_collections()))
            .cloned()
            .collect()
    }

    fn stats(&self) -> (usize, usize, usize) {
        (self.graphs.len(), self.collections.len(), self.document_count())
    }
}

/// In-memory GraphModule implementation
pub struct InMemoryGraphModule {
    store: Arc<RwLock<MemoryStore>>,
    config: InMemoryConfig,
}

impl InMemoryGraphModule {
    /// Create a new in-memory graph module
    pub fn new() -> Self {
        Self::new_with_config(InMemoryConfig::default())
    }

    /// Create a new in-memory graph module with configuration
    pub fn new_with_config(config: InMemoryConfig) -> Self {
        info!("Creating in-memory graph module with config: {:?}", config);
        Self {
            store: Arc::new(RwLock::new(MemoryStore::default())),
            config,
        }
    }

    /// Number of graphs, collections and documents
    pub async fn stats(&self) -> (usize, usize, usize) {
        let store = self.store.read().await;
        store.stats()
    }

    /// Whether a collection with this name currently exists
    pub async fn has_collection(&self, name: &str) -> bool {
        let store = self.store.read().await;
        store.collections.contains_key(name)
    }

    /// Clear all data from the store
    pub async fn clear(&self) {
        let mut store = self.store.write().await;
        *store = MemoryStore::default();
        info!("Cleared in-memory graph module");
    }
}

impl Default for InMemoryGraphModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphModule for InMemoryGraphModule {
    async fn graph(&self, name: &str) -> Result<GraphInfo, GraphError> {
        let store = self.store.read().await;
        store.graph_info(name)
    }

    async fn list_graphs(&self) -> Result<Vec<GraphInfo>, GraphError> {
        let store = self.store.read().await;
        Ok(store
            .graphs
            .iter()
            .map(|(name, defs)| GraphInfo::new(name.as_str(), defs.clone()))
            .collect())
    }

    async fn create_graph(&self, name: &str, edge_definitions: Vec<EdgeDefinition>) -> Result<GraphInfo, GraphError> {
        let mut store = self.store.write().await;

        if name.is_empty() {
            return Err(GraphError::MissingGraphName);
        }
        if !is_valid_key(name) {
            return Err(GraphError::IllegalName(name.to_string()));
        }
        if store.graphs.contains_key(name) {
            return Err(GraphError::DuplicateGraph(name.to_string()));
        }

        store.check_definitions(name, &[], &edge_definitions)?;
        store.ensure_collections(&edge_definitions);
        store.graphs.insert(name.to_string(), edge_definitions.clone());

        info!("Created graph {} with {} edge definitions", name, edge_definitions.len());
        Ok(GraphInfo::new(name, edge_definitions))
    }

    async fn drop_graph(&self, name: &str, drop_collections: bool) -> Result<(), GraphError> {
        let mut store = self.store.write().await;

        let definitions = store
            .graphs
            .remove(name)
            .ok_or_else(|| GraphError::GraphNotFound(name.to_string()))?;

        if drop_collections {
            let in_use = store.collections_in_use();
            let owned: BTreeSet<&String> = definitions
                .iter()
                .flat_map(|def| std::iter::once(&def.collection).chain(def.vertex_collections()))
                .collect();
            for collection in owned.into_iter().filter(|c| !in_use.contains(*c)) {
                store.collections.remove(collection);
                debug!("Dropped collection {} with graph {}", collection, name);
            }
        }

        info!("Dropped graph {} (drop_collections: {})", name, drop_collections);
        Ok(())
    }

    async fn extend_edge_definitions(&self, graph: &str, definition: EdgeDefinition) -> Result<GraphInfo, GraphError> {
        let mut store = self.store.write().await;

        let existing = store.graph_info(graph)?.edge_definitions;
        let additions = [definition];
        store.check_definitions(graph, &existing, &additions)?;
        store.ensure_collections(&additions);

        let [definition] = additions;
        info!("Added edge definition {} to graph {}", definition.collection, graph);
        store
            .graphs
            .get_mut(graph)
            .ok_or_else(|| GraphError::GraphNotFound(graph.to_string()))?
            .push(definition);

        store.graph_info(graph)
    }

    async fn save_vertex(&self, target: &CollectionRef, body: Document) -> Result<DocumentMeta, GraphError> {
        let mut store = self.store.write().await;

        if self.config.verbose {
            debug!("Saving vertex into {}", target);
        }

        store.resolve(target)?;
        store.check_capacity(self.config.max_documents)?;
        let meta = store.insert(&target.collection, body, &[])?;

        if self.config.verbose {
            debug!("Saved vertex {} rev {}", meta.id, meta.rev);
        }
        Ok(meta)
    }

    async fn save_edge(&self, target: &CollectionRef, from: &str, to: &str, body: Document) -> Result<DocumentMeta, GraphError> {
        let mut store = self.store.write().await;

        if self.config.verbose {
            debug!("Saving edge {} -> {} into {}", from, to, target);
        }

        let graph = store.resolve(target)?;
        let definition = graph
            .definition(&target.collection)
            .ok_or_else(|| target.not_in_graph())?;

        let from_handle = DocumentHandle::parse(from)?;
        let to_handle = DocumentHandle::parse(to)?;

        if !definition.from.contains(&from_handle.collection) {
            return Err(GraphError::InvalidEdge(format!(
                "{} may not start an edge in {}",
                from_handle.collection, target.collection
            )));
        }
        if !definition.to.contains(&to_handle.collection) {
            return Err(GraphError::InvalidEdge(format!(
                "{} may not end an edge in {}",
                to_handle.collection, target.collection
            )));
        }
        for handle in [&from_handle, &to_handle] {
            if !store.contains_document(handle) {
                return Err(GraphError::InvalidEdge(format!("vertex {} not found", handle)));
            }
        }

        store.check_capacity(self.config.max_documents)?;
        let meta = store.insert(&target.collection, body, &[("_from", from), ("_to", to)])?;

        if self.config.verbose {
            debug!("Saved edge {} rev {}", meta.id, meta.rev);
        }
        Ok(meta)
    }

    async fn document(&self, target: &CollectionRef, key: &str) -> Result<Document, GraphError> {
        let store = self.store.read().await;

        store.resolve(target)?;
        store
            .collection(&target.collection)?
            .documents
            .get(key)
            .cloned()
            .ok_or_else(|| GraphError::DocumentNotFound(target.handle(key).to_string()))
    }

    async fn replace(&self, target: &CollectionRef, key: &str, body: Document) -> Result<DocumentMeta, GraphError> {
        let mut store = self.store.write().await;

        store.resolve(target)?;
        let meta = store.rewrite(&target.handle(key), |_| body)?;

        if self.config.verbose {
            debug!("Replaced {} rev {}", meta.id, meta.rev);
        }
        Ok(meta)
    }

    async fn update(&self, target: &CollectionRef, key: &str, body: Document) -> Result<DocumentMeta, GraphError> {
        let mut store = self.store.write().await;

        store.resolve(target)?;
        let meta = store.rewrite(&target.handle(key), |existing| {
            let mut merged = existing.clone();
            merged.merge(body.without_system_attributes());
            merged
        })?;

        if self.config.verbose {
            debug!("Updated {} rev {}", meta.id, meta.rev);
        }
        Ok(meta)
    }

    async fn remove(&self, target: &CollectionRef, key: &str) -> Result<bool, GraphError> {
        let mut store = self.store.write().await;

        store.resolve(target)?;
        let handle = target.handle(key);
        store
            .collection_mut(&target.collection)?
            .documents
            .remove(key)
            .ok_or_else(|| GraphError::DocumentNotFound(handle.to_string()))?;

        if target.kind == CollectionKind::Vertex {
            let removed = store.remove_connected_edges(&handle.to_string());
            if removed > 0 {
                debug!("Removed {} edges connected to {}", removed, handle);
            }
        }

        if self.config.verbose {
            debug!("Removed {}", handle);
        }
        Ok(true)
    }

    async fn health_check(&self) -> Result<(), GraphError> {
        let (graphs, collections, documents) = self.stats().await;
        debug!(
            "In-memory graph module health check: {} graphs, {} collections, {} documents",
            graphs, collections, documents
        );
        Ok(())
    }
}
