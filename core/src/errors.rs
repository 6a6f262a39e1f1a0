//! Error types for graph gateway operations

use thiserror::Error;

/// Umbrella error for process-level concerns
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Graph module error: {0}")]
    Graph(#[from] GraphError),

    #[error("Presentation error: {0}")]
    Presentation(#[from] PresentationError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

/// Errors raised by a graph module.
///
/// The `Display` text of each variant is the fixed message clients see;
/// attached strings are context for logs only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("document not found")]
    DocumentNotFound(String),

    #[error("collection not found")]
    CollectionNotFound(String),

    #[error("illegal document handle")]
    DocumentHandleBad(String),

    #[error("illegal name")]
    IllegalName(String),

    #[error("unique constraint violated")]
    UniqueConstraintViolated(String),

    #[error("invalid collection type")]
    CollectionTypeInvalid(String),

    #[error("illegal document key")]
    DocumentKeyBad(String),

    #[error("invalid document type")]
    DocumentTypeInvalid,

    #[error("invalid edge")]
    InvalidEdge(String),

    #[error("multi use of edge collection in edge def")]
    EdgeCollectionMultiUse(String),

    #[error("edge collection already used in edge def")]
    EdgeCollectionUsedInOtherGraph(String),

    #[error("missing graph name")]
    MissingGraphName,

    #[error("malformed edge definition")]
    MalformedEdgeDefinition(String),

    #[error("graph not found")]
    GraphNotFound(String),

    #[error("graph already exists")]
    DuplicateGraph(String),

    #[error("vertex collection does not exist or is not part of the graph")]
    VertexCollectionNotInGraph(String),

    #[error("edge collection not used in graph")]
    EdgeCollectionNotInGraph(String),

    #[error("resource limit exceeded")]
    ResourceLimit(String),

    #[error("internal error")]
    Internal(String),
}

impl GraphError {
    /// Stable numeric code reported to clients as `errorNum`
    pub fn error_num(&self) -> u32 {
        match self {
            GraphError::DocumentNotFound(_) => 1202,
            GraphError::CollectionNotFound(_) => 1203,
            GraphError::DocumentHandleBad(_) => 1205,
            GraphError::IllegalName(_) => 1208,
            GraphError::UniqueConstraintViolated(_) => 1210,
            GraphError::CollectionTypeInvalid(_) => 1218,
            GraphError::DocumentKeyBad(_) => 1221,
            GraphError::DocumentTypeInvalid => 1227,
            GraphError::InvalidEdge(_) => 1906,
            GraphError::EdgeCollectionMultiUse(_) => 1920,
            GraphError::EdgeCollectionUsedInOtherGraph(_) => 1921,
            GraphError::MissingGraphName => 1922,
            GraphError::MalformedEdgeDefinition(_) => 1923,
            GraphError::GraphNotFound(_) => 1924,
            GraphError::DuplicateGraph(_) => 1925,
            GraphError::VertexCollectionNotInGraph(_) => 1926,
            GraphError::EdgeCollectionNotInGraph(_) => 1930,
            GraphError::ResourceLimit(_) => 32,
            GraphError::Internal(_) => 4,
        }
    }

    /// Context attached when the error was raised, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            GraphError::DocumentTypeInvalid | GraphError::MissingGraphName => None,
            GraphError::DocumentNotFound(d)
            | GraphError::CollectionNotFound(d)
            | GraphError::DocumentHandleBad(d)
            | GraphError::IllegalName(d)
            | GraphError::UniqueConstraintViolated(d)
            | GraphError::CollectionTypeInvalid(d)
            | GraphError::DocumentKeyBad(d)
            | GraphError::InvalidEdge(d)
            | GraphError::EdgeCollectionMultiUse(d)
            | GraphError::EdgeCollectionUsedInOtherGraph(d)
            | GraphError::MalformedEdgeDefinition(d)
            | GraphError::GraphNotFound(d)
            | GraphError::DuplicateGraph(d)
            | GraphError::VertexCollectionNotInGraph(d)
            | GraphError::EdgeCollectionNotInGraph(d)
            | GraphError::ResourceLimit(d)
            | GraphError::Internal(d) => Some(d.as_str()),
        }
    }
}

/// Errors related to presentation adapters
#[derive(Error, Debug)]
pub enum PresentationError {
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
