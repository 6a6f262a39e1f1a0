//! # Graph Gateway Core
//!
//! Core types, error enums and traits shared by the graph gateway crates.
//! The [`GraphModule`] trait is the seam between the HTTP routes and
//! whatever backend manages graphs, collections and documents.

pub mod types;
pub mod traits;
pub mod errors;

// Re-export commonly used types and traits
pub use types::{CollectionKind, CollectionRef, Document, DocumentHandle, DocumentMeta, EdgeDefinition, GraphInfo};
pub use traits::{GraphModule, PresentationAdapter};
pub use errors::{CoreError, GraphError, PresentationError};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::types::*;
    pub use crate::traits::*;
    pub use crate::errors::*;
    pub use async_trait::async_trait;
}
