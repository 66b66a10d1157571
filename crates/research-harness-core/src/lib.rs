//! # Research Harness Core
//!
//! Pure logic for Research Harness: the run state, tool routing, text
//! chunking, memory scoring, prompt construction, and the pipeline
//! transition table, plus the collaborator traits the application
//! crate implements against real providers.
//!
//! This crate contains no tokio, sqlx, filesystem I/O, or HTTP
//! dependencies. Everything here is deterministic and unit-testable.

pub mod chunk;
pub mod embedding;
pub mod error;
pub mod graph;
pub mod memory;
pub mod models;
pub mod prompt;
pub mod router;
pub mod store;
pub mod text;

pub use error::ProviderError;
pub use graph::{Edge, ErrorPolicy, Stage};
pub use models::{
    DocumentMetadata, DocumentRecord, MemoryEntry, RagDoc, RunState, SearchResult, ToolChoice,
};
