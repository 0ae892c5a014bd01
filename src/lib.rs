//! docrag: retrieval-augmented question answering over PDF documents.
//!
//! The pipeline runs in two phases. The build phase loads a directory of
//! documents, chunks their text, embeds the chunks through a hosted
//! embedding endpoint, and builds an in-memory vector index. The query
//! phase embeds a question, retrieves the nearest chunks, and asks a
//! hosted generation endpoint to answer from them, returning the answer
//! together with the contributing source documents.
//!
//! This crate is the pipeline core; upload handling and result rendering
//! belong to whatever thin presentation layer consumes it (see
//! `src/main.rs` for a minimal console one).

pub mod chunker;
pub mod document_loader;
pub mod embedding_client;
pub mod error;
pub mod generation_client;
pub mod models;
pub mod orchestrator;
pub mod vector_index;

pub use chunker::{ChunkingConfig, TextChunker};
pub use document_loader::{DocumentLoader, LoadOutcome};
pub use embedding_client::{
    EmbeddingBackend, EmbeddingClient, EmbeddingEndpointConfig, HttpEmbeddingBackend,
};
pub use error::{RagError, Result};
pub use generation_client::{
    GenerationBackend, GenerationClient, GenerationEndpointConfig, HttpGenerationBackend,
};
pub use models::*;
pub use orchestrator::{RagOrchestrator, RetryPolicy, DEFAULT_TOP_K};
pub use vector_index::{ScoredEntry, VectorIndex};
