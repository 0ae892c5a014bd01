use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, RagError>;

/// Errors surfaced by the RAG pipeline.
///
/// Per-file ingestion failures are not errors: the loader records them as
/// [`crate::models::IngestionWarning`]s and continues with the rest of the
/// batch.
#[derive(Error, Debug)]
pub enum RagError {
    /// Invalid configuration: bad chunking parameters, an empty document
    /// set, a zero top-k, or a query against an index built with a
    /// different embedding model.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The remote embedding endpoint failed, timed out, or returned an
    /// unexpected response shape.
    #[error("embedding service error: {0}")]
    EmbeddingService(String),

    /// The remote generation endpoint failed, timed out, or returned an
    /// unexpected response shape.
    #[error("generation service error: {0}")]
    GenerationService(String),

    /// `answer` was called before any successful `build_index`.
    #[error("pipeline is not ready: no index has been built yet")]
    NotReady,

    /// `retrieve` was called against an empty index. Distinct from "zero
    /// matches", which cannot happen once an index is built.
    #[error("vector index is empty: nothing has been indexed")]
    IndexNotReady,

    /// A malformed retrieval request, e.g. a query vector whose dimension
    /// does not match the index.
    #[error("retrieval error: {0}")]
    Retrieval(String),

    /// Directory-level I/O failure while loading documents.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RagError {
    /// Remote service failures are transient and worth retrying with
    /// backoff. Everything else is deterministic and will fail the same
    /// way on the next attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RagError::EmbeddingService(_) | RagError::GenerationService(_)
        )
    }
}
