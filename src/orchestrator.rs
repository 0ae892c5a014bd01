use std::path::Path;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::sleep;

use crate::chunker::{ChunkingConfig, TextChunker};
use crate::document_loader::DocumentLoader;
use crate::embedding_client::EmbeddingClient;
use crate::error::{RagError, Result};
use crate::generation_client::GenerationClient;
use crate::models::{IndexEntry, IndexReport, QueryResult};
use crate::vector_index::{ScoredEntry, VectorIndex};

/// Default number of chunks retrieved per question.
pub const DEFAULT_TOP_K: usize = 3;

/// Backoff settings for the retry-wrapped pipeline operations.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_factor: f64,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(8),
        }
    }
}

/// A successfully built index together with the identity of the embedding
/// model that produced its vectors.
struct BuiltIndex {
    index: VectorIndex,
    embedding_model: String,
}

/// End-to-end RAG pipeline: loader, chunker, embedding client, vector
/// index, and generation client behind a two-state lifecycle.
///
/// Unbuilt until the first successful [`build_index`](Self::build_index),
/// Ready afterwards. A failed rebuild keeps the last good index serving;
/// readers never observe a half-built one.
pub struct RagOrchestrator {
    loader: DocumentLoader,
    chunking: ChunkingConfig,
    embedding: EmbeddingClient,
    generation: GenerationClient,
    index: RwLock<Option<BuiltIndex>>,
}

impl RagOrchestrator {
    pub fn new(
        chunking: ChunkingConfig,
        embedding: EmbeddingClient,
        generation: GenerationClient,
    ) -> Self {
        Self {
            loader: DocumentLoader::new(),
            chunking,
            embedding,
            generation,
            index: RwLock::new(None),
        }
    }

    /// Whether a question can be answered right now.
    pub async fn is_ready(&self) -> bool {
        self.index.read().await.is_some()
    }

    /// Run the build phase: load the directory, chunk, embed, and swap in
    /// a fresh index.
    ///
    /// Fails without touching the current index when the directory yields
    /// no usable documents or when the embedding service fails. Per-file
    /// extraction failures are reported in the returned
    /// [`IndexReport::warnings`], not as errors.
    pub async fn build_index(&self, documents_dir: &Path) -> Result<IndexReport> {
        // Validate chunking parameters before any I/O.
        let chunker = TextChunker::new(&self.chunking)?;

        let outcome = self.loader.load(documents_dir)?;
        if outcome.documents.is_empty() {
            return Err(RagError::Configuration(format!(
                "no usable documents found in {}",
                documents_dir.display()
            )));
        }

        let chunks = chunker.split_documents(&outcome.documents);
        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let embeddings = self.embedding.embed(&texts).await?;

        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry {
                embedding,
                text: chunk.text,
                source: chunk.source,
            })
            .collect();

        let report = IndexReport {
            documents: outcome.documents.len(),
            chunks: entries.len(),
            embedding_model: self.embedding.model_id().to_string(),
            warnings: outcome.warnings,
        };

        let index = VectorIndex::build(entries)?;

        // Atomic swap: everything above ran on local state, so concurrent
        // answers kept reading the previous index.
        *self.index.write().await = Some(BuiltIndex {
            index,
            embedding_model: report.embedding_model.clone(),
        });

        log::info!(
            "Index ready: {} chunks from {} documents",
            report.chunks,
            report.documents
        );
        Ok(report)
    }

    /// Answer a question from the built index: embed the question,
    /// retrieve the `top_k` nearest chunks, assemble the prompt, generate,
    /// and attribute sources in first-seen order.
    pub async fn answer(&self, question: &str, top_k: usize) -> Result<QueryResult> {
        let guard = self.index.read().await;
        let built = guard.as_ref().ok_or(RagError::NotReady)?;

        if built.embedding_model != self.embedding.model_id() {
            return Err(RagError::Configuration(format!(
                "index was built with embedding model '{}' but the client now reports '{}'; rebuild the index",
                built.embedding_model,
                self.embedding.model_id()
            )));
        }

        let query_embedding = self.embedding.embed_query(question).await?;
        let retrieved = built.index.retrieve(&query_embedding, top_k)?;

        let prompt = build_prompt(question, &retrieved);
        let answer = self.generation.generate(&prompt).await?;

        let mut sources: Vec<String> = Vec::new();
        for scored in &retrieved {
            if !sources.contains(&scored.entry.source) {
                sources.push(scored.entry.source.clone());
            }
        }

        log::info!(
            "Answered question from {} chunks across {} sources",
            retrieved.len(),
            sources.len()
        );
        Ok(QueryResult { answer, sources })
    }

    /// [`build_index`](Self::build_index) with exponential backoff on
    /// embedding service failures. Deterministic errors return immediately.
    pub async fn build_index_with_retry(
        &self,
        documents_dir: &Path,
        policy: &RetryPolicy,
    ) -> Result<IndexReport> {
        let mut delay = policy.initial_delay;
        let mut attempt = 1u32;
        loop {
            match self.build_index(documents_dir).await {
                Ok(report) => return Ok(report),
                Err(e) if e.is_retryable() && attempt < policy.max_attempts => {
                    log::warn!(
                        "build_index attempt {}/{} failed: {}",
                        attempt,
                        policy.max_attempts,
                        e
                    );
                    sleep(delay).await;
                    delay = next_delay(delay, policy);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// [`answer`](Self::answer) with exponential backoff on embedding or
    /// generation service failures. Deterministic errors (including
    /// `NotReady`) return immediately.
    pub async fn answer_with_retry(
        &self,
        question: &str,
        top_k: usize,
        policy: &RetryPolicy,
    ) -> Result<QueryResult> {
        let mut delay = policy.initial_delay;
        let mut attempt = 1u32;
        loop {
            match self.answer(question, top_k).await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < policy.max_attempts => {
                    log::warn!(
                        "answer attempt {}/{} failed: {}",
                        attempt,
                        policy.max_attempts,
                        e
                    );
                    sleep(delay).await;
                    delay = next_delay(delay, policy);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn next_delay(current: Duration, policy: &RetryPolicy) -> Duration {
    Duration::from_secs_f64(
        (current.as_secs_f64() * policy.backoff_factor).min(policy.max_delay.as_secs_f64()),
    )
}

/// Fixed prompt template: retrieved chunks in retrieval order, then the
/// question.
fn build_prompt(question: &str, retrieved: &[ScoredEntry]) -> String {
    let mut context = String::new();
    for scored in retrieved {
        context.push_str(&format!(
            "Document: {}\nContent: {}\n\n",
            scored.entry.source, scored.entry.text
        ));
    }

    format!(
        r#"Answer the question using only the context documents below.
If the context does not contain the answer, say so clearly instead of guessing.

CONTEXT DOCUMENTS:
{context}QUESTION: {question}

ANSWER:"#
    )
}
