use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A loaded document: identity plus full extracted text. Immutable once
/// loaded; discarded after chunking.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    /// Filename used as the citation identity.
    pub filename: String,
    /// Full path of the source file.
    pub path: PathBuf,
    pub content: String,
}

/// A bounded text segment derived from one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Sequence position within the owning document.
    pub index: usize,
    pub text: String,
    /// Filename of the owning document.
    pub source: String,
}

/// One indexed triple: embedding vector, chunk text, source identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub embedding: Vec<f32>,
    pub text: String,
    pub source: String,
}

/// Answer to one question plus the distinct source documents that
/// contributed retrieved chunks, in first-seen order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub answer: String,
    pub sources: Vec<String>,
}

/// A file that could not be ingested. Non-fatal: the rest of the batch
/// still indexes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionWarning {
    pub path: PathBuf,
    pub reason: String,
}

/// Summary of a successful `build_index`, including any non-fatal
/// ingestion warnings to report alongside the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexReport {
    pub documents: usize,
    pub chunks: usize,
    /// Identity of the embedding model the index was built with.
    pub embedding_model: String,
    pub warnings: Vec<IngestionWarning>,
}

/// Decoding controls accepted by the generation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParameters {
    pub max_length: u32,
    pub num_return_sequences: u32,
    pub top_k: u32,
    pub top_p: f32,
    pub do_sample: bool,
    pub temperature: f32,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            max_length: 3000,
            num_return_sequences: 1,
            top_k: 250,
            top_p: 0.95,
            do_sample: true,
            temperature: 0.5,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EmbeddingRequest {
    pub inputs: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingResponse {
    pub vectors: Vec<Vec<f32>>,
}

#[derive(Debug, Serialize)]
pub struct GenerationRequest<'a> {
    pub text_inputs: &'a str,
    #[serde(flatten)]
    pub parameters: &'a GenerationParameters,
}

#[derive(Debug, Deserialize)]
pub struct GenerationResponse {
    pub generated_texts: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_request_flattens_parameters() {
        let parameters = GenerationParameters::default();
        let request = GenerationRequest {
            text_inputs: "What color is the sky?",
            parameters: &parameters,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["text_inputs"], "What color is the sky?");
        assert_eq!(value["max_length"], 3000);
        assert_eq!(value["num_return_sequences"], 1);
        assert_eq!(value["top_k"], 250);
        assert_eq!(value["do_sample"], true);
    }

    #[test]
    fn embedding_response_parses_vectors() {
        let body = r#"{"vectors": [[0.1, 0.2], [0.3, 0.4]]}"#;
        let response: EmbeddingResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.vectors.len(), 2);
        assert_eq!(response.vectors[0].len(), 2);
    }
}
