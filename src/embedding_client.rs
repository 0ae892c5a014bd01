use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{RagError, Result};
use crate::models::{EmbeddingRequest, EmbeddingResponse};

/// Remote embedding capability: one `embed_batch` call is one network
/// round-trip.
///
/// `model_id` identifies the embedding model so that an index can refuse
/// queries embedded in a different vector space.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Embed one batch of texts, order-preserving, one vector per text.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Identity/version of the embedding model behind this backend.
    fn model_id(&self) -> &str;
}

/// Connection settings for a hosted embedding endpoint.
#[derive(Debug, Clone)]
pub struct EmbeddingEndpointConfig {
    pub endpoint_url: String,
    pub model_id: String,
    /// Bound on each request; the call fails with a service error instead
    /// of hanging.
    pub timeout: Duration,
}

/// HTTP implementation of [`EmbeddingBackend`].
///
/// Posts `{"inputs": [...]}` and expects `{"vectors": [[...], ...]}` with
/// one vector per input.
pub struct HttpEmbeddingBackend {
    client: Client,
    config: EmbeddingEndpointConfig,
}

impl HttpEmbeddingBackend {
    pub fn new(config: EmbeddingEndpointConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RagError::EmbeddingService(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl EmbeddingBackend for HttpEmbeddingBackend {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            inputs: texts.to_vec(),
        };

        let response = self
            .client
            .post(&self.config.endpoint_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                RagError::EmbeddingService(format!(
                    "request to {} failed: {e}",
                    self.config.endpoint_url
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::EmbeddingService(format!(
                "endpoint returned {status}: {body}"
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| RagError::EmbeddingService(format!("unexpected response shape: {e}")))?;

        if parsed.vectors.len() != texts.len() {
            return Err(RagError::EmbeddingService(format!(
                "endpoint returned {} vectors for {} inputs",
                parsed.vectors.len(),
                texts.len()
            )));
        }

        Ok(parsed.vectors)
    }

    fn model_id(&self) -> &str {
        &self.config.model_id
    }
}

/// Batching wrapper over an [`EmbeddingBackend`].
///
/// Document-time and query-time embedding go through the same backend, so
/// every vector in an index lives in one embedding space.
pub struct EmbeddingClient {
    backend: Arc<dyn EmbeddingBackend>,
    batch_size: usize,
}

impl EmbeddingClient {
    pub fn new(backend: Arc<dyn EmbeddingBackend>, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(RagError::Configuration(
                "embedding batch_size must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            backend,
            batch_size,
        })
    }

    /// Embed all texts, issuing one remote call per group of at most
    /// `batch_size` texts and concatenating the results in input order.
    /// Any batch failure fails the whole call.
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let batch_size = self.batch_size.min(texts.len());
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(batch_size) {
            let mut vectors = self.backend.embed_batch(batch).await?;
            embeddings.append(&mut vectors);
        }

        log::debug!(
            "Embedded {} texts in batches of {}",
            embeddings.len(),
            batch_size
        );
        Ok(embeddings)
    }

    /// Embed a single query text with the identical model and transform
    /// used at document time.
    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.backend.embed_batch(&[text.to_string()]).await?;
        vectors.pop().ok_or_else(|| {
            RagError::EmbeddingService("endpoint returned no vector for the query".to_string())
        })
    }

    pub fn model_id(&self) -> &str {
        self.backend.model_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records the size of every batch it receives and embeds each text as
    /// a vector tagged with its position in the call.
    struct RecordingBackend {
        batch_sizes: Mutex<Vec<usize>>,
        fail_after: Option<usize>,
    }

    impl RecordingBackend {
        fn new() -> Self {
            Self {
                batch_sizes: Mutex::new(Vec::new()),
                fail_after: None,
            }
        }

        fn failing_after(calls: usize) -> Self {
            Self {
                batch_sizes: Mutex::new(Vec::new()),
                fail_after: Some(calls),
            }
        }
    }

    #[async_trait]
    impl EmbeddingBackend for RecordingBackend {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut sizes = self.batch_sizes.lock().unwrap();
            if let Some(limit) = self.fail_after {
                if sizes.len() >= limit {
                    return Err(RagError::EmbeddingService("endpoint unavailable".into()));
                }
            }
            sizes.push(texts.len());
            Ok(texts
                .iter()
                .map(|text| vec![text.len() as f32, 1.0])
                .collect())
        }

        fn model_id(&self) -> &str {
            "recording-model"
        }
    }

    fn texts(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[tokio::test]
    async fn preserves_order_and_count() {
        let backend = Arc::new(RecordingBackend::new());
        let client = EmbeddingClient::new(backend, 2).unwrap();

        let input = texts(&["a", "bb", "ccc", "dddd", "eeeee"]);
        let vectors = client.embed(&input).await.unwrap();

        assert_eq!(vectors.len(), input.len());
        for (vector, text) in vectors.iter().zip(&input) {
            assert_eq!(vector[0], text.len() as f32);
        }
    }

    #[tokio::test]
    async fn groups_into_batches_of_at_most_batch_size() {
        let backend = Arc::new(RecordingBackend::new());
        let client = EmbeddingClient::new(backend.clone(), 2).unwrap();

        client
            .embed(&texts(&["a", "b", "c", "d", "e"]))
            .await
            .unwrap();

        assert_eq!(*backend.batch_sizes.lock().unwrap(), vec![2, 2, 1]);
    }

    #[tokio::test]
    async fn batch_size_is_clamped_to_input_length() {
        let backend = Arc::new(RecordingBackend::new());
        let client = EmbeddingClient::new(backend.clone(), 100).unwrap();

        client.embed(&texts(&["a", "b"])).await.unwrap();

        assert_eq!(*backend.batch_sizes.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn empty_input_makes_no_remote_calls() {
        let backend = Arc::new(RecordingBackend::new());
        let client = EmbeddingClient::new(backend.clone(), 10).unwrap();

        let vectors = client.embed(&[]).await.unwrap();

        assert!(vectors.is_empty());
        assert!(backend.batch_sizes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn one_failed_batch_fails_the_whole_call() {
        let backend = Arc::new(RecordingBackend::failing_after(1));
        let client = EmbeddingClient::new(backend, 2).unwrap();

        let result = client.embed(&texts(&["a", "b", "c", "d"])).await;
        assert!(matches!(result, Err(RagError::EmbeddingService(_))));
    }

    #[tokio::test]
    async fn embed_query_returns_one_vector() {
        let backend = Arc::new(RecordingBackend::new());
        let client = EmbeddingClient::new(backend, 10).unwrap();

        let vector = client.embed_query("hello").await.unwrap();
        assert_eq!(vector, vec![5.0, 1.0]);
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let backend = Arc::new(RecordingBackend::new());
        let result = EmbeddingClient::new(backend, 0);
        assert!(matches!(result, Err(RagError::Configuration(_))));
    }
}
