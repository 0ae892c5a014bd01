use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{RagError, Result};
use crate::models::{GenerationParameters, GenerationRequest, GenerationResponse};

/// Remote text-generation capability. One `generate` call is one network
/// round-trip and may return multiple candidate sequences.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        parameters: &GenerationParameters,
    ) -> Result<Vec<String>>;

    /// Identity/version of the generation model behind this backend.
    fn model_id(&self) -> &str;
}

/// Connection settings for a hosted text-generation endpoint.
#[derive(Debug, Clone)]
pub struct GenerationEndpointConfig {
    pub endpoint_url: String,
    pub model_id: String,
    pub timeout: Duration,
}

/// HTTP implementation of [`GenerationBackend`].
///
/// Posts `{"text_inputs": ..., <parameters>}` and expects
/// `{"generated_texts": [...]}`.
pub struct HttpGenerationBackend {
    client: Client,
    config: GenerationEndpointConfig,
}

impl HttpGenerationBackend {
    pub fn new(config: GenerationEndpointConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                RagError::GenerationService(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl GenerationBackend for HttpGenerationBackend {
    async fn generate(
        &self,
        prompt: &str,
        parameters: &GenerationParameters,
    ) -> Result<Vec<String>> {
        let request = GenerationRequest {
            text_inputs: prompt,
            parameters,
        };

        let response = self
            .client
            .post(&self.config.endpoint_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                RagError::GenerationService(format!(
                    "request to {} failed: {e}",
                    self.config.endpoint_url
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::GenerationService(format!(
                "endpoint returned {status}: {body}"
            )));
        }

        let parsed: GenerationResponse = response
            .json()
            .await
            .map_err(|e| RagError::GenerationService(format!("unexpected response shape: {e}")))?;

        Ok(parsed.generated_texts)
    }

    fn model_id(&self) -> &str {
        &self.config.model_id
    }
}

/// Generation client with fixed decoding parameters.
///
/// Does not retry and does not alter parameters on failure; retry policy
/// belongs to the orchestrator.
pub struct GenerationClient {
    backend: Arc<dyn GenerationBackend>,
    parameters: GenerationParameters,
}

impl GenerationClient {
    pub fn new(backend: Arc<dyn GenerationBackend>, parameters: GenerationParameters) -> Self {
        Self {
            backend,
            parameters,
        }
    }

    /// Generate text for `prompt` and return the first sequence.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let sequences = self.backend.generate(prompt, &self.parameters).await?;
        sequences.into_iter().next().ok_or_else(|| {
            RagError::GenerationService("endpoint returned no generated sequences".to_string())
        })
    }

    pub fn model_id(&self) -> &str {
        self.backend.model_id()
    }

    pub fn parameters(&self) -> &GenerationParameters {
        &self.parameters
    }
}
