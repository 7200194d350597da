//! Embedding client implementations

use crate::config::EmbedConfig;
use crate::error::{EmbedError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

/// Result of embedding generation
#[derive(Debug, Clone)]
pub struct EmbeddingBatch {
    /// The generated embeddings, one per input text, in input order
    pub embeddings: Vec<Vec<f32>>,
    /// The dimension of each embedding vector
    pub dimension: usize,
}

impl EmbeddingBatch {
    /// Create a batch from a vector of embeddings.
    ///
    /// The dimension is inferred from the first vector; an empty batch has
    /// dimension 0.
    pub fn new(embeddings: Vec<Vec<f32>>) -> Self {
        let dimension = embeddings.first().map(|e| e.len()).unwrap_or(0);
        Self {
            embeddings,
            dimension,
        }
    }

    /// Number of embedding vectors in this batch.
    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    /// Whether the batch holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }
}

/// Trait for clients that turn text into embedding vectors.
///
/// The retrieval pipeline only depends on this trait, so tests substitute a
/// deterministic fake and production wires in [`HttpEmbeddingClient`].
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Generate embeddings for multiple texts in one batched call.
    ///
    /// The result is order-preserving: `embeddings[i]` corresponds to
    /// `texts[i]`.
    async fn embed_texts(&self, texts: &[String]) -> Result<EmbeddingBatch>;

    /// Generate an embedding for a single text.
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text.to_string()];
        let batch = self.embed_texts(&texts).await?;
        batch
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| EmbedError::invalid_response("service returned no embedding"))
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingEntry>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingEntry {
    index: usize,
    embedding: Vec<f32>,
}

/// HTTP client for an OpenAI-compatible `/embeddings` endpoint.
#[derive(Debug, Clone)]
pub struct HttpEmbeddingClient {
    http: reqwest::Client,
    config: EmbedConfig,
}

impl HttpEmbeddingClient {
    /// Create a client for the configured endpoint.
    pub fn new(config: EmbedConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("reqwest client construction should not fail");
        Self { http, config }
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &EmbedConfig {
        &self.config
    }
}

#[async_trait]
impl EmbeddingClient for HttpEmbeddingClient {
    async fn embed_texts(&self, texts: &[String]) -> Result<EmbeddingBatch> {
        if texts.is_empty() {
            return Err(EmbedError::EmptyBatch);
        }

        tracing::debug!(count = texts.len(), model = %self.config.model, "requesting embeddings");

        let response = self
            .http
            .post(self.config.embeddings_url())
            .bearer_auth(&self.config.api_key)
            .json(&json!({
                "model": self.config.model,
                "input": texts,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "embedding service rejected the batch");
            return Err(EmbedError::ServiceStatus { status, message });
        }

        let body: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| EmbedError::invalid_response(e.to_string()))?;

        if body.data.len() != texts.len() {
            return Err(EmbedError::invalid_response(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                body.data.len()
            )));
        }

        // The service is allowed to return entries out of order; the `index`
        // field is authoritative.
        let mut embeddings: Vec<Option<Vec<f32>>> = vec![None; texts.len()];
        for entry in body.data {
            let slot = embeddings
                .get_mut(entry.index)
                .ok_or_else(|| {
                    EmbedError::invalid_response(format!("embedding index {} out of range", entry.index))
                })?;
            *slot = Some(entry.embedding);
        }
        let embeddings = embeddings
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| EmbedError::invalid_response("duplicate or missing embedding index"))?;

        Ok(EmbeddingBatch::new(embeddings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpEmbeddingClient {
        HttpEmbeddingClient::new(EmbedConfig::new(server.uri(), "sk-test"))
    }

    #[tokio::test]
    async fn embeds_a_batch_in_input_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .and(body_partial_json(json!({"model": "text-embedding-3-small"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [
                    {"object": "embedding", "index": 0, "embedding": [1.0, 0.0]},
                    {"object": "embedding", "index": 1, "embedding": [0.0, 1.0]},
                ],
                "model": "text-embedding-3-small",
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let batch = client
            .embed_texts(&["first".to_string(), "second".to_string()])
            .await
            .unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.dimension, 2);
        assert_eq!(batch.embeddings[0], vec![1.0, 0.0]);
        assert_eq!(batch.embeddings[1], vec![0.0, 1.0]);
    }

    #[tokio::test]
    async fn reorders_entries_by_index_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"index": 1, "embedding": [0.0, 1.0]},
                    {"index": 0, "embedding": [1.0, 0.0]},
                ],
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let batch = client
            .embed_texts(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(batch.embeddings[0], vec![1.0, 0.0]);
        assert_eq!(batch.embeddings[1], vec![0.0, 1.0]);
    }

    #[tokio::test]
    async fn surfaces_service_errors_without_fabricating_vectors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.embed_texts(&["text".to_string()]).await.unwrap_err();
        match err {
            EmbedError::ServiceStatus { status, message } => {
                assert_eq!(status.as_u16(), 429);
                assert_eq!(message, "rate limited");
            }
            other => panic!("expected ServiceStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejects_an_empty_batch_locally() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        let err = client.embed_texts(&[]).await.unwrap_err();
        assert!(matches!(err, EmbedError::EmptyBatch));
    }

    #[tokio::test]
    async fn rejects_a_short_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"index": 0, "embedding": [1.0]}],
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .embed_texts(&["a".to_string(), "b".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, EmbedError::InvalidResponse { .. }));
    }
}
