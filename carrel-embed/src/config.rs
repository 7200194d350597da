//! Configuration for the embedding service client

use std::time::Duration;

/// Default embedding model requested from the service.
pub const DEFAULT_EMBED_MODEL: &str = "text-embedding-3-small";

/// Configuration for an OpenAI-compatible embedding endpoint.
///
/// `base_url` is the API root (e.g. `https://api.openai.com/v1`); the client
/// appends `/embeddings`. The key is sent as a bearer token.
#[derive(Debug, Clone)]
pub struct EmbedConfig {
    /// API root, without a trailing slash.
    pub base_url: String,
    /// Bearer token for the service.
    pub api_key: String,
    /// Model name sent with every request.
    pub model: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl EmbedConfig {
    /// Create a configuration with the default model and a 30s timeout.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        EmbedConfig {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: DEFAULT_EMBED_MODEL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the model name (builder style).
    pub fn with_model<S: Into<String>>(self, model: S) -> Self {
        Self {
            model: model.into(),
            ..self
        }
    }

    /// Set the per-request timeout (builder style).
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// The full URL of the embeddings endpoint.
    pub fn embeddings_url(&self) -> String {
        format!("{}/embeddings", self.base_url)
    }
}
