//! Ollama embedding client.
//!
//! Talks to the Ollama embeddings API (`POST /api/embeddings`) with a bounded
//! per-request timeout. Health probes hit `/api/tags` with a short fixed
//! timeout so a wedged Ollama cannot stall health reporting.

use super::{EmbedError, Embedder};
use crate::config::EmbeddingConfig;
use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

const HEALTH_TIMEOUT: Duration = Duration::from_secs(2);

pub struct OllamaEmbedder {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

impl OllamaEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

impl Embedder for OllamaEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let url = format!("{}/api/embeddings", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "model": self.model, "prompt": text }))
            .send()
            .map_err(|e| EmbedError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EmbedError::Status(response.status().as_u16()));
        }

        let body: EmbeddingsResponse = response
            .json()
            .map_err(|e| EmbedError::Malformed(e.to_string()))?;

        if body.embedding.is_empty() {
            return Err(EmbedError::Malformed("empty embedding vector".into()));
        }

        tracing::debug!(dims = body.embedding.len(), "embedded text");
        Ok(body.embedding)
    }

    fn is_healthy(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        self.client
            .get(&url)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
