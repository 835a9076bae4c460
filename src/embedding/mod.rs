//! Text-to-vector embedding boundary.
//!
//! Provides the [`Embedder`] trait and an Ollama-backed implementation. The
//! embedder is the only network collaborator of the engine; every call is
//! bounded by the configured timeout, and any failure aborts the whole
//! request — no partial results are ever produced from a failed embedding.

pub mod ollama;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbedError {
    /// The embedding service could not be reached or timed out.
    #[error("embedding service unreachable: {0}")]
    Unreachable(String),

    /// The service answered with a non-success status.
    #[error("embedding service returned HTTP {0}")]
    Status(u16),

    /// The response body did not contain a usable vector.
    #[error("malformed embedding response: {0}")]
    Malformed(String),
}

/// Trait for embedding text into vectors.
///
/// All methods are synchronous and blocking — callers in async contexts run
/// them via `tokio::task::spawn_blocking`. Implementations must return
/// vectors of a constant length for the lifetime of the process; vector
/// dimensionality is fixed by the embedding model, not by this trait.
pub trait Embedder: Send + Sync {
    /// Embed a single text string into a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    /// Probe whether the embedding service is reachable. Used by health
    /// reporting only — a failed probe degrades status, it never aborts.
    fn is_healthy(&self) -> bool;

    /// Model identifier, for health reporting and mismatch warnings.
    fn model(&self) -> &str;
}

/// Create an embedder from config.
pub fn create_embedder(config: &crate::config::EmbeddingConfig) -> anyhow::Result<Box<dyn Embedder>> {
    let embedder = ollama::OllamaEmbedder::new(config)?;
    Ok(Box::new(embedder))
}
