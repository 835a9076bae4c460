//! Cosine similarity over fixed-length embedding vectors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SimilarityError {
    #[error("embedding dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    /// At least one vector has zero magnitude; the cosine ratio is undefined.
    /// Returned as an explicit error so degenerate vectors never rank silently.
    #[error("cannot compute similarity for a zero-magnitude vector")]
    DegenerateVector,
}

/// Cosine similarity of two equal-length vectors, in `[-1, 1]`.
///
/// Accumulates in f64 regardless of element type to keep ordering stable for
/// near-tie scores.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, SimilarityError> {
    if a.len() != b.len() {
        return Err(SimilarityError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(SimilarityError::DegenerateVector);
    }

    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}
