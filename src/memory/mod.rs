pub mod chunks;
pub mod recall;
pub mod stats;
pub mod store;
pub mod supersede;
pub mod types;
pub mod vector;

/// Encode an f32 embedding as little-endian bytes for BLOB storage.
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Decode a stored BLOB back into an f32 embedding. Trailing bytes that do
/// not form a whole f32 are rejected as corruption.
pub fn embedding_from_bytes(bytes: &[u8]) -> Result<Vec<f32>, String> {
    if bytes.len() % 4 != 0 {
        return Err(format!("embedding blob length {} is not a multiple of 4", bytes.len()));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Decode an embedding BLOB inside a rusqlite row mapper, surfacing
/// corruption as a column conversion failure.
pub(crate) fn decode_embedding_column(idx: usize, blob: Vec<u8>) -> rusqlite::Result<Vec<f32>> {
    embedding_from_bytes(&blob).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Blob, e.into())
    })
}

/// Round a similarity score to 4 decimal digits for presentation.
///
/// Internal comparison and sorting always use full precision; rounding
/// happens only when building response payloads.
pub fn round_similarity(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
