//! Cosine similarity between embedding vectors.
//!
//! For unit-normalized embeddings the score lands in `[0, 1]` in practice,
//! but the value is not clamped; callers compare it against a threshold.

use crate::error::DimensionMismatch;

/// Compute cosine similarity between two embedding vectors.
///
/// Returns `dot(a, b) / (‖a‖ × ‖b‖)` using the Euclidean norm.
///
/// - `1.0` = identical direction
/// - `0.0` = orthogonal (unrelated)
/// - `-1.0` = opposite direction
///
/// If either norm is exactly zero the result is `0.0` rather than NaN.
///
/// # Errors
///
/// Returns [`DimensionMismatch`] when the vectors differ in length. All
/// embeddings in one run share a dimensionality, so a mismatch is a
/// programming error and is never retried.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, DimensionMismatch> {
    if a.len() != b.len() {
        return Err(DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return Ok(0.0);
    }

    Ok(dot / denom)
}
