//! Vector similarity ranking.
//!
//! Pure-Rust cosine similarity and the stable ranking used by every store's
//! `related_ids`.

use ait_core::experience::{Experience, ExperienceId};

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if the vectors differ in length, are empty, or either is zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Rank experiences by cosine similarity to a query embedding.
///
/// Returns at most `limit` ids, most similar first. The sort is stable, so
/// equal scores keep insertion order and the ranking is deterministic.
/// Experiences without a usable embedding score 0 and still take part.
pub fn rank_by_similarity(
    entries: &[Experience],
    query_embedding: &[f32],
    limit: usize,
) -> Vec<ExperienceId> {
    let mut scored: Vec<(f32, &ExperienceId)> = entries
        .iter()
        .map(|e| (cosine_similarity(&e.embedding, query_embedding), &e.id))
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.truncate(limit);
    scored.into_iter().map(|(_, id)| id.clone()).collect()
}
