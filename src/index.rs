//! Similarity queries over a candidate set.
//!
//! The candidate set is fully populated by the batch generator before any
//! query runs, so queries only ever observe a stable embedding state. Both
//! queries are synchronous full scans: `find_similar` is O(n) per call,
//! `find_all_pairs` is a single strict-upper-triangle pass, O(n²) total,
//! visiting each unordered pair exactly once.

use crate::error::DimensionMismatch;
use crate::models::{Item, SimilarityPair, SimilarityResult};
use crate::similarity::cosine_similarity;

/// When bounding pair output, let the buffer grow to this multiple of
/// `max_pairs` before re-sorting and truncating. Keeps peak memory at
/// O(max_pairs) for large candidate sets.
const TRUNCATE_SLACK: usize = 4;

/// Score one candidate pair, short-circuiting on identical content.
///
/// Both embeddings must be present; `None` means the pair cannot be scored
/// and is skipped by the caller. For scorable pairs, equal content hashes
/// mean byte-identical title+body, which scores 1.0 without touching the
/// vectors.
fn score(a: &Item, b: &Item) -> Result<Option<f32>, DimensionMismatch> {
    match (&a.embedding, &b.embedding) {
        (Some(ea), Some(eb)) => {
            if let (Some(ha), Some(hb)) = (&a.content_hash, &b.content_hash) {
                if ha == hb {
                    return Ok(Some(1.0));
                }
            }
            Ok(Some(cosine_similarity(ea, eb)?))
        }
        _ => Ok(None),
    }
}

/// Find items similar to `target` within `items`.
///
/// Returns at most `limit` results with `similarity >= threshold`, in
/// descending similarity order; ties keep the candidate-set order (stable
/// sort). The scan always covers the whole set — `limit` bounds output,
/// not work.
///
/// A target without an embedding yields an empty result rather than an
/// error: callers must run the generation pass first. The target itself is
/// never returned (matched by `(number, item_type)`).
pub fn find_similar<'a>(
    target: &Item,
    items: &'a [Item],
    threshold: f32,
    limit: usize,
) -> Result<Vec<SimilarityResult<'a>>, DimensionMismatch> {
    if target.embedding.is_none() {
        return Ok(Vec::new());
    }

    let mut results: Vec<SimilarityResult<'a>> = Vec::new();
    for item in items {
        if item.key() == target.key() {
            continue;
        }
        let Some(similarity) = score(target, item)? else {
            continue;
        };
        if similarity >= threshold {
            results.push(SimilarityResult { item, similarity });
        }
    }

    results.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results.truncate(limit);
    Ok(results)
}

/// Find every similar pair in the candidate set.
///
/// Enumerates each unordered pair `(i, j)` with `i < j` exactly once, so no
/// dedup structure is needed. Pairs where either item lacks an embedding
/// are skipped. Results are ordered by descending similarity; ties keep
/// first-seen (triangular iteration) order.
///
/// With `max_pairs` set, the result is the true top `max_pairs` by
/// similarity. The working buffer is re-sorted and truncated whenever it
/// exceeds a small multiple of the bound, so memory stays O(max_pairs)
/// rather than O(n²).
pub fn find_all_pairs<'a>(
    items: &'a [Item],
    threshold: f32,
    max_pairs: Option<usize>,
) -> Result<Vec<SimilarityPair<'a>>, DimensionMismatch> {
    let mut pairs: Vec<SimilarityPair<'a>> = Vec::new();
    let sort_desc = |pairs: &mut Vec<SimilarityPair<'a>>| {
        pairs.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    };

    for (i, item1) in items.iter().enumerate() {
        for item2 in &items[i + 1..] {
            let Some(similarity) = score(item1, item2)? else {
                continue;
            };
            if similarity < threshold {
                continue;
            }
            pairs.push(SimilarityPair {
                item1,
                item2,
                similarity,
            });

            if let Some(max) = max_pairs {
                if pairs.len() >= max.saturating_mul(TRUNCATE_SLACK).max(max.saturating_add(1)) {
                    sort_desc(&mut pairs);
                    pairs.truncate(max);
                }
            }
        }
    }

    sort_desc(&mut pairs);
    if let Some(max) = max_pairs {
        pairs.truncate(max);
    }
    Ok(pairs)
}
