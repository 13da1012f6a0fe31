//! Batch embedding generation over a candidate set.
//!
//! Populates `content_hash` and `embedding` on every item before the index
//! queries run. Hashes are computed up front for the whole set (pure, never
//! fails), so exact-duplicate detection works even when the provider is
//! down. Embeddings are requested in fixed-size batches: all requests in a
//! batch run concurrently and are awaited together before the next batch
//! starts. One failed item never aborts the run.

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::embedding::EmbeddingProvider;
use crate::fingerprint::content_hash;
use crate::models::Item;
use crate::progress::{ProgressEvent, ProgressReporter};

/// Outcome counts for one generation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateSummary {
    /// Items processed (hash computed), equal to the candidate-set size.
    pub processed: usize,
    /// Items that received an embedding.
    pub embedded: usize,
    /// Items whose embedding request failed; their `embedding` stays unset.
    pub failed: usize,
}

/// Generates embeddings for a candidate set with bounded concurrency.
pub struct BatchEmbeddingGenerator {
    provider: Arc<dyn EmbeddingProvider>,
    concurrency: usize,
}

impl BatchEmbeddingGenerator {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, concurrency: usize) -> Self {
        Self {
            provider,
            concurrency: concurrency.max(1),
        }
    }

    /// Populate `content_hash` and `embedding` on every item in place.
    ///
    /// Batch N+1 does not start until all of batch N's requests resolve. No
    /// ordering is guaranteed within a batch. After each batch the reporter
    /// receives an [`ProgressEvent::Embedding`] with cumulative counts.
    ///
    /// Per-item failures are logged to stderr and counted in the summary;
    /// the failed item keeps its hash but no embedding.
    pub async fn generate(
        &self,
        items: &mut [Item],
        reporter: &dyn ProgressReporter,
    ) -> GenerateSummary {
        let total = items.len();

        // Hash pass first: pure and infallible, independent of the provider.
        for item in items.iter_mut() {
            item.content_hash = Some(content_hash(&item.title, item.body.as_deref()));
        }

        let mut summary = GenerateSummary {
            processed: total,
            ..Default::default()
        };

        let indices: Vec<usize> = (0..total).collect();
        for batch in indices.chunks(self.concurrency) {
            let mut tasks: JoinSet<(usize, anyhow::Result<Vec<f32>>)> = JoinSet::new();

            for &idx in batch {
                let provider = Arc::clone(&self.provider);
                let text = items[idx].embed_text();
                tasks.spawn(async move { (idx, provider.embed(&text).await) });
            }

            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((idx, Ok(vector))) => {
                        items[idx].embedding = Some(vector);
                        summary.embedded += 1;
                    }
                    Ok((idx, Err(e))) => {
                        eprintln!(
                            "Warning: embedding failed for {} #{}: {}",
                            items[idx].item_type, items[idx].number, e
                        );
                        summary.failed += 1;
                    }
                    Err(e) => {
                        // Task panicked; the item stays unembedded.
                        eprintln!("Warning: embedding task failed: {}", e);
                        summary.failed += 1;
                    }
                }
            }

            reporter.report(ProgressEvent::Embedding {
                n: (summary.embedded + summary.failed) as u64,
                total: total as u64,
            });
        }

        summary
    }
}
