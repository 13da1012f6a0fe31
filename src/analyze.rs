//! Analysis pipeline: fetch → generate → query → report.
//!
//! Each run owns its candidate set exclusively. The generation pass fully
//! completes before any index query runs, so queries always observe a
//! stable embedding state.

use anyhow::{bail, Result};
use std::path::Path;

use crate::config::Config;
use crate::embedding;
use crate::generator::BatchEmbeddingGenerator;
use crate::github::GithubClient;
use crate::index;
use crate::models::{Item, ItemType};
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::report::{self, PairsReport, SimilarReport};

/// Parameters shared by both analysis modes. CLI flags override config.
pub struct AnalysisRequest<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    pub item_type: ItemType,
    pub max_items: usize,
    pub threshold: f32,
    pub output: &'a Path,
}

/// Look up an item by its `(number, item_type)` identity key.
fn target_by_key(items: &[Item], key: (u64, ItemType)) -> Option<&Item> {
    items.iter().find(|i| i.key() == key)
}

async fn fetch_candidates(
    config: &Config,
    req: &AnalysisRequest<'_>,
    reporter: &dyn ProgressReporter,
) -> Result<Vec<Item>> {
    let repository = format!("{}/{}", req.owner, req.repo);
    reporter.report(ProgressEvent::Fetching {
        repository: repository.clone(),
    });

    let client = GithubClient::new(&config.github)?;
    let items = client
        .fetch_items(req.owner, req.repo, req.item_type, req.max_items)
        .await?;
    Ok(items)
}

async fn generate_embeddings(
    config: &Config,
    items: &mut [Item],
    reporter: &dyn ProgressReporter,
) -> Result<crate::generator::GenerateSummary> {
    if !config.embedding.is_enabled() {
        bail!("Embedding provider is disabled. Set [embedding] provider in config.");
    }
    let provider = embedding::create_provider(&config.embedding)?;
    let generator = BatchEmbeddingGenerator::new(provider, config.embedding.concurrency);
    Ok(generator.generate(items, reporter).await)
}

/// Single-target mode: find items similar to `#item_number`.
pub async fn run_similar(
    config: &Config,
    req: &AnalysisRequest<'_>,
    item_number: u64,
    reporter: &dyn ProgressReporter,
) -> Result<()> {
    let repository = format!("{}/{}", req.owner, req.repo);
    let mut items = fetch_candidates(config, req, reporter).await?;

    // The target may fall outside the candidate window (old item, or the
    // other item type); fetch it individually in that case. The key of the
    // fetched item is authoritative, since its type may differ from the
    // window's.
    let target_key = match target_by_key(&items, (item_number, req.item_type)) {
        Some(target) => target.key(),
        None => {
            let client = GithubClient::new(&config.github)?;
            let target = client.fetch_item(req.owner, req.repo, item_number).await?;
            let key = target.key();
            items.push(target);
            key
        }
    };

    let summary = generate_embeddings(config, &mut items, reporter).await?;

    let target = target_by_key(&items, target_key)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("target item #{} missing after fetch", item_number))?;

    let results = index::find_similar(&target, &items, req.threshold, config.analysis.limit)?;

    let processed = items.len();
    let report = SimilarReport::build(&repository, processed, &target, &results);
    report::write_report(req.output, &report)?;

    println!("similar items for {} #{}", repository, item_number);
    println!("  processed items: {}", processed);
    println!("  embedded: {}", summary.embedded);
    println!("  failed embeddings: {}", summary.failed);
    println!("  matches: {}", results.len());
    println!("  report: {}", req.output.display());

    Ok(())
}

/// Global mode: find all similar pairs in the candidate set.
pub async fn run_pairs(
    config: &Config,
    req: &AnalysisRequest<'_>,
    max_pairs: usize,
    reporter: &dyn ProgressReporter,
) -> Result<()> {
    let repository = format!("{}/{}", req.owner, req.repo);
    let mut items = fetch_candidates(config, req, reporter).await?;

    let summary = generate_embeddings(config, &mut items, reporter).await?;

    let pairs = index::find_all_pairs(&items, req.threshold, Some(max_pairs))?;

    let processed = items.len();
    let report = PairsReport::build(&repository, processed, &pairs);
    report::write_report(req.output, &report)?;

    println!("similarity pairs for {}", repository);
    println!("  processed items: {}", processed);
    println!("  embedded: {}", summary.embedded);
    println!("  failed embeddings: {}", summary.failed);
    println!("  pairs found: {}", pairs.len());
    println!("  report: {}", req.output.display());

    Ok(())
}
