//! # Issue Radar CLI (`radar`)
//!
//! Detects duplicate and related issues or pull requests in a GitHub
//! repository via embedding similarity.
//!
//! ## Usage
//!
//! ```bash
//! # All similar pairs among the 200 most recent issues
//! radar --owner rust-lang --repo cargo --item-type issues --max-items 200
//!
//! # Items similar to one issue
//! radar --owner rust-lang --repo cargo --item-number 1234
//!
//! # Pull requests, custom threshold and output path
//! radar --owner o --repo r --item-type pull_request \
//!     --similarity-threshold 0.9 --output ./pr-dupes.json
//! ```
//!
//! Mode selection: `--item-number` present runs the single-target query,
//! absent runs the global all-pairs query. Progress is printed to stderr
//! when it is a TTY; the JSON report path and a summary go to stdout.

use anyhow::bail;
use clap::Parser;
use std::path::PathBuf;

use issue_radar::analyze::{self, AnalysisRequest};
use issue_radar::config;
use issue_radar::models::ItemType;
use issue_radar::progress::ProgressMode;

/// Parse and range-check the similarity threshold flag.
fn parse_threshold(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("{} is out of range [0.0, 1.0]", value));
    }
    Ok(value)
}

/// Issue Radar — duplicate and related issue/PR detection for GitHub
/// repositories via embeddings.
#[derive(Parser)]
#[command(
    name = "radar",
    about = "Detect duplicate and related issues/PRs in a GitHub repository",
    version,
    long_about = "Issue Radar fetches recent issues or pull requests from a GitHub \
    repository, embeds their content, and reports similar items (single target) or \
    all similar pairs (whole set) as a JSON file for downstream tooling."
)]
struct Cli {
    /// Repository owner (user or organization).
    #[arg(long)]
    owner: String,

    /// Repository name.
    #[arg(long)]
    repo: String,

    /// Item type to analyze: `issues` or `pull_request`.
    #[arg(long, default_value = "issues")]
    item_type: String,

    /// Maximum number of items to fetch into the candidate set.
    #[arg(long)]
    max_items: Option<usize>,

    /// Analyze similarity against this single item instead of all pairs.
    #[arg(long)]
    item_number: Option<u64>,

    /// Minimum similarity for a match, in [0.0, 1.0] (inclusive threshold).
    #[arg(long, value_parser = parse_threshold)]
    similarity_threshold: Option<f32>,

    /// Cap on reported pairs in all-pairs mode (top pairs by similarity).
    #[arg(long)]
    max_pairs: Option<usize>,

    /// Path for the JSON report.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Path to configuration file (TOML). Defaults apply when missing.
    #[arg(long, default_value = "./config/radar.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    let Some(item_type) = ItemType::parse(&cli.item_type) else {
        bail!(
            "Unknown item type: {}. Use issues or pull_request.",
            cli.item_type
        );
    };

    let output = cli.output.unwrap_or_else(|| cfg.output.path.clone());
    let request = AnalysisRequest {
        owner: &cli.owner,
        repo: &cli.repo,
        item_type,
        max_items: cli.max_items.unwrap_or(cfg.analysis.max_items),
        threshold: cli
            .similarity_threshold
            .unwrap_or(cfg.analysis.similarity_threshold),
        output: &output,
    };

    let reporter = ProgressMode::auto().reporter();

    match cli.item_number {
        Some(number) => {
            analyze::run_similar(&cfg, &request, number, reporter.as_ref()).await?;
        }
        None => {
            let max_pairs = cli.max_pairs.unwrap_or(cfg.analysis.max_pairs);
            analyze::run_pairs(&cfg, &request, max_pairs, reporter.as_ref()).await?;
        }
    }

    Ok(())
}
