//! JSON report serialization.
//!
//! The report schema is the contract external tooling (CI comment bots)
//! depends on: camelCase keys, `type` field names, both report kinds
//! wrapped with `repository`, `processedItems` and `timestamp` metadata.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::models::{Item, ItemState, ItemType, SimilarityPair, SimilarityResult};

/// Target item header in the single-target report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSummary {
    pub number: u64,
    pub title: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
}

/// One match in the single-target report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarItemEntry {
    pub number: u64,
    pub title: String,
    pub state: ItemState,
    pub url: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub similarity: f64,
}

/// One side of a pair in the global report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairItemEntry {
    pub number: u64,
    pub title: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub url: String,
}

/// One entry in the global report's pair list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairEntry {
    pub item1: PairItemEntry,
    pub item2: PairItemEntry,
    pub similarity: f64,
}

/// Single-target report: items similar to one target.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarReport {
    pub repository: String,
    pub processed_items: usize,
    pub timestamp: String,
    pub target_item: TargetSummary,
    pub similar_items: Vec<SimilarItemEntry>,
}

/// Global report: all similar pairs in the candidate set.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairsReport {
    pub repository: String,
    pub processed_items: usize,
    pub timestamp: String,
    pub similarity_pairs: Vec<PairEntry>,
}

fn pair_item(item: &Item) -> PairItemEntry {
    PairItemEntry {
        number: item.number,
        title: item.title.clone(),
        item_type: item.item_type,
        url: item.url.clone(),
    }
}

impl SimilarReport {
    pub fn build(
        repository: &str,
        processed_items: usize,
        target: &Item,
        results: &[SimilarityResult<'_>],
    ) -> Self {
        Self {
            repository: repository.to_string(),
            processed_items,
            timestamp: Utc::now().to_rfc3339(),
            target_item: TargetSummary {
                number: target.number,
                title: target.title.clone(),
                item_type: target.item_type,
            },
            similar_items: results
                .iter()
                .map(|r| SimilarItemEntry {
                    number: r.item.number,
                    title: r.item.title.clone(),
                    state: r.item.state,
                    url: r.item.url.clone(),
                    item_type: r.item.item_type,
                    similarity: r.similarity as f64,
                })
                .collect(),
        }
    }
}

impl PairsReport {
    pub fn build(repository: &str, processed_items: usize, pairs: &[SimilarityPair<'_>]) -> Self {
        Self {
            repository: repository.to_string(),
            processed_items,
            timestamp: Utc::now().to_rfc3339(),
            similarity_pairs: pairs
                .iter()
                .map(|p| PairEntry {
                    item1: pair_item(p.item1),
                    item2: pair_item(p.item2),
                    similarity: p.similarity as f64,
                })
                .collect(),
        }
    }
}

/// Write a report as pretty-printed JSON with a trailing newline.
pub fn write_report<T: Serialize>(path: &Path, report: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Item;
    use chrono::Utc;

    fn item(number: u64, item_type: ItemType, state: ItemState) -> Item {
        Item::new(
            number,
            format!("item {}", number),
            None,
            state,
            item_type,
            Utc::now(),
            format!("https://github.com/o/r/issues/{}", number),
        )
    }

    #[test]
    fn similar_report_schema_is_camel_case() {
        let target = item(10, ItemType::Issue, ItemState::Open);
        let other = item(11, ItemType::Issue, ItemState::Closed);
        let results = vec![SimilarityResult {
            item: &other,
            similarity: 0.91,
        }];
        let report = SimilarReport::build("octo/repo", 2, &target, &results);
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["repository"], "octo/repo");
        assert_eq!(value["processedItems"], 2);
        assert!(value["timestamp"].is_string());
        assert_eq!(value["targetItem"]["number"], 10);
        assert_eq!(value["targetItem"]["type"], "issue");
        let entry = &value["similarItems"][0];
        assert_eq!(entry["number"], 11);
        assert_eq!(entry["state"], "closed");
        assert_eq!(entry["type"], "issue");
        assert!(entry["url"].as_str().unwrap().starts_with("https://"));
        assert!((entry["similarity"].as_f64().unwrap() - 0.91).abs() < 1e-6);
    }

    #[test]
    fn pairs_report_schema_is_camel_case() {
        let a = item(1, ItemType::Issue, ItemState::Open);
        let b = item(2, ItemType::PullRequest, ItemState::Merged);
        let pairs = vec![SimilarityPair {
            item1: &a,
            item2: &b,
            similarity: 0.88,
        }];
        let report = PairsReport::build("octo/repo", 2, &pairs);
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["processedItems"], 2);
        let pair = &value["similarityPairs"][0];
        assert_eq!(pair["item1"]["number"], 1);
        assert_eq!(pair["item1"]["type"], "issue");
        assert_eq!(pair["item2"]["type"], "pull_request");
        assert!(pair["item2"]["url"].is_string());
        assert!((pair["similarity"].as_f64().unwrap() - 0.88).abs() < 1e-6);
    }

    #[test]
    fn write_report_creates_parent_and_trailing_newline() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out").join("report.json");
        let report = PairsReport::build("octo/repo", 0, &[]);
        write_report(&path, &report).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["similarityPairs"].as_array().unwrap().len(), 0);
    }
}
