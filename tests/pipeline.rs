//! End-to-end pipeline tests against a mock embedding provider:
//! generate → query → report, without any network access.

use std::sync::Arc;

use anyhow::bail;
use async_trait::async_trait;
use chrono::Utc;

use issue_radar::embedding::EmbeddingProvider;
use issue_radar::generator::BatchEmbeddingGenerator;
use issue_radar::index;
use issue_radar::models::{Item, ItemState, ItemType};
use issue_radar::progress::NoProgress;
use issue_radar::report::{write_report, PairsReport, SimilarReport};

/// Maps known titles to fixed vectors; fails on titles containing "broken".
struct FixtureProvider;

#[async_trait]
impl EmbeddingProvider for FixtureProvider {
    fn model_name(&self) -> &str {
        "fixture"
    }
    fn dims(&self) -> usize {
        2
    }
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        if text.contains("broken") {
            bail!("provider unavailable for this item");
        }
        // Near-duplicate cluster A around the x axis, cluster B around y.
        let v = if text.contains("login crash") {
            vec![1.0, 0.05]
        } else if text.contains("signin crash") {
            vec![1.0, 0.10]
        } else if text.contains("dark mode") {
            vec![0.05, 1.0]
        } else if text.contains("night theme") {
            vec![0.10, 1.0]
        } else {
            vec![0.7, -0.7]
        };
        Ok(v)
    }
}

fn item(number: u64, title: &str, item_type: ItemType) -> Item {
    Item::new(
        number,
        title,
        Some(format!("details for {}", title)),
        ItemState::Open,
        item_type,
        Utc::now(),
        format!("https://github.com/octo/repo/issues/{}", number),
    )
}

fn candidate_set() -> Vec<Item> {
    vec![
        item(1, "App login crash on startup", ItemType::Issue),
        item(2, "Crash at signin crash screen", ItemType::Issue),
        item(3, "Add dark mode support", ItemType::Issue),
        item(4, "Support a night theme toggle", ItemType::Issue),
        item(5, "Unrelated flaky test", ItemType::Issue),
    ]
}

#[tokio::test]
async fn full_pairs_pipeline_produces_expected_report() {
    let mut items = candidate_set();
    let generator = BatchEmbeddingGenerator::new(Arc::new(FixtureProvider), 2);
    let summary = generator.generate(&mut items, &NoProgress).await;
    assert_eq!(summary.embedded, 5);
    assert_eq!(summary.failed, 0);

    let pairs = index::find_all_pairs(&items, 0.85, Some(10)).unwrap();
    // Exactly the two near-duplicate clusters qualify, best first.
    assert_eq!(pairs.len(), 2);
    assert_eq!((pairs[0].item1.number, pairs[0].item2.number), (1, 2));
    assert_eq!((pairs[1].item1.number, pairs[1].item2.number), (3, 4));
    assert!(pairs[0].similarity >= pairs[1].similarity);

    let report = PairsReport::build("octo/repo", items.len(), &pairs);
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("pairs.json");
    write_report(&path, &report).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["repository"], "octo/repo");
    assert_eq!(value["processedItems"], 5);
    let listed = value["similarityPairs"].as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["item1"]["number"], 1);
    assert_eq!(listed[0]["item2"]["number"], 2);
    assert_eq!(listed[0]["item1"]["type"], "issue");
}

#[tokio::test]
async fn single_target_pipeline_excludes_target_and_respects_threshold() {
    let mut items = candidate_set();
    let generator = BatchEmbeddingGenerator::new(Arc::new(FixtureProvider), 3);
    generator.generate(&mut items, &NoProgress).await;

    let target = items[0].clone(); // login crash
    let results = index::find_similar(&target, &items, 0.85, 5).unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].item.number, 2);
    assert!(results.iter().all(|r| r.item.number != target.number));

    let report = SimilarReport::build("octo/repo", items.len(), &target, &results);
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["targetItem"]["number"], 1);
    assert_eq!(value["similarItems"][0]["number"], 2);
    assert_eq!(value["similarItems"][0]["state"], "open");
}

#[tokio::test]
async fn provider_failure_for_one_item_does_not_abort_the_run() {
    let mut items = candidate_set();
    items.push(item(6, "completely broken fixture entry", ItemType::Issue));

    let generator = BatchEmbeddingGenerator::new(Arc::new(FixtureProvider), 2);
    let summary = generator.generate(&mut items, &NoProgress).await;

    assert_eq!(summary.processed, 6);
    assert_eq!(summary.embedded, 5);
    assert_eq!(summary.failed, 1);

    let failed = items.iter().find(|i| i.number == 6).unwrap();
    assert!(failed.embedding.is_none());
    assert!(failed.content_hash.is_some());

    // Queries still work over the remaining embedded items.
    let pairs = index::find_all_pairs(&items, 0.85, None).unwrap();
    assert_eq!(pairs.len(), 2);
}

#[tokio::test]
async fn exact_duplicates_score_one_via_content_hash() {
    let mut items = vec![
        item(1, "App login crash on startup", ItemType::Issue),
        item(2, "App login crash on startup", ItemType::Issue),
    ];
    // Identical content, same hash; vectors differ slightly per fixture.
    items[1].body = items[0].body.clone();

    let generator = BatchEmbeddingGenerator::new(Arc::new(FixtureProvider), 2);
    generator.generate(&mut items, &NoProgress).await;

    let pairs = index::find_all_pairs(&items, 0.99, None).unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].similarity, 1.0);
}
