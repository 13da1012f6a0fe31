//! TOML configuration parsing.
//!
//! Every section defaults sensibly, so a missing config file is not an
//! error: the CLI is usable with flags alone. `load_config` validates the
//! parsed values and rejects anything out of range.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GithubConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Environment variable holding the API token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_per_page")]
    pub per_page: usize,
    #[serde(default = "default_fetch_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token_env: default_token_env(),
            per_page: default_per_page(),
            max_retries: default_fetch_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}
fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}
fn default_per_page() -> usize {
    100
}
fn default_fetch_retries() -> u32 {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    /// Items embedded concurrently per batch.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            dims: None,
            concurrency: default_concurrency(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_concurrency() -> usize {
    10
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    /// Minimum cosine similarity for a match, inclusive.
    #[serde(default = "default_threshold")]
    pub similarity_threshold: f32,
    /// Candidate-set size fetched per run.
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    /// Result cap for single-target queries.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Result cap for the global pair query.
    #[serde(default = "default_max_pairs")]
    pub max_pairs: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_threshold(),
            max_items: default_max_items(),
            limit: default_limit(),
            max_pairs: default_max_pairs(),
        }
    }
}

fn default_threshold() -> f32 {
    0.85
}
fn default_max_items() -> usize {
    100
}
fn default_limit() -> usize {
    5
}
fn default_max_pairs() -> usize {
    50
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("./similarity-report.json")
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if !(0.0..=1.0).contains(&config.analysis.similarity_threshold) {
        anyhow::bail!("analysis.similarity_threshold must be in [0.0, 1.0]");
    }
    if config.analysis.max_items == 0 {
        anyhow::bail!("analysis.max_items must be >= 1");
    }
    if config.embedding.concurrency == 0 {
        anyhow::bail!("embedding.concurrency must be >= 1");
    }
    if config.github.per_page == 0 || config.github.per_page > 100 {
        anyhow::bail!("github.per_page must be in [1, 100]");
    }

    if config.embedding.is_enabled() {
        if config.embedding.dims.is_none() || config.embedding.dims == Some(0) {
            anyhow::bail!(
                "embedding.dims must be > 0 when provider is '{}'",
                config.embedding.provider
            );
        }
        if config.embedding.model.is_none() {
            anyhow::bail!(
                "embedding.model must be specified when provider is '{}'",
                config.embedding.provider
            );
        }
    }

    match config.embedding.provider.as_str() {
        "disabled" | "openai" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be disabled or openai.",
            other
        ),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config(Path::new("/nonexistent/radar.toml")).unwrap();
        assert_eq!(config.embedding.provider, "disabled");
        assert_eq!(config.analysis.max_items, 100);
        assert!((config.analysis.similarity_threshold - 0.85).abs() < 1e-6);
    }

    #[test]
    fn parses_partial_config() {
        let config: Config = toml::from_str(
            r#"
            [embedding]
            provider = "openai"
            model = "text-embedding-3-small"
            dims = 1536

            [analysis]
            similarity_threshold = 0.9
            "#,
        )
        .unwrap();
        validate(&config).unwrap();
        assert_eq!(config.embedding.dims, Some(1536));
        assert_eq!(config.embedding.concurrency, 10);
        assert_eq!(config.github.api_url, "https://api.github.com");
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let config: Config = toml::from_str(
            r#"
            [analysis]
            similarity_threshold = 1.5
            "#,
        )
        .unwrap();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_enabled_provider_without_dims() {
        let config: Config = toml::from_str(
            r#"
            [embedding]
            provider = "openai"
            model = "text-embedding-3-small"
            "#,
        )
        .unwrap();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_unknown_provider() {
        let config: Config = toml::from_str(
            r#"
            [embedding]
            provider = "cohere"
            model = "embed-v3"
            dims = 1024
            "#,
        )
        .unwrap();
        assert!(validate(&config).is_err());
    }
}
