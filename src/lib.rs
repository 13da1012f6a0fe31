//! # Issue Radar
//!
//! Duplicate and related issue/PR detection for GitHub repositories.
//!
//! Issue Radar fetches a window of issues or pull requests from the GitHub
//! REST API, embeds their title+body text with an embedding provider, and
//! answers two similarity queries: "what is similar to item #N" and "which
//! pairs in the whole set are similar". Results are written as JSON reports
//! for downstream tooling such as CI comment bots.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────────────┐   ┌───────────────┐
//! │  GitHub   │──▶│ BatchEmbedding   │──▶│ CandidateIndex │
//! │  fetch    │   │ Generator        │   │ similar/pairs │
//! │ (+retry)  │   │ (hash + embed)   │   └──────┬────────┘
//! └──────────┘   └─────────────────┘          │
//!                                             ▼
//!                                       ┌──────────┐
//!                                       │ JSON      │
//!                                       │ report    │
//!                                       └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export GITHUB_TOKEN=...
//! export OPENAI_API_KEY=...
//! radar --owner rust-lang --repo cargo --item-type issues            # all pairs
//! radar --owner rust-lang --repo cargo --item-number 1234            # one target
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`similarity`] | Cosine similarity scoring |
//! | [`fingerprint`] | Content hashing for exact duplicates |
//! | [`index`] | Single-target and all-pairs similarity queries |
//! | [`generator`] | Bounded-concurrency embedding generation |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`retry`] | Rate-limit-aware retry |
//! | [`github`] | GitHub REST item fetching |
//! | [`report`] | JSON report serialization |
//! | [`analyze`] | Pipeline orchestration |

pub mod analyze;
pub mod config;
pub mod embedding;
pub mod error;
pub mod fingerprint;
pub mod generator;
pub mod github;
pub mod index;
pub mod models;
pub mod progress;
pub mod report;
pub mod retry;
pub mod similarity;
