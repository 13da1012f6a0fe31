//! Typed errors for the similarity core and the GitHub fetch boundary.
//!
//! Pure-computation errors ([`DimensionMismatch`]) are programming bugs and
//! propagate as hard failures. Fetch errors carry enough structure for the
//! retry layer to distinguish rate limiting (retryable, with an optional
//! reset instant) from everything else (not retryable).

use thiserror::Error;

/// Two vectors of differing length were passed to the similarity scorer.
///
/// All embeddings in one run share a dimensionality, so this indicates a
/// programming error rather than a transient condition. Never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("embedding dimension mismatch: {left} vs {right}")]
pub struct DimensionMismatch {
    pub left: usize,
    pub right: usize,
}

/// Errors from the GitHub item-fetch boundary.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The API signalled a rate limit (HTTP 403/429). `reset_at` is the
    /// epoch-seconds value of the `X-RateLimit-Reset` header when present.
    #[error("rate limited by the GitHub API")]
    RateLimited { reset_at: Option<i64> },

    /// Retries on a rate-limited call were exhausted.
    #[error("rate limit retries exhausted after {attempts} attempts")]
    RateLimitExceeded { attempts: u32 },

    /// The repository does not exist or is not visible with this token.
    #[error("repository {0} not found")]
    RepositoryNotFound(String),

    /// The requested target item does not exist in the repository.
    #[error("item #{number} not found in {repository}")]
    TargetItemNotFound { repository: String, number: u64 },

    /// Any other non-success API response.
    #[error("GitHub API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure (DNS, TLS, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}
