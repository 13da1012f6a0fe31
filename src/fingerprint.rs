//! Content fingerprinting for exact-duplicate detection.
//!
//! Two items with the same hash have identical content; two items with
//! different hashes may still be semantically similar. The hash is computed
//! for every item regardless of embedding outcome, so exact-duplicate
//! detection works even when the embedding provider fails.

use sha2::{Digest, Sha256};

/// SHA-256 hex fingerprint over `title` and `body`, joined by a single
/// newline and trimmed. A missing body hashes the same as an empty one.
pub fn content_hash(title: &str, body: Option<&str>) -> String {
    let text = format!("{}\n{}", title, body.unwrap_or(""));
    let mut hasher = Sha256::new();
    hasher.update(text.trim().as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_idempotent() {
        let a = content_hash("Fix login crash", Some("Stack trace attached"));
        let b = content_hash("Fix login crash", Some("Stack trace attached"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_differs_on_title() {
        let a = content_hash("Fix login crash", Some("body"));
        let b = content_hash("Fix logout crash", Some("body"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_missing_body_equals_empty_body() {
        assert_eq!(content_hash("title", None), content_hash("title", Some("")));
    }

    #[test]
    fn test_hash_is_hex_sha256() {
        let h = content_hash("t", Some("b"));
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
