//! Content addressing for the simulated repository.
//!
//! Everything in the commit graph is identified by a SHA-1 hex digest:
//! file contents by a digest of their bytes, commits by a digest of their
//! metadata. See [`derive_commit_id`] for the deliberate limits of the
//! commit id scheme.

use chrono::{DateTime, Utc};
use sha1::{Digest, Sha1};

use crate::types::ObjectHash;

/// Hash raw file content into an [`ObjectHash`].
///
/// Pure function: equal bytes always produce the same digest.
pub fn hash_content(content: &[u8]) -> ObjectHash {
    let mut hasher = Sha1::new();
    hasher.update(content);
    ObjectHash::new(format!("{:x}", hasher.finalize()))
}

/// Derive a commit id from its metadata.
///
/// The digest covers the timestamp (rendered RFC 3339), the message, and
/// the parent id (empty for a root commit), and nothing else. The snapshot
/// is intentionally excluded, matching the system this simulates: two
/// commits created in the same instant with the same message and parent
/// produce the same id even when their file states differ. Callers must
/// not rely on the id to distinguish snapshot content.
pub fn derive_commit_id(
    timestamp: DateTime<Utc>,
    message: &str,
    parent: Option<&ObjectHash>,
) -> ObjectHash {
    let mut hasher = Sha1::new();
    hasher.update(timestamp.to_rfc3339().as_bytes());
    hasher.update(message.as_bytes());
    if let Some(parent) = parent {
        hasher.update(parent.as_str().as_bytes());
    }
    ObjectHash::new(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_hash_content_known_digest() {
        // SHA-1 of the ASCII string "hello".
        let hash = hash_content(b"hello");
        assert_eq!(hash.as_str(), "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d");
    }

    #[test]
    fn test_hash_content_deterministic() {
        assert_eq!(hash_content(b"abc"), hash_content(b"abc"));
        assert_ne!(hash_content(b"abc"), hash_content(b"abd"));
    }

    #[test]
    fn test_hash_content_empty() {
        // SHA-1 of the empty input.
        let hash = hash_content(b"");
        assert_eq!(hash.as_str(), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn test_commit_id_depends_on_metadata_only() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let parent = ObjectHash::new("aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d");

        let a = derive_commit_id(at, "first", Some(&parent));
        let b = derive_commit_id(at, "first", Some(&parent));
        assert_eq!(a, b, "same metadata must produce the same id");

        let other_message = derive_commit_id(at, "second", Some(&parent));
        assert_ne!(a, other_message);

        let other_parent = derive_commit_id(at, "first", None);
        assert_ne!(a, other_parent);

        let other_time = derive_commit_id(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 1).unwrap(),
            "first",
            Some(&parent),
        );
        assert_ne!(a, other_time);
    }

    #[test]
    fn test_commit_id_is_hex_sha1() {
        let id = derive_commit_id(Utc::now(), "msg", None);
        assert_eq!(id.as_str().len(), 40);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
