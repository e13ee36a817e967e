//! Content-addressed hashing for source text.
//!
//! Regions of code are identified by digest rather than by line coordinates,
//! so unrelated edits elsewhere in a file do not invalidate prior references.
//! The contract is byte-for-byte: UTF-8 input, no normalization.

use sha2::{Digest, Sha256};

/// Canonical prefix for content hashes.
pub const HASH_PREFIX: &str = "sha256:";

/// Computes the canonical content hash of a text: `sha256:<64 lowercase hex>`.
#[must_use]
pub fn hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{HASH_PREFIX}{:x}", hasher.finalize())
}

/// Hashes a sequence of lines joined with `\n`.
#[must_use]
pub fn hash_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let joined = lines
        .iter()
        .map(std::convert::AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n");
    hash(&joined)
}

/// Checks whether `text` hashes to `expected`.
#[must_use]
pub fn verify(text: &str, expected: &str) -> bool {
    hash(text) == expected
}

/// Returns true if `candidate` is in canonical form (`sha256:` + 64 lowercase hex).
#[must_use]
pub fn is_canonical(candidate: &str) -> bool {
    let Some(hex) = candidate.strip_prefix(HASH_PREFIX) else {
        return false;
    };
    hex.len() == 64 && hex.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(hash("hello world"), hash("hello world"));
    }

    #[test]
    fn distinct_inputs_produce_distinct_hashes() {
        assert_ne!(hash("hello"), hash("world"));
        assert_ne!(hash(""), hash(" "));
    }

    #[test]
    fn hash_has_canonical_form() {
        let h = hash("some content");
        assert!(h.starts_with(HASH_PREFIX));
        assert_eq!(h.len(), HASH_PREFIX.len() + 64);
        assert!(is_canonical(&h));
    }

    #[test]
    fn hash_lines_joins_with_newline() {
        assert_eq!(hash_lines(&["a", "b", "c"]), hash("a\nb\nc"));
        assert_eq!(hash_lines::<&str>(&[]), hash(""));
    }

    #[test]
    fn verify_round_trip() {
        let h = hash("fn main() {}");
        assert!(verify("fn main() {}", &h));
        assert!(!verify("fn main() { }", &h));
    }

    #[test]
    fn is_canonical_rejects_malformed() {
        assert!(!is_canonical("sha256:abc"));
        assert!(!is_canonical("md5:0000"));
        assert!(!is_canonical(&format!("sha256:{}", "G".repeat(64))));
        assert!(!is_canonical(&format!("sha256:{}", "A".repeat(64))));
    }

    proptest! {
        #[test]
        fn prop_hash_deterministic(s in ".*") {
            prop_assert_eq!(hash(&s), hash(&s));
        }

        #[test]
        fn prop_hash_canonical(s in ".*") {
            prop_assert!(is_canonical(&hash(&s)));
        }

        #[test]
        fn prop_distinct_inputs_distinct_hashes(a in ".+", b in ".+") {
            prop_assume!(a != b);
            prop_assert_ne!(hash(&a), hash(&b));
        }
    }
}
