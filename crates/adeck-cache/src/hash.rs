//! Short content digests.
//!
//! One algorithm serves every purpose that needs a hash in this workspace:
//! cache keys for diagrams and themes, and the live-reload change token of a
//! deck. The digest is a truncated SHA-256 and is meant for cache busting and
//! change detection, not for adversarial collision resistance.

use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Number of hex characters in a [`content_hash`].
pub const HASH_LEN: usize = 12;

/// Hash `bytes` into a fixed-length lowercase hex string.
#[must_use]
pub fn content_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut hex = hex::encode(digest);
    hex.truncate(HASH_LEN);
    hex
}

/// Hash the concatenated contents of `paths`, skipping `None` entries.
///
/// # Errors
///
/// Returns the first I/O error hit while reading a file.
pub fn hash_files<'a, I>(paths: I) -> io::Result<String>
where
    I: IntoIterator<Item = Option<&'a Path>>,
{
    let mut hasher = Sha256::new();
    for path in paths.into_iter().flatten() {
        hasher.update(std::fs::read(path)?);
    }
    let mut hex = hex::encode(hasher.finalize());
    hex.truncate(HASH_LEN);
    Ok(hex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_content_hash_is_deterministic() {
        assert_eq!(content_hash(b"deck"), content_hash(b"deck"));
    }

    #[test]
    fn test_content_hash_distinguishes_inputs() {
        assert_ne!(content_hash(b"deck one"), content_hash(b"deck two"));
        assert_ne!(content_hash(b""), content_hash(b" "));
    }

    #[test]
    fn test_content_hash_has_fixed_length() {
        let large = vec![b'x'; 1 << 20];
        for input in [&b""[..], b"a", large.as_slice()] {
            let hash = content_hash(input);
            assert_eq!(hash.len(), HASH_LEN);
            assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_hash_files_matches_concatenation() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("deck.adoc");
        let css = tmp.path().join("custom.css");
        std::fs::write(&input, "= Demo\n").unwrap();
        std::fs::write(&css, "body {}").unwrap();

        let hash = hash_files([Some(input.as_path()), None, Some(css.as_path())]).unwrap();
        assert_eq!(hash, content_hash(b"= Demo\nbody {}"));
    }

    #[test]
    fn test_hash_files_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing.adoc");
        assert!(hash_files([Some(missing.as_path())]).is_err());
    }
}
