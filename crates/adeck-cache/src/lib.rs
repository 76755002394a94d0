//! Content-addressed build cache for adeck.
//!
//! Expensive build artifacts (rendered diagrams, compiled theme stylesheets,
//! fetched emoji images) are stored under keys that already embed a hash of
//! everything that influenced them. A key either exists, in which case its
//! bytes are current, or it does not.
//!
//! - [`Cache`]: hands out one bucket per artifact kind
//! - [`CacheBucket`]: Key-value store addressed by content-derived keys
//! - [`content_hash`]: The short digest used for every key and change token
//!
//! # Implementations
//!
//! - [`NullCache`] / [`NullCacheBucket`]: used with `--no-cache`, every lookup misses
//! - [`FileCache`]: Directory-per-bucket implementation with version validation
//!
//! # Example
//!
//! ```
//! use adeck_cache::{Cache, NullCache, content_hash};
//!
//! let cache = NullCache;
//! let bucket = cache.bucket("diagrams");
//! let key = format!("graph-0-{}.svg", content_hash(b"graph TD; A-->B"));
//! bucket.set(&key, b"<svg/>");
//! assert_eq!(bucket.get(&key), None); // NullCache always misses
//! ```

mod ext;
mod file;
mod hash;

pub use ext::CacheBucketExt;
pub use file::FileCache;
pub use hash::{HASH_LEN, content_hash, hash_files};

/// Name of the hidden cache folder created next to the input document.
pub const CACHE_DIR_NAME: &str = ".adeck-cache";

/// Entries of one artifact kind (`diagrams`, `themes`, `emojis`).
///
/// Keys are expected to be content-addressed: whoever builds a key includes
/// a hash of the inputs in it, so a stored entry never needs revalidation.
pub trait CacheBucket: Send + Sync {
    /// Retrieve a cached value, or `None` if the key was never stored.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store a value in the cache, overwriting any existing entry.
    ///
    /// Failures are logged and swallowed; the cache is an optimisation only.
    fn set(&self, key: &str, value: &[u8]);

    /// Whether an entry exists for `key`.
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Hands out [`CacheBucket`]s by name.
///
/// Buckets are logically isolated from each other; the file-based cache
/// stores each one in its own subdirectory.
pub trait Cache: Send + Sync {
    /// Open or create a named bucket (e.g. "diagrams", "themes", "emojis").
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket>;
}

/// Bucket that forgets everything it is given.
pub struct NullCacheBucket;

impl CacheBucket for NullCacheBucket {
    fn get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _value: &[u8]) {}
}

/// Cache used when caching is turned off.
///
/// Used when caching is disabled in the tool settings.
pub struct NullCache;

impl Cache for NullCache {
    fn bucket(&self, _name: &str) -> Box<dyn CacheBucket> {
        Box::new(NullCacheBucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_cache_misses_after_set() {
        let cache = NullCache;
        let bucket = cache.bucket("diagrams");

        assert_eq!(bucket.get("graph-0-abc.svg"), None);

        bucket.set("graph-0-abc.svg", b"<svg/>");
        assert_eq!(bucket.get("graph-0-abc.svg"), None);
        assert!(!bucket.contains("graph-0-abc.svg"));
    }

    #[test]
    fn test_disabled_cache_every_bucket_misses() {
        let cache = NullCache;

        for name in &["diagrams", "themes", "emojis"] {
            let bucket = cache.bucket(name);
            bucket.set("k", b"data");
            assert_eq!(bucket.get("k"), None, "bucket {name} should miss");
        }
    }
}
