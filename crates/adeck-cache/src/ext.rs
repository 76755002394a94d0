//! Extension trait for [`CacheBucket`] with typed convenience methods.

use crate::CacheBucket;

/// String helpers for [`CacheBucket`].
///
/// Implemented as default methods on an extension trait so that
/// [`CacheBucket`] stays object-safe and implementors only handle raw bytes.
pub trait CacheBucketExt: CacheBucket {
    /// Retrieve a cached UTF-8 string.
    ///
    /// Returns `None` on cache miss or invalid UTF-8.
    fn get_string(&self, key: &str) -> Option<String> {
        let bytes = self.get(key)?;
        String::from_utf8(bytes).ok()
    }

    /// Store a string value in the cache.
    fn set_string(&self, key: &str, value: &str) {
        self.set(key, value.as_bytes());
    }

    /// Return the cached string for `key`, computing and storing it on a miss.
    ///
    /// The second element of the tuple is `true` when the value came from the
    /// cache.
    ///
    /// # Errors
    ///
    /// Propagates the error of `compute`; nothing is stored in that case.
    fn get_or_insert_string<E>(
        &self,
        key: &str,
        compute: impl FnOnce() -> Result<String, E>,
    ) -> Result<(String, bool), E> {
        if let Some(hit) = self.get_string(key) {
            return Ok((hit, true));
        }
        let value = compute()?;
        self.set_string(key, &value);
        Ok((value, false))
    }
}

impl<B: CacheBucket + ?Sized> CacheBucketExt for B {}
