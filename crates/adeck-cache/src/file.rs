//! On-disk cache next to the deck.
//!
//! [`FileCache`] stores every entry as a plain file named after its key, so a
//! cached diagram is a regular `.svg` file that can be opened directly. Since
//! keys are content-addressed, no header or etag is stored alongside.
//!
//! The root holds a `VERSION` stamp. Opening a root whose stamp is absent or
//! names another release empties it first.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{Cache, CacheBucket};

/// [`Cache`] kept as plain files under one folder.
///
/// Directory layout:
/// ```text
/// {root}/
/// +-- VERSION                   # contains the cache version string
/// +-- diagrams/
/// |   +-- graph-0-1a2b3c4d5e6f.svg
/// +-- themes/
/// |   +-- dark-65-0.04-250.css
/// +-- emojis/
///     +-- rocket.svg
/// ```
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Open the cache at `root` for the given release `version`.
    ///
    /// A missing or different `VERSION` stamp empties the folder first.
    /// Filesystem failures are logged; the cache then simply misses.
    #[must_use]
    pub fn new(root: PathBuf, version: &str) -> Self {
        validate_version(&root, version);
        Self { root }
    }

    /// Root directory of this cache.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Cache for FileCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(FileCacheBucket {
            dir: self.root.join(name),
        })
    }
}

/// One sub-folder of a [`FileCache`].
struct FileCacheBucket {
    dir: PathBuf,
}

impl CacheBucket for FileCacheBucket {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        fs::read(self.dir.join(key)).ok()
    }

    fn set(&self, key: &str, value: &[u8]) {
        let path = self.dir.join(key);
        let Some(parent) = path.parent() else {
            return;
        };
        if let Err(e) = fs::create_dir_all(parent) {
            tracing::warn!(path = %parent.display(), "failed to create cache bucket: {e}");
            return;
        }

        // Write to a sibling first so a concurrent reader never sees a torn file
        let tmp = path.with_extension("partial");
        if let Err(e) = fs::write(&tmp, value).and_then(|()| fs::rename(&tmp, &path)) {
            tracing::warn!(path = %path.display(), "failed to write cache entry: {e}");
        }
    }

    fn contains(&self, key: &str) -> bool {
        self.dir.join(key).is_file()
    }
}

/// Outcome of comparing the stored `VERSION` with the running one.
#[derive(Debug, PartialEq, Eq)]
enum Stamp {
    Current,
    Stale(String),
    Missing,
}

fn read_stamp(stamp_path: &Path, version: &str) -> Stamp {
    match fs::read_to_string(stamp_path) {
        Ok(stored) if stored.trim() == version => Stamp::Current,
        Ok(stored) => Stamp::Stale(stored.trim().to_owned()),
        Err(_) => Stamp::Missing,
    }
}

/// Make `root` a cache for `version`, discarding entries of any other release.
fn validate_version(root: &Path, version: &str) {
    let stamp_path = root.join("VERSION");
    match read_stamp(&stamp_path, version) {
        Stamp::Current => return,
        Stamp::Stale(stored) => {
            tracing::info!(root = %root.display(), %stored, %version, "Discarding cache of another release");
        }
        Stamp::Missing => {
            tracing::debug!(root = %root.display(), "Initializing cache");
        }
    }

    let reset = match fs::remove_dir_all(root) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => fs::create_dir_all(root).and_then(|()| fs::write(&stamp_path, version)),
    };
    if let Err(e) = reset {
        tracing::warn!(root = %root.display(), error = %e, "Cannot reset cache folder");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_then_get() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");
        let bucket = cache.bucket("diagrams");

        bucket.set("graph-0-abc.svg", b"<svg></svg>");
        assert_eq!(bucket.get("graph-0-abc.svg"), Some(b"<svg></svg>".to_vec()));
        assert!(bucket.contains("graph-0-abc.svg"));
    }

    #[test]
    fn test_entries_are_plain_files() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");
        let cache = FileCache::new(root.clone(), "v1");
        cache.bucket("emojis").set("rocket.svg", b"<svg id=\"rocket\"/>");

        let on_disk = fs::read_to_string(root.join("emojis/rocket.svg")).unwrap();
        assert_eq!(on_disk, "<svg id=\"rocket\"/>");
        assert!(!root.join("emojis/rocket.partial").exists());
    }

    #[test]
    fn test_unknown_key_misses() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");
        let bucket = cache.bucket("themes");

        assert_eq!(bucket.get("nonexistent.css"), None);
        assert!(!bucket.contains("nonexistent.css"));
    }

    #[test]
    fn test_set_replaces_entry() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");
        let bucket = cache.bucket("themes");

        bucket.set("dark.css", b"first");
        bucket.set("dark.css", b"second");
        assert_eq!(bucket.get("dark.css"), Some(b"second".to_vec()));
    }

    #[test]
    fn test_same_key_in_two_buckets() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");

        let diagrams = cache.bucket("diagrams");
        let themes = cache.bucket("themes");

        diagrams.set("key", b"diagram");
        themes.set("key", b"theme");

        assert_eq!(diagrams.get("key"), Some(b"diagram".to_vec()));
        assert_eq!(themes.get("key"), Some(b"theme".to_vec()));
    }

    #[test]
    fn test_same_release_keeps_entries() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");

        let cache = FileCache::new(root.clone(), "v1");
        cache.bucket("diagrams").set("key", b"preserved");

        let cache2 = FileCache::new(root, "v1");
        assert_eq!(cache2.bucket("diagrams").get("key"), Some(b"preserved".to_vec()));
    }

    #[test]
    fn test_other_release_discards_entries() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");

        let cache = FileCache::new(root.clone(), "v1");
        cache.bucket("diagrams").set("key", b"will-be-wiped");

        let cache2 = FileCache::new(root.clone(), "v2");
        assert_eq!(cache2.bucket("diagrams").get("key"), None);

        assert_eq!(read_stamp(&root.join("VERSION"), "v2"), Stamp::Current);
    }

    #[test]
    fn test_unstamped_folder_is_emptied() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");

        fs::create_dir_all(root.join("diagrams")).unwrap();
        fs::write(root.join("diagrams/orphan.svg"), b"stale data").unwrap();

        let cache = FileCache::new(root.clone(), "v1");
        assert_eq!(cache.bucket("diagrams").get("orphan.svg"), None);

        assert_eq!(
            read_stamp(&root.join("VERSION"), "v3"),
            Stamp::Stale("v1".to_owned())
        );
    }

    #[test]
    fn test_missing_root_is_created() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("deeply/nested/.adeck-cache");

        assert!(!root.exists());
        let cache = FileCache::new(root.clone(), "v1");

        assert!(root.exists());
        assert_eq!(cache.root(), root.as_path());
        let version = fs::read_to_string(root.join("VERSION")).unwrap();
        assert_eq!(version, "v1");
    }
}
