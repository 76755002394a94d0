//! Filesystem watching.
//!
//! Raw `notify` events are filtered, debounced, and every debounced event
//! becomes one [`RebuildRequest`] on the rebuild queue.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::debouncer::{EventDebouncer, FsEvent, FsEventKind};

const DEBOUNCE: Duration = Duration::from_millis(100);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A debounced change that requires a rebuild.
pub(crate) type RebuildRequest = FsEvent;

/// Which paths trigger a rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WatchFilter {
    input: PathBuf,
    assets: PathBuf,
    ignored: Vec<PathBuf>,
}

impl WatchFilter {
    /// Watch `input` and everything under `assets`, except the build's own
    /// products.
    pub fn new(input: &Path, assets: &Path, ignored: Vec<PathBuf>) -> Self {
        Self {
            input: input.to_path_buf(),
            assets: assets.to_path_buf(),
            ignored,
        }
    }

    pub fn matches(&self, path: &Path) -> bool {
        if self.ignored.iter().any(|ignored| path.starts_with(ignored)) {
            return false;
        }
        path == self.input || path.starts_with(&self.assets)
    }

    /// Folders to register with the watcher and their mode.
    fn roots(&self) -> Vec<(&Path, RecursiveMode)> {
        let mut roots = vec![(self.assets.as_path(), RecursiveMode::Recursive)];
        if let Some(folder) = self.input.parent()
            && !folder.starts_with(&self.assets)
        {
            roots.push((folder, RecursiveMode::NonRecursive));
        }
        roots
    }
}

/// Keeps the OS watcher alive; dropping it stops watching.
pub(crate) struct DeckWatcher {
    _watcher: RecommendedWatcher,
}

impl DeckWatcher {
    /// Start watching and feed `requests`.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start(
        filter: WatchFilter,
        requests: mpsc::Sender<RebuildRequest>,
    ) -> Result<Self, notify::Error> {
        let (tx, mut rx) = mpsc::channel::<Event>(100);
        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                // The callback runs on the watcher's own thread.
                Ok(event) => {
                    let _ = tx.blocking_send(event);
                }
                Err(e) => tracing::warn!(error = %e, "File watcher error"),
            }
        })?;
        for (root, mode) in filter.roots() {
            watcher.watch(root, mode)?;
            tracing::debug!(path = %root.display(), ?mode, "Watching");
        }

        let debouncer = Arc::new(EventDebouncer::new(DEBOUNCE));
        let recorder = Arc::clone(&debouncer);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                record_event(&event, &filter, &recorder);
            }
        });

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(POLL_INTERVAL);
            loop {
                interval.tick().await;
                for event in debouncer.drain_ready() {
                    tracing::info!(path = %event.path.display(), kind = ?event.kind, "Change detected");
                    if requests.send(event).await.is_err() {
                        return;
                    }
                }
            }
        });

        Ok(Self { _watcher: watcher })
    }
}

fn record_event(event: &Event, filter: &WatchFilter, debouncer: &EventDebouncer) {
    let kind = match event.kind {
        EventKind::Create(_) => FsEventKind::Created,
        EventKind::Modify(_) => FsEventKind::Modified,
        EventKind::Remove(_) => FsEventKind::Removed,
        _ => return,
    };
    for path in &event.paths {
        if filter.matches(path) {
            debouncer.record(path.clone(), kind);
        }
    }
}
