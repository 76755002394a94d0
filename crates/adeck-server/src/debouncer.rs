//! Event debouncing.
//!
//! Editors emit several filesystem events per save. Events for the same
//! path are coalesced until the path has been quiet for the debounce
//! duration.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Kind of filesystem event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FsEventKind {
    Created,
    Modified,
    Removed,
}

/// A debounced filesystem event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FsEvent {
    pub path: PathBuf,
    pub kind: FsEventKind,
}

struct PendingEvent {
    kind: FsEventKind,
    deadline: Instant,
}

/// Thread-safe event debouncer.
pub(crate) struct EventDebouncer {
    pending: Mutex<HashMap<PathBuf, PendingEvent>>,
    debounce: Duration,
}

impl EventDebouncer {
    pub fn new(debounce: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            debounce,
        }
    }

    /// Record an event, pushing back the deadline of its path.
    pub fn record(&self, path: PathBuf, kind: FsEventKind) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let deadline = Instant::now() + self.debounce;

        match pending.entry(path) {
            Entry::Vacant(entry) => {
                entry.insert(PendingEvent { kind, deadline });
            }
            Entry::Occupied(mut entry) => {
                let pending = entry.get_mut();
                pending.kind = Self::coalesce(pending.kind, kind);
                pending.deadline = deadline;
            }
        }
    }

    /// Removed followed by a write is a rename-save and counts as a
    /// modification.
    fn coalesce(existing: FsEventKind, new: FsEventKind) -> FsEventKind {
        use FsEventKind::{Created, Modified, Removed};

        match (existing, new) {
            (_, Removed) => Removed,
            (Removed, _) => Modified,
            (Created, _) | (_, Created) => Created,
            (Modified, Modified) => Modified,
        }
    }

    /// Take the events whose deadline has passed, oldest path first.
    pub fn drain_ready(&self) -> Vec<FsEvent> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        let mut ready: Vec<(Instant, PathBuf)> = pending
            .iter()
            .filter(|(_, event)| event.deadline <= now)
            .map(|(path, event)| (event.deadline, path.clone()))
            .collect();
        ready.sort();

        ready
            .into_iter()
            .filter_map(|(_, path)| {
                pending
                    .remove(&path)
                    .map(|event| FsEvent { path, kind: event.kind })
            })
            .collect()
    }
}
