//! The single rebuild consumer.
//!
//! Requests are handled strictly one after another: a rebuild is never
//! cancelled, never times out and never overlaps another one. After each
//! successful rebuild the new input hash is published to every connected
//! client.

use std::sync::Arc;
use std::time::Instant;

use adeck_deck::BuildError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::watcher::RebuildRequest;

/// Consume `requests` until every sender is gone.
///
/// `build` runs on the blocking pool and returns the new input hash.
pub(crate) fn spawn_rebuilder<F>(
    mut requests: mpsc::Receiver<RebuildRequest>,
    build: F,
    hashes: watch::Sender<String>,
) -> JoinHandle<()>
where
    F: Fn() -> Result<String, BuildError> + Send + Sync + 'static,
{
    let build = Arc::new(build);
    tokio::spawn(async move {
        while let Some(request) = requests.recv().await {
            let build = Arc::clone(&build);
            let start = Instant::now();
            match tokio::task::spawn_blocking(move || build()).await {
                Ok(Ok(hash)) => {
                    tracing::info!(
                        trigger = %request.path.display(),
                        hash = %hash,
                        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                        "Rebuilt deck"
                    );
                    hashes.send_replace(hash);
                }
                Ok(Err(e)) => {
                    tracing::error!(trigger = %request.path.display(), error = %e, "Rebuild failed");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Rebuild task panicked");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::debouncer::FsEventKind;

    fn request() -> RebuildRequest {
        RebuildRequest {
            path: PathBuf::from("/talk/deck.adoc"),
            kind: FsEventKind::Modified,
        }
    }

    #[tokio::test]
    async fn test_every_request_rebuilds_in_order() {
        let (tx, rx) = mpsc::channel(8);
        let (hashes, latest) = watch::channel(String::from("initial"));
        let builds = Arc::new(AtomicUsize::new(0));
        let running = Arc::new(AtomicUsize::new(0));

        let handle = {
            let builds = Arc::clone(&builds);
            let running = Arc::clone(&running);
            spawn_rebuilder(
                rx,
                move || {
                    assert_eq!(running.fetch_add(1, Ordering::SeqCst), 0);
                    let n = builds.fetch_add(1, Ordering::SeqCst) + 1;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok(format!("hash-{n}"))
                },
                hashes,
            )
        };
        for _ in 0..3 {
            tx.send(request()).await.unwrap();
        }
        drop(tx);
        handle.await.unwrap();

        assert_eq!(builds.load(Ordering::SeqCst), 3);
        assert_eq!(*latest.borrow(), "hash-3");
    }

    #[tokio::test]
    async fn test_failed_rebuild_keeps_previous_hash() {
        let (tx, rx) = mpsc::channel(8);
        let (hashes, latest) = watch::channel(String::from("initial"));
        let handle = spawn_rebuilder(
            rx,
            || {
                Err(BuildError::Style("broken palette".to_owned()))
            },
            hashes,
        );
        tx.send(request()).await.unwrap();
        drop(tx);
        handle.await.unwrap();

        assert_eq!(*latest.borrow(), "initial");
    }
}
