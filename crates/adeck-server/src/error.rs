//! Watch mode errors.

use adeck_deck::BuildError;

/// Error stopping watch mode.
///
/// Only the initial build and the server setup can fail; later rebuild
/// failures are logged and the watcher keeps running.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("cannot watch files: {0}")]
    Watch(#[from] notify::Error),
    #[error("invalid listen address {0}")]
    Address(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
