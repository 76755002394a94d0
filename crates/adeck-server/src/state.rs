//! Shared server state.

use std::path::PathBuf;

use tokio::sync::watch;

pub(crate) struct AppState {
    /// The built deck served at `/`.
    pub output_path: PathBuf,
    /// Input hash of the latest successful build.
    pub latest_hash: watch::Receiver<String>,
}
