//! Watch mode for adeck.
//!
//! Builds the deck once, then rebuilds it on every change of the input
//! document or its assets folder, and tells open browsers to reload:
//!
//! ```text
//! notify ──► debouncer ──► mpsc queue ──► rebuilder (one at a time)
//!                                              │
//!                                              ▼ new input hash
//! Browser ◄──{"reload":true}── /ws ◄── watch channel
//!    │
//!    └──{"hash":"…"}──► /ws
//! ```
//!
//! The server also serves the latest built deck at `/`.

mod app;
mod debouncer;
mod error;
mod protocol;
mod rebuild;
mod state;
mod watcher;
mod websocket;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use adeck_deck::{BuildOptions, BuildOutcome, LiveReloadTarget, Services, build_deck};
use tokio::sync::{mpsc, watch};

pub use error::ServerError;

use crate::state::AppState;
use crate::watcher::{DeckWatcher, WatchFilter};

/// Watch mode configuration.
#[derive(Clone, Debug)]
pub struct WatchConfig {
    pub input: PathBuf,
    /// Defaults to the input with an `.html` extension.
    pub output: Option<PathBuf>,
    pub host: String,
    pub port: u16,
}

/// Build, then watch and serve until Ctrl-C.
///
/// `services` stays alive for the whole session, so a started diagram
/// renderer is reused by every rebuild.
///
/// # Errors
///
/// Fails when the initial build fails, the files cannot be watched or the
/// server cannot bind. Later rebuild failures are only logged.
pub async fn run_watch(config: WatchConfig, services: Services) -> Result<(), ServerError> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|_| ServerError::Address(format!("{}:{}", config.host, config.port)))?;
    let options = BuildOptions {
        live_reload: Some(LiveReloadTarget { port: config.port }),
    };
    let services = Arc::new(services);

    let first = {
        let services = Arc::clone(&services);
        let config = config.clone();
        let options = options.clone();
        tokio::task::spawn_blocking(move || {
            build_deck(&services, &config.input, config.output.as_deref(), options)
        })
        .await
        .map_err(std::io::Error::other)??
    };
    let BuildOutcome {
        output_path,
        input_hash,
        input_path,
        assets_path,
        cache_path,
        ..
    } = first;

    let filter = WatchFilter::new(
        &input_path,
        &assets_path,
        vec![output_path.clone(), cache_path],
    );

    let (requests_tx, requests_rx) = mpsc::channel(64);
    let (hash_tx, hash_rx) = watch::channel(input_hash);
    let _watcher = DeckWatcher::start(filter, requests_tx)?;

    let output = output_path.clone();
    let rebuilder = {
        let services = Arc::clone(&services);
        rebuild::spawn_rebuilder(
            requests_rx,
            move || {
                build_deck(&services, &input_path, Some(&output), options.clone())
                    .map(|outcome| outcome.input_hash)
            },
            hash_tx,
        )
    };

    let state = Arc::new(AppState {
        output_path,
        latest_hash: hash_rx,
    });
    let app = app::create_router(state);

    tracing::info!(address = %addr, "Starting live reload server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    rebuilder.abort();
    let _ = rebuilder.await;
    if let Ok(services) = Arc::try_unwrap(services) {
        services.close();
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
