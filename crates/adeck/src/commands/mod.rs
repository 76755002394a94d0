//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod options;
pub(crate) mod watch;

use std::path::PathBuf;

use adeck_config::{CliSettings, Settings};
use clap::Args;

use crate::error::CliError;

pub(crate) use build::BuildArgs;
pub(crate) use options::OptionsArgs;
pub(crate) use watch::WatchArgs;

/// Tool settings flags shared by `build` and `watch`.
#[derive(Args)]
pub(crate) struct SettingsArgs {
    /// Path to the settings file (default: auto-discover adeck.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Kroki server URL for diagram rendering (overrides settings).
    #[arg(long, env = "ADECK_KROKI_URL")]
    kroki_url: Option<String>,

    /// Enable caching (default: enabled).
    #[arg(long)]
    cache: Option<bool>,

    /// Disable caching.
    #[arg(long, conflicts_with = "cache")]
    no_cache: bool,

    /// Enable verbose output (info-level logs with timings).
    #[arg(short, long)]
    pub verbose: bool,
}

impl SettingsArgs {
    /// Load settings, letting flags override the file.
    pub(crate) fn load(&self, host: Option<String>, port: Option<u16>) -> Result<Settings, CliError> {
        let cli_settings = CliSettings {
            host,
            port,
            kroki_url: self.kroki_url.clone(),
            cache_enabled: self.resolve_cache_enabled(),
        };
        let settings = Settings::load(self.config.as_deref(), Some(&cli_settings))?;
        tracing::debug!(
            kroki_url = %settings.diagrams.kroki_url,
            cache = settings.cache.enabled,
            "Settings loaded"
        );
        Ok(settings)
    }

    /// Resolve `cache_enabled` from --cache/--no-cache flags.
    fn resolve_cache_enabled(&self) -> Option<bool> {
        self.no_cache.then_some(false).or(self.cache)
    }
}
