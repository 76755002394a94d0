//! `adeck watch` command implementation.

use std::path::PathBuf;

use adeck_deck::Services;
use adeck_server::{WatchConfig, run_watch};
use clap::Args;

use super::SettingsArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the watch command.
#[derive(Args)]
pub(crate) struct WatchArgs {
    /// Asciidoc document to build and watch.
    input: PathBuf,

    /// Output file (default: the input with an .html extension).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Host to bind the live reload server to (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind the live reload server to (overrides settings).
    #[arg(short, long)]
    port: Option<u16>,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

impl WatchArgs {
    /// Execute the watch command.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid, the first build fails
    /// or the server cannot start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let settings = self.settings.load(self.host, self.port)?;

        output.highlight(&format!("Watching {}", self.input.display()));
        output.info(&format!(
            "Live reload server on http://{}:{}",
            settings.server.host, settings.server.port
        ));
        output.info(&format!("Kroki URL: {}", settings.diagrams.kroki_url));
        if !settings.cache.enabled {
            output.info("Cache: disabled");
        }

        let config = WatchConfig {
            input: self.input,
            output: self.output,
            host: settings.server.host.clone(),
            port: settings.server.port,
        };
        run_watch(config, Services::from_settings(&settings)).await?;
        Ok(())
    }
}
