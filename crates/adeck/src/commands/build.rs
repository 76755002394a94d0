//! `adeck build` command implementation.

use std::path::PathBuf;
use std::time::Instant;

use adeck_deck::{BuildOptions, LiveReloadTarget, Services, build_deck};
use clap::Args;

use super::SettingsArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Asciidoc document to build.
    input: PathBuf,

    /// Output file (default: the input with an .html extension).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Inline the live reload client, for a watch server on the settings port.
    #[arg(long)]
    live_reload: bool,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid or the build fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let settings = self.settings.load(None, None)?;
        let options = BuildOptions {
            live_reload: self.live_reload.then_some(LiveReloadTarget {
                port: settings.server.port,
            }),
        };

        let start = Instant::now();
        let services = Services::from_settings(&settings);
        let result = build_deck(&services, &self.input, self.output.as_deref(), options);
        services.close();
        let outcome = result?;

        let elapsed = start.elapsed().as_secs_f64();
        output.success(&format!(
            "Built {} in {elapsed:.2}s",
            outcome.output_path.display()
        ));
        if !outcome.warnings.is_empty() {
            output.warning(&format!(
                "{} option value(s) rejected, defaults used",
                outcome.warnings.len()
            ));
        }
        Ok(())
    }
}
