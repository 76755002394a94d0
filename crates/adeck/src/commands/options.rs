//! `adeck options` command implementation.

use adeck_config::{OPTIONS, OptionSpec};
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the options command.
#[derive(Args)]
pub(crate) struct OptionsArgs {
    /// Only show this option.
    name: Option<String>,
}

impl OptionsArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::stdout();
        let selected: Vec<&OptionSpec> = OPTIONS
            .iter()
            .filter(|spec| self.name.as_deref().is_none_or(|name| spec.id == name))
            .collect();
        if selected.is_empty() {
            Output::new().warning(&format!(
                "Unknown option {}",
                self.name.as_deref().unwrap_or_default()
            ));
        }
        for spec in selected {
            output.highlight(&format!(":{}:", spec.id));
            for line in describe(spec) {
                output.info(&line);
            }
            output.info("");
        }
        Ok(())
    }
}

fn describe(spec: &OptionSpec) -> Vec<String> {
    vec![
        format!("  {}", spec.documentation),
        format!("  default:  {}", spec.default_value),
        format!("  accepted: {}", spec.accepted_values),
    ]
}
