//! Live reload client for watch-mode builds.

use adeck_dom::{Dom, InsertPosition};

use super::Stage;
use crate::deck::Deck;
use crate::error::BuildError;
use crate::services::BuildContext;

/// Inlines the live reload client when the build asks for it.
///
/// Requires: [`crate::BuildOptions::live_reload`]. Guarantees: a script that
/// reports [`Deck::input_hash`] to the watch server on the configured port.
pub struct LiveReload;

impl Stage for LiveReload {
    fn name(&self) -> &'static str {
        "live-reload"
    }

    fn run(
        &self,
        deck: &mut Deck,
        dom: &mut dyn Dom,
        _context: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        let Some(target) = deck.build_options.live_reload else {
            return Ok(());
        };
        let script = adeck_assets::live_reload_js()
            .replace("{{hash}}", &deck.input_hash)
            .replace("{{port}}", &target.port.to_string());
        dom.insert_inline_script(&script, InsertPosition::BeforeEnd)?;
        Ok(())
    }
}
