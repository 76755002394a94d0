//! The deck's own stylesheet and script.

use std::path::Path;

use adeck_dom::{Dom, InsertPosition};

use super::Stage;
use crate::deck::Deck;
use crate::error::BuildError;
use crate::services::BuildContext;

/// Inlines the deck's own stylesheet and script.
///
/// Requires: nothing. Guarantees: `custom-css` as the last `<head>` style,
/// `custom-js` as the last `<body>` script. A file that disappeared since
/// option resolution is reported and left out.
pub struct CustomFiles;

impl Stage for CustomFiles {
    fn name(&self) -> &'static str {
        "custom-files"
    }

    fn run(
        &self,
        deck: &mut Deck,
        dom: &mut dyn Dom,
        _context: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        let configuration = &deck.configuration;
        if let Some(css) = configuration.custom_css.as_deref().and_then(read) {
            dom.insert_inline_style(&css, InsertPosition::BeforeEnd)?;
        }
        if let Some(js) = configuration.custom_js.as_deref().and_then(read) {
            dom.insert_inline_script(&js, InsertPosition::BeforeEnd)?;
        }
        Ok(())
    }
}

fn read(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Custom file vanished, skipping");
            None
        }
    }
}
