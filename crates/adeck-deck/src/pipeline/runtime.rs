//! The presentation runtime stylesheet and script.

use adeck_dom::{Dom, InsertPosition};

use super::Stage;
use crate::deck::Deck;
use crate::error::BuildError;
use crate::services::BuildContext;

/// Inlines the presentation runtime.
///
/// Requires: runs last, so that its style and script come first in
/// `<head>` and `<body>`. Guarantees: the runtime stylesheet and script are
/// present exactly once.
pub struct Runtime;

impl Stage for Runtime {
    fn name(&self) -> &'static str {
        "runtime"
    }

    fn run(
        &self,
        _deck: &mut Deck,
        dom: &mut dyn Dom,
        _context: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        dom.insert_inline_style(&adeck_assets::runtime_css(), InsertPosition::AfterBegin)?;
        dom.insert_inline_script(&adeck_assets::runtime_js(), InsertPosition::AfterBegin)?;
        Ok(())
    }
}
