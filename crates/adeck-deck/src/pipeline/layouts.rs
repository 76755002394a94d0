//! Stylesheets for the layout classes a deck uses.

use adeck_dom::{Dom, InsertPosition};

use super::Stage;
use crate::deck::Deck;
use crate::error::BuildError;
use crate::services::BuildContext;

/// Adds the stylesheet of each layout class used by a slide.
///
/// Requires: nothing. Guarantees: one stylesheet per layout in
/// [`adeck_assets::LAYOUTS`] that some element carries as a class, in
/// declaration order.
pub struct Layouts;

impl Stage for Layouts {
    fn name(&self) -> &'static str {
        "layouts"
    }

    fn run(
        &self,
        _deck: &mut Deck,
        dom: &mut dyn Dom,
        _context: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        for layout in adeck_assets::LAYOUTS {
            if dom.select_one(&format!(".{layout}"))?.is_none() {
                continue;
            }
            if let Some(css) = adeck_assets::layout_css(layout) {
                tracing::debug!(layout, "Adding layout stylesheet");
                dom.insert_inline_style(&css, InsertPosition::BeforeEnd)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::testing::{TestServices, write_deck};

    #[test]
    fn test_only_used_layouts() {
        let tmp = TempDir::new().unwrap();
        let mut deck = write_deck(
            tmp.path(),
            "[.columns]\n== Two\n\n[.center]\n--\nA\n--\n\n[.columns]\n== Again\n",
        );
        let mut dom = crate::builder::base_dom(&deck).unwrap();
        let services = TestServices::new();
        Layouts.run(&mut deck, &mut dom, &services.context()).unwrap();

        let styles = dom.select_all("head style").unwrap();
        assert_eq!(styles.len(), 2);
        assert_eq!(
            dom.text_content(styles[0]),
            adeck_assets::layout_css("columns").unwrap()
        );
        assert_eq!(
            dom.text_content(styles[1]),
            adeck_assets::layout_css("center").unwrap()
        );
    }
}
