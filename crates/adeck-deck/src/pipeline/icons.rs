//! Icon sprite sheet built from the icons folder.

use std::path::Path;

use adeck_diagrams::{SvgError, svg};
use adeck_dom::{Dom, InsertPosition};

use super::Stage;
use crate::deck::Deck;
use crate::embed::{css_class_name, file_stem};
use crate::error::BuildError;
use crate::services::BuildContext;

/// Embeds the icons folder as a sprite sheet.
///
/// Requires: nothing. Guarantees: every usable `.svg` of the configured
/// folder is a `<symbol id="icon-<stem>">` in one hidden `<svg>` at the end
/// of `<body>`, and its id is listed in [`Deck::svg_icons`].
pub struct SvgIcons;

impl Stage for SvgIcons {
    fn name(&self) -> &'static str {
        "svg-icons"
    }

    fn run(
        &self,
        deck: &mut Deck,
        dom: &mut dyn Dom,
        _context: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        let Some(folder) = deck.configuration.svg_icons_folder.clone() else {
            return Ok(());
        };
        let mut symbols = String::new();
        for path in icon_files(&folder) {
            let Ok(source) = std::fs::read_to_string(&path) else {
                tracing::warn!(icon = %path.display(), "Cannot read icon");
                continue;
            };
            let id = css_class_name("icon", &file_stem(&path));
            match svg::into_symbol(&source, &id) {
                Ok(symbol) => {
                    symbols.push_str(&symbol);
                    deck.svg_icons.push(id);
                }
                Err(SvgError::NoSize) => {
                    tracing::error!(
                        icon = %path.display(),
                        "Icon has neither a viewBox nor width and height, skipping"
                    );
                }
                Err(e) => {
                    tracing::error!(icon = %path.display(), error = %e, "Invalid icon, skipping");
                }
            }
        }
        if symbols.is_empty() {
            return Ok(());
        }
        let sprite = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" class=\"icon-sprite\" aria-hidden=\"true\" style=\"display:none\">{symbols}</svg>"
        );
        dom.insert_html("body", InsertPosition::BeforeEnd, &sprite)?;
        tracing::debug!(count = deck.svg_icons.len(), "Embedded SVG icons");
        Ok(())
    }
}

fn icon_files(folder: &Path) -> Vec<std::path::PathBuf> {
    let Ok(entries) = std::fs::read_dir(folder) else {
        tracing::warn!(folder = %folder.display(), "Cannot read icons folder");
        return Vec::new();
    };
    let mut files: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
        })
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::testing::{TestServices, write_deck};

    #[test]
    fn test_sprite_sheet() {
        let tmp = TempDir::new().unwrap();
        let icons = tmp.path().join("icons");
        std::fs::create_dir(&icons).unwrap();
        std::fs::write(icons.join("server.svg"), "<svg viewBox=\"0 0 16 16\"><rect/></svg>").unwrap();
        std::fs::write(icons.join("broken.svg"), "<svg><rect/></svg>").unwrap();
        std::fs::write(icons.join("cloud.svg"), "<svg width='8' height = '8'></svg>").unwrap();
        std::fs::write(icons.join("garbled.svg"), "<svg viewBox='0 0 1 1'><g></svg").unwrap();
        std::fs::write(icons.join("notes.txt"), "not an icon").unwrap();

        let mut deck = write_deck(tmp.path(), ":svg-icons-folder: icons\n\n== One\n\nicon:server[]\n");
        let mut dom = crate::builder::base_dom(&deck).unwrap();
        let services = TestServices::new();
        SvgIcons.run(&mut deck, &mut dom, &services.context()).unwrap();

        assert_eq!(deck.svg_icons, ["icon-cloud", "icon-server"]);
        let sprite = dom.require("body > svg.icon-sprite").unwrap();
        let ids: Vec<_> = dom
            .select_within(sprite, "symbol")
            .unwrap()
            .into_iter()
            .map(|node| dom.attribute(node, "id").unwrap())
            .collect();
        assert_eq!(ids, ["icon-cloud", "icon-server"]);
        assert!(dom.select_one("use[href=\"#icon-server\"]").unwrap().is_some());
    }
}
