//! Syntax highlighting of code listings.

use adeck_dom::{Dom, InsertPosition, NodeId};

use super::Stage;
use crate::css;
use crate::deck::Deck;
use crate::error::BuildError;
use crate::highlight::{Highlighter, wrap_lines};
use crate::services::BuildContext;

/// Highlights code listings.
///
/// Requires: listings rendered as `code[data-lang]`. Guarantees: each such
/// element keeps its identity and attributes and gains the highlighter's
/// classes and markup; one highlighter stylesheet scoped by the switching
/// mode, plus the line-number rules when a listing has `linenums`.
pub struct Highlight;

impl Stage for Highlight {
    fn name(&self) -> &'static str {
        "highlight"
    }

    fn run(
        &self,
        deck: &mut Deck,
        dom: &mut dyn Dom,
        context: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        let blocks = dom.select_all("code[data-lang]")?;
        if blocks.is_empty() {
            return Ok(());
        }
        let highlighter = context.services.highlighter.as_ref();
        let mut line_numbers = false;

        for code in blocks {
            let language = dom.attribute(code, "data-lang").unwrap_or_default();
            let numbered = dom.attribute(code, "data-linenums").is_some();
            line_numbers |= numbered;

            if dom.element_children(code).is_empty() {
                highlight_source(dom, highlighter, code, &language, numbered)?;
            } else {
                highlight_text_nodes(dom, highlighter, code, &language)?;
            }
        }

        let configuration = &deck.configuration;
        let mut stylesheet = css::for_variants(configuration, |variant| {
            highlighter
                .stylesheet(configuration.highlight_theme(variant))
                .map(Some)
        })?;
        if line_numbers {
            stylesheet.push_str(&adeck_assets::line_numbers_css());
        }
        dom.insert_inline_style(&stylesheet, InsertPosition::BeforeEnd)?;
        Ok(())
    }
}

fn highlight_source(
    dom: &mut dyn Dom,
    highlighter: &dyn Highlighter,
    code: NodeId,
    language: &str,
    numbered: bool,
) -> Result<(), BuildError> {
    let source = dom.text_content(code);
    let highlighted = highlighter.highlight(&source, language)?;
    let html = if numbered {
        wrap_lines(&highlighted.html)
    } else {
        highlighted.html
    };
    dom.set_inner_html(code, &html)?;
    for class in &highlighted.classes {
        dom.add_class(code, class);
    }
    Ok(())
}

/// Listings with markup of their own: highlight each text run in place.
fn highlight_text_nodes(
    dom: &mut dyn Dom,
    highlighter: &dyn Highlighter,
    code: NodeId,
    language: &str,
) -> Result<(), BuildError> {
    let mut classes = Vec::new();
    for node in dom.descendants(code) {
        let Some(text) = dom.text(node) else {
            continue;
        };
        if text.trim().is_empty() {
            continue;
        }
        let highlighted = highlighter.highlight(&text, language)?;
        let html = highlighted.html.strip_suffix('\n').unwrap_or(&highlighted.html);
        let html = if text.ends_with('\n') {
            format!("{html}\n")
        } else {
            html.to_owned()
        };
        dom.replace_with_html(node, &html)?;
        classes = highlighted.classes;
    }
    for class in &classes {
        dom.add_class(code, class);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use adeck_dom::ArenaDom;
    use tempfile::TempDir;

    use super::*;
    use crate::testing::{TestServices, write_deck};

    fn run(tmp: &TempDir, text: &str) -> ArenaDom {
        let mut deck = write_deck(tmp.path(), text);
        let services = TestServices::new();
        let mut dom = crate::builder::build_dom(&deck, &services.context()).unwrap();
        Highlight.run(&mut deck, &mut dom, &services.context()).unwrap();
        dom
    }

    #[test]
    fn test_code_keeps_identity() {
        let tmp = TempDir::new().unwrap();
        let dom = run(
            &tmp,
            "== Code\n\n[source,javascript]\n----\nconst answer = 42;\n----\n",
        );

        let code = dom.require("code[data-code-id]").unwrap();
        assert_eq!(dom.attribute(code, "data-lang").as_deref(), Some("javascript"));
        assert!(dom.has_class(code, "language-javascript"));
        assert!(dom.has_class(code, "hl-code"));
        assert!(!dom.select_within(code, "span").unwrap().is_empty());
        assert_eq!(dom.text_content(code), "const answer = 42;");

        let styles = dom.select_all("head style").unwrap();
        assert_eq!(styles.len(), 1);
        let css = dom.text_content(styles[0]);
        assert!(css.contains(".hl-code"));
        assert!(!css.contains("data-linenums"));
    }

    #[test]
    fn test_line_numbers() {
        let tmp = TempDir::new().unwrap();
        let dom = run(
            &tmp,
            ":theme: dark-manual\n\n== Code\n\n[source,rust,linenums]\n----\nfn main() {\n}\n----\n",
        );

        let code = dom.require("code[data-linenums]").unwrap();
        assert_eq!(dom.select_within(code, "span.line").unwrap().len(), 2);
        let css = dom.text_content(dom.require("head style").unwrap());
        assert!(css.contains("body.theme-dark .hl-code"));
        assert!(css.contains("body.theme-light .hl-code"));
        assert!(css.contains("code[data-linenums] .line::before"));
    }

    #[test]
    fn test_keep_markup_is_highlighted_around_markup() {
        let tmp = TempDir::new().unwrap();
        let dom = run(
            &tmp,
            "== Code\n\n[source,javascript,options=\"keep-markup\"]\n----\nlet <b>x</b> = 1;\n----\n",
        );
        let code = dom.require("code[data-code-id]").unwrap();
        assert_eq!(dom.select_within(code, "b").unwrap().len(), 1);
        assert_eq!(dom.text_content(code), "let x = 1;");
    }

    #[test]
    fn test_no_listings_no_stylesheet() {
        let tmp = TempDir::new().unwrap();
        let dom = run(&tmp, "== Text\n\nplain\n");
        assert!(dom.select_one("head style").unwrap().is_none());
    }
}
