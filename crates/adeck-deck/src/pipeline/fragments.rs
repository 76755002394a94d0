//! Fragment classes and per-slide fragment numbering.

use adeck_dom::{Dom, NodeId};

use super::Stage;
use crate::deck::Deck;
use crate::error::BuildError;
use crate::services::BuildContext;

const NOTES: &str = "aside.notes";

/// Marks list items and table rows as fragments.
///
/// Requires: speaker notes already moved to `aside.notes`. Guarantees:
///
/// - with `fragment-lists`, every `<li>` outside the notes is a `fragment`
/// - with `fragment-tables`, every body row outside the notes is a `fragment`
/// - with `fragment-lists`, every `<li>` outside the notes holding a nested
///   list has `has-children`
/// - inside sections with the `auto-fragment-index` role, fragments without
///   an explicit `data-fragment-index` are numbered per slide, after the
///   highest explicit index
pub struct Fragments;

impl Stage for Fragments {
    fn name(&self) -> &'static str {
        "fragments"
    }

    fn run(
        &self,
        deck: &mut Deck,
        dom: &mut dyn Dom,
        _context: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        if deck.configuration.fragment_lists {
            for item in outside_notes(dom, "li")? {
                dom.add_class(item, "fragment");
                if !dom.select_within(item, "ul, ol")?.is_empty() {
                    dom.add_class(item, "has-children");
                }
            }
        }
        if deck.configuration.fragment_tables {
            for row in outside_notes(dom, "tbody tr")? {
                dom.add_class(row, "fragment");
            }
        }
        for section in dom.select_all("section.auto-fragment-index")? {
            let mut slides = dom.select_within(section, "section")?;
            slides.insert(0, section);
            for slide in slides {
                if dom.select_within(slide, "section")?.is_empty() {
                    number_fragments(dom, slide)?;
                }
            }
        }
        Ok(())
    }
}

fn outside_notes(dom: &dyn Dom, selector: &str) -> Result<Vec<NodeId>, BuildError> {
    let mut nodes = Vec::new();
    for node in dom.select_all(selector)? {
        if dom.closest(node, NOTES)?.is_none() {
            nodes.push(node);
        }
    }
    Ok(nodes)
}

fn number_fragments(dom: &mut dyn Dom, slide: NodeId) -> Result<(), BuildError> {
    let fragments = dom.select_within(slide, ".fragment")?;
    let explicit = fragments
        .iter()
        .filter_map(|&node| dom.attribute(node, "data-fragment-index"))
        .filter_map(|index| index.trim().parse::<u32>().ok())
        .max();
    let mut next = explicit.map_or(0, |max| max.saturating_add(1));
    for node in fragments {
        if dom.attribute(node, "data-fragment-index").is_none() {
            dom.set_attribute(node, "data-fragment-index", &next.to_string());
            next = next.saturating_add(1);
        }
    }
    Ok(())
}
