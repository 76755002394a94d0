//! Diagram rendering into graph placeholders, with cached SVG output.

use adeck_cache::CacheBucketExt;
use adeck_diagrams::{DiagramKey, DiagramRequest, diagram_type, svg};
use adeck_dom::Dom;

use super::Stage;
use crate::deck::Deck;
use crate::error::BuildError;
use crate::services::BuildContext;

/// Renders the deck's diagrams into their placeholders.
///
/// Requires: `div.graph-placeholder[data-graph-id]` for every graph of the
/// deck. Guarantees: each placeholder is a `div.graph` holding the
/// post-processed SVG, or the error graphic when rendering failed; every
/// successfully rendered type is recorded in [`Deck::graph_types`];
/// animations are applied to the rendered SVG.
///
/// Cached SVGs are reused; the renderer only sees cache misses, which are
/// rendered in parallel.
pub struct Graphs;

impl Stage for Graphs {
    fn name(&self) -> &'static str {
        "graphs"
    }

    fn run(
        &self,
        deck: &mut Deck,
        dom: &mut dyn Dom,
        context: &BuildContext<'_>,
    ) -> Result<(), BuildError> {
        if deck.graphs.is_empty() {
            warn_orphan_animations(deck);
            return Ok(());
        }
        let session = &context.services.renderer;
        let bucket = context.cache.bucket("diagrams");

        let mut rendered: Vec<Option<String>> = Vec::with_capacity(deck.graphs.len());
        let mut misses = Vec::new();
        for (index, (id, source)) in deck.graphs.iter().enumerate() {
            let key = DiagramKey {
                id,
                source,
                endpoint: session.endpoint(),
            };
            if let Some(svg) = bucket.get_string(&key.cache_key()) {
                tracing::debug!(graph = %id, "Diagram cache hit");
                rendered.push(Some(svg));
            } else {
                rendered.push(None);
                misses.push((
                    index,
                    key.cache_key(),
                    DiagramRequest {
                        id: id.clone(),
                        source: source.clone(),
                    },
                ));
            }
        }

        if !misses.is_empty() {
            let requests: Vec<DiagramRequest> =
                misses.iter().map(|(_, _, request)| request.clone()).collect();
            let results = session.render_all(&requests);
            for ((index, cache_key, _), result) in misses.into_iter().zip(results) {
                match result {
                    Ok(svg) => {
                        bucket.set_string(&cache_key, &svg);
                        rendered[index] = Some(svg);
                    }
                    Err(e) => tracing::error!(error = %e, "Diagram rendering failed"),
                }
            }
        }

        let graphs: Vec<(String, String)> = deck
            .graphs
            .iter()
            .map(|(id, source)| (id.clone(), source.clone()))
            .collect();
        for ((id, source), svg) in graphs.into_iter().zip(rendered) {
            let kind = diagram_type(&source);
            let processed = svg.and_then(|svg| match svg::post_process(&svg, &kind) {
                Ok(processed) => Some(processed),
                Err(e) => {
                    tracing::error!(graph = %id, error = %e, "Rendered diagram is not usable SVG");
                    None
                }
            });
            let inner = match processed {
                Some(processed) => {
                    deck.graph_types.insert(kind);
                    processed
                }
                None => svg::add_root_class(&adeck_assets::error_svg(), "graph-error")?,
            };
            let escaped_id = html_escape::encode_double_quoted_attribute(&id);
            let html = format!("<div class=\"graph\" data-graph-id=\"{escaped_id}\">{inner}</div>");
            let selector = format!("div.graph-placeholder[data-graph-id=\"{escaped_id}\"]");
            for placeholder in dom.select_all(&selector)? {
                dom.replace_with_html(placeholder, &html)?;
            }
        }

        apply_animations(deck, dom)
    }
}

fn warn_orphan_animations(deck: &Deck) {
    for target in deck.graph_animations.keys() {
        tracing::warn!(graph = %target, "Animation targets an unknown graph");
    }
}

fn apply_animations(deck: &Deck, dom: &mut dyn Dom) -> Result<(), BuildError> {
    for (target, animations) in &deck.graph_animations {
        if !deck.graphs.contains_key(target) {
            tracing::warn!(graph = %target, "Animation targets an unknown graph");
            continue;
        }
        let selector = format!(
            "div.graph[data-graph-id=\"{}\"]",
            html_escape::encode_double_quoted_attribute(target)
        );
        for container in dom.select_all(&selector)? {
            for animation in animations {
                let nodes = dom.select_within(container, &animation.selector)?;
                if nodes.is_empty() {
                    tracing::warn!(
                        graph = %target,
                        selector = %animation.selector,
                        "Animation selector matches nothing"
                    );
                    continue;
                }
                for node in nodes {
                    for class in &animation.classes {
                        dom.add_class(node, class);
                    }
                    for (name, value) in animation.attribute_values() {
                        dom.set_attribute(node, name, &value);
                    }
                }
            }
        }
    }
    Ok(())
}
