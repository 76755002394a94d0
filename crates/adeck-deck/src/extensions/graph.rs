//! `[graph]` and `[graph-animation]` block processors.

use std::collections::BTreeMap;

use adeck_asciidoc::{BlockProcessor, ProcessResult};
use indexmap::IndexMap;
use serde::Deserialize;

/// Changes applied to the nodes of a rendered diagram matching `selector`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphAnimation {
    pub selector: String,
    #[serde(default, alias = "class")]
    pub classes: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl GraphAnimation {
    /// Attribute values as strings; JSON strings are used without quotes.
    pub fn attribute_values(&self) -> impl Iterator<Item = (&str, String)> {
        self.attributes.iter().map(|(name, value)| {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (name.as_str(), value)
        })
    }
}

/// Collects diagram sources from `[graph]` listings.
///
/// Each block is replaced by a placeholder that the graph stage swaps for the
/// rendered SVG.
#[derive(Debug, Default)]
pub struct GraphBlock {
    graphs: IndexMap<String, String>,
}

impl GraphBlock {
    /// Diagram sources by graph id, in document order.
    pub fn into_graphs(self) -> IndexMap<String, String> {
        self.graphs
    }
}

impl BlockProcessor for GraphBlock {
    fn style(&self) -> &str {
        "graph"
    }

    fn process(
        &mut self,
        _attributes: &IndexMap<String, String>,
        id: Option<&str>,
        source: &str,
        index: usize,
    ) -> ProcessResult {
        let id = id.map_or_else(|| format!("graph-{index}"), str::to_owned);
        if self.graphs.contains_key(&id) {
            tracing::warn!(graph = %id, "Duplicate graph id, the later diagram wins");
        }
        let placeholder = format!(
            "<div class=\"graph-placeholder\" data-graph-id=\"{}\"></div>",
            html_escape::encode_double_quoted_attribute(&id)
        );
        self.graphs.insert(id, source.to_owned());
        ProcessResult::Placeholder(placeholder)
    }
}

/// Collects `[graph-animation,target=<id>]` descriptors.
///
/// The block body is a JSON5 list of [`GraphAnimation`]s. The block itself
/// never reaches the output.
#[derive(Debug, Default)]
pub struct GraphAnimationBlock {
    animations: IndexMap<String, Vec<GraphAnimation>>,
}

impl GraphAnimationBlock {
    /// Animations by target graph id, in document order.
    pub fn into_animations(self) -> IndexMap<String, Vec<GraphAnimation>> {
        self.animations
    }
}

impl BlockProcessor for GraphAnimationBlock {
    fn style(&self) -> &str {
        "graph-animation"
    }

    fn process(
        &mut self,
        attributes: &IndexMap<String, String>,
        _id: Option<&str>,
        source: &str,
        _index: usize,
    ) -> ProcessResult {
        let Some(target) = attributes.get("target").filter(|t| !t.is_empty()) else {
            tracing::error!("graph-animation block without a target attribute");
            return ProcessResult::Drop;
        };
        match json5::from_str::<Vec<GraphAnimation>>(source) {
            Ok(parsed) => {
                self.animations
                    .entry(target.clone())
                    .or_default()
                    .extend(parsed);
            }
            Err(e) => {
                tracing::error!(target = %target, error = %e, "Invalid graph animation");
            }
        }
        ProcessResult::Drop
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn attributes(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_graph_ids() {
        let mut block = GraphBlock::default();
        let first = block.process(&attributes(&[]), None, "graph TD\nA-->B", 0);
        let second = block.process(&attributes(&[]), Some("flow"), "pie", 1);

        assert_eq!(
            first,
            ProcessResult::Placeholder(
                "<div class=\"graph-placeholder\" data-graph-id=\"graph-0\"></div>".to_owned()
            )
        );
        assert_eq!(
            second,
            ProcessResult::Placeholder(
                "<div class=\"graph-placeholder\" data-graph-id=\"flow\"></div>".to_owned()
            )
        );
        let graphs = block.into_graphs();
        assert_eq!(graphs.keys().collect::<Vec<_>>(), ["graph-0", "flow"]);
        assert_eq!(graphs["graph-0"], "graph TD\nA-->B");
    }

    #[test]
    fn test_animation_json5() {
        let mut block = GraphAnimationBlock::default();
        let source = "[\n  // highlight the first node\n  {selector: '#A', class: ['fragment'], attributes: {'data-fragment-index': '1'}},\n  {selector: '.edge', classes: ['fragment', 'fade-in'],},\n]";
        let result = block.process(&attributes(&[("target", "flow")]), None, source, 0);

        assert_eq!(result, ProcessResult::Drop);
        let animations = block.into_animations();
        let flow = &animations["flow"];
        assert_eq!(flow.len(), 2);
        assert_eq!(flow[0].selector, "#A");
        assert_eq!(flow[0].classes, ["fragment"]);
        assert_eq!(
            flow[0].attribute_values().collect::<Vec<_>>(),
            [("data-fragment-index", "1".to_owned())]
        );
        assert_eq!(flow[1].classes, ["fragment", "fade-in"]);
        assert!(flow[1].attributes.is_empty());
    }

    #[test]
    fn test_invalid_animation_is_dropped() {
        let mut block = GraphAnimationBlock::default();
        let result = block.process(&attributes(&[("target", "flow")]), None, "[{selector:", 0);

        assert_eq!(result, ProcessResult::Drop);
        assert!(block.into_animations().is_empty());
    }

    #[test]
    fn test_animation_without_target() {
        let mut block = GraphAnimationBlock::default();
        let result = block.process(&attributes(&[]), None, "[]", 0);

        assert_eq!(result, ProcessResult::Drop);
        assert!(block.into_animations().is_empty());
    }
}
