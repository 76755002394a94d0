//! Diagram cache key computation.

use adeck_cache::content_hash;

/// Parameters that determine a rendered diagram.
#[derive(Debug, Clone, Copy)]
pub struct DiagramKey<'a> {
    /// Graph id the diagram is registered under.
    pub id: &'a str,
    /// Diagram source as written in the document.
    pub source: &'a str,
    /// Renderer endpoint (e.g. "mermaid").
    pub endpoint: &'a str,
}

impl DiagramKey<'_> {
    /// Content hash of everything that affects the rendered output.
    ///
    /// Computed from `"{endpoint}:svg:{source}"`; the graph id is not part of
    /// it, so moving a diagram to another id reuses its hash.
    #[must_use]
    pub fn compute_hash(&self) -> String {
        content_hash(format!("{}:svg:{}", self.endpoint, self.source).as_bytes())
    }

    /// File name of the cached SVG: `<id>-<hash>.svg`.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!("{}-{}.svg", self.id, self.compute_hash())
    }
}
