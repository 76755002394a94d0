//! Renderer trait and the scoped session owning a renderer instance.

use std::sync::OnceLock;

use rayon::prelude::*;

use crate::error::{DiagramError, RenderError};

/// Turns diagram source into SVG markup.
pub trait DiagramRenderer: Send + Sync {
    /// Render one diagram.
    fn render(&self, source: &str) -> Result<String, RenderError>;

    /// Endpoint name, part of every diagram cache key.
    fn endpoint(&self) -> &str;
}

type Factory = Box<dyn Fn() -> Result<Box<dyn DiagramRenderer>, RenderError> + Send + Sync>;

/// Lazily started renderer with an explicit owner.
///
/// The renderer is created on the first render request and kept until the
/// session is dropped. A one-shot build owns its own session; watch mode
/// keeps one across rebuilds.
pub struct RendererSession {
    endpoint: String,
    factory: Factory,
    renderer: OnceLock<Box<dyn DiagramRenderer>>,
}

/// A diagram to render.
#[derive(Debug, Clone)]
pub struct DiagramRequest {
    pub id: String,
    pub source: String,
}

impl RendererSession {
    /// Create a session that builds its renderer with `factory` on first use.
    ///
    /// `endpoint` must match the endpoint of the renderer the factory
    /// produces; it is needed for cache keys before the renderer starts.
    pub fn new(
        endpoint: impl Into<String>,
        factory: impl Fn() -> Result<Box<dyn DiagramRenderer>, RenderError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            factory: Box::new(factory),
            renderer: OnceLock::new(),
        }
    }

    /// Create a session around an already constructed renderer.
    pub fn with_renderer(renderer: Box<dyn DiagramRenderer>) -> Self {
        let session = Self {
            endpoint: renderer.endpoint().to_owned(),
            factory: Box::new(|| Err(RenderError::Unavailable("renderer already set".to_owned()))),
            renderer: OnceLock::new(),
        };
        let _ = session.renderer.set(renderer);
        session
    }

    /// Endpoint of the session's renderer.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether the renderer has been started.
    pub fn is_started(&self) -> bool {
        self.renderer.get().is_some()
    }

    fn renderer(&self) -> Result<&dyn DiagramRenderer, RenderError> {
        if let Some(renderer) = self.renderer.get() {
            return Ok(renderer.as_ref());
        }
        tracing::debug!(endpoint = %self.endpoint, "Starting diagram renderer");
        let renderer = (self.factory)()?;
        // A concurrent first call may have won; either instance is equivalent.
        let _ = self.renderer.set(renderer);
        self.renderer
            .get()
            .map(AsRef::as_ref)
            .ok_or_else(|| RenderError::Unavailable("renderer failed to start".to_owned()))
    }

    /// Render one diagram, starting the renderer if needed.
    pub fn render(&self, source: &str) -> Result<String, RenderError> {
        self.renderer()?.render(source)
    }

    /// Render diagrams in parallel.
    ///
    /// Results keep the order of `requests`; a failing diagram does not
    /// affect the others.
    pub fn render_all(&self, requests: &[DiagramRequest]) -> Vec<Result<String, DiagramError>> {
        if requests.is_empty() {
            return Vec::new();
        }
        let renderer = match self.renderer() {
            Ok(renderer) => renderer,
            Err(e) => {
                let message = e.to_string();
                return requests
                    .iter()
                    .map(|r| {
                        Err(DiagramError {
                            id: r.id.clone(),
                            kind: RenderError::Unavailable(message.clone()),
                        })
                    })
                    .collect();
            }
        };

        requests
            .par_iter()
            .map(|request| {
                renderer.render(&request.source).map_err(|kind| DiagramError {
                    id: request.id.clone(),
                    kind,
                })
            })
            .collect()
    }

    /// Release the renderer.
    pub fn close(self) {
        if self.is_started() {
            tracing::debug!(endpoint = %self.endpoint, "Closing diagram renderer");
        }
    }
}
