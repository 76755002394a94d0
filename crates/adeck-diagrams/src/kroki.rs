//! Kroki-backed renderer.
//!
//! Sends diagram source to a Kroki server via HTTP POST
//! (`{server}/{endpoint}/svg`) and returns the SVG body.

use std::time::Duration;

use ureq::Agent;

use crate::error::RenderError;
use crate::session::{DiagramRenderer, RendererSession};

/// Kroki endpoint used for deck diagrams.
pub const MERMAID_ENDPOINT: &str = "mermaid";

/// Create HTTP agent with the specified timeout.
pub fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Renders diagrams through a Kroki server.
pub struct KrokiRenderer {
    agent: Agent,
    server_url: String,
    endpoint: String,
}

impl KrokiRenderer {
    #[must_use]
    pub fn new(server_url: &str, endpoint: &str, timeout: Duration) -> Self {
        Self {
            agent: create_agent(timeout),
            server_url: server_url.trim_end_matches('/').to_owned(),
            endpoint: endpoint.to_owned(),
        }
    }

    /// Session that starts a Mermaid renderer against `server_url` on first use.
    #[must_use]
    pub fn session(server_url: &str, timeout: Duration) -> RendererSession {
        let server_url = server_url.to_owned();
        RendererSession::new(MERMAID_ENDPOINT, move || {
            Ok(Box::new(Self::new(&server_url, MERMAID_ENDPOINT, timeout))
                as Box<dyn DiagramRenderer>)
        })
    }

    fn url(&self) -> String {
        format!("{}/{}/svg", self.server_url, self.endpoint)
    }
}

impl DiagramRenderer for KrokiRenderer {
    fn render(&self, source: &str) -> Result<String, RenderError> {
        let response = self
            .agent
            .post(&self.url())
            .header("Content-Type", "text/plain")
            .send(source.as_bytes())
            .map_err(|e| RenderError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let body = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            return Err(RenderError::Status { status, body });
        }

        let data = body
            .read_to_vec()
            .map_err(|e| RenderError::Io(e.to_string()))?;
        let svg = String::from_utf8(data)
            .map_err(|e| RenderError::InvalidSvg(format!("invalid UTF-8: {e}")))?;
        if !svg.contains("<svg") {
            return Err(RenderError::InvalidSvg("missing <svg> root".to_owned()));
        }
        Ok(svg)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
