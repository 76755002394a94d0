//! Diagram rendering for adeck.
//!
//! - [`DiagramRenderer`]: turns diagram source into SVG
//! - [`RendererSession`]: owns one lazily started renderer; batches are
//!   rendered in parallel with `rayon`
//! - [`KrokiRenderer`]: renderer backed by a Kroki server
//! - [`DiagramKey`]: content hash and cache file name of a diagram
//! - [`diagram_type`]: short type name used for per-type styling
//! - [`svg`]: SVG start-tag rewriting used before embedding
//!
//! # Example
//!
//! ```
//! use adeck_diagrams::{DiagramKey, diagram_type};
//!
//! let source = "graph TD\n  A --> B";
//! let key = DiagramKey { id: "graph-0", source, endpoint: "mermaid" };
//! assert!(key.cache_key().starts_with("graph-0-"));
//! assert_eq!(diagram_type(source), "flowchart");
//! ```

mod error;
mod key;
mod kind;
mod kroki;
mod session;
pub mod svg;

pub use error::{DiagramError, RenderError, SvgError};
pub use key::DiagramKey;
pub use kind::diagram_type;
pub use kroki::{KrokiRenderer, MERMAID_ENDPOINT, create_agent};
pub use session::{DiagramRenderer, DiagramRequest, RendererSession};
