//! Diagram rendering errors.

/// Error returned by a [`DiagramRenderer`](crate::DiagramRenderer).
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("I/O error: {0}")]
    Io(String),
    #[error("renderer returned invalid SVG: {0}")]
    InvalidSvg(String),
    #[error("renderer unavailable: {0}")]
    Unavailable(String),
}

/// Rendering failure of one diagram in a batch.
#[derive(Debug, thiserror::Error)]
#[error("diagram {id}: {kind}")]
pub struct DiagramError {
    pub id: String,
    pub kind: RenderError,
}

/// SVG markup that cannot be rewritten.
#[derive(Debug, thiserror::Error)]
pub enum SvgError {
    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),
    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),
    #[error("cannot write SVG: {0}")]
    Write(#[from] std::io::Error),
    #[error("document root is not an <svg> element")]
    NotSvg,
    #[error("SVG has neither a viewBox nor numeric width and height")]
    NoSize,
}
