//! Build errors.

use std::io;
use std::path::PathBuf;

use adeck_diagrams::SvgError;
use adeck_dom::DomError;

/// Error aborting a deck build.
///
/// Problems with individual assets (a missing image, a diagram the renderer
/// rejects) are logged and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The input document could not be read.
    #[error("cannot read input {}: {source}", path.display())]
    Input { path: PathBuf, source: io::Error },
    /// A DOM operation the pipeline relies on failed.
    #[error(transparent)]
    Dom(#[from] DomError),
    /// A bundled SVG asset could not be rewritten.
    #[error("invalid bundled SVG: {0}")]
    Svg(#[from] SvgError),
    /// The theme stylesheet could not be compiled.
    #[error("style compilation failed: {0}")]
    Style(String),
    /// The syntax highlighter failed on valid input.
    #[error("highlighting failed: {0}")]
    Highlight(String),
    /// The output file could not be written.
    #[error("cannot write output {}: {source}", path.display())]
    Output { path: PathBuf, source: io::Error },
}
