//! The deck aggregate and its parser.

use std::io;
use std::path::{Path, PathBuf};

use adeck_asciidoc::Document;
use adeck_cache::CACHE_DIR_NAME;
use adeck_config::{DeckConfiguration, OptionWarning};
use indexmap::{IndexMap, IndexSet};

use crate::error::BuildError;
use crate::extensions::{DeckExtensions, EmojiEntry, GraphAnimation};

/// Where the live reload client connects to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveReloadTarget {
    pub port: u16,
}

/// Per-build options coming from the caller rather than the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Inline the live reload client.
    pub live_reload: Option<LiveReloadTarget>,
}

/// Everything known about the deck being built.
///
/// Created once per build by [`parse_deck`]. Stages read the document and
/// configuration and only append to `graph_types` and `svg_icons`.
#[derive(Debug)]
pub struct Deck {
    pub document: Document,
    pub configuration: DeckConfiguration,
    /// Rejected option values.
    pub warnings: Vec<OptionWarning>,
    /// Emojis by name, in first-use order.
    pub emojis: IndexMap<String, EmojiEntry>,
    /// Diagram sources by graph id.
    pub graphs: IndexMap<String, String>,
    /// Animations by target graph id.
    pub graph_animations: IndexMap<String, Vec<GraphAnimation>>,
    /// Hash of the input and custom CSS/JS; the live reload change token.
    pub input_hash: String,
    pub input_path: PathBuf,
    pub input_folder: PathBuf,
    pub cache_path: PathBuf,
    /// Diagram types rendered so far.
    pub graph_types: IndexSet<String>,
    /// Ids of the embedded SVG icons.
    pub svg_icons: Vec<String>,
    pub build_options: BuildOptions,
}

/// Hash of the input document and the custom files it references.
///
/// Images, fonts and other assets are not part of the hash.
pub fn hash_deck(
    input: &Path,
    custom_css: Option<&Path>,
    custom_js: Option<&Path>,
) -> io::Result<String> {
    adeck_cache::hash_files([Some(input), custom_css, custom_js])
}

/// Read and parse the input document into a [`Deck`].
///
/// # Errors
///
/// Returns [`BuildError::Input`] when the input cannot be read.
pub fn parse_deck(input: &Path, build_options: BuildOptions) -> Result<Deck, BuildError> {
    let input_error = |source: io::Error| BuildError::Input {
        path: input.to_path_buf(),
        source,
    };
    let input_path = std::path::absolute(input).map_err(input_error)?;
    let text = std::fs::read_to_string(&input_path).map_err(input_error)?;
    let input_folder = input_path
        .parent()
        .map_or_else(|| PathBuf::from("/"), Path::to_path_buf);
    let cache_path = input_folder.join(CACHE_DIR_NAME);

    let mut extensions = DeckExtensions::new();
    let document = extensions.parse(&text);
    let registers = extensions.into_registers();

    let resolution = adeck_config::resolve(
        |name| document.attribute(name).map(str::to_owned),
        &input_folder,
    );
    let configuration = resolution.configuration;

    let input_hash = hash_deck(
        &input_path,
        configuration.custom_css.as_deref(),
        configuration.custom_js.as_deref(),
    )
    .map_err(input_error)?;

    tracing::debug!(
        input = %input_path.display(),
        hash = %input_hash,
        graphs = registers.graphs.len(),
        emojis = registers.emojis.len(),
        "Parsed deck"
    );

    Ok(Deck {
        document,
        configuration,
        warnings: resolution.warnings,
        emojis: registers.emojis,
        graphs: registers.graphs,
        graph_animations: registers.graph_animations,
        input_hash,
        input_path,
        input_folder,
        cache_path,
        graph_types: IndexSet::new(),
        svg_icons: Vec::new(),
        build_options,
    })
}
