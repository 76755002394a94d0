//! One complete build: document in, self-contained HTML file out.

use std::path::{Path, PathBuf};

use adeck_cache::{Cache, FileCache, NullCache};
use adeck_config::OptionWarning;
use adeck_dom::Dom;

use crate::builder::build_dom;
use crate::deck::{BuildOptions, parse_deck};
use crate::error::BuildError;
use crate::pipeline;
use crate::services::{BuildContext, Services};

/// Result of a successful build.
#[derive(Debug)]
pub struct BuildOutcome {
    pub output_path: PathBuf,
    /// Change token of the inputs, see [`crate::hash_deck`].
    pub input_hash: String,
    pub input_path: PathBuf,
    /// Folder the deck's path options resolve against.
    pub assets_path: PathBuf,
    pub cache_path: PathBuf,
    /// Rejected option values, already logged.
    pub warnings: Vec<OptionWarning>,
}

/// Default output path: the input with an `.html` extension.
pub fn default_output(input: &Path) -> PathBuf {
    input.with_extension("html")
}

/// Build `input` into `output` (or [`default_output`]).
///
/// The cache lives next to the input and is skipped entirely when
/// [`Services::cache_enabled`] is off.
///
/// # Errors
///
/// Fails when the input cannot be read, the output cannot be written or a
/// stage hits an internal error. Nothing is written in that case.
pub fn build_deck(
    services: &Services,
    input: &Path,
    output: Option<&Path>,
    options: BuildOptions,
) -> Result<BuildOutcome, BuildError> {
    let mut deck = parse_deck(input, options)?;
    let output_path = output.map_or_else(|| default_output(&deck.input_path), Path::to_path_buf);

    let cache: Box<dyn Cache> = if services.cache_enabled {
        Box::new(FileCache::new(
            deck.cache_path.clone(),
            env!("CARGO_PKG_VERSION"),
        ))
    } else {
        Box::new(NullCache)
    };
    let context = BuildContext {
        services,
        cache: cache.as_ref(),
    };

    let mut dom = build_dom(&deck, &context)?;
    pipeline::run(&mut deck, &mut dom, &context)?;
    let html = services.minifier.minify(&dom.serialize());

    let output_error = |source| BuildError::Output {
        path: output_path.clone(),
        source,
    };
    if let Some(parent) = output_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(output_error)?;
    }
    std::fs::write(&output_path, html).map_err(output_error)?;

    tracing::info!(
        output = %output_path.display(),
        warnings = deck.warnings.len(),
        "Deck built"
    );
    Ok(BuildOutcome {
        output_path,
        input_hash: deck.input_hash,
        input_path: deck.input_path,
        assets_path: deck.configuration.assets_path,
        cache_path: deck.cache_path,
        warnings: deck.warnings,
    })
}
