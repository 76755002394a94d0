//! Collaborators shared by builds.

use adeck_cache::Cache;
use adeck_config::Settings;
use adeck_diagrams::{KrokiRenderer, RendererSession};

use crate::extensions::{CdnEmojiSource, EmojiSource};
use crate::highlight::{Highlighter, SyntectHighlighter};
use crate::minify::{HtmlMinifier, Minifier};
use crate::style::{PaletteCompiler, StyleCompiler};

/// External engines used by the pipeline.
///
/// A one-shot build owns its `Services`; watch mode keeps one instance, and
/// with it a warm diagram renderer, across rebuilds.
pub struct Services {
    pub renderer: RendererSession,
    pub style_compiler: Box<dyn StyleCompiler>,
    pub highlighter: Box<dyn Highlighter>,
    pub minifier: Box<dyn Minifier>,
    pub emoji_source: Box<dyn EmojiSource>,
    /// Use the on-disk cache next to the input document.
    pub cache_enabled: bool,
}

impl Services {
    /// Default engines configured from tool settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        let timeout = settings.diagrams.timeout();
        Self {
            renderer: KrokiRenderer::session(&settings.diagrams.kroki_url, timeout),
            style_compiler: Box::new(PaletteCompiler),
            highlighter: Box::new(SyntectHighlighter::new()),
            minifier: Box::new(HtmlMinifier),
            emoji_source: Box::new(CdnEmojiSource::new(&settings.emoji.base_url, timeout)),
            cache_enabled: settings.cache.enabled,
        }
    }

    /// Release the diagram renderer.
    pub fn close(self) {
        self.renderer.close();
    }
}

/// What a stage may use besides the deck and the DOM.
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    pub services: &'a Services,
    pub cache: &'a dyn Cache,
}
