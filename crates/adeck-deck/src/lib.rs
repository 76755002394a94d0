//! Deck building for adeck.
//!
//! Turns one Asciidoc document into a single self-contained HTML slide
//! deck:
//!
//! 1. [`parse_deck`] reads the document, runs the deck extensions (emoji,
//!    icon and graph macros) and resolves the configuration attributes
//! 2. [`builder::build_dom`] lays out the slides and inlines images, emojis
//!    and speaker notes
//! 3. [`pipeline::run`] applies the ordered transformation stages
//! 4. [`build_deck`] serializes, minifies and writes the result
//!
//! External engines (diagram renderer, style compiler, highlighter,
//! minifier, emoji source) are reached through traits bundled in
//! [`Services`], so one instance can be kept warm across watch-mode
//! rebuilds.

mod build;
pub mod builder;
pub mod css;
mod deck;
pub mod embed;
mod error;
pub mod extensions;
mod highlight;
mod minify;
pub mod pipeline;
mod services;
mod style;

pub use build::{BuildOutcome, build_deck, default_output};
pub use deck::{BuildOptions, Deck, LiveReloadTarget, hash_deck, parse_deck};
pub use error::BuildError;
pub use highlight::{Highlighted, Highlighter, SyntectHighlighter, wrap_lines};
pub use minify::{HtmlMinifier, Minifier};
pub use services::{BuildContext, Services};
pub use style::{PaletteCompiler, StyleCompiler, ThemeRequest};
