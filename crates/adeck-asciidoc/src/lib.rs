//! Asciidoc parsing and HTML conversion for slide decks.
//!
//! Covers the subset of Asciidoc used by presentations: the document header
//! and attribute entries, sections, paragraphs, lists, tables, listings,
//! literal, sidebar, example, open and quote blocks, passthroughs, block and
//! inline images, inline formatting and macros.
//!
//! Custom behaviour plugs in through a [`Registry`] of inline macros and
//! block processors.
//!
//! # Example
//!
//! ```
//! use adeck_asciidoc::{Registry, parse, render_blocks};
//!
//! let doc = parse("= Demo\n\n== Hello\n\nWorld", &mut Registry::new());
//! assert_eq!(doc.title.as_deref(), Some("Demo"));
//! assert!(render_blocks(&doc.blocks, &doc).contains("<h2>Hello</h2>"));
//! ```

mod ast;
mod attributes;
mod extension;
mod html;
mod inline;
mod parser;

pub use ast::{
    Block, BlockKind, BlockMeta, Document, ImageRef, List, ListItem, Listing, Section, Table,
};
pub use extension::{BlockProcessor, InlineMacro, ProcessResult, Registry};
pub use html::{render_block, render_blocks};

/// Parse Asciidoc source with the given extensions active.
pub fn parse(text: &str, registry: &mut Registry<'_>) -> Document {
    parser::parse_document(text, registry)
}
