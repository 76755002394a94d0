//! Parser extensions for deck-specific syntax.
//!
//! - `emoji:name[]`: [`EmojiMacro`]
//! - `icon:name[]`: [`IconMacro`]
//! - `[graph]` listings: [`GraphBlock`]
//! - `[graph-animation,target=id]` listings: [`GraphAnimationBlock`]
//!
//! A fresh [`DeckExtensions`] is created for every build; what the
//! extensions collect is moved into the [`crate::Deck`] once parsing ends.

mod emoji;
mod emoji_table;
mod graph;
mod icon;

use adeck_asciidoc::{Document, Registry};
use indexmap::IndexMap;

pub use emoji::{
    CdnEmojiSource, EmojiEntry, EmojiFetcher, EmojiMacro, EmojiSource, FetchError,
};
pub use emoji_table::codepoint;
pub use graph::{GraphAnimation, GraphAnimationBlock, GraphBlock};
pub use icon::IconMacro;

/// Registers filled while parsing.
#[derive(Debug, Default)]
pub struct Registers {
    pub emojis: IndexMap<String, EmojiEntry>,
    pub graphs: IndexMap<String, String>,
    pub graph_animations: IndexMap<String, Vec<GraphAnimation>>,
}

/// Owner of every deck extension for one parse.
#[derive(Debug, Default)]
pub struct DeckExtensions {
    emoji: EmojiMacro,
    icon: IconMacro,
    graph: GraphBlock,
    animation: GraphAnimationBlock,
}

impl DeckExtensions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `text` with all extensions active.
    pub fn parse(&mut self, text: &str) -> Document {
        let mut registry = Registry::new();
        registry
            .inline_macro(&mut self.emoji)
            .inline_macro(&mut self.icon)
            .block_processor(&mut self.graph)
            .block_processor(&mut self.animation);
        adeck_asciidoc::parse(text, &mut registry)
    }

    /// Hand over everything collected.
    pub fn into_registers(self) -> Registers {
        Registers {
            emojis: self.emoji.into_emojis(),
            graphs: self.graph.into_graphs(),
            graph_animations: self.animation.into_animations(),
        }
    }
}
