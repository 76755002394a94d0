//! Parser extension points.
//!
//! Extensions are registered with a [`Registry`] before parsing and are
//! consulted while the document is being read:
//!
//! - [`InlineMacro`]s handle `name:target[attributes]` in any inline text
//! - [`BlockProcessor`]s handle verbatim blocks (`----` or `....`) whose first
//!   positional attribute names their style, e.g. `[graph,id=flow]`
//!
//! The registry only borrows extensions, so whatever an extension collects
//! during the parse stays with its owner once the registry is dropped.

use indexmap::IndexMap;

/// Result of processing a styled verbatim block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessResult {
    /// Replace the block with placeholder HTML substituted after conversion.
    Placeholder(String),
    /// Replace the block with final HTML.
    Inline(String),
    /// Remove the block from the output.
    Drop,
    /// Not handled; convert as a regular block.
    PassThrough,
}

/// Handler for `name:target[attributes]` inline macros.
pub trait InlineMacro {
    /// Macro name, the part before the colon.
    fn name(&self) -> &str;

    /// Return the HTML replacing the macro, or `None` to leave it as text.
    fn process(&mut self, target: &str, attributes: &str) -> Option<String>;
}

/// Handler for verbatim blocks with a custom style.
pub trait BlockProcessor {
    /// Block style handled by this processor.
    fn style(&self) -> &str;

    /// Process a block.
    ///
    /// # Arguments
    ///
    /// * `attributes` - Named attributes of the block (positional ones under
    ///   their 1-based index)
    /// * `id` - Block id, if one was given
    /// * `source` - Raw content of the block
    /// * `index` - Zero-based index among the blocks handled by this processor
    fn process(
        &mut self,
        attributes: &IndexMap<String, String>,
        id: Option<&str>,
        source: &str,
        index: usize,
    ) -> ProcessResult;
}

/// Extensions active for one parse.
#[derive(Default)]
pub struct Registry<'a> {
    inline_macros: Vec<&'a mut dyn InlineMacro>,
    block_processors: Vec<(&'a mut dyn BlockProcessor, usize)>,
}

impl<'a> Registry<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inline_macro(&mut self, handler: &'a mut dyn InlineMacro) -> &mut Self {
        self.inline_macros.push(handler);
        self
    }

    pub fn block_processor(&mut self, handler: &'a mut dyn BlockProcessor) -> &mut Self {
        self.block_processors.push((handler, 0));
        self
    }

    pub(crate) fn handles_inline(&self, name: &str) -> bool {
        self.inline_macros.iter().any(|m| m.name() == name)
    }

    pub(crate) fn process_inline(
        &mut self,
        name: &str,
        target: &str,
        attributes: &str,
    ) -> Option<String> {
        self.inline_macros
            .iter_mut()
            .find(|m| m.name() == name)
            .and_then(|m| m.process(target, attributes))
    }

    pub(crate) fn process_block(
        &mut self,
        style: &str,
        attributes: &IndexMap<String, String>,
        id: Option<&str>,
        source: &str,
    ) -> ProcessResult {
        let Some((processor, count)) = self
            .block_processors
            .iter_mut()
            .find(|(p, _)| p.style() == style)
        else {
            return ProcessResult::PassThrough;
        };
        let result = processor.process(attributes, id, source, *count);
        if result != ProcessResult::PassThrough {
            *count += 1;
        }
        result
    }
}
