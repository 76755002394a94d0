//! Mutable HTML tree for deck transformations.
//!
//! Every build stage manipulates the deck through the object-safe [`Dom`]
//! trait, never through a concrete tree type. [`ArenaDom`] is the shipped
//! implementation: a `kuchikiki` tree (parsed and serialized by `html5ever`,
//! matched by the `selectors` engine) whose nodes are registered in an arena
//! and addressed by [`NodeId`]. Detached nodes stay registered until the tree
//! is dropped.
//!
//! Parsing follows the HTML standard: missing `html`, `head` and `body`
//! elements are added, HTML names are lowercased and inline SVG keeps its
//! mixed-case names such as `viewBox` or `foreignObject`. Inserted markup is
//! parsed as template content, so list items, table rows and SVG fragments
//! need no context element.
//!
//! Selectors are CSS level 3 selectors, including combinators, attribute
//! operators and `:not()`.

mod arena;

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

pub use arena::ArenaDom;

/// Handle of a node inside a [`Dom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Where [`Dom::insert_html_at`] places new nodes relative to a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    /// Before the target, as a sibling.
    BeforeBegin,
    /// Inside the target, before its first child.
    AfterBegin,
    /// Inside the target, after its last child.
    BeforeEnd,
    /// After the target, as a sibling.
    AfterEnd,
}

/// DOM manipulation error.
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    /// A selector the caller relies on matched nothing.
    #[error("no element matches `{0}`")]
    MissingNode(String),
    /// A selector could not be parsed.
    #[error("invalid selector `{selector}`: {message}")]
    InvalidSelector { selector: String, message: String },
    /// A sibling insertion targeted a node without parent.
    #[error("node has no parent")]
    Detached,
    /// An element name that HTML cannot express.
    #[error("invalid element name `{0}`")]
    InvalidTag(String),
}

static SCRIPT_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</(script)").unwrap());
static STYLE_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</(style)").unwrap());

/// Rewrite `</script` sequences so `js` cannot end an inline script early.
pub fn escape_script_close(js: &str) -> Cow<'_, str> {
    SCRIPT_CLOSE.replace_all(js, r"<\/$1")
}

fn escape_style_close(css: &str) -> Cow<'_, str> {
    STYLE_CLOSE.replace_all(css, r"<\/$1")
}

/// Capabilities every build stage relies on.
///
/// Node-level accessors silently ignore operations that make no sense for the
/// node kind (setting an attribute on a text node, for example). Selector
/// errors and missing required nodes surface as [`DomError`].
pub trait Dom {
    /// The document root.
    fn document(&self) -> NodeId;

    /// All elements matching `selector`, in document order.
    fn select_all(&self, selector: &str) -> Result<Vec<NodeId>, DomError>;

    /// Descendants of `scope` matching `selector`, in document order.
    fn select_within(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, DomError>;

    /// Whether element `node` matches `selector`.
    fn matches(&self, node: NodeId, selector: &str) -> Result<bool, DomError>;

    /// First element matching `selector`.
    fn select_one(&self, selector: &str) -> Result<Option<NodeId>, DomError> {
        Ok(self.select_all(selector)?.into_iter().next())
    }

    /// First element matching `selector`, or [`DomError::MissingNode`].
    fn require(&self, selector: &str) -> Result<NodeId, DomError> {
        self.select_one(selector)?
            .ok_or_else(|| DomError::MissingNode(selector.to_owned()))
    }

    /// Closest inclusive ancestor of `node` matching `selector`.
    fn closest(&self, node: NodeId, selector: &str) -> Result<Option<NodeId>, DomError> {
        let mut current = Some(node);
        while let Some(id) = current {
            if self.tag_name(id).is_some() && self.matches(id, selector)? {
                return Ok(Some(id));
            }
            current = self.parent(id);
        }
        Ok(None)
    }

    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> Result<NodeId, DomError>;

    /// Create a detached text node.
    fn create_text(&mut self, text: &str) -> NodeId;

    /// Rename an element, keeping attributes, children and its [`NodeId`].
    fn change_tag(&mut self, node: NodeId, tag: &str) -> Result<(), DomError>;

    /// Element name, `None` for non-element nodes.
    fn tag_name(&self, node: NodeId) -> Option<&str>;

    /// Text of a text node, `None` for other nodes.
    fn text(&self, node: NodeId) -> Option<String>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// All attributes of an element, in source order.
    fn attributes(&self, node: NodeId) -> Vec<(String, String)>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    fn remove_attribute(&mut self, node: NodeId, name: &str);

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attribute(node, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if self.tag_name(node).is_none() || self.has_class(node, class) {
            return;
        }
        let classes = match self.attribute(node, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_owned(),
        };
        self.set_attribute(node, "class", &classes);
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        let Some(existing) = self.attribute(node, "class") else {
            return;
        };
        let remaining = existing
            .split_whitespace()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attribute(node, "class", &remaining);
    }

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Child nodes of any kind.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Child elements only.
    fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node)
            .into_iter()
            .filter(|child| self.tag_name(*child).is_some())
            .collect()
    }

    /// All descendant nodes in document order.
    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).into_iter().rev().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).into_iter().rev());
        }
        out
    }

    /// Move `child` to the end of `parent`'s children.
    fn append_child(&mut self, parent: NodeId, child: NodeId);

    /// Move `node` right before `reference`.
    fn insert_before(&mut self, reference: NodeId, node: NodeId) -> Result<(), DomError>;

    /// Remove `node` from its parent.
    fn detach(&mut self, node: NodeId);

    /// Parse `html` and insert the resulting nodes relative to `node`.
    fn insert_html_at(
        &mut self,
        node: NodeId,
        position: InsertPosition,
        html: &str,
    ) -> Result<Vec<NodeId>, DomError>;

    /// Parse `html` and insert it relative to the first match of `selector`.
    fn insert_html(
        &mut self,
        selector: &str,
        position: InsertPosition,
        html: &str,
    ) -> Result<Vec<NodeId>, DomError> {
        let target = self.require(selector)?;
        self.insert_html_at(target, position, html)
    }

    /// Replace `node` by the nodes parsed from `html`.
    fn replace_with_html(&mut self, node: NodeId, html: &str) -> Result<Vec<NodeId>, DomError> {
        let inserted = self.insert_html_at(node, InsertPosition::BeforeBegin, html)?;
        self.detach(node);
        Ok(inserted)
    }

    /// Replace the children of `node` by the nodes parsed from `html`.
    fn set_inner_html(&mut self, node: NodeId, html: &str) -> Result<Vec<NodeId>, DomError> {
        for child in self.children(node) {
            self.detach(child);
        }
        self.insert_html_at(node, InsertPosition::BeforeEnd, html)
    }

    /// Replace the children of `node` by a single text node.
    fn set_text(&mut self, node: NodeId, text: &str) {
        for child in self.children(node) {
            self.detach(child);
        }
        let text_node = self.create_text(text);
        self.append_child(node, text_node);
    }

    fn inner_html(&self, node: NodeId) -> String;

    fn outer_html(&self, node: NodeId) -> String;

    /// Concatenated text of all descendant text nodes.
    fn text_content(&self, node: NodeId) -> String {
        if let Some(text) = self.text(node) {
            return text;
        }
        self.descendants(node)
            .into_iter()
            .filter_map(|id| self.text(id))
            .collect()
    }

    /// Inline a stylesheet into `<head>`, guarding `</style` sequences.
    fn insert_inline_style(&mut self, css: &str, position: InsertPosition) -> Result<(), DomError> {
        let html = format!("<style>{}</style>", escape_style_close(css));
        self.insert_html("head", position, &html)?;
        Ok(())
    }

    /// Inline a script into `<body>`, guarding `</script` sequences.
    fn insert_inline_script(&mut self, js: &str, position: InsertPosition) -> Result<(), DomError> {
        let html = format!("<script>{}</script>", escape_script_close(js));
        self.insert_html("body", position, &html)?;
        Ok(())
    }

    /// Serialize the whole document.
    fn serialize(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_script_close() {
        assert_eq!(
            escape_script_close("a = '</script>'; b = '</SCRIPT >'"),
            r"a = '<\/script>'; b = '<\/SCRIPT >'"
        );
        assert!(matches!(escape_script_close("plain"), Cow::Borrowed("plain")));
    }
}
