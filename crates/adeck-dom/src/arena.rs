//! [`Dom`] over a `kuchikiki` tree.

use std::collections::HashMap;
use std::rc::Rc;

use kuchikiki::traits::*;
use kuchikiki::{Attribute, ExpandedName, Node, NodeRef, Selectors};

use crate::{Dom, DomError, InsertPosition, NodeId};

/// Elements whose text children are serialized without escaping.
const RAW_TEXT: &[&str] = &[
    "script",
    "style",
    "xmp",
    "iframe",
    "noembed",
    "noframes",
    "plaintext",
];

/// HTML tree with stable node handles.
///
/// Every node that enters the tree (parsed, created or inserted) gets the
/// next [`NodeId`]; the handle keeps the node alive after it is detached.
pub struct ArenaDom {
    nodes: Vec<NodeRef>,
    ids: HashMap<*const Node, NodeId>,
}

impl ArenaDom {
    /// Parse a complete HTML document.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        let document = kuchikiki::parse_html().one(html);
        let mut dom = Self {
            nodes: Vec::new(),
            ids: HashMap::new(),
        };
        dom.register_tree(&document);
        dom
    }

    fn node(&self, id: NodeId) -> &NodeRef {
        &self.nodes[id.0]
    }

    fn id_of(&self, node: &NodeRef) -> Option<NodeId> {
        self.ids.get(&Rc::as_ptr(&node.0)).copied()
    }

    fn register(&mut self, node: &NodeRef) -> NodeId {
        if let Some(id) = self.id_of(node) {
            return id;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(node.clone());
        self.ids.insert(Rc::as_ptr(&node.0), id);
        id
    }

    /// Register `root` and everything below it.
    fn register_tree(&mut self, root: &NodeRef) -> NodeId {
        let id = self.register(root);
        for node in root.descendants() {
            self.register(&node);
        }
        id
    }

    fn select_from(&self, scope: &NodeRef, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let selectors = compile(selector)?;
        Ok(scope
            .descendants()
            .elements()
            .filter(|element| selectors.matches(element))
            .filter_map(|element| self.id_of(element.as_node()))
            .collect())
    }
}

impl Dom for ArenaDom {
    fn document(&self) -> NodeId {
        NodeId(0)
    }

    fn select_all(&self, selector: &str) -> Result<Vec<NodeId>, DomError> {
        self.select_from(self.node(self.document()), selector)
    }

    fn select_within(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, DomError> {
        self.select_from(self.node(scope), selector)
    }

    fn matches(&self, node: NodeId, selector: &str) -> Result<bool, DomError> {
        let selectors = compile(selector)?;
        Ok(self
            .node(node)
            .clone()
            .into_element_ref()
            .is_some_and(|element| selectors.matches(&element)))
    }

    fn create_element(&mut self, tag: &str) -> Result<NodeId, DomError> {
        let element = new_element(tag)?;
        element.detach();
        Ok(self.register(&element))
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.register(&NodeRef::new_text(text))
    }

    fn change_tag(&mut self, node: NodeId, tag: &str) -> Result<(), DomError> {
        let old = self.node(node).clone();
        let Some(element) = old.as_element() else {
            return Ok(());
        };
        let replacement = new_element(tag)?;
        if let Some(renamed) = replacement.as_element() {
            renamed.attributes.borrow_mut().map = element.attributes.borrow().map.clone();
        }
        for child in old.children().collect::<Vec<_>>() {
            replacement.append(child);
        }
        if old.parent().is_some() {
            old.insert_before(replacement.clone());
        } else {
            replacement.detach();
        }
        old.detach();

        self.ids.remove(&Rc::as_ptr(&old.0));
        self.ids.insert(Rc::as_ptr(&replacement.0), node);
        self.nodes[node.0] = replacement;
        Ok(())
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.node(node)
            .as_element()
            .map(|element| &*element.name.local)
    }

    fn text(&self, node: NodeId) -> Option<String> {
        self.node(node).as_text().map(|text| text.borrow().clone())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let element = self.node(node).as_element()?;
        let attributes = element.attributes.borrow();
        attributes
            .map
            .iter()
            .find(|(key, attribute)| is_named(key, attribute, name))
            .map(|(_, attribute)| attribute.value.clone())
    }

    fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        let Some(element) = self.node(node).as_element() else {
            return Vec::new();
        };
        let attributes = element.attributes.borrow();
        attributes
            .map
            .iter()
            .map(|(key, attribute)| (qualified_name(key, attribute), attribute.value.clone()))
            .collect()
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(element) = self.node(node).as_element() else {
            return;
        };
        let mut attributes = element.attributes.borrow_mut();
        let existing = attributes
            .map
            .iter_mut()
            .find(|(key, attribute)| is_named(key, attribute, name));
        match existing {
            Some((_, attribute)) => value.clone_into(&mut attribute.value),
            None => {
                attributes.insert(name, value.to_owned());
            }
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(element) = self.node(node).as_element() {
            element
                .attributes
                .borrow_mut()
                .map
                .retain(|key, attribute| !is_named(key, attribute, name));
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)
            .parent()
            .and_then(|parent| self.id_of(&parent))
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node)
            .children()
            .filter_map(|child| self.id_of(&child))
            .collect()
    }

    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node)
            .descendants()
            .filter_map(|descendant| self.id_of(&descendant))
            .collect()
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let child = self.node(child).clone();
        self.node(parent).append(child);
    }

    fn insert_before(&mut self, reference: NodeId, node: NodeId) -> Result<(), DomError> {
        let reference = self.node(reference);
        if reference.parent().is_none() {
            return Err(DomError::Detached);
        }
        reference.insert_before(self.node(node).clone());
        Ok(())
    }

    fn detach(&mut self, node: NodeId) {
        self.node(node).detach();
    }

    fn insert_html_at(
        &mut self,
        node: NodeId,
        position: InsertPosition,
        html: &str,
    ) -> Result<Vec<NodeId>, DomError> {
        let target = self.node(node).clone();
        let sibling = matches!(
            position,
            InsertPosition::BeforeBegin | InsertPosition::AfterEnd
        );
        if sibling && target.parent().is_none() {
            return Err(DomError::Detached);
        }

        let parsed = parse_fragment(html);
        match position {
            InsertPosition::BeforeBegin => {
                for new in &parsed {
                    target.insert_before(new.clone());
                }
            }
            InsertPosition::AfterEnd => {
                for new in parsed.iter().rev() {
                    target.insert_after(new.clone());
                }
            }
            InsertPosition::AfterBegin => match target.first_child() {
                Some(first) => {
                    for new in &parsed {
                        first.insert_before(new.clone());
                    }
                }
                None => {
                    for new in &parsed {
                        target.append(new.clone());
                    }
                }
            },
            InsertPosition::BeforeEnd => {
                for new in &parsed {
                    target.append(new.clone());
                }
            }
        }
        Ok(parsed.iter().map(|new| self.register_tree(new)).collect())
    }

    fn inner_html(&self, node: NodeId) -> String {
        let node = self.node(node);
        let raw = node
            .as_element()
            .is_some_and(|element| RAW_TEXT.contains(&&*element.name.local));
        node.children()
            .map(|child| match child.as_text() {
                Some(text) if raw => text.borrow().clone(),
                _ => child.to_string(),
            })
            .collect()
    }

    fn outer_html(&self, node: NodeId) -> String {
        self.node(node).to_string()
    }

    fn serialize(&self) -> String {
        self.node(self.document()).to_string()
    }
}

fn compile(selector: &str) -> Result<Selectors, DomError> {
    Selectors::compile(selector).map_err(|_| DomError::InvalidSelector {
        selector: selector.to_owned(),
        message: "unsupported or malformed selector".to_owned(),
    })
}

/// Parse `html` as `<template>` content, which accepts any element without
/// a context: list items, table rows, `<style>` and inline SVG alike.
fn parse_fragment(html: &str) -> Vec<NodeRef> {
    let document = kuchikiki::parse_html().one(format!("<template>{html}</template>"));
    document
        .descendants()
        .elements()
        .find(|element| &*element.name.local == "template")
        .and_then(|template| template.template_contents.clone())
        .map(|contents| contents.children().collect())
        .unwrap_or_default()
}

/// A parsed, still unattached element named `tag`.
fn new_element(tag: &str) -> Result<NodeRef, DomError> {
    let valid = tag.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !valid {
        return Err(DomError::InvalidTag(tag.to_owned()));
    }
    parse_fragment(&format!("<{tag}></{tag}>"))
        .into_iter()
        .find(|node| {
            node.as_element()
                .is_some_and(|element| (*element.name.local).eq_ignore_ascii_case(tag))
        })
        .ok_or_else(|| DomError::InvalidTag(tag.to_owned()))
}

fn is_named(key: &ExpandedName, attribute: &Attribute, name: &str) -> bool {
    match &attribute.prefix {
        Some(prefix) => {
            name.strip_prefix(&**prefix)
                .and_then(|rest| rest.strip_prefix(':'))
                == Some(&*key.local)
        }
        None => &*key.local == name,
    }
}

fn qualified_name(key: &ExpandedName, attribute: &Attribute) -> String {
    match &attribute.prefix {
        Some(prefix) => format!("{}:{}", &**prefix, &*key.local),
        None => key.local.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = "<!DOCTYPE html><html><head><title>T</title></head>\
        <body><div class=\"slides\"><section id=\"a\" class=\"one two\"><p>Hi</p></section>\
        <section id=\"b\"><ul><li>x<ul><li>y</li></ul></li></ul></section></div></body></html>";

    fn body_html(dom: &ArenaDom) -> String {
        dom.inner_html(dom.require("body").unwrap())
    }

    #[test]
    fn test_parse_and_serialize_round_trip() {
        let page = "<!DOCTYPE html><html><head><title>T</title></head>\
            <body><div class=\"slides\"><section id=\"b\"><ul><li>x<ul><li>y</li></ul></li></ul>\
            </section></div></body></html>";
        assert_eq!(ArenaDom::parse(page).serialize(), page);
    }

    #[test]
    fn test_missing_document_elements_are_added() {
        let dom = ArenaDom::parse("<p>x</p>");
        assert_eq!(
            dom.serialize(),
            "<html><head></head><body><p>x</p></body></html>"
        );
    }

    #[test]
    fn test_select_by_class_and_id() {
        let dom = ArenaDom::parse(PAGE);
        let first = dom.select_one("section.one.two").unwrap().unwrap();
        assert_eq!(dom.attribute(first, "id").as_deref(), Some("a"));
        assert_eq!(dom.select_all("#b li").unwrap().len(), 2);
        assert_eq!(dom.select_all("#b > ul > li").unwrap().len(), 1);
        assert_eq!(dom.select_all("section:not(.one)").unwrap().len(), 1);
        assert!(dom.select_one("section.three").unwrap().is_none());
    }

    #[test]
    fn test_invalid_selector_errors() {
        let dom = ArenaDom::parse(PAGE);
        assert!(matches!(
            dom.select_all("p["),
            Err(DomError::InvalidSelector { selector, .. }) if selector == "p["
        ));
    }

    #[test]
    fn test_require_missing_node_errors() {
        let dom = ArenaDom::parse(PAGE);
        assert!(matches!(dom.require("aside"), Err(DomError::MissingNode(s)) if s == "aside"));
    }

    #[test]
    fn test_change_tag_keeps_children_attributes_and_id() {
        let mut dom = ArenaDom::parse("<div class=\"notes\"><p>n</p></div>");
        let notes = dom.require(".notes").unwrap();
        dom.change_tag(notes, "aside").unwrap();
        assert_eq!(dom.tag_name(notes), Some("aside"));
        assert_eq!(dom.require("aside.notes").unwrap(), notes);
        assert_eq!(body_html(&dom), "<aside class=\"notes\"><p>n</p></aside>");
        assert!(matches!(
            dom.change_tag(notes, "a b"),
            Err(DomError::InvalidTag(tag)) if tag == "a b"
        ));
    }

    #[test]
    fn test_insert_html_positions() {
        let mut dom = ArenaDom::parse("<div><p>b</p></div>");
        let p = dom.require("p").unwrap();
        dom.insert_html_at(p, InsertPosition::BeforeBegin, "<i>0</i>").unwrap();
        dom.insert_html_at(p, InsertPosition::AfterBegin, "a").unwrap();
        dom.insert_html_at(p, InsertPosition::BeforeEnd, "c").unwrap();
        dom.insert_html_at(p, InsertPosition::AfterEnd, "<i>1</i>").unwrap();
        assert_eq!(body_html(&dom), "<div><i>0</i><p>abc</p><i>1</i></div>");
    }

    #[test]
    fn test_fragments_need_no_context() {
        let mut dom = ArenaDom::parse("<table><tbody></tbody></table><ul></ul>");
        let tbody = dom.require("tbody").unwrap();
        let rows = dom
            .insert_html_at(tbody, InsertPosition::BeforeEnd, "<tr><td>1</td></tr><tr><td>2</td></tr>")
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(dom.select_all("tbody > tr > td").unwrap().len(), 2);

        let list = dom.require("ul").unwrap();
        dom.insert_html_at(list, InsertPosition::BeforeEnd, "<li>x</li>").unwrap();
        assert_eq!(dom.select_all("ul > li").unwrap().len(), 1);
    }

    #[test]
    fn test_inline_svg_keeps_names() {
        let mut dom = ArenaDom::parse("<div></div>");
        let div = dom.require("div").unwrap();
        dom.insert_html_at(
            div,
            InsertPosition::BeforeEnd,
            "<svg viewBox='0 0 1 1'><foreignObject><p>a</p></foreignObject><use href=\"#icon-x\"/></svg>",
        )
        .unwrap();
        let svg = dom.require("div > svg").unwrap();
        assert_eq!(dom.attribute(svg, "viewBox").as_deref(), Some("0 0 1 1"));
        let label = dom.require("svg p").unwrap();
        let parent = dom.parent(label).unwrap();
        assert_eq!(dom.tag_name(parent), Some("foreignObject"));
        assert!(dom.select_one("use[href=\"#icon-x\"]").unwrap().is_some());
    }

    #[test]
    fn test_sibling_insert_on_detached_node_errors() {
        let mut dom = ArenaDom::parse("");
        let orphan = dom.create_element("div").unwrap();
        assert!(matches!(
            dom.insert_html_at(orphan, InsertPosition::AfterEnd, "x"),
            Err(DomError::Detached)
        ));
        assert!(matches!(
            dom.create_element("div onclick=x"),
            Err(DomError::InvalidTag(_))
        ));
    }

    #[test]
    fn test_move_nodes_under_new_wrapper() {
        let mut dom = ArenaDom::parse("<main><div id=\"x\"></div><div id=\"y\"></div></main>");
        let x = dom.require("#x").unwrap();
        let y = dom.require("#y").unwrap();
        let wrapper = dom.create_element("section").unwrap();
        dom.insert_before(x, wrapper).unwrap();
        dom.append_child(wrapper, x);
        dom.append_child(wrapper, y);
        assert_eq!(
            body_html(&dom),
            "<main><section><div id=\"x\"></div><div id=\"y\"></div></section></main>"
        );
        assert_eq!(dom.parent(x), Some(wrapper));
    }

    #[test]
    fn test_attributes() {
        let mut dom = ArenaDom::parse("<p title='say \"hi\"'>x</p>");
        let p = dom.require("p").unwrap();
        assert_eq!(dom.attribute(p, "title").as_deref(), Some("say \"hi\""));
        dom.set_attribute(p, "title", "a & b");
        dom.set_attribute(p, "data-n", "1");
        let mut attributes = dom.attributes(p);
        attributes.sort();
        assert_eq!(
            attributes,
            [
                ("data-n".to_owned(), "1".to_owned()),
                ("title".to_owned(), "a & b".to_owned())
            ]
        );
        dom.remove_attribute(p, "title");
        assert_eq!(body_html(&dom), "<p data-n=\"1\">x</p>");
    }

    #[test]
    fn test_classes() {
        let mut dom = ArenaDom::parse("<li>x</li>");
        let li = dom.require("li").unwrap();
        dom.add_class(li, "fragment");
        dom.add_class(li, "fragment");
        dom.add_class(li, "has-children");
        assert_eq!(
            dom.attribute(li, "class").as_deref(),
            Some("fragment has-children")
        );
        dom.remove_class(li, "fragment");
        assert!(!dom.has_class(li, "fragment"));
        assert!(dom.has_class(li, "has-children"));
    }

    #[test]
    fn test_text_is_escaped_and_markup_kept() {
        let mut dom = ArenaDom::parse("<pre><code></code></pre>");
        let code = dom.require("code").unwrap();
        dom.set_text(code, "<b>bold</b> & more");
        assert_eq!(dom.inner_html(code), "&lt;b&gt;bold&lt;/b&gt; &amp; more");
        dom.set_inner_html(code, "<b>bold</b> &amp; more").unwrap();
        assert_eq!(dom.inner_html(code), "<b>bold</b> &amp; more");
        assert_eq!(dom.text_content(code), "bold & more");
    }

    #[test]
    fn test_inline_script_is_guarded() {
        let mut dom = ArenaDom::parse("<html><head></head><body><p>x</p></body></html>");
        dom.insert_inline_script("var s = \"</script>\";", InsertPosition::AfterBegin)
            .unwrap();
        dom.insert_inline_style("a > b{color:red}", InsertPosition::BeforeEnd)
            .unwrap();
        assert_eq!(
            dom.serialize(),
            "<html><head><style>a > b{color:red}</style></head><body>\
             <script>var s = \"<\\/script>\";</script><p>x</p></body></html>"
        );
        let style = dom.require("style").unwrap();
        assert_eq!(dom.inner_html(style), "a > b{color:red}");
    }

    #[test]
    fn test_closest() {
        let dom = ArenaDom::parse("<aside class=\"notes\"><ul><li>n</li></ul></aside>");
        let li = dom.require("li").unwrap();
        assert!(dom.closest(li, "aside.notes").unwrap().is_some());
        assert!(dom.closest(li, "section").unwrap().is_none());
    }

    #[test]
    fn test_replace_with_html() {
        let mut dom =
            ArenaDom::parse("<p><img class=\"emoji-placeholder\" data-emoji=\"rocket\"> go</p>");
        let img = dom.require("img.emoji-placeholder").unwrap();
        dom.replace_with_html(img, "<span class=\"emoji emoji-rocket\"></span>")
            .unwrap();
        assert_eq!(
            body_html(&dom),
            "<p><span class=\"emoji emoji-rocket\"></span> go</p>"
        );
    }
}
