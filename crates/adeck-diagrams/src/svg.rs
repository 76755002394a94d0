//! SVG rewriting.
//!
//! Markup is streamed through a `quick-xml` reader. Events that are not
//! edited are copied from the source unchanged; an edited start tag is
//! written back from its parsed attributes, double-quoted.

use std::borrow::Cow;
use std::sync::LazyLock;

use quick_xml::escape::{escape, unescape};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;
use regex::{Captures, Regex};

use crate::error::SvgError;

static USE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[use:([A-Za-z0-9_-]+)\]\]").unwrap());
static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([0-9]+(?:\.[0-9]+)?)\s*(?:px)?\s*$").unwrap());

/// HTML elements without end tags, found in `<foreignObject>` labels.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Root attributes a sprite symbol must not carry.
const SYMBOL_DROPPED: &[&str] = &[
    "width",
    "height",
    "id",
    "class",
    "xmlns",
    "xmlns:xlink",
    "version",
];

/// Post-process a rendered diagram before embedding.
///
/// - tags the root with `graph-<type>`
/// - removes embedded `<style>` elements, styling is injected once per type
/// - makes arrow-head markers follow the stroke colour of their line
/// - turns `[[use:name]]` placeholders into references to the icon sprite
pub fn post_process(svg: &str, diagram_type: &str) -> Result<String, SvgError> {
    let class = format!("graph-{diagram_type}");
    let svg = rewrite(svg, Scope::Tree, |tag, ancestors| {
        let name = tag.name.clone();
        match name.as_str() {
            "style" => return Ok(Action::Drop),
            "path" | "polygon" | "circle" if ancestors.iter().any(|a| a == "marker") => {
                let style = match tag.get("style") {
                    Some(existing) => format!("fill: context-stroke; {existing}"),
                    None => "fill: context-stroke".to_owned(),
                };
                tag.set("style", &style);
            }
            _ => {}
        }
        if ancestors.is_empty() {
            tag.add_class(&class);
        }
        Ok(Action::Keep)
    })?;
    Ok(resolve_use_placeholders(&svg))
}

/// Append a class to the root `<svg>` element.
pub fn add_root_class(svg: &str, class: &str) -> Result<String, SvgError> {
    rewrite(svg, Scope::Root, |tag, _| {
        tag.add_class(class);
        Ok(Action::Keep)
    })
}

/// Value of an attribute on the root `<svg>` element.
pub fn root_attribute(svg: &str, name: &str) -> Result<Option<String>, SvgError> {
    let mut value = None;
    rewrite(svg, Scope::Root, |tag, _| {
        value = tag.get(name);
        Ok(Action::Keep)
    })?;
    Ok(value)
}

/// Remove an attribute from the root `<svg>` element.
pub fn remove_root_attribute(svg: &str, name: &str) -> Result<String, SvgError> {
    rewrite(svg, Scope::Root, |tag, _| {
        tag.remove(name);
        Ok(Action::Keep)
    })
}

/// Remove `width` and `height` from the root `<svg>` element.
pub fn strip_root_dimensions(svg: &str) -> Result<String, SvgError> {
    rewrite(svg, Scope::Root, |tag, _| {
        tag.remove("width");
        tag.remove("height");
        Ok(Action::Keep)
    })
}

/// Make sure the root has a `viewBox`, deriving it from `width`/`height`.
///
/// Fails with [`SvgError::NoSize`] when there is neither a `viewBox` nor
/// numeric dimensions.
pub fn ensure_view_box(svg: &str) -> Result<String, SvgError> {
    rewrite(svg, Scope::Root, |tag, _| {
        derive_view_box(tag)?;
        Ok(Action::Keep)
    })
}

/// Turn a standalone icon file into a sprite `<symbol>` with the given id.
///
/// The prolog and comments outside the root are dropped, the root keeps a
/// `viewBox` but loses its size and identity attributes.
pub fn into_symbol(svg: &str, id: &str) -> Result<String, SvgError> {
    let svg = strip_prolog(svg)?;
    rewrite(svg.trim(), Scope::Root, |tag, _| {
        derive_view_box(tag)?;
        for name in SYMBOL_DROPPED {
            tag.remove(name);
        }
        tag.set("id", id);
        tag.rename("symbol");
        Ok(Action::Keep)
    })
}

/// Replace `[[use:name]]` with an inline reference to `#icon-name`.
#[must_use]
pub fn resolve_use_placeholders(svg: &str) -> String {
    USE_PLACEHOLDER
        .replace_all(svg, |caps: &Captures<'_>| {
            let name = &caps[1];
            format!("<svg class=\"icon icon-{name}\"><use href=\"#icon-{name}\"></use></svg>")
        })
        .into_owned()
}

fn derive_view_box(tag: &mut Tag) -> Result<(), SvgError> {
    if tag.get("viewBox").is_some() {
        return Ok(());
    }
    let width = tag.get("width").and_then(|w| parse_length(&w));
    let height = tag.get("height").and_then(|h| parse_length(&h));
    let (Some(width), Some(height)) = (width, height) else {
        return Err(SvgError::NoSize);
    };
    tag.set("viewBox", &format!("0 0 {width} {height}"));
    Ok(())
}

fn parse_length(value: &str) -> Option<String> {
    NUMBER.captures(value).map(|caps| caps[1].to_owned())
}

/// Which start tags [`rewrite`] hands to its edit function.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Scope {
    Root,
    Tree,
}

enum Action {
    Keep,
    /// Remove the element and everything inside it.
    Drop,
}

/// A start tag open for editing. Attribute values are kept escaped.
struct Tag {
    name: String,
    attributes: Vec<(String, String)>,
    changed: bool,
}

impl Tag {
    fn read(start: &BytesStart<'_>) -> Result<Self, SvgError> {
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute?;
            attributes.push((attribute.key.0.to_owned(), attribute.value.into_owned()));
        }
        Ok(Self {
            name: start.name().0.to_owned(),
            attributes,
            changed: false,
        })
    }

    fn get(&self, name: &str) -> Option<String> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, raw)| unescape(raw).map_or_else(|_| raw.clone(), Cow::into_owned))
    }

    fn set(&mut self, name: &str, value: &str) {
        let raw = escape(value).into_owned();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, slot)) => *slot = raw,
            None => self.attributes.push((name.to_owned(), raw)),
        }
        self.changed = true;
    }

    fn remove(&mut self, name: &str) {
        let before = self.attributes.len();
        self.attributes.retain(|(key, _)| key != name);
        self.changed |= self.attributes.len() != before;
    }

    fn rename(&mut self, name: &str) {
        name.clone_into(&mut self.name);
        self.changed = true;
    }

    fn add_class(&mut self, class: &str) {
        match self.get("class") {
            Some(existing) if existing.split_whitespace().any(|c| c == class) => {}
            Some(existing) if !existing.trim().is_empty() => {
                self.set("class", &format!("{} {class}", existing.trim_end()));
            }
            _ => self.set("class", class),
        }
    }

    fn to_start(&self) -> BytesStart<'_> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, raw) in &self.attributes {
            // Single-quoted source values may hold a bare `"`.
            start.push_attribute(Attribute {
                key: QName(key.as_str()),
                value: Cow::Owned(raw.replace('"', "&quot;")),
            });
        }
        start
    }
}

/// Stream `svg` and let `edit` change or drop start tags.
///
/// `edit` also receives the names of the open ancestors, empty for the
/// root. Fails with [`SvgError::NotSvg`] unless the first element is an
/// `<svg>`.
fn rewrite<F>(svg: &str, scope: Scope, mut edit: F) -> Result<String, SvgError>
where
    F: FnMut(&mut Tag, &[String]) -> Result<Action, SvgError>,
{
    let mut reader = Reader::from_str(svg);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.allow_dangling_amp = true;

    let mut writer = Writer::new(Vec::with_capacity(svg.len()));
    let mut open: Vec<String> = Vec::new();
    // Depth of the element being dropped, if any.
    let mut dropping: Option<usize> = None;
    let mut seen_root = false;

    loop {
        let from = offset(&reader, svg);
        let event = reader.read_event()?;
        let source = &svg[from..offset(&reader, svg)];
        match &event {
            Event::Eof => break,
            Event::Start(start) | Event::Empty(start) => {
                let empty = matches!(event, Event::Empty(_));
                let name = start.name().0.to_owned();
                let container = !empty && !VOID_ELEMENTS.contains(&name.as_str());
                let is_root = !seen_root;
                if is_root && name.rsplit(':').next() != Some("svg") {
                    return Err(SvgError::NotSvg);
                }
                seen_root = true;

                if dropping.is_some() || (scope == Scope::Root && !is_root) {
                    if dropping.is_none() {
                        writer.get_mut().extend_from_slice(source.as_bytes());
                    }
                    if container {
                        open.push(name);
                    }
                    continue;
                }

                let mut tag = Tag::read(start)?;
                match edit(&mut tag, open.as_slice())? {
                    Action::Drop => {
                        if container {
                            dropping = Some(open.len());
                        }
                    }
                    Action::Keep if tag.changed => {
                        let start = tag.to_start();
                        if empty {
                            writer.write_event(Event::Empty(start))?;
                        } else {
                            writer.write_event(Event::Start(start))?;
                        }
                    }
                    Action::Keep => writer.get_mut().extend_from_slice(source.as_bytes()),
                }
                if container {
                    open.push(tag.name);
                }
            }
            Event::End(end) => {
                let Some(name) = open.pop() else {
                    writer.get_mut().extend_from_slice(source.as_bytes());
                    continue;
                };
                match dropping {
                    Some(depth) if depth == open.len() => dropping = None,
                    Some(_) => {}
                    None if name == end.name().0 => {
                        writer.get_mut().extend_from_slice(source.as_bytes());
                    }
                    None => {
                        let out = writer.get_mut();
                        out.extend_from_slice(b"</");
                        out.extend_from_slice(name.as_bytes());
                        out.push(b'>');
                    }
                }
            }
            _ => {
                if dropping.is_none() {
                    writer.get_mut().extend_from_slice(source.as_bytes());
                }
            }
        }
    }

    if !seen_root {
        return Err(SvgError::NotSvg);
    }
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

/// Drop the XML declaration, doctype, processing instructions and comments
/// outside the root element.
fn strip_prolog(svg: &str) -> Result<String, SvgError> {
    let mut reader = Reader::from_str(svg);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.allow_dangling_amp = true;

    let mut out = String::with_capacity(svg.len());
    let mut depth = 0usize;
    loop {
        let from = offset(&reader, svg);
        let event = reader.read_event()?;
        let source = &svg[from..offset(&reader, svg)];
        match event {
            Event::Eof => break,
            Event::Decl(_) | Event::DocType(_) | Event::PI(_) | Event::Comment(_)
                if depth == 0 => {}
            Event::Start(start) => {
                if !VOID_ELEMENTS.contains(&start.name().0) {
                    depth += 1;
                }
                out.push_str(source);
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                out.push_str(source);
            }
            _ => out.push_str(source),
        }
    }
    Ok(out)
}

fn offset(reader: &Reader<&[u8]>, svg: &str) -> usize {
    usize::try_from(reader.buffer_position()).map_or(svg.len(), |at| at.min(svg.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_add_root_class() {
        assert_eq!(
            add_root_class("<svg id=\"a\"><g/></svg>", "graph-flowchart").unwrap(),
            "<svg id=\"a\" class=\"graph-flowchart\"><g/></svg>"
        );
        assert_eq!(
            add_root_class("<svg class=\"x\"></svg>", "graph-pie").unwrap(),
            "<svg class=\"x graph-pie\"></svg>"
        );
        assert_eq!(
            add_root_class("<svg class=\"graph-pie\"></svg>", "graph-pie").unwrap(),
            "<svg class=\"graph-pie\"></svg>"
        );
    }

    #[test]
    fn test_post_process() {
        let svg = "<?xml version=\"1.0\"?><svg viewBox=\"0 0 10 10\"><style>.a{fill:red}</style>\
                   <defs><marker id=\"arrow\"><path d=\"M0 0\"/></marker></defs>\
                   <text>[[use:server]]</text><path d=\"M1 1\"/></svg>";
        assert_eq!(
            post_process(svg, "flowchart").unwrap(),
            "<?xml version=\"1.0\"?><svg viewBox=\"0 0 10 10\" class=\"graph-flowchart\">\
             <defs><marker id=\"arrow\"><path d=\"M0 0\" style=\"fill: context-stroke\"/></marker></defs>\
             <text><svg class=\"icon icon-server\"><use href=\"#icon-server\"></use></svg></text>\
             <path d=\"M1 1\"/></svg>"
        );
    }

    #[test]
    fn test_arrowhead_with_existing_style() {
        let svg = "<svg><marker><path style=\"stroke: red\"></path></marker></svg>";
        assert_eq!(
            post_process(svg, "x").unwrap(),
            "<svg class=\"graph-x\"><marker><path style=\"fill: context-stroke; stroke: red\"></path></marker></svg>"
        );
    }

    #[test]
    fn test_post_process_single_quotes_and_html_labels() {
        let svg = "<svg class='flow' viewBox='0 0 4 4'><style type='text/css'>a{}</style>\
                   <marker id='m'><polygon points='0,0 1,1' style='stroke: \"x\"'/></marker>\
                   <foreignObject><div>a<br>b &amp; c</div></foreignObject></svg>";
        assert_eq!(
            post_process(svg, "flowchart").unwrap(),
            "<svg class=\"flow graph-flowchart\" viewBox=\"0 0 4 4\">\
             <marker id='m'><polygon points=\"0,0 1,1\" style=\"fill: context-stroke; stroke: &quot;x&quot;\"/></marker>\
             <foreignObject><div>a<br>b &amp; c</div></foreignObject></svg>"
        );
    }

    #[test]
    fn test_view_box_from_dimensions() {
        let svg = ensure_view_box("<svg width=\"24px\" height=\"16\"><g/></svg>").unwrap();
        assert_eq!(
            strip_root_dimensions(&svg).unwrap(),
            "<svg viewBox=\"0 0 24 16\"><g/></svg>"
        );
    }

    #[test]
    fn test_view_box_from_spaced_and_single_quoted_dimensions() {
        let svg = ensure_view_box("<svg width = \"24\" height='12.5px'><g/></svg>").unwrap();
        assert_eq!(
            root_attribute(&svg, "viewBox").unwrap().as_deref(),
            Some("0 0 24 12.5")
        );
        assert_eq!(
            strip_root_dimensions(&svg).unwrap(),
            "<svg viewBox=\"0 0 24 12.5\"><g/></svg>"
        );
    }

    #[test]
    fn test_view_box_kept() {
        let svg = "<svg viewBox=\"0 0 5 5\" width=\"100%\"></svg>";
        assert_eq!(ensure_view_box(svg).unwrap(), svg);
        assert_eq!(
            strip_root_dimensions(svg).unwrap(),
            "<svg viewBox=\"0 0 5 5\"></svg>"
        );
    }

    #[test]
    fn test_view_box_missing() {
        assert!(matches!(
            ensure_view_box("<svg><g/></svg>"),
            Err(SvgError::NoSize)
        ));
        assert!(matches!(
            ensure_view_box("<svg width=\"100%\" height=\"2em\"></svg>"),
            Err(SvgError::NoSize)
        ));
    }

    #[test]
    fn test_not_svg() {
        assert!(matches!(add_root_class("<html></html>", "x"), Err(SvgError::NotSvg)));
        assert!(matches!(add_root_class("just text", "x"), Err(SvgError::NotSvg)));
    }

    #[test]
    fn test_remove_root_attribute() {
        let svg = "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"x\" id=\"a\"><g id=\"b\"/></svg>";
        let svg = remove_root_attribute(svg, "xmlns").unwrap();
        assert_eq!(
            remove_root_attribute(&svg, "id").unwrap(),
            "<svg xmlns:xlink=\"x\"><g id=\"b\"/></svg>"
        );
    }

    #[test]
    fn test_root_attribute() {
        let svg = "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 1 1\"><svg width=\"3\"/></svg>";
        assert_eq!(
            root_attribute(svg, "viewBox").unwrap().as_deref(),
            Some("0 0 1 1")
        );
        assert_eq!(root_attribute(svg, "width").unwrap(), None);
    }

    #[test]
    fn test_into_symbol() {
        let source = "<?xml version=\"1.0\"?>\n<!-- icon -->\n<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"24\" height=\"24\"><path d=\"M0 0\"/></svg>\n";
        assert_eq!(
            into_symbol(source, "icon-server").unwrap(),
            "<symbol viewBox=\"0 0 24 24\" id=\"icon-server\"><path d=\"M0 0\"/></symbol>"
        );
    }

    #[test]
    fn test_into_symbol_single_quotes() {
        let source = "<svg xmlns='http://www.w3.org/2000/svg' id='old' width = '16' height='16'>\
                      <g><path d='M0 0'/></g></svg>";
        assert_eq!(
            into_symbol(source, "icon-cloud").unwrap(),
            "<symbol viewBox=\"0 0 16 16\" id=\"icon-cloud\"><g><path d='M0 0'/></g></symbol>"
        );
        assert!(matches!(
            into_symbol("<svg><path/></svg>", "icon-x"),
            Err(SvgError::NoSize)
        ));
    }
}
