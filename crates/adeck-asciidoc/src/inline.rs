//! Inline substitutions: attribute references, macros, quotes, line breaks.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::{Captures, Regex};

use crate::ast::ImageRef;
use crate::extension::Registry;

static ATTRIBUTE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9_][A-Za-z0-9_-]*)\}").unwrap());
static PASSTHROUGH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+\+\+(.+?)\+\+\+|pass:\[((?:\\\]|[^\]])*)\]").unwrap());
static MACRO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([a-z][a-z0-9_-]*):([^\s\[\]]*)\[((?:\\\]|[^\]])*)\]").unwrap()
});
static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bhttps?://[^\s<>\[\]"]+[^\s<>\[\]".,;:!?)]"#).unwrap());
static STRONG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|[^\w*])\*(\S|\S.*?\S)\*($|[^\w*])").unwrap());
static EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|[^\w_])_(\S|\S.*?\S)_($|[^\w_])").unwrap());
static MONOSPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());
static MARK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|[^\w#])#(\S|\S.*?\S)#($|[^\w#])").unwrap());
static HARD_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" \+\n").unwrap());
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("\u{E000}(\\d+)\u{E001}").unwrap());

/// State shared by every inline conversion of one parse.
pub(crate) struct InlineContext<'r, 'a> {
    pub(crate) registry: &'r mut Registry<'a>,
    pub(crate) images: Vec<ImageRef>,
}

impl InlineContext<'_, '_> {
    /// Convert Asciidoc inline text to HTML.
    pub(crate) fn convert(&mut self, text: &str, attributes: &IndexMap<String, String>) -> String {
        let text = substitute_attributes(text, attributes);
        let mut stash: Vec<String> = Vec::new();

        let text = PASSTHROUGH.replace_all(&text, |caps: &Captures<'_>| {
            let raw = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map_or("", |m| m.as_str())
                .replace("\\]", "]");
            stash_html(&mut stash, raw)
        });

        let text = MACRO
            .replace_all(&text, |caps: &Captures<'_>| {
                let name = &caps[1];
                let target = &caps[2];
                let attrs = caps[3].replace("\\]", "]");
                match self.inline_macro(name, target, &attrs, attributes) {
                    Some(html) => stash_html(&mut stash, html),
                    None => caps[0].to_owned(),
                }
            })
            .into_owned();

        let text = BARE_URL.replace_all(&text, |caps: &Captures<'_>| {
            let url = &caps[0];
            stash_html(&mut stash, link(url, url))
        });

        let mut html = html_escape::encode_text(&text).into_owned();
        for _ in 0..2 {
            html = STRONG
                .replace_all(&html, "${1}<strong>${2}</strong>${3}")
                .into_owned();
            html = EMPHASIS.replace_all(&html, "${1}<em>${2}</em>${3}").into_owned();
            html = MARK.replace_all(&html, "${1}<mark>${2}</mark>${3}").into_owned();
        }
        html = MONOSPACE.replace_all(&html, "<code>${1}</code>").into_owned();
        html = HARD_BREAK.replace_all(&html, "<br>\n").into_owned();

        PLACEHOLDER
            .replace_all(&html, |caps: &Captures<'_>| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| stash.get(i).cloned())
                    .unwrap_or_default()
            })
            .into_owned()
    }

    fn inline_macro(
        &mut self,
        name: &str,
        target: &str,
        attrs: &str,
        attributes: &IndexMap<String, String>,
    ) -> Option<String> {
        if self.registry.handles_inline(name) {
            return self.registry.process_inline(name, target, attrs);
        }
        match name {
            "image" => Some(self.inline_image(target, attrs, attributes)),
            "http" | "https" | "mailto" => {
                let url = format!("{name}:{target}");
                let label = if attrs.is_empty() { url.as_str() } else { attrs };
                Some(link(&url, label))
            }
            "link" => {
                let label = if attrs.is_empty() { target } else { attrs };
                Some(link(target, label))
            }
            "kbd" => Some(format!(
                "<kbd>{}</kbd>",
                html_escape::encode_text(attrs.trim())
            )),
            _ => None,
        }
    }

    fn inline_image(
        &mut self,
        target: &str,
        attrs: &str,
        attributes: &IndexMap<String, String>,
    ) -> String {
        let image = self.register_image(target, attrs, attributes);
        format!(
            "<span class=\"image\"><img src=\"{}\" alt=\"{}\" data-image-index=\"{}\"></span>",
            html_escape::encode_double_quoted_attribute(&image.target),
            html_escape::encode_double_quoted_attribute(&image.alt),
            image.index
        )
    }

    /// Record an image reference and return it.
    pub(crate) fn register_image(
        &mut self,
        target: &str,
        attrs: &str,
        attributes: &IndexMap<String, String>,
    ) -> ImageRef {
        let mut positional = attrs.split(',').map(str::trim);
        let alt = positional
            .next()
            .filter(|alt| !alt.is_empty())
            .map_or_else(|| default_alt(target), str::to_owned);
        let width = positional.next().filter(|w| !w.is_empty()).map(str::to_owned);
        let height = positional.next().filter(|h| !h.is_empty()).map(str::to_owned);

        let image = ImageRef {
            index: self.images.len(),
            target: target.to_owned(),
            images_dir: attributes.get("imagesdir").cloned(),
            alt,
            width,
            height,
        };
        self.images.push(image.clone());
        image
    }
}

/// Replace `{name}` references with document attribute values.
fn substitute_attributes(text: &str, attributes: &IndexMap<String, String>) -> String {
    ATTRIBUTE_REF
        .replace_all(text, |caps: &Captures<'_>| {
            let name = &caps[1];
            match name {
                "nbsp" => "\u{a0}".to_owned(),
                "sp" => " ".to_owned(),
                "empty" => String::new(),
                "amp" => "&".to_owned(),
                _ => attributes
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_owned()),
            }
        })
        .into_owned()
}

fn stash_html(stash: &mut Vec<String>, html: String) -> String {
    stash.push(html);
    format!("\u{E000}{}\u{E001}", stash.len() - 1)
}

fn link(url: &str, label: &str) -> String {
    format!(
        "<a href=\"{}\">{}</a>",
        html_escape::encode_double_quoted_attribute(url),
        html_escape::encode_text(label)
    )
}

fn default_alt(target: &str) -> String {
    let file = target.rsplit('/').next().unwrap_or(target);
    let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);
    stem.replace(['-', '_'], " ")
}
