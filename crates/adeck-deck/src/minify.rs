//! Output minification.

use std::sync::LazyLock;

use adeck_dom::{ArenaDom, Dom};
use regex::Regex;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Elements whose text is whitespace-sensitive.
const PREFORMATTED: &str = "pre, code, textarea";

/// Elements where whitespace-only text between children never renders.
const BLOCK_CONTAINERS: [&str; 11] = [
    "html", "head", "body", "ul", "ol", "table", "thead", "tbody", "tfoot", "tr", "section",
];

/// Shrinks serialized HTML.
pub trait Minifier: Send + Sync {
    fn minify(&self, html: &str) -> String;
}

/// Collapses insignificant whitespace and minifies inline stylesheets.
///
/// Text inside `pre`, `code`, `textarea` and `script` is left untouched.
#[derive(Debug, Default)]
pub struct HtmlMinifier;

impl Minifier for HtmlMinifier {
    fn minify(&self, html: &str) -> String {
        let mut dom = ArenaDom::parse(html);
        let root = dom.document();

        for node in dom.descendants(root) {
            let Some(text) = dom.text(node) else {
                continue;
            };
            let parent_tag = dom
                .parent(node)
                .and_then(|parent| dom.tag_name(parent))
                .map(str::to_ascii_lowercase);
            let replacement = match parent_tag.as_deref() {
                Some("script") => continue,
                Some("style") => minify_css(&text),
                parent => {
                    if dom.closest(node, PREFORMATTED).ok().flatten().is_some() {
                        continue;
                    }
                    let collapsed = WHITESPACE.replace_all(&text, " ");
                    if collapsed == " " && parent.is_some_and(|p| BLOCK_CONTAINERS.contains(&p)) {
                        dom.detach(node);
                        continue;
                    }
                    collapsed.into_owned()
                }
            };
            if replacement != text {
                let new_node = dom.create_text(&replacement);
                if dom.insert_before(node, new_node).is_ok() {
                    dom.detach(node);
                }
            }
        }

        dom.serialize()
    }
}

fn minify_css(css: &str) -> String {
    match minifier::css::minify(css) {
        Ok(minified) => minified.to_string(),
        Err(e) => {
            tracing::debug!(error = %e, "Keeping stylesheet unminified");
            css.to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_collapses_whitespace() {
        let html = "<html>\n  <head>\n    <title>T</title>\n  </head>\n  <body>\n    <p>a   <b>b</b>\n  c</p>\n  </body>\n</html>";
        assert_eq!(
            HtmlMinifier.minify(html),
            "<html><head><title>T</title></head><body><p>a <b>b</b> c</p></body></html>"
        );
    }

    #[test]
    fn test_keeps_preformatted_text() {
        let body = "<body><pre><code>fn main() {\n    x\n}</code></pre><script>let  a = 1;\n</script></body>";
        assert_eq!(
            HtmlMinifier.minify(body),
            format!("<html><head></head>{body}</html>")
        );
    }

    #[test]
    fn test_minifies_styles() {
        let html = "<head><style>\n.a {\n  color: red;\n}\n</style></head>";
        let minified = HtmlMinifier.minify(html);
        assert!(minified.starts_with("<html><head><style>.a{color:red"));
        assert!(!minified.contains('\n'));
    }
}
