//! Syntax highlighting of code listings.

use syntect::highlighting::ThemeSet;
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::error::BuildError;

const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

/// Highlighted markup for the content of a `<code>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlighted {
    pub html: String,
    /// Classes to merge onto the `<code>` element.
    pub classes: Vec<String>,
}

/// Turns source code into highlighted HTML.
pub trait Highlighter: Send + Sync {
    /// Highlight `code` written in `language`.
    ///
    /// Unknown languages are highlighted as plain text.
    fn highlight(&self, code: &str, language: &str) -> Result<Highlighted, BuildError>;

    /// Stylesheet for the highlighter theme `theme`.
    fn stylesheet(&self, theme: &str) -> Result<String, BuildError>;
}

/// Class-based highlighting with `syntect`'s bundled syntaxes and themes.
pub struct SyntectHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }
}

impl SyntectHighlighter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, language: &str) -> Result<Highlighted, BuildError> {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(language)
            .or_else(|| self.syntax_set.find_syntax_by_extension(language))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, CLASS_STYLE);
        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|e| BuildError::Highlight(e.to_string()))?;
        }
        Ok(Highlighted {
            html: generator.finalize(),
            classes: vec!["hl-code".to_owned()],
        })
    }

    fn stylesheet(&self, theme: &str) -> Result<String, BuildError> {
        let theme = self
            .theme_set
            .themes
            .get(theme)
            .ok_or_else(|| BuildError::Highlight(format!("unknown highlight theme {theme}")))?;
        css_for_theme_with_class_style(theme, CLASS_STYLE)
            .map_err(|e| BuildError::Highlight(e.to_string()))
    }
}

/// Wrap every line of highlighted markup in `<span class="line">`.
///
/// Spans left open at the end of a line are closed there and reopened on
/// the next one, so each line is well-formed on its own.
pub fn wrap_lines(html: &str) -> String {
    let mut out = String::with_capacity(html.len() + html.len() / 4);
    let mut open: Vec<&str> = Vec::new();
    let text = html.strip_suffix('\n').unwrap_or(html);

    for line in text.split('\n') {
        out.push_str("<span class=\"line\">");
        for tag in &open {
            out.push_str(tag);
        }
        out.push_str(line);

        let mut rest = line;
        while let Some(start) = rest.find('<') {
            let tail = &rest[start..];
            let end = tail.find('>').map_or(tail.len(), |i| i + 1);
            let tag = &tail[..end];
            if tag.starts_with("</span") {
                open.pop();
            } else if tag.starts_with("<span") {
                open.push(tag);
            }
            rest = &tail[end..];
        }

        for _ in &open {
            out.push_str("</span>");
        }
        out.push_str("</span>\n");
    }
    out
}
