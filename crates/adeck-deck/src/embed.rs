//! Data URIs and CSS class names for inlined assets.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Characters escaped in SVG data URIs; everything else stays readable.
const SVG_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'\'')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// An asset file turned into something a stylesheet can reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddableImage {
    pub name: String,
    pub css_class: String,
    pub data_uri: String,
    pub mime: String,
    pub path: PathBuf,
}

impl EmbeddableImage {
    /// Read `path` and encode it.
    ///
    /// SVG roots lose their `width`/`height` so they scale with the element
    /// they decorate.
    pub fn load(path: &Path, css_class: String) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let mime = adeck_assets::mime_for(&path.to_string_lossy());
        let data_uri = if mime == "image/svg+xml" {
            let svg = String::from_utf8_lossy(&bytes);
            let svg = adeck_diagrams::svg::strip_root_dimensions(&svg)
                .map_err(std::io::Error::other)?;
            svg_data_uri(&svg)
        } else {
            base64_data_uri(&bytes, &mime)
        };
        Ok(Self {
            name: file_stem(path),
            css_class,
            data_uri,
            mime,
            path: path.to_path_buf(),
        })
    }

    pub fn is_svg(&self) -> bool {
        self.mime == "image/svg+xml"
    }

    /// PNG, JPEG, GIF or BMP; formats with a much smaller SVG or modern
    /// equivalent usually available.
    pub fn is_legacy_raster(&self) -> bool {
        matches!(
            self.mime.as_str(),
            "image/png" | "image/jpeg" | "image/gif" | "image/bmp"
        )
    }

    /// `.class{background-image:url("…")}`
    pub fn css_rule(&self) -> String {
        background_rule(&self.css_class, &self.data_uri)
    }
}

/// Percent-escaped `data:image/svg+xml` URI.
pub fn svg_data_uri(svg: &str) -> String {
    format!(
        "data:image/svg+xml,{}",
        utf8_percent_encode(svg.trim(), SVG_ENCODE_SET)
    )
}

/// Base64 data URI.
pub fn base64_data_uri(bytes: &[u8], mime: &str) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

pub fn background_rule(css_class: &str, data_uri: &str) -> String {
    format!(".{css_class}{{background-image:url(\"{data_uri}\")}}")
}

/// `prefix-` followed by `name` reduced to CSS-safe characters.
pub fn css_class_name(prefix: &str, name: &str) -> String {
    let mut class = format!("{prefix}-");
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            class.push(c.to_ascii_lowercase());
        } else {
            class.push('-');
        }
    }
    class
}

pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
