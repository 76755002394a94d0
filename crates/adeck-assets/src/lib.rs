//! Assets bundled into every deck.
//!
//! All files under `assets/` are compiled into the binary with `rust-embed`:
//!
//! - `runtime/`: slide runtime stylesheet and script
//! - `layouts/`: one stylesheet per layout class
//! - `theme/`: base stylesheet and the per-variant palette templates
//! - `diagrams/`: per-diagram-type stylesheets, one per variant
//! - `highlight/`: highlighter plugin stylesheets
//! - `scripts/`: live reload client and theme toggle
//! - `images/`: fallback graphics

use std::borrow::Cow;

#[derive(rust_embed::RustEmbed)]
#[folder = "assets"]
struct Assets;

/// Layout classes with a bundled stylesheet.
pub const LAYOUTS: [&str; 3] = ["columns", "center", "split"];

/// Get an asset by path (relative to `assets/`).
pub fn get(path: &str) -> Option<Cow<'static, [u8]>> {
    Assets::get(path).map(|f| f.data)
}

/// Get a UTF-8 asset by path.
pub fn text(path: &str) -> Option<Cow<'static, str>> {
    match get(path)? {
        Cow::Borrowed(bytes) => std::str::from_utf8(bytes).ok().map(Cow::Borrowed),
        Cow::Owned(bytes) => String::from_utf8(bytes).ok().map(Cow::Owned),
    }
}

/// Iterate all bundled asset paths.
pub fn iter() -> impl Iterator<Item = Cow<'static, str>> {
    Assets::iter()
}

fn required(path: &str) -> Cow<'static, str> {
    text(path).unwrap_or_default()
}

/// Slide runtime stylesheet.
pub fn runtime_css() -> Cow<'static, str> {
    required("runtime/deck.css")
}

/// Slide runtime script.
pub fn runtime_js() -> Cow<'static, str> {
    required("runtime/deck.js")
}

/// Stylesheet of a layout class, if one is bundled.
pub fn layout_css(layout: &str) -> Option<Cow<'static, str>> {
    text(&format!("layouts/{layout}.css"))
}

/// Theme rules shared by every palette.
pub fn theme_base_css() -> Cow<'static, str> {
    required("theme/base.css")
}

/// Palette declarations template for a variant (`dark` or `light`).
///
/// Placeholders: `{{lightness}}`, `{{chroma}}`, `{{hue}}`.
pub fn palette_template(variant: &str) -> Option<Cow<'static, str>> {
    text(&format!("theme/{variant}.css"))
}

/// Stylesheet for one diagram type in one variant.
pub fn diagram_css(diagram_type: &str, variant: &str) -> Option<Cow<'static, str>> {
    text(&format!("diagrams/{diagram_type}-{variant}.css"))
}

/// Line numbering rules for highlighted listings.
pub fn line_numbers_css() -> Cow<'static, str> {
    required("highlight/line-numbers.css")
}

/// Live reload client template.
///
/// Placeholders: `{{hash}}`, `{{port}}`.
pub fn live_reload_js() -> Cow<'static, str> {
    required("scripts/live-reload.js")
}

/// Theme toggle script for manual switching.
pub fn theme_toggle_js() -> Cow<'static, str> {
    required("scripts/theme-toggle.js")
}

/// Graphic shown in place of a diagram that failed to render.
pub fn error_svg() -> Cow<'static, str> {
    required("images/error.svg")
}

/// Return the MIME type string for the given file path.
pub fn mime_for(path: &str) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_owned()
}
