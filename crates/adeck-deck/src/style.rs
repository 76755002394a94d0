//! Theme stylesheet compilation.

use adeck_config::{DeckConfiguration, ThemeColor, ThemeSwitchingMode, ThemeVariant};

use crate::css;
use crate::error::BuildError;

/// Inputs of a theme stylesheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeRequest<'a> {
    pub theme_name: &'a str,
    pub mode: ThemeSwitchingMode,
    pub starting: ThemeVariant,
    pub color: ThemeColor,
}

impl<'a> ThemeRequest<'a> {
    pub fn from_configuration(configuration: &'a DeckConfiguration) -> Self {
        Self {
            theme_name: &configuration.theme_name,
            mode: configuration.theme_switching_mode,
            starting: configuration.starting_theme,
            color: configuration.theme_color,
        }
    }

    /// File name in the `themes` cache bucket.
    pub fn cache_key(&self) -> String {
        format!(
            "{}-{}-{}-{}.css",
            self.theme_name, self.color.lightness, self.color.chroma, self.color.hue
        )
    }
}

/// Produces the deck's base theme stylesheet.
pub trait StyleCompiler: Send + Sync {
    fn compile(&self, request: &ThemeRequest<'_>) -> Result<String, BuildError>;
}

/// Fills the bundled palette templates with the theme colour.
///
/// Palette variables land on `:root` for the starting variant; the other
/// variant overrides them on `body.theme-*` (manual switching) or inside a
/// `prefers-color-scheme` query (automatic switching). The shared rules of
/// `theme/base.css` follow.
#[derive(Debug, Default)]
pub struct PaletteCompiler;

impl PaletteCompiler {
    fn declarations(variant: ThemeVariant, color: ThemeColor) -> Result<String, BuildError> {
        let template = adeck_assets::palette_template(variant.as_str()).ok_or_else(|| {
            BuildError::Style(format!("no palette template for {variant}"))
        })?;
        Ok(template
            .replace("{{lightness}}", &color.lightness.to_string())
            .replace("{{chroma}}", &color.chroma.to_string())
            .replace("{{hue}}", &color.hue.to_string()))
    }
}

impl StyleCompiler for PaletteCompiler {
    fn compile(&self, request: &ThemeRequest<'_>) -> Result<String, BuildError> {
        let starting = request.starting;
        let other = starting.opposite();
        let starting_palette = Self::declarations(starting, request.color)?;

        let mut out = match request.mode {
            ThemeSwitchingMode::None => format!(":root{{{starting_palette}}}"),
            ThemeSwitchingMode::Manual => format!(
                ":root,{}{{{starting_palette}}}{}{{{}}}",
                css::body_scope(starting),
                css::body_scope(other),
                Self::declarations(other, request.color)?
            ),
            ThemeSwitchingMode::Auto => format!(
                ":root{{{starting_palette}}}{}",
                css::media(
                    &format!(":root{{{}}}", Self::declarations(other, request.color)?),
                    &css::prefers(other)
                )
            ),
        };
        out.push('\n');
        out.push_str(&adeck_assets::theme_base_css());
        Ok(out)
    }
}
