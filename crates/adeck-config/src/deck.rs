//! Typed deck configuration produced by option resolution.

use std::fmt;
use std::path::PathBuf;

/// Every theme name accepted by the `theme` option.
pub const THEME_NAMES: [&str; 6] = [
    "dark",
    "light",
    "dark-manual",
    "light-manual",
    "dark-auto",
    "light-auto",
];

/// Highlighter themes bundled with the syntax highlighter.
pub const HIGHLIGHT_THEMES: [&str; 7] = [
    "base16-ocean.dark",
    "base16-eighties.dark",
    "base16-mocha.dark",
    "base16-ocean.light",
    "InspiredGitHub",
    "Solarized (dark)",
    "Solarized (light)",
];

/// One of the two colour schemes a deck can be displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeVariant {
    Dark,
    Light,
}

impl ThemeVariant {
    /// The other variant.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Lowercase name, also used as the `<body>` class in manual mode.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

impl fmt::Display for ThemeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the audience can switch between dark and light variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeSwitchingMode {
    /// Only the starting variant is shipped.
    None,
    /// A toggle script switches a class on `<body>`.
    Manual,
    /// The variant follows `prefers-color-scheme`.
    Auto,
}

impl ThemeSwitchingMode {
    /// Derive the mode from a validated theme name.
    #[must_use]
    pub fn from_theme_name(name: &str) -> Self {
        if name.ends_with("-manual") {
            Self::Manual
        } else if name.ends_with("-auto") {
            Self::Auto
        } else {
            Self::None
        }
    }
}

/// Named chroma presets for the `theme-chroma` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromaLevel {
    None,
    Low,
    Medium,
    High,
}

impl ChromaLevel {
    pub const NAMES: [&'static str; 4] = ["none", "low", "medium", "high"];

    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "none" => Some(Self::None),
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// OKLCH chroma value of this preset.
    #[must_use]
    pub fn chroma(self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Low => 0.04,
            Self::Medium => 0.1,
            Self::High => 0.18,
        }
    }
}

/// An OKLCH accent colour: lightness in percent, chroma, hue in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeColor {
    pub lightness: f64,
    pub chroma: f64,
    pub hue: f64,
}

impl ThemeColor {
    pub const DEFAULT_LIGHTNESS: f64 = 65.0;
}

impl fmt::Display for ThemeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lightness, self.chroma, self.hue)
    }
}

/// Validated options of one deck.
///
/// Built by [`crate::resolve`]; never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckConfiguration {
    /// Folder that the other path options are relative to.
    pub assets_path: PathBuf,
    pub custom_js: Option<PathBuf>,
    pub custom_css: Option<PathBuf>,
    pub favicon: Option<PathBuf>,
    pub svg_icons_folder: Option<PathBuf>,
    /// Overrides the document title in `<title>`.
    pub page_title: Option<String>,
    pub fragment_lists: bool,
    pub fragment_tables: bool,
    pub theme_name: String,
    pub theme_hue: f64,
    pub theme_chroma: ChromaLevel,
    pub theme_color: ThemeColor,
    pub highlight_theme_dark: String,
    pub highlight_theme_light: String,
    pub starting_theme: ThemeVariant,
    pub non_starting_theme: ThemeVariant,
    pub theme_switching_mode: ThemeSwitchingMode,
}

impl DeckConfiguration {
    /// Highlighter theme for `variant`.
    #[must_use]
    pub fn highlight_theme(&self, variant: ThemeVariant) -> &str {
        match variant {
            ThemeVariant::Dark => &self.highlight_theme_dark,
            ThemeVariant::Light => &self.highlight_theme_light,
        }
    }

    /// Variants whose stylesheets must be shipped in the deck.
    #[must_use]
    pub fn shipped_variants(&self) -> Vec<ThemeVariant> {
        match self.theme_switching_mode {
            ThemeSwitchingMode::None => vec![self.starting_theme],
            ThemeSwitchingMode::Manual | ThemeSwitchingMode::Auto => {
                vec![self.starting_theme, self.non_starting_theme]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switching_mode_from_suffix() {
        assert_eq!(ThemeSwitchingMode::from_theme_name("dark"), ThemeSwitchingMode::None);
        assert_eq!(
            ThemeSwitchingMode::from_theme_name("light-manual"),
            ThemeSwitchingMode::Manual
        );
        assert_eq!(
            ThemeSwitchingMode::from_theme_name("dark-auto"),
            ThemeSwitchingMode::Auto
        );
    }

    #[test]
    fn test_theme_color_display() {
        let color = ThemeColor {
            lightness: 65.0,
            chroma: 0.04,
            hue: 250.0,
        };
        assert_eq!(color.to_string(), "65 0.04 250");
    }

    #[test]
    fn test_variant_opposite() {
        assert_eq!(ThemeVariant::Dark.opposite(), ThemeVariant::Light);
        assert_eq!(ThemeVariant::Light.opposite(), ThemeVariant::Dark);
    }
}
