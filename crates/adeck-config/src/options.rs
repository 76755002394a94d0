//! Document attribute options and their resolution.
//!
//! Every option a deck author can set is declared once in [`OPTIONS`] with its
//! attribute id, documentation, default and accepted values. Options are
//! resolved in declaration order against a configuration that starts out with
//! every default filled in, so a later option can read what an earlier one
//! resolved to (the file options are relative to `assets-path`, the default
//! `theme-color` is built from `theme-hue` and `theme-chroma`).
//!
//! Invalid input never fails resolution. Each rejected value is logged,
//! recorded as an [`OptionWarning`] and replaced by the option's default.

use std::path::{Component, Path, PathBuf};

use crate::deck::{
    ChromaLevel, DeckConfiguration, HIGHLIGHT_THEMES, THEME_NAMES, ThemeColor,
    ThemeSwitchingMode, ThemeVariant,
};

/// Declaration of one document attribute option.
pub struct OptionSpec {
    /// Document attribute name.
    pub id: &'static str,
    pub documentation: &'static str,
    pub default_value: &'static str,
    pub accepted_values: &'static str,
    apply: fn(&mut Resolver, Option<&str>),
}

impl std::fmt::Debug for OptionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionSpec").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Severity of a rejected option value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningLevel {
    Warning,
    Error,
}

/// A rejected option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionWarning {
    pub option: &'static str,
    pub level: WarningLevel,
    pub message: String,
}

/// Outcome of [`resolve`].
#[derive(Debug, Clone)]
pub struct Resolution {
    pub configuration: DeckConfiguration,
    pub warnings: Vec<OptionWarning>,
}

/// All options, in resolution order.
pub static OPTIONS: &[OptionSpec] = &[
    OptionSpec {
        id: "assets-path",
        documentation: "Folder containing the assets referenced by the other path options.",
        default_value: "the folder of the input document",
        accepted_values: "an existing folder, relative to the input document",
        apply: |r, raw| {
            let base = r.input_folder.clone();
            if let Some(path) = r.path("assets-path", raw, base, PathKind::Folder) {
                r.config.assets_path = path;
            }
        },
    },
    OptionSpec {
        id: "custom-js",
        documentation: "Script inlined at the end of the deck.",
        default_value: "unset",
        accepted_values: "an existing file, relative to assets-path",
        apply: |r, raw| {
            let base = r.config.assets_path.clone();
            r.config.custom_js = r.path("custom-js", raw, base, PathKind::File);
        },
    },
    OptionSpec {
        id: "custom-css",
        documentation: "Stylesheet inlined after the theme styles.",
        default_value: "unset",
        accepted_values: "an existing file, relative to assets-path",
        apply: |r, raw| {
            let base = r.config.assets_path.clone();
            r.config.custom_css = r.path("custom-css", raw, base, PathKind::File);
        },
    },
    OptionSpec {
        id: "favicon",
        documentation: "Icon embedded as the page favicon.",
        default_value: "unset",
        accepted_values: "an existing file, relative to assets-path",
        apply: |r, raw| {
            let base = r.config.assets_path.clone();
            r.config.favicon = r.path("favicon", raw, base, PathKind::File);
        },
    },
    OptionSpec {
        id: "svg-icons-folder",
        documentation: "Folder of SVG files usable with the icon:name[] macro.",
        default_value: "unset",
        accepted_values: "an existing folder, relative to assets-path",
        apply: |r, raw| {
            let base = r.config.assets_path.clone();
            r.config.svg_icons_folder = r.path("svg-icons-folder", raw, base, PathKind::Folder);
        },
    },
    OptionSpec {
        id: "page-title",
        documentation: "HTML page title.",
        default_value: "the document title",
        accepted_values: "any text",
        apply: |r, raw| {
            r.config.page_title = raw
                .map(str::trim)
                .filter(|title| !title.is_empty())
                .map(str::to_owned);
        },
    },
    OptionSpec {
        id: "fragment-lists",
        documentation: "Reveal list items one at a time.",
        default_value: "false",
        accepted_values: "true, false",
        apply: |r, raw| r.config.fragment_lists = r.boolean("fragment-lists", raw, false),
    },
    OptionSpec {
        id: "fragment-tables",
        documentation: "Reveal table rows one at a time.",
        default_value: "false",
        accepted_values: "true, false",
        apply: |r, raw| r.config.fragment_tables = r.boolean("fragment-tables", raw, false),
    },
    OptionSpec {
        id: "theme",
        documentation: "Colour scheme and how the audience may switch it.",
        default_value: "dark",
        accepted_values: "dark, light, dark-manual, light-manual, dark-auto, light-auto",
        apply: |r, raw| r.config.theme_name = r.one_of("theme", raw, &THEME_NAMES, "dark"),
    },
    OptionSpec {
        id: "theme-hue",
        documentation: "Hue of the accent colour, in degrees.",
        default_value: "250",
        accepted_values: "a number from 0 to 360",
        apply: |r, raw| r.config.theme_hue = r.number("theme-hue", raw, 0.0..=360.0, 250.0),
    },
    OptionSpec {
        id: "theme-chroma",
        documentation: "Saturation preset of the accent colour.",
        default_value: "low",
        accepted_values: "none, low, medium, high",
        apply: |r, raw| {
            let name = r.one_of("theme-chroma", raw, &ChromaLevel::NAMES, "low");
            r.config.theme_chroma = ChromaLevel::from_name(&name).unwrap_or(ChromaLevel::Low);
        },
    },
    OptionSpec {
        id: "theme-color",
        documentation: "Accent colour as OKLCH components, overriding theme-hue and theme-chroma.",
        default_value: "65, the theme-chroma preset and theme-hue",
        accepted_values: "\"L C H\" with L from 0 to 100, C from 0 to 0.4, H from 0 to 360",
        apply: |r, raw| {
            let fallback = ThemeColor {
                lightness: ThemeColor::DEFAULT_LIGHTNESS,
                chroma: r.config.theme_chroma.chroma(),
                hue: r.config.theme_hue,
            };
            r.config.theme_color = r.color("theme-color", raw).unwrap_or(fallback);
        },
    },
    OptionSpec {
        id: "highlight-theme-dark",
        documentation: "Syntax highlighting theme used by the dark variant.",
        default_value: "base16-ocean.dark",
        accepted_values: "one of the bundled highlighter themes",
        apply: |r, raw| {
            r.config.highlight_theme_dark =
                r.one_of("highlight-theme-dark", raw, &HIGHLIGHT_THEMES, "base16-ocean.dark");
        },
    },
    OptionSpec {
        id: "highlight-theme-light",
        documentation: "Syntax highlighting theme used by the light variant.",
        default_value: "InspiredGitHub",
        accepted_values: "one of the bundled highlighter themes",
        apply: |r, raw| {
            r.config.highlight_theme_light =
                r.one_of("highlight-theme-light", raw, &HIGHLIGHT_THEMES, "InspiredGitHub");
        },
    },
];

/// Resolve every option in [`OPTIONS`] against the document's attributes.
///
/// `attribute` returns the raw value of a document attribute, if set.
/// `input_folder` is the folder of the input document.
pub fn resolve(attribute: impl Fn(&str) -> Option<String>, input_folder: &Path) -> Resolution {
    let mut resolver = Resolver {
        input_folder: input_folder.to_path_buf(),
        config: defaults(input_folder),
        warnings: Vec::new(),
    };

    for option in OPTIONS {
        let raw = attribute(option.id);
        (option.apply)(&mut resolver, raw.as_deref());
    }

    let mut configuration = resolver.config;
    configuration.starting_theme = if configuration.theme_name.starts_with("light") {
        ThemeVariant::Light
    } else {
        ThemeVariant::Dark
    };
    configuration.non_starting_theme = configuration.starting_theme.opposite();
    configuration.theme_switching_mode =
        ThemeSwitchingMode::from_theme_name(&configuration.theme_name);

    Resolution {
        configuration,
        warnings: resolver.warnings,
    }
}

fn defaults(input_folder: &Path) -> DeckConfiguration {
    DeckConfiguration {
        assets_path: input_folder.to_path_buf(),
        custom_js: None,
        custom_css: None,
        favicon: None,
        svg_icons_folder: None,
        page_title: None,
        fragment_lists: false,
        fragment_tables: false,
        theme_name: "dark".to_owned(),
        theme_hue: 250.0,
        theme_chroma: ChromaLevel::Low,
        theme_color: ThemeColor {
            lightness: ThemeColor::DEFAULT_LIGHTNESS,
            chroma: ChromaLevel::Low.chroma(),
            hue: 250.0,
        },
        highlight_theme_dark: "base16-ocean.dark".to_owned(),
        highlight_theme_light: "InspiredGitHub".to_owned(),
        starting_theme: ThemeVariant::Dark,
        non_starting_theme: ThemeVariant::Light,
        theme_switching_mode: ThemeSwitchingMode::None,
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum PathKind {
    File,
    Folder,
}

/// Mutable state threaded through the option table.
struct Resolver {
    input_folder: PathBuf,
    config: DeckConfiguration,
    warnings: Vec<OptionWarning>,
}

impl Resolver {
    fn warn(&mut self, option: &'static str, message: String) {
        tracing::warn!(option, "{message}");
        self.warnings.push(OptionWarning {
            option,
            level: WarningLevel::Warning,
            message,
        });
    }

    fn error(&mut self, option: &'static str, message: String) {
        tracing::error!(option, "{message}");
        self.warnings.push(OptionWarning {
            option,
            level: WarningLevel::Error,
            message,
        });
    }

    fn path(
        &mut self,
        option: &'static str,
        raw: Option<&str>,
        base: PathBuf,
        kind: PathKind,
    ) -> Option<PathBuf> {
        let raw = raw.map(str::trim).filter(|value| !value.is_empty())?;
        if Path::new(raw)
            .components()
            .any(|component| matches!(component, Component::ParentDir))
        {
            self.error(
                option,
                format!("{option}: \"{raw}\" must not contain a parent folder segment"),
            );
            return None;
        }

        let resolved = base.join(raw);
        if !resolved.exists() {
            self.warn(
                option,
                format!("{option}: {} does not exist", resolved.display()),
            );
            return None;
        }
        match kind {
            PathKind::File if !resolved.is_file() => {
                self.warn(option, format!("{option}: {} is not a file", resolved.display()));
                None
            }
            PathKind::Folder if !resolved.is_dir() => {
                self.warn(option, format!("{option}: {} is not a folder", resolved.display()));
                None
            }
            _ => Some(resolved),
        }
    }

    fn boolean(&mut self, option: &'static str, raw: Option<&str>, default: bool) -> bool {
        match raw.map(str::trim) {
            Some("true") => true,
            Some("false") => false,
            None | Some("") => default,
            Some(other) => {
                self.warn(
                    option,
                    format!("{option}: \"{other}\" is not true or false, using {default}"),
                );
                default
            }
        }
    }

    fn one_of(
        &mut self,
        option: &'static str,
        raw: Option<&str>,
        accepted: &[&str],
        default: &str,
    ) -> String {
        match raw.map(str::trim) {
            None | Some("") => default.to_owned(),
            Some(value) if accepted.contains(&value) => value.to_owned(),
            Some(other) => {
                self.warn(
                    option,
                    format!(
                        "{option}: \"{other}\" is not one of {}, using {default}",
                        accepted.join(", ")
                    ),
                );
                default.to_owned()
            }
        }
    }

    fn number(
        &mut self,
        option: &'static str,
        raw: Option<&str>,
        range: std::ops::RangeInclusive<f64>,
        default: f64,
    ) -> f64 {
        let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return default;
        };
        match raw.parse::<f64>() {
            Ok(value) if range.contains(&value) => value,
            _ => {
                self.warn(
                    option,
                    format!(
                        "{option}: \"{raw}\" is not a number from {} to {}, using {default}",
                        range.start(),
                        range.end()
                    ),
                );
                default
            }
        }
    }

    fn color(&mut self, option: &'static str, raw: Option<&str>) -> Option<ThemeColor> {
        let raw = raw.map(str::trim).filter(|value| !value.is_empty())?;
        let parts: Vec<f64> = raw
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<_, _>>()
            .unwrap_or_default();

        if let [lightness, chroma, hue] = parts[..]
            && (0.0..=100.0).contains(&lightness)
            && (0.0..=0.4).contains(&chroma)
            && (0.0..=360.0).contains(&hue)
        {
            return Some(ThemeColor {
                lightness,
                chroma,
                hue,
            });
        }
        self.warn(
            option,
            format!("{option}: \"{raw}\" is not a valid \"L C H\" colour, using the default"),
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn resolve_with(attributes: &[(&str, &str)], folder: &Path) -> Resolution {
        let map: HashMap<String, String> = attributes
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        resolve(|name| map.get(name).cloned(), folder)
    }

    #[test]
    fn test_no_attributes_resolves_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let resolution = resolve_with(&[], tmp.path());

        assert!(resolution.warnings.is_empty());
        assert_eq!(resolution.configuration, defaults(tmp.path()));
        let config = resolution.configuration;
        assert_eq!(config.assets_path, tmp.path());
        assert_eq!(config.theme_name, "dark");
        assert_eq!(config.starting_theme, ThemeVariant::Dark);
        assert_eq!(config.non_starting_theme, ThemeVariant::Light);
        assert_eq!(config.theme_switching_mode, ThemeSwitchingMode::None);
        assert!(!config.fragment_lists);
        assert!(!config.fragment_tables);
    }

    #[test]
    fn test_every_option_has_unique_id() {
        let mut ids: Vec<_> = OPTIONS.iter().map(|o| o.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), OPTIONS.len());
    }

    #[test]
    fn test_parent_segment_in_path_options_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let deck = tmp.path().join("deck");
        fs::create_dir_all(&deck).unwrap();
        fs::write(tmp.path().join("outside.css"), "body{}").unwrap();

        for option in ["assets-path", "custom-js", "custom-css", "favicon", "svg-icons-folder"] {
            let resolution = resolve_with(&[(option, "../outside.css")], &deck);
            assert_eq!(
                resolution.configuration,
                defaults(&deck),
                "{option} should resolve to its default"
            );
            assert_eq!(resolution.warnings.len(), 1, "{option}");
            assert_eq!(resolution.warnings[0].option, option);
            assert_eq!(resolution.warnings[0].level, WarningLevel::Error);
        }
    }

    #[test]
    fn test_files_resolve_relative_to_assets_path() {
        let tmp = TempDir::new().unwrap();
        let assets = tmp.path().join("assets");
        fs::create_dir_all(assets.join("icons")).unwrap();
        fs::write(assets.join("custom.css"), "body{}").unwrap();
        fs::write(assets.join("custom.js"), "").unwrap();
        fs::write(assets.join("favicon.png"), [0u8]).unwrap();

        let resolution = resolve_with(
            &[
                ("assets-path", "assets"),
                ("custom-css", "custom.css"),
                ("custom-js", "custom.js"),
                ("favicon", "favicon.png"),
                ("svg-icons-folder", "icons"),
            ],
            tmp.path(),
        );

        assert!(resolution.warnings.is_empty(), "{:?}", resolution.warnings);
        let config = resolution.configuration;
        assert_eq!(config.assets_path, assets);
        assert_eq!(config.custom_css, Some(assets.join("custom.css")));
        assert_eq!(config.custom_js, Some(assets.join("custom.js")));
        assert_eq!(config.favicon, Some(assets.join("favicon.png")));
        assert_eq!(config.svg_icons_folder, Some(assets.join("icons")));
    }

    #[test]
    fn test_missing_and_mismatched_paths_warn() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("folder")).unwrap();
        fs::write(tmp.path().join("file.css"), "").unwrap();

        let resolution = resolve_with(
            &[
                ("custom-css", "missing.css"),
                ("custom-js", "folder"),
                ("svg-icons-folder", "file.css"),
            ],
            tmp.path(),
        );

        let config = &resolution.configuration;
        assert_eq!(config.custom_css, None);
        assert_eq!(config.custom_js, None);
        assert_eq!(config.svg_icons_folder, None);
        let options: Vec<_> = resolution.warnings.iter().map(|w| w.option).collect();
        assert_eq!(options, vec!["custom-js", "custom-css", "svg-icons-folder"]);
        assert!(
            resolution
                .warnings
                .iter()
                .all(|w| w.level == WarningLevel::Warning)
        );
    }

    #[test]
    fn test_boolean_options() {
        let tmp = TempDir::new().unwrap();
        let resolution = resolve_with(
            &[("fragment-lists", "true"), ("fragment-tables", "yes")],
            tmp.path(),
        );

        assert!(resolution.configuration.fragment_lists);
        assert!(!resolution.configuration.fragment_tables);
        assert_eq!(resolution.warnings.len(), 1);
        assert_eq!(resolution.warnings[0].option, "fragment-tables");
    }

    #[test]
    fn test_empty_boolean_is_default_without_warning() {
        let tmp = TempDir::new().unwrap();
        let resolution = resolve_with(&[("fragment-lists", "")], tmp.path());
        assert!(!resolution.configuration.fragment_lists);
        assert!(resolution.warnings.is_empty());
    }

    #[test]
    fn test_theme_derivations() {
        let tmp = TempDir::new().unwrap();

        let manual = resolve_with(&[("theme", "light-manual")], tmp.path()).configuration;
        assert_eq!(manual.starting_theme, ThemeVariant::Light);
        assert_eq!(manual.non_starting_theme, ThemeVariant::Dark);
        assert_eq!(manual.theme_switching_mode, ThemeSwitchingMode::Manual);
        assert_eq!(
            manual.shipped_variants(),
            vec![ThemeVariant::Light, ThemeVariant::Dark]
        );

        let auto = resolve_with(&[("theme", "dark-auto")], tmp.path()).configuration;
        assert_eq!(auto.starting_theme, ThemeVariant::Dark);
        assert_eq!(auto.theme_switching_mode, ThemeSwitchingMode::Auto);
    }

    #[test]
    fn test_unknown_theme_warns_and_defaults() {
        let tmp = TempDir::new().unwrap();
        let resolution = resolve_with(&[("theme", "solarized")], tmp.path());
        assert_eq!(resolution.configuration.theme_name, "dark");
        assert_eq!(resolution.warnings.len(), 1);
        assert_eq!(resolution.warnings[0].option, "theme");
    }

    #[test]
    fn test_hue_range() {
        let tmp = TempDir::new().unwrap();

        let ok = resolve_with(&[("theme-hue", "120")], tmp.path());
        assert!((ok.configuration.theme_hue - 120.0).abs() < f64::EPSILON);
        assert!((ok.configuration.theme_color.hue - 120.0).abs() < f64::EPSILON);

        for bad in ["361", "-1", "blue"] {
            let resolution = resolve_with(&[("theme-hue", bad)], tmp.path());
            assert!((resolution.configuration.theme_hue - 250.0).abs() < f64::EPSILON);
            assert_eq!(resolution.warnings.len(), 1, "{bad}");
        }
    }

    #[test]
    fn test_theme_color_overrides_hue_and_chroma() {
        let tmp = TempDir::new().unwrap();
        let resolution = resolve_with(
            &[
                ("theme-hue", "10"),
                ("theme-chroma", "high"),
                ("theme-color", "70 0.2 140"),
            ],
            tmp.path(),
        );
        let config = resolution.configuration;
        assert_eq!(config.theme_chroma, ChromaLevel::High);
        assert_eq!(
            config.theme_color,
            ThemeColor {
                lightness: 70.0,
                chroma: 0.2,
                hue: 140.0
            }
        );
    }

    #[test]
    fn test_theme_color_defaults_from_hue_and_chroma() {
        let tmp = TempDir::new().unwrap();
        let resolution = resolve_with(
            &[("theme-hue", "10"), ("theme-chroma", "medium")],
            tmp.path(),
        );
        assert_eq!(
            resolution.configuration.theme_color,
            ThemeColor {
                lightness: 65.0,
                chroma: 0.1,
                hue: 10.0
            }
        );
    }

    #[test]
    fn test_invalid_theme_color_warns() {
        let tmp = TempDir::new().unwrap();
        for bad in ["70 0.2", "70 0.9 140", "101 0.1 140", "a b c"] {
            let resolution = resolve_with(&[("theme-color", bad)], tmp.path());
            assert_eq!(resolution.configuration.theme_color, defaults(tmp.path()).theme_color);
            assert_eq!(resolution.warnings.len(), 1, "{bad}");
        }
    }

    #[test]
    fn test_highlight_theme_must_be_bundled() {
        let tmp = TempDir::new().unwrap();
        let resolution = resolve_with(
            &[
                ("highlight-theme-dark", "Solarized (dark)"),
                ("highlight-theme-light", "github"),
            ],
            tmp.path(),
        );
        let config = resolution.configuration;
        assert_eq!(config.highlight_theme(ThemeVariant::Dark), "Solarized (dark)");
        assert_eq!(config.highlight_theme(ThemeVariant::Light), "InspiredGitHub");
        assert_eq!(resolution.warnings.len(), 1);
    }

    #[test]
    fn test_page_title_is_trimmed() {
        let tmp = TempDir::new().unwrap();
        let config = resolve_with(&[("page-title", "  Talk  ")], tmp.path()).configuration;
        assert_eq!(config.page_title.as_deref(), Some("Talk"));
    }
}
