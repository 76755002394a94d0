//! Configuration for adeck.
//!
//! Two layers live here:
//!
//! - Deck options: document attributes such as `:theme: dark-manual:` are
//!   resolved into a typed [`DeckConfiguration`] by [`resolve`]. Invalid values
//!   degrade to defaults with a warning, they never fail a build.
//! - Tool settings: `adeck.toml`, discovered in the current directory or its
//!   parents, configures the diagram server, emoji source, watch server and
//!   cache. See [`Settings`].
//!
//! ## Environment Variable Expansion
//!
//! String settings values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields: `server.host`, `diagrams.kroki_url`, `emoji.base_url`.

mod deck;
mod expand;
mod options;
mod settings;

use std::path::PathBuf;

pub use deck::{
    ChromaLevel, DeckConfiguration, HIGHLIGHT_THEMES, THEME_NAMES, ThemeColor,
    ThemeSwitchingMode, ThemeVariant,
};
pub use options::{OPTIONS, OptionSpec, OptionWarning, Resolution, WarningLevel, resolve};
pub use settings::{
    CacheSettings, CliSettings, DiagramSettings, EmojiSettings, ServerSettings, Settings,
};

/// Settings error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Settings file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Settings error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Settings field path (e.g., "`diagrams.kroki_url`").
        field: String,
        /// Error message (e.g., "${`KROKI_URL`} not set").
        message: String,
    },
}
