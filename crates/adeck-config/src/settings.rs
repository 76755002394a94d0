//! Tool settings read from `adeck.toml`.
//!
//! These settings configure the tool rather than one deck: where diagrams
//! are rendered, where emoji images come from, which address the watch-mode
//! server binds to and whether the build cache is used.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::{ConfigError, expand};

/// Settings filename to search for.
const SETTINGS_FILENAME: &str = "adeck.toml";

/// CLI settings that override settings file values.
///
/// All fields are optional. Only non-None values override the loaded settings.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override Kroki URL for diagram rendering.
    pub kroki_url: Option<String>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
}

/// Tool settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub diagrams: DiagramSettings,
    pub emoji: EmojiSettings,
    pub cache: CacheSettings,
    /// Path to the settings file (set after loading).
    #[serde(skip)]
    pub settings_path: Option<PathBuf>,
}

/// Live-reload server settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7979,
        }
    }
}

/// Diagram rendering settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DiagramSettings {
    /// Kroki server URL.
    pub kroki_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl DiagramSettings {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for DiagramSettings {
    fn default() -> Self {
        Self {
            kroki_url: "https://kroki.io".to_owned(),
            timeout_secs: 30,
        }
    }
}

/// Emoji image source settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EmojiSettings {
    /// Base URL; images are fetched from `{base_url}/{codepoint}.svg`.
    pub base_url: String,
}

impl Default for EmojiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://cdn.jsdelivr.net/gh/jdecked/twemoji@latest/assets/svg".to_owned(),
        }
    }
}

/// Build cache settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Settings {
    /// Load settings from file with optional CLI overrides.
    ///
    /// If `settings_path` is provided, loads from that file. Otherwise,
    /// searches for `adeck.toml` in the current directory and its parents,
    /// falling back to defaults when none is found.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `settings_path` doesn't exist, parsing
    /// fails, or a value is invalid.
    pub fn load(
        settings_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut settings = if let Some(path) = settings_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(overrides) = cli_settings {
            settings.apply_cli_settings(overrides);
            settings.validate()?;
        }

        Ok(settings)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(kroki_url) = &settings.kroki_url {
            self.diagrams.kroki_url.clone_from(kroki_url);
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.cache.enabled = cache_enabled;
        }
    }

    /// Search for the settings file in the current directory and parents.
    fn discover() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(SETTINGS_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut settings: Self = toml::from_str(&content)?;

        settings.expand_env_vars()?;
        settings.settings_path = Some(path.to_path_buf());
        settings.validate()?;

        Ok(settings)
    }

    /// Validate settings values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        require_non_empty(&self.diagrams.kroki_url, "diagrams.kroki_url")?;
        require_http_url(&self.diagrams.kroki_url, "diagrams.kroki_url")?;
        if self.diagrams.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "diagrams.timeout_secs must be greater than 0".to_owned(),
            ));
        }

        require_non_empty(&self.emoji.base_url, "emoji.base_url")?;
        require_http_url(&self.emoji.base_url, "emoji.base_url")?;
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;
        self.diagrams.kroki_url = expand::expand_env(&self.diagrams.kroki_url, "diagrams.kroki_url")?;
        self.emoji.base_url = expand::expand_env(&self.emoji.base_url, "emoji.base_url")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 7979);
        assert_eq!(settings.diagrams.kroki_url, "https://kroki.io");
        assert_eq!(settings.diagrams.timeout(), Duration::from_secs(30));
        assert!(settings.cache.enabled);
        settings.validate().unwrap();
    }

    #[test]
    fn test_parse_minimal_settings() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.server.port, 7979);
        assert!(settings.emoji.base_url.starts_with("https://"));
    }

    #[test]
    fn test_parse_full_settings() {
        let toml = r#"
[server]
host = "0.0.0.0"
port = 9000

[diagrams]
kroki_url = "http://localhost:8000"
timeout_secs = 5

[emoji]
base_url = "https://example.com/emoji"

[cache]
enabled = false
"#;
        let settings: Settings = toml::from_str(toml).unwrap();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.diagrams.kroki_url, "http://localhost:8000");
        assert_eq!(settings.diagrams.timeout_secs, 5);
        assert_eq!(settings.emoji.base_url, "https://example.com/emoji");
        assert!(!settings.cache.enabled);
    }

    #[test]
    fn test_load_from_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("adeck.toml");
        std::fs::write(&path, "[diagrams]\nkroki_url = \"http://kroki.local\"\n").unwrap();

        let settings = Settings::load(Some(&path), None).unwrap();
        assert_eq!(settings.diagrams.kroki_url, "http://kroki.local");
        assert_eq!(settings.settings_path, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let err = Settings::load(Some(&tmp.path().join("nope.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_invalid_kroki_url_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("adeck.toml");
        std::fs::write(&path, "[diagrams]\nkroki_url = \"kroki.io\"\n").unwrap();

        let err = Settings::load(Some(&path), None).unwrap_err();
        assert!(err.to_string().contains("diagrams.kroki_url"));
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(matches!(settings.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut settings = Settings::default();
        let overrides = CliSettings {
            port: Some(9000),
            cache_enabled: Some(false),
            ..Default::default()
        };

        settings.apply_cli_settings(&overrides);

        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert!(!settings.cache.enabled);
    }

    #[test]
    fn test_env_default_expansion() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("adeck.toml");
        std::fs::write(
            &path,
            "[diagrams]\nkroki_url = \"${ADECK_TEST_UNSET_KROKI:-http://fallback:8000}\"\n",
        )
        .unwrap();

        let settings = Settings::load(Some(&path), None).unwrap();
        assert_eq!(settings.diagrams.kroki_url, "http://fallback:8000");
    }
}
