//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Theme (light or dark)
//! - Optional seed for reproducible challenge draws
//! - Which persistence backend holds the snapshot
//!
//! Configuration is stored at `~/.config/habitroom/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Json,
    Sqlite,
}

/// UI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub theme: Theme,
}

/// Daily challenge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChallengeConfig {
    /// Fixed seed for the challenge draw; unset draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Persistence configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/habitroom/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub challenge: ChallengeConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                // "none" clears an optional, whether or not it is set.
                let clears = value.eq_ignore_ascii_case("none")
                    && matches!(
                        existing,
                        serde_json::Value::Null | serde_json::Value::Number(_)
                    );

                let new_value = match existing {
                    _ if clears => serde_json::Value::Null,
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    // Unset optionals: numbers stay numbers.
                    serde_json::Value::Null => match value.parse::<u64>() {
                        Ok(n) => serde_json::Value::Number(n.into()),
                        Err(_) => serde_json::Value::String(value.into()),
                    },
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    serde_json::Value::String(_) => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk or write and return the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field's type.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Flip between light and dark, returning the new theme.
    pub fn toggle_theme(&mut self) -> Theme {
        self.ui.theme = self.ui.theme.toggled();
        tracing::debug!(theme = ?self.ui.theme, "theme toggled");
        self.ui.theme
    }

    /// Flip the theme and write the config to `path`.
    ///
    /// The in-memory theme changes even when the write fails; the error is
    /// returned so the caller can report it.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be written to `path`.
    pub fn toggle_theme_and_save(&mut self, path: &Path) -> Result<Theme, ConfigError> {
        let theme = self.toggle_theme();
        self.save_to(path).map_err(|e| {
            tracing::warn!(error = %e, "failed to save theme change");
            e
        })?;
        Ok(theme)
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.ui.theme, Theme::Light);
        assert_eq!(parsed.storage.backend, StorageBackend::Json);
        assert!(parsed.challenge.seed.is_none());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[ui]\ntheme = \"dark\"\n").unwrap();
        assert_eq!(parsed.ui.theme, Theme::Dark);
        assert_eq!(parsed.storage.backend, StorageBackend::Json);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("ui.theme").as_deref(), Some("light"));
        assert_eq!(cfg.get("storage.backend").as_deref(), Some("json"));
        assert_eq!(cfg.get("challenge.seed").as_deref(), Some("null"));
        assert!(cfg.get("ui.missing_key").is_none());
    }

    #[test]
    fn apply_updates_enum_and_optional_number() {
        let mut cfg = Config::default();
        cfg.apply("ui.theme", "dark").unwrap();
        cfg.apply("storage.backend", "sqlite").unwrap();
        cfg.apply("challenge.seed", "42").unwrap();
        assert_eq!(cfg.ui.theme, Theme::Dark);
        assert_eq!(cfg.storage.backend, StorageBackend::Sqlite);
        assert_eq!(cfg.challenge.seed, Some(42));

        cfg.apply("challenge.seed", "7").unwrap();
        assert_eq!(cfg.challenge.seed, Some(7));
    }

    #[test]
    fn apply_rejects_unknown_key_and_bad_value() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("ui.nonexistent_key", "x"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.apply("ui.theme", "purple"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg.ui.theme, Theme::Light);
    }

    #[test]
    fn toggle_theme_flips() {
        let mut cfg = Config::default();
        assert_eq!(cfg.toggle_theme(), Theme::Dark);
        assert_eq!(cfg.toggle_theme(), Theme::Light);
    }

    #[test]
    fn load_from_missing_file_writes_default() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.ui.theme, Theme::Light);
        assert!(path.exists());

        let mut cfg = cfg;
        assert_eq!(cfg.toggle_theme_and_save(&path).unwrap(), Theme::Dark);
        assert_eq!(Config::load_from(&path).unwrap().ui.theme, Theme::Dark);
    }

    #[test]
    fn theme_toggle_survives_unwritable_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("missing").join("config.toml");
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.toggle_theme_and_save(&path),
            Err(ConfigError::SaveFailed { .. })
        ));
        assert_eq!(cfg.ui.theme, Theme::Dark);
        assert!(!path.exists());
    }

    #[test]
    fn apply_clears_a_set_seed_with_none() {
        let mut cfg = Config::default();
        cfg.apply("challenge.seed", "42").unwrap();
        assert_eq!(cfg.challenge.seed, Some(42));

        cfg.apply("challenge.seed", "none").unwrap();
        assert!(cfg.challenge.seed.is_none());

        cfg.apply("challenge.seed", "NONE").unwrap();
        assert!(cfg.challenge.seed.is_none());
        assert!(matches!(
            cfg.apply("challenge.seed", "soon"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn load_from_rejects_garbage() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "ui = [").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
