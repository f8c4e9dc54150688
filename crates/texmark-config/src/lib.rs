//! Texmark Config
//!
//! This crate handles configuration loading and management
//! for texmark, supporting TOML configuration files.
//!
//! # Overview
//!
//! Configuration is loaded from platform-specific locations:
//! - Linux: `~/.config/texmark/config.toml`
//! - macOS: `~/Library/Application Support/texmark/config.toml`
//! - Windows: `%APPDATA%\texmark\config.toml`
//!
//! # Example
//!
//! ```no_run
//! use texmark_config::Config;
//!
//! // Load config with defaults
//! let config = Config::load().unwrap();
//!
//! // Or load with an override file
//! let config = Config::load_with_override(Some("./custom.toml")).unwrap();
//! ```

mod extensions;
mod render;

pub use extensions::ExtensionsConfig;
pub use render::RenderConfig;

use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use texmark_core::{Options, Result, TexmarkError};

/// Default TOML configuration string.
const DEFAULT_TOML: &str = r#"[extensions]
Enabled = [
    "autolink",
    "table",
    "strikethrough",
    "tagfilter",
    "tasklist",
    "latex_block",
    "latex_inline",
]

[render]
Format     = "html"
Sourcepos  = true
Hardbreaks = false
Nobreaks   = false
Unsafe     = false
"#;

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Extensions attached to every parser
    #[serde(default)]
    pub extensions: ExtensionsConfig,

    /// Output settings
    #[serde(default)]
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        // Parse the default TOML to ensure consistency
        toml::from_str(DEFAULT_TOML).expect("Default TOML should be valid")
    }
}

impl Config {
    /// Returns the default TOML configuration string.
    ///
    /// # Example
    ///
    /// ```
    /// use texmark_config::Config;
    /// let toml = Config::default_toml();
    /// assert!(toml.contains("[extensions]"));
    /// assert!(toml.contains("[render]"));
    /// ```
    pub fn default_toml() -> &'static str {
        DEFAULT_TOML
    }

    /// Returns the platform-specific configuration file path.
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Returns the platform-specific configuration directory.
    pub fn config_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "texmark").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Ensures the config file exists, creating it with defaults if not.
    ///
    /// # Returns
    ///
    /// The path to the config file.
    pub fn ensure_config_file() -> Result<PathBuf> {
        let config_dir = Self::config_dir()
            .ok_or_else(|| TexmarkError::Config("Could not determine config directory".into()))?;

        std::fs::create_dir_all(&config_dir)?;

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            std::fs::write(&config_path, DEFAULT_TOML)?;
            debug!("wrote default config to {}", config_path.display());
        }

        Ok(config_path)
    }

    /// Load configuration from the default platform-specific path.
    ///
    /// If no config file exists, returns the default configuration.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path.
    ///
    /// Sections and keys missing from the file take their defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        debug!("loading config from {}", path.display());
        toml::from_str(&content)
            .map_err(|e| TexmarkError::Config(format!("Parse error in {}: {}", path.display(), e)))
    }

    /// Load configuration with an optional override file or string.
    ///
    /// 1. Load the base config from the default location
    /// 2. If `override_config` is given, apply it with
    ///    [`Config::apply_override`]
    pub fn load_with_override(override_config: Option<&str>) -> Result<Self> {
        let mut config = Self::load()?;
        if let Some(override_str) = override_config {
            config.apply_override(override_str)?;
        }
        Ok(config)
    }

    /// Apply an override given as a path to an existing file, or else as
    /// inline TOML.
    ///
    /// Only the keys the override mentions change; everything else keeps
    /// its current value.
    ///
    /// # Example
    ///
    /// ```
    /// use texmark_config::Config;
    /// use texmark_core::OutputFormat;
    ///
    /// let mut config = Config::default();
    /// config.apply_override("[render]\nFormat = \"xml\"").unwrap();
    /// assert_eq!(config.render.format, OutputFormat::Xml);
    /// assert!(config.render.sourcepos);
    /// ```
    pub fn apply_override(&mut self, override_str: &str) -> Result<()> {
        let override_path = Path::new(override_str);
        let override_toml = if override_path.is_file() {
            debug!("applying config override file {}", override_path.display());
            std::fs::read_to_string(override_path)?
        } else {
            debug!("applying inline config override");
            override_str.to_string()
        };

        let overlay: toml::Table = override_toml
            .parse()
            .map_err(|e| TexmarkError::Config(format!("Override parse error: {}", e)))?;
        let mut base = match toml::Value::try_from(&*self) {
            Ok(toml::Value::Table(table)) => table,
            Ok(_) => return Err(TexmarkError::Config("Config did not serialize to a table".into())),
            Err(e) => return Err(TexmarkError::Config(format!("Serialization error: {}", e))),
        };
        merge_tables(&mut base, overlay);

        *self = toml::Value::Table(base)
            .try_into()
            .map_err(|e| TexmarkError::Config(format!("Override error: {}", e)))?;
        Ok(())
    }

    /// Merge another config into this one.
    ///
    /// Values from `other` take precedence over values in `self`.
    ///
    /// # Example
    ///
    /// ```
    /// use texmark_config::Config;
    ///
    /// let mut base = Config::default();
    /// let override_config: Config = toml::from_str(r#"
    ///     [render]
    ///     Sourcepos = false
    /// "#).unwrap();
    ///
    /// base.merge(&override_config);
    /// assert!(!base.render.sourcepos);
    /// ```
    pub fn merge(&mut self, other: &Config) {
        self.extensions.merge(&other.extensions);
        self.render.merge(&other.render);
    }

    /// Save configuration to a file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| TexmarkError::Config(format!("Serialization error: {}", e)))?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    /// The render option flags this configuration selects.
    pub fn options(&self) -> Options {
        self.render.options()
    }
}

/// Overlay `overlay` onto `base`, descending into tables that exist in both.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, incoming),
                _ => {
                    base.insert(key, toml::Value::Table(incoming));
                }
            },
            other => {
                base.insert(key, other);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use texmark_core::OutputFormat;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.extensions.is_enabled("latex_block"));
        assert_eq!(config.render.format, OutputFormat::Html);
        assert!(config.render.sourcepos);
        assert_eq!(config.options(), Options::SOURCEPOS);
    }

    #[test]
    fn test_default_toml_parses() {
        let config: Config = toml::from_str(DEFAULT_TOML).unwrap();
        assert_eq!(config.extensions.enabled.len(), 7);
        assert!(!config.render.unsafe_html);
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_merge() {
        let mut base = Config::default();
        let override_toml = r#"
            [extensions]
            Enabled = ["latex_block"]
            [render]
            Format = "latex"
        "#;
        let override_config: Config = toml::from_str(override_toml).unwrap();

        base.merge(&override_config);
        assert_eq!(base.extensions.enabled, ["latex_block"]);
        assert_eq!(base.render.format, OutputFormat::Latex);
    }

    #[test]
    fn test_inline_override_keeps_other_keys() {
        let mut config = Config::default();
        config.extensions.enabled = vec!["latex_inline".to_string()];
        config.apply_override("[render]\nHardbreaks = true").unwrap();

        assert!(config.render.hardbreaks);
        assert!(config.render.sourcepos);
        assert_eq!(config.extensions.enabled, ["latex_inline"]);
    }

    #[test]
    fn test_override_parse_error() {
        let mut config = Config::default();
        let err = config.apply_override("[render\nbroken").unwrap_err();
        assert!(matches!(err, TexmarkError::Config(_)));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_override_bad_value() {
        let mut config = Config::default();
        assert!(config.apply_override("[render]\nFormat = \"rtf\"").is_err());
    }

    #[test]
    fn test_override_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("override.toml");
        std::fs::write(&path, "[render]\nFormat = \"xml\"\n").unwrap();

        let mut config = Config::default();
        config.apply_override(path.to_str().unwrap()).unwrap();
        assert_eq!(config.render.format, OutputFormat::Xml);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.render.nobreaks = true;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, TexmarkError::Io(_)));
    }

    #[test]
    fn test_config_path() {
        // Containers may have no home directory
        if let Some(p) = Config::config_path() {
            assert!(p.to_string_lossy().contains("texmark"));
        }
    }
}
