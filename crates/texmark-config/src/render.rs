//! Output settings.
//!
//! This module contains the `RenderConfig` struct: the default output
//! format and the flags that become [`Options`].

use serde::{Deserialize, Serialize};
use texmark_core::{Options, OutputFormat};

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RenderConfig {
    /// Format used when the command line does not pick one.
    /// Default: html
    #[serde(default)]
    pub format: OutputFormat,

    /// Annotate output with source positions.
    /// Default: true
    #[serde(default = "default_true")]
    pub sourcepos: bool,

    /// Render soft breaks as hard breaks.
    /// Default: false
    #[serde(default)]
    pub hardbreaks: bool,

    /// Render soft breaks as spaces.
    /// Default: false
    #[serde(default)]
    pub nobreaks: bool,

    /// Pass raw HTML and dangerous link targets through to HTML output.
    /// Default: false
    #[serde(default, rename = "Unsafe")]
    pub unsafe_html: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Html,
            sourcepos: true,
            hardbreaks: false,
            nobreaks: false,
            unsafe_html: false,
        }
    }
}

impl RenderConfig {
    /// Merge another RenderConfig into this one.
    ///
    /// All fields are copied from `other`.
    pub fn merge(&mut self, other: &RenderConfig) {
        self.format = other.format;
        self.sourcepos = other.sourcepos;
        self.hardbreaks = other.hardbreaks;
        self.nobreaks = other.nobreaks;
        self.unsafe_html = other.unsafe_html;
    }

    /// The option flags these settings stand for.
    pub fn options(&self) -> Options {
        let mut options = Options::DEFAULT;
        options.set(Options::SOURCEPOS, self.sourcepos);
        options.set(Options::HARDBREAKS, self.hardbreaks);
        options.set(Options::NOBREAKS, self.nobreaks);
        options.set(Options::UNSAFE, self.unsafe_html);
        options
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let render = RenderConfig::default();
        assert_eq!(render.format, OutputFormat::Html);
        assert!(render.sourcepos);
        assert!(!render.hardbreaks);
        assert!(!render.nobreaks);
        assert!(!render.unsafe_html);
    }

    #[test]
    fn test_serde_pascal_case() {
        let toml_str = r#"
            Format = "latex"
            Sourcepos = false
            Hardbreaks = true
            Nobreaks = false
            Unsafe = true
        "#;
        let render: RenderConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(render.format, OutputFormat::Latex);
        assert!(!render.sourcepos);
        assert!(render.hardbreaks);
        assert!(render.unsafe_html);
    }

    #[test]
    fn test_unknown_format_is_an_error() {
        assert!(toml::from_str::<RenderConfig>(r#"Format = "rtf""#).is_err());
    }

    #[test]
    fn test_options() {
        let render = RenderConfig::default();
        assert_eq!(render.options(), Options::SOURCEPOS);

        let render = RenderConfig {
            sourcepos: false,
            hardbreaks: true,
            nobreaks: true,
            ..RenderConfig::default()
        };
        assert_eq!(render.options(), Options::HARDBREAKS | Options::NOBREAKS);

        let render = RenderConfig {
            unsafe_html: true,
            ..RenderConfig::default()
        };
        assert_eq!(render.options(), Options::SOURCEPOS | Options::UNSAFE);
    }
}
