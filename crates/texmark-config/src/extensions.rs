//! Extension selection.

use serde::{Deserialize, Serialize};

/// Which registered extensions a parser gets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExtensionsConfig {
    /// Extension names, attached in this order.
    /// Default: every built-in extension
    #[serde(default = "default_enabled")]
    pub enabled: Vec<String>,
}

impl Default for ExtensionsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
        }
    }
}

impl ExtensionsConfig {
    /// Merge another ExtensionsConfig into this one. The list is replaced,
    /// not extended.
    pub fn merge(&mut self, other: &ExtensionsConfig) {
        self.enabled = other.enabled.clone();
    }

    /// Whether `name` is enabled
    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled.iter().any(|n| n == name)
    }

    /// A config with no extensions at all.
    pub fn none() -> Self {
        Self { enabled: vec![] }
    }
}

fn default_enabled() -> Vec<String> {
    [
        "autolink",
        "table",
        "strikethrough",
        "tagfilter",
        "tasklist",
        "latex_block",
        "latex_inline",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let ext = ExtensionsConfig::default();
        assert!(ext.is_enabled("latex_block"));
        assert!(ext.is_enabled("latex_inline"));
        assert!(ext.is_enabled("table"));
        assert!(ext.is_enabled("tasklist"));
        assert_eq!(ext.enabled.len(), 7);
    }

    #[test]
    fn test_serde_pascal_case() {
        let ext: ExtensionsConfig = toml::from_str(r#"Enabled = ["latex_inline"]"#).unwrap();
        assert_eq!(ext.enabled, ["latex_inline"]);
    }

    #[test]
    fn test_missing_list_uses_default() {
        let ext: ExtensionsConfig = toml::from_str("").unwrap();
        assert_eq!(ext, ExtensionsConfig::default());
    }

    #[test]
    fn test_merge_replaces() {
        let mut ext = ExtensionsConfig::default();
        ext.merge(&ExtensionsConfig::none());
        assert!(ext.enabled.is_empty());
    }
}
