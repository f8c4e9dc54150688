//! Built-in extensions.
//!
//! This module provides:
//! - A list of all built-in extensions
//! - Metadata for listing them
//! - Factory and filter helpers for selective loading

use crate::{
    autolink::AutolinkExtension,
    latex::{LatexBlockExtension, LatexInlineExtension},
    strikethrough::StrikethroughExtension,
    table::TableExtension,
    tagfilter::TagfilterExtension,
    tasklist::TasklistExtension,
};
use std::sync::Arc;
use texmark_core::SyntaxExtension;

/// Get all built-in extensions, in registration order.
pub fn builtin_extensions() -> Vec<Arc<dyn SyntaxExtension>> {
    builtin_extension_info()
        .iter()
        .filter_map(|info| create_extension(info.name))
        .collect()
}

/// Extension metadata.
#[derive(Debug, Clone)]
pub struct ExtensionInfo {
    /// Registered name
    pub name: &'static str,
    /// Short description
    pub description: &'static str,
    /// Whether the default configuration enables it
    pub default_enabled: bool,
}

/// Get information about all built-in extensions.
pub fn builtin_extension_info() -> Vec<ExtensionInfo> {
    vec![
        ExtensionInfo {
            name: "autolink",
            description: "Links bare www. and http(s)/ftp URLs",
            default_enabled: true,
        },
        ExtensionInfo {
            name: "table",
            description: "Pipe tables with a delimiter row",
            default_enabled: true,
        },
        ExtensionInfo {
            name: "strikethrough",
            description: "Strikes out text between ~~ delimiters",
            default_enabled: true,
        },
        ExtensionInfo {
            name: "tagfilter",
            description: "Escapes script, style and similar tags in raw HTML output",
            default_enabled: true,
        },
        ExtensionInfo {
            name: "tasklist",
            description: "Turns [ ] and [x] list items into task items",
            default_enabled: true,
        },
        ExtensionInfo {
            name: "latex_block",
            description: "Display math between $$ delimiters",
            default_enabled: true,
        },
        ExtensionInfo {
            name: "latex_inline",
            description: "Inline math between \\\\( and \\\\)",
            default_enabled: true,
        },
    ]
}

/// Create an extension by name.
///
/// # Returns
/// - `Some(extension)` if the name matches a built-in extension
/// - `None` if the name is not recognized
pub fn create_extension(name: &str) -> Option<Arc<dyn SyntaxExtension>> {
    match name {
        "autolink" => Some(Arc::new(AutolinkExtension::new())),
        "table" => Some(Arc::new(TableExtension::new())),
        "strikethrough" => Some(Arc::new(StrikethroughExtension::new())),
        "tagfilter" => Some(Arc::new(TagfilterExtension::new())),
        "tasklist" => Some(Arc::new(TasklistExtension::new())),
        "latex_block" => Some(Arc::new(LatexBlockExtension::new())),
        "latex_inline" => Some(Arc::new(LatexInlineExtension::new())),
        _ => None,
    }
}

/// Extension filter for selective loading.
#[derive(Debug, Clone, Default)]
pub struct ExtensionFilter {
    /// Extensions to include (if empty, include all)
    pub include: Vec<String>,
    /// Extensions to exclude
    pub exclude: Vec<String>,
}

impl ExtensionFilter {
    /// Create a filter that includes all extensions.
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter that includes no extensions.
    pub fn none() -> Self {
        Self {
            include: vec![],
            exclude: vec!["*".to_string()],
        }
    }

    /// Create a filter that only includes specific extensions.
    pub fn only(names: Vec<String>) -> Self {
        Self {
            include: names,
            exclude: vec![],
        }
    }

    /// Check if an extension should be loaded.
    pub fn should_load(&self, name: &str) -> bool {
        // A wildcard exclude leaves only what is named explicitly
        if self.exclude.iter().any(|n| n == "*") {
            return self.include.iter().any(|n| n == name);
        }
        if self.exclude.iter().any(|n| n == name) {
            return false;
        }

        if self.include.is_empty() {
            return true;
        }
        self.include.iter().any(|n| n == name)
    }
}

/// Load built-in extensions with a filter.
pub fn load_builtin_extensions(filter: &ExtensionFilter) -> Vec<Arc<dyn SyntaxExtension>> {
    builtin_extension_info()
        .iter()
        .filter(|info| filter.should_load(info.name))
        .filter_map(|info| create_extension(info.name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_extensions() {
        let names: Vec<_> = builtin_extensions()
            .iter()
            .map(|e| e.name().to_string())
            .collect();
        assert_eq!(
            names,
            [
                "autolink",
                "table",
                "strikethrough",
                "tagfilter",
                "tasklist",
                "latex_block",
                "latex_inline"
            ]
        );
    }

    #[test]
    fn test_builtin_extension_info() {
        let info = builtin_extension_info();
        let latex = info.iter().find(|i| i.name == "latex_inline").unwrap();
        assert!(latex.default_enabled);
        assert!(info.iter().all(|i| create_extension(i.name).is_some()));
    }

    #[test]
    fn test_create_extension() {
        let block = create_extension("latex_block").unwrap();
        assert_eq!(block.name(), "latex_block");
        assert_eq!(create_extension("table").unwrap().name(), "table");
        assert!(create_extension("mermaid").is_none());
    }

    #[test]
    fn test_extension_filter_all() {
        let filter = ExtensionFilter::all();
        assert!(filter.should_load("latex_block"));
        assert!(filter.should_load("any"));
    }

    #[test]
    fn test_extension_filter_none() {
        let filter = ExtensionFilter::none();
        assert!(!filter.should_load("latex_block"));
        assert!(!filter.should_load("any"));
    }

    #[test]
    fn test_extension_filter_only() {
        let filter = ExtensionFilter::only(vec!["latex_inline".to_string()]);
        assert!(filter.should_load("latex_inline"));
        assert!(!filter.should_load("latex_block"));
    }

    #[test]
    fn test_extension_filter_exclude() {
        let mut filter = ExtensionFilter::all();
        filter.exclude.push("autolink".to_string());
        assert!(!filter.should_load("autolink"));
        assert!(filter.should_load("strikethrough"));
    }

    #[test]
    fn test_load_builtin_extensions() {
        assert_eq!(load_builtin_extensions(&ExtensionFilter::all()).len(), 7);
        assert!(load_builtin_extensions(&ExtensionFilter::none()).is_empty());

        let mut filter = ExtensionFilter::none();
        filter.include.push("latex_block".to_string());
        let loaded = load_builtin_extensions(&filter);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name(), "latex_block");
    }
}
