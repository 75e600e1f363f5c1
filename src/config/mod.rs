pub mod settings;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Root directory of the vault the engine operates on.
    pub vault_directory: Option<PathBuf>,
    /// Locale tag used for user-facing messages, e.g. `en` or `zh-cn`.
    pub language: String,
    pub case_sensitive_by_default: bool,
    pub use_regex_by_default: bool,
    pub ignore_patterns: HashSet<String>,
    pub markdown_extensions: Vec<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        settings::load_config(None)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut ignore_patterns = HashSet::new();
        for pattern in [".trash/", "node_modules/", "*.excalidraw.md"] {
            ignore_patterns.insert(pattern.to_string());
        }

        Self {
            vault_directory: None,
            language: "en".to_string(),
            case_sensitive_by_default: true,
            use_regex_by_default: false,
            ignore_patterns,
            markdown_extensions: vec!["md".to_string()],
        }
    }
}
