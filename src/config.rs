use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// When the sub-collection builder issues a query instead of letting the
/// caller use the already-loaded collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionFetchPolicy {
    /// Query only when a filter, sort or pagination was configured.
    #[default]
    WhenConfigured,
    /// Always query, even with nothing configured.
    Always,
    /// Never query; the loaded collection is authoritative.
    Never,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub collection_fetch: CollectionFetchPolicy,
    pub default_page_size: usize,
    pub max_page_size: usize,
    /// Run the literal audit on every generated statement.
    pub audit_generated_text: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            collection_fetch: CollectionFetchPolicy::default(),
            default_page_size: 500,
            max_page_size: 10000,
            audit_generated_text: false,
        }
    }
}

impl EngineConfig {
    pub fn get_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hqlgen")
            .join("config.toml")
    }

    /// Load from `path`, or from the default location. A missing file yields
    /// the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::get_config_path(),
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        if config.default_page_size == 0 || config.default_page_size > config.max_page_size {
            anyhow::bail!(
                "default_page_size must be between 1 and max_page_size ({})",
                config.max_page_size
            );
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml("collection_fetch = \"always\"\n").unwrap();
        assert_eq!(config.collection_fetch, CollectionFetchPolicy::Always);
        assert_eq!(config.default_page_size, 500);
        assert_eq!(config.max_page_size, 10000);
        assert!(!config.audit_generated_text);
    }

    #[test]
    fn test_inconsistent_page_sizes_rejected() {
        let result = EngineConfig::from_toml("default_page_size = 50\nmax_page_size = 10\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config =
            EngineConfig::load(Some(Path::new("/nonexistent/hqlgen/config.toml"))).unwrap();
        assert_eq!(config, EngineConfig::default());
    }
}
