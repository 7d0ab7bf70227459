//! Generator settings
//!
//! Every field has a default matching the gramods source layout, so a config
//! file is only needed to document a tree with different conventions:
//!
//! ```toml
//! suffixes = [".cpp", ".hh"]
//! module_prefix = "gm"
//! namespace = "gramods"
//! extension = "hh"
//! templates = "doc/templates"
//! ```

use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Error loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Module prefix must be a non-empty identifier, got {0:?}")]
    InvalidModulePrefix(String),
}

/// Settings for one generator run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// File name suffixes that are scanned
    pub suffixes: Vec<String>,
    /// Lowercase prefix of module directory names (`gm` in `gmCore`)
    pub module_prefix: String,
    /// C++ namespace enclosing all modules
    pub namespace: String,
    /// Extension of the generated pages
    pub extension: String,
    /// Directory with `<name>.hbs` files replacing built-in templates
    pub templates: Option<PathBuf>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            suffixes: vec![".cpp".to_string(), ".hh".to_string()],
            module_prefix: "gm".to_string(),
            namespace: "gramods".to_string(),
            extension: "hh".to_string(),
            templates: None,
        }
    }
}

impl GeneratorConfig {
    /// Load settings from a TOML file; missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would otherwise produce a broken module pattern.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid = !self.module_prefix.is_empty()
            && self
                .module_prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(ConfigError::InvalidModulePrefix(self.module_prefix.clone()));
        }
        Ok(())
    }
}

/// Preprocessor symbols considered defined while scanning.
///
/// `None` at the call sites means conditional-compilation tracking is off
/// and every line is scanned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Defines(BTreeSet<String>);

impl Defines {
    /// Parse a comma separated list, ignoring empty items and whitespace.
    pub fn parse(list: &str) -> Self {
        Self(
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.0.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
