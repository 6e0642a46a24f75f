use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use quillmark_renderer::Theme;
use serde::Deserialize;
use thiserror::Error;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "quillmark.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file at {}: {source}", .config_path.display())]
    Read {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file at {}: {source}", .config_path.display())]
    Parse {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("unknown theme {name:?} in {} (expected auto, light or dark)", .config_path.display())]
    UnknownTheme { config_path: PathBuf, name: String },
}

/// Settings read from `quillmark.toml`. Every field is optional; command-line
/// flags take precedence.
#[derive(Debug, Default, PartialEq)]
pub struct Config {
    pub theme: Option<Theme>,
    pub raw: Option<bool>,
    pub class_name: Option<String>,
    /// CSS custom properties, keyed with or without the leading `--`.
    pub vars: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    theme: Option<String>,
    raw: Option<bool>,
    class_name: Option<String>,
    vars: BTreeMap<String, String>,
}

impl Config {
    /// Loads an explicitly requested file; a missing file is an error.
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_path = config_path.as_ref();
        let content =
            std::fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
                config_path: config_path.to_path_buf(),
                source,
            })?;
        Self::from_toml(&content, config_path)
    }

    /// Loads `quillmark.toml` from `dir` when present.
    pub fn discover(dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);
        if !config_path.exists() {
            return Ok(None);
        }
        Self::load_from_path(&config_path).map(Some)
    }

    fn from_toml(content: &str, config_path: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            config_path: config_path.to_path_buf(),
            source,
        })?;

        let theme = match raw.theme {
            Some(name) => Some(Theme::from_name(&name).ok_or_else(|| {
                ConfigError::UnknownTheme {
                    config_path: config_path.to_path_buf(),
                    name,
                }
            })?),
            None => None,
        };

        tracing::debug!(path = %config_path.display(), "loaded config");
        Ok(Config {
            theme,
            raw: raw.raw,
            class_name: raw.class_name,
            vars: raw.vars,
        })
    }
}
