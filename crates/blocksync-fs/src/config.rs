//! Format-agnostic configuration loading and saving

use crate::{Error, NormalizedPath, Result, io};
use serde::{Serialize, de::DeserializeOwned};

/// Serialization format, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Detect from a path's extension:
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    /// - `.yaml`, `.yml` -> YAML
    pub fn from_path(path: &NormalizedPath) -> Result<Self> {
        let extension = path.extension().unwrap_or("");
        match extension.to_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }
}

/// Format-agnostic configuration store.
///
/// Serialization is deterministic for a given value, so loading a file and
/// saving it again without changes reproduces the same bytes. Saves go through
/// [`io::write_atomic`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Load configuration from a file.
    pub fn load<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<T> {
        let format = ConfigFormat::from_path(path)?;
        let content = io::read_text(path)?;
        self.parse(path, format, &content)
    }

    /// Load configuration, or `T::default()` when the file does not exist.
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, path: &NormalizedPath) -> Result<T> {
        match self.load(path) {
            Err(e) if e.is_not_found() => {
                tracing::debug!(path = %path, "Config not found, using defaults");
                Ok(T::default())
            }
            other => other,
        }
    }

    /// Render a value in the format implied by `path` without writing it.
    pub fn render<T: Serialize>(&self, path: &NormalizedPath, value: &T) -> Result<String> {
        let format = ConfigFormat::from_path(path)?;
        let serialize_error = |message: String| Error::ConfigSerialize {
            path: path.to_native(),
            format: format.name().into(),
            message,
        };
        match format {
            ConfigFormat::Toml => {
                toml::to_string_pretty(value).map_err(|e| serialize_error(e.to_string()))
            }
            ConfigFormat::Json => serde_json::to_string_pretty(value)
                .map(|mut s| {
                    s.push('\n');
                    s
                })
                .map_err(|e| serialize_error(e.to_string())),
            ConfigFormat::Yaml => {
                serde_yaml::to_string(value).map_err(|e| serialize_error(e.to_string()))
            }
        }
    }

    /// Save configuration to a file atomically.
    pub fn save<T: Serialize>(&self, path: &NormalizedPath, value: &T) -> Result<()> {
        let content = self.render(path, value)?;
        io::write_atomic(path, content.as_bytes())
    }

    fn parse<T: DeserializeOwned>(
        &self,
        path: &NormalizedPath,
        format: ConfigFormat,
        content: &str,
    ) -> Result<T> {
        let parse_error = |message: String| Error::ConfigParse {
            path: path.to_native(),
            format: format.name().into(),
            message,
        };
        match format {
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
            ConfigFormat::Json => {
                serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))
            }
            ConfigFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))
            }
        }
    }
}
