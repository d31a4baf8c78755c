//! Loader for the `KustomizeBuild` plugin configuration file.

use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::resource::{KustomizeBuild, KIND};

/// Reads and parses the plugin configuration at `path`.
pub fn load_spec(path: &Path) -> Result<KustomizeBuild, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_spec(&content, path)
}

/// Parses a plugin configuration from YAML (or JSON) content.
///
/// `path` is only used to label errors.
pub fn parse_spec(content: &str, path: &Path) -> Result<KustomizeBuild, ConfigError> {
    let resource: KustomizeBuild =
        serde_yaml::from_str(content).map_err(|e| ConfigError::ParseYaml {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if resource.kind != KIND {
        return Err(ConfigError::InvalidKind {
            path: path.to_path_buf(),
            kind: resource.kind,
            expected: KIND.to_string(),
        });
    }

    if resource.api_version.trim().is_empty() {
        return Err(ConfigError::InvalidResource {
            path: path.to_path_buf(),
            message: "apiVersion is required".to_string(),
        });
    }

    if resource.metadata.name.trim().is_empty() {
        return Err(ConfigError::InvalidResource {
            path: path.to_path_buf(),
            message: "metadata.name is required".to_string(),
        });
    }

    Ok(resource)
}
