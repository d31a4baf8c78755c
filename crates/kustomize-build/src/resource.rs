//! K8s-style resource types for the `KustomizeBuild` plugin configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The kind every plugin configuration must declare.
pub const KIND: &str = "KustomizeBuild";

/// The coordinate system a glob pattern is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryBase {
    /// Relative to the repository root.
    Git,
    /// Relative to the directory kustomize was invoked from.
    Pwd,
}

impl DirectoryBase {
    /// Returns all directory bases.
    pub fn all() -> &'static [DirectoryBase] {
        &[DirectoryBase::Git, DirectoryBase::Pwd]
    }

    /// Returns the literal used for this base in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectoryBase::Git => "git",
            DirectoryBase::Pwd => "pwd",
        }
    }
}

impl std::fmt::Display for DirectoryBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DirectoryBase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "git" => Ok(DirectoryBase::Git),
            "pwd" => Ok(DirectoryBase::Pwd),
            _ => Err(format!("Unknown directory base: {}", s)),
        }
    }
}

/// Metadata for a resource, following K8s conventions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// The name of the plugin configuration.
    #[serde(default)]
    pub name: String,

    /// Key-value labels for organizing and selecting resources.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,

    /// Key-value annotations for storing additional metadata.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub annotations: HashMap<String, String>,
}

impl ObjectMeta {
    /// Creates a new ObjectMeta with just a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: HashMap::new(),
            annotations: HashMap::new(),
        }
    }

    /// Adds an annotation to the metadata.
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }
}

/// The `KustomizeBuild` plugin configuration handed over by kustomize.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KustomizeBuild {
    /// API version; free-form, kustomize uses it only for plugin lookup.
    pub api_version: String,

    /// Must be `KustomizeBuild`.
    pub kind: String,

    /// Resource metadata.
    pub metadata: ObjectMeta,

    /// The directory selectors.
    #[serde(default)]
    pub spec: KustomizeBuildSpec,
}

impl KustomizeBuild {
    /// Creates a new resource with the given API version, name and spec.
    pub fn new(
        api_version: impl Into<String>,
        name: impl Into<String>,
        spec: KustomizeBuildSpec,
    ) -> Self {
        Self {
            api_version: api_version.into(),
            kind: KIND.to_string(),
            metadata: ObjectMeta::new(name),
            spec,
        }
    }

    /// Returns the name of the resource.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

/// The `spec` section: an ordered list of directory selectors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KustomizeBuildSpec {
    #[serde(default)]
    pub directories: Vec<Directory>,
}

impl KustomizeBuildSpec {
    /// Returns the bases referenced by at least one directory entry, in
    /// [`DirectoryBase::all`] order.
    pub fn bases(&self) -> Vec<DirectoryBase> {
        DirectoryBase::all()
            .iter()
            .copied()
            .filter(|base| self.directories.iter().any(|d| d.base == *base))
            .collect()
    }

    /// Concatenates the globs of every entry with the given base, keeping
    /// the order in which entries and their globs were declared.
    pub fn merged_globs(&self, base: DirectoryBase) -> Vec<&str> {
        self.directories
            .iter()
            .filter(|d| d.base == base)
            .flat_map(|d| d.globs.iter().map(String::as_str))
            .collect()
    }
}

/// A set of glob patterns expressed in one base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Directory {
    pub base: DirectoryBase,

    #[serde(default)]
    pub globs: Vec<String>,
}

impl Directory {
    pub fn new<I, S>(base: DirectoryBase, globs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            base,
            globs: globs.into_iter().map(Into::into).collect(),
        }
    }
}
