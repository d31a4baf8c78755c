//! Builder for `KustomizeBuild` resources used by the scenarios.

#![allow(dead_code)]

use kustomize_build::{Directory, DirectoryBase, KustomizeBuild, KustomizeBuildSpec};

pub struct SpecBuilder {
    api_version: String,
    name: String,
    directories: Vec<Directory>,
}

impl SpecBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            api_version: "incognia.com/v1alpha1".to_string(),
            name: name.to_string(),
            directories: Vec::new(),
        }
    }

    /// Add a directory entry with repository-relative globs.
    pub fn git(self, globs: &[&str]) -> Self {
        self.directory(DirectoryBase::Git, globs)
    }

    /// Add a directory entry with working-directory-relative globs.
    pub fn pwd(self, globs: &[&str]) -> Self {
        self.directory(DirectoryBase::Pwd, globs)
    }

    pub fn directory(mut self, base: DirectoryBase, globs: &[&str]) -> Self {
        self.directories
            .push(Directory::new(base, globs.iter().copied()));
        self
    }

    pub fn build(self) -> KustomizeBuild {
        KustomizeBuild::new(
            self.api_version,
            self.name,
            KustomizeBuildSpec {
                directories: self.directories,
            },
        )
    }

    pub fn to_yaml(self) -> String {
        serde_yaml::to_string(&self.build()).expect("Failed to serialize resource")
    }
}
