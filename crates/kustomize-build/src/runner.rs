//! Building a selected directory into resource documents.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use tracing::debug;

use crate::error::BuildError;
use crate::manifest::{split_documents, Manifest};

/// Default program used to build kustomizations.
pub const DEFAULT_KUSTOMIZE: &str = "kustomize";

/// Turns a kustomization directory into its rendered documents.
///
/// Implementations must not modify the tree they read and must return the
/// same documents for unchanged input. They are shared between worker
/// threads when builds run in parallel.
pub trait KustomizationRunner: Send + Sync {
    fn run(&self, dir: &Path) -> Result<Vec<Manifest>, BuildError>;
}

impl<R: KustomizationRunner + ?Sized> KustomizationRunner for Box<R> {
    fn run(&self, dir: &Path) -> Result<Vec<Manifest>, BuildError> {
        (**self).run(dir)
    }
}

impl<R: KustomizationRunner + ?Sized> KustomizationRunner for std::sync::Arc<R> {
    fn run(&self, dir: &Path) -> Result<Vec<Manifest>, BuildError> {
        (**self).run(dir)
    }
}

/// Runs `<program> build [args...] <dir>` and splits its stdout into documents.
#[derive(Debug, Clone)]
pub struct KustomizeCommand {
    program: PathBuf,
    args: Vec<String>,
}

impl KustomizeCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Extra arguments placed between `build` and the directory,
    /// e.g. `--enable-helm`.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn command(&self, dir: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(dir).arg("build").args(&self.args).arg(dir);
        cmd
    }
}

impl Default for KustomizeCommand {
    fn default() -> Self {
        Self::new(DEFAULT_KUSTOMIZE)
    }
}

impl KustomizationRunner for KustomizeCommand {
    fn run(&self, dir: &Path) -> Result<Vec<Manifest>, BuildError> {
        let started = Instant::now();

        let output = self
            .command(dir)
            .output()
            .map_err(|e| BuildError::Spawn {
                program: self.program.display().to_string(),
                path: dir.to_path_buf(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(BuildError::Failed {
                path: dir.to_path_buf(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let manifests = split_documents(&output.stdout);
        debug!(
            directory = %dir.display(),
            documents = manifests.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "built kustomization"
        );

        Ok(manifests)
    }
}
