//! Fixture repositories and a fake kustomize runner.

#![allow(dead_code)]

use std::env::VarError;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::TempDir;

use kustomize_build::{BuildError, KustomizationRunner, Manifest, Overrides, Settings};

/// Directories created in every fixture repository, relative to its root.
pub const FIXTURE_DIRS: &[&str] = &["a/api", "a/app", "b/api", "k8s"];

/// A temporary repository with a `.git` marker and a `k8s` working directory.
pub struct TestRepo {
    temp_dir: TempDir,
    /// Repository root.
    pub root: PathBuf,
    /// Working directory the plugin is invoked from.
    pub working_dir: PathBuf,
}

impl TestRepo {
    /// Create the standard tree: `.git`, `a/api`, `a/app`, `b/api`, `k8s`.
    pub fn new() -> Self {
        let repo = Self::without_marker();
        std::fs::create_dir_all(repo.root.join(".git")).expect("Failed to create .git");
        repo
    }

    /// Create the standard tree without the `.git` marker.
    pub fn without_marker() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().to_path_buf();
        for dir in FIXTURE_DIRS {
            std::fs::create_dir_all(root.join(dir)).expect("Failed to create fixture dir");
        }

        let working_dir = root.join("k8s");
        Self {
            temp_dir,
            root,
            working_dir,
        }
    }

    /// Write a plugin configuration file into the working directory.
    pub fn write_spec(&self, filename: &str, content: &str) -> PathBuf {
        let path = self.working_dir.join(filename);
        std::fs::write(&path, content).expect("Failed to write config file");
        path
    }

    /// Settings pointing at this repository, ignoring the process environment.
    /// The repository root search never leaves the temp directory.
    pub fn settings(&self, jobs: usize) -> Settings {
        let overrides = Overrides {
            working_dir: Some(self.working_dir.clone()),
            jobs: Some(jobs.to_string()),
            ceiling_dir: Some(self.root.clone()),
            ..Overrides::default()
        };
        Settings::resolve(overrides, |_| Err(VarError::NotPresent))
            .expect("Failed to resolve settings")
    }
}

/// In-process runner producing one ConfigMap per directory.
pub struct FakeRunner {
    root: PathBuf,
    fail_on: Option<PathBuf>,
    calls: Mutex<Vec<PathBuf>>,
}

impl FakeRunner {
    pub fn new(repo: &TestRepo) -> Self {
        Self {
            root: repo.root.clone(),
            fail_on: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail the build of `dir`, given relative to the repository root.
    pub fn failing_on(mut self, dir: &str) -> Self {
        self.fail_on = Some(self.root.join(dir));
        self
    }

    /// Directories built so far, relative to the repository root.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|dir| self.relative(dir))
            .collect()
    }

    fn relative(&self, dir: &Path) -> String {
        let relative = dir.strip_prefix(&self.root).unwrap().to_string_lossy();
        if relative.is_empty() {
            ".".to_string()
        } else {
            relative.replace('\\', "/")
        }
    }
}

impl KustomizationRunner for FakeRunner {
    fn run(&self, dir: &Path) -> Result<Vec<Manifest>, BuildError> {
        self.calls.lock().unwrap().push(dir.to_path_buf());

        if self.fail_on.as_deref() == Some(dir) {
            return Err(BuildError::Other {
                path: dir.to_path_buf(),
                message: "unable to find one of 'kustomization.yaml'".to_string(),
            });
        }

        Ok(vec![config_map(&self.relative(dir))])
    }
}

/// The document `FakeRunner` emits for a repository-relative directory.
pub fn config_map(dir: &str) -> Manifest {
    Manifest::new(format!(
        "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: {}\ndata:\n  path: {}\n",
        dir.replace('/', "-"),
        dir
    ))
}

/// The full output stream expected for `dirs`, in order.
pub fn expected_output(dirs: &[&str]) -> String {
    dirs.iter()
        .map(|dir| {
            let manifest = config_map(dir);
            format!(
                "---\n{}",
                String::from_utf8(manifest.as_bytes().to_vec()).unwrap()
            )
        })
        .collect()
}
