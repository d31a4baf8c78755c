use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Path error: {0}")]
    Path(#[from] PathError),

    #[error("Unable to find git root in '{}' parents", start.display())]
    RepoRootNotFound { start: PathBuf },

    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    #[error("Failed to walk directory tree at '{path}': {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to write manifests: {0}")]
    Output(#[source] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML in '{path}': {message}")]
    ParseYaml { path: PathBuf, message: String },

    #[error("Invalid kind '{kind}' in '{path}', expected '{expected}'")]
    InvalidKind {
        path: PathBuf,
        kind: String,
        expected: String,
    },

    #[error("Invalid resource in '{path}': {message}")]
    InvalidResource { path: PathBuf, message: String },

    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("{name} is empty")]
    MissingEnv { name: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvNotUnicode { name: String },

    #[error("Invalid value '{value}' for {name}: {reason}")]
    InvalidSetting {
        name: String,
        value: String,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Path '{}' is not absolute", path.display())]
    NotAbsolute { path: PathBuf },

    #[error("Cannot express '{}' relative to '{}'", path.display(), base.display())]
    NotRelative { path: PathBuf, base: PathBuf },
}

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Failed to run '{program}' for '{}': {source}", path.display())]
    Spawn {
        program: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Build of '{}' failed ({status}): {stderr}", path.display())]
    Failed {
        path: PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Build of '{}' failed: {message}", path.display())]
    Other { path: PathBuf, message: String },

    #[error("Build worker pool stopped before '{}' was built", path.display())]
    Interrupted { path: PathBuf },
}

impl BuildError {
    /// Returns the directory whose build failed.
    pub fn path(&self) -> &std::path::Path {
        match self {
            BuildError::Spawn { path, .. }
            | BuildError::Failed { path, .. }
            | BuildError::Other { path, .. }
            | BuildError::Interrupted { path } => path,
        }
    }
}

pub type Result<T> = std::result::Result<T, GeneratorError>;
