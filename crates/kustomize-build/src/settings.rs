//! Runtime settings resolved from the environment and command-line overrides.

use std::env::VarError;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::runner::DEFAULT_KUSTOMIZE;

/// Directory kustomize was invoked from; set by kustomize for exec plugins.
pub const CONFIG_ROOT_ENV: &str = "KUSTOMIZE_PLUGIN_CONFIG_ROOT";

/// Number of parallel builds, or `auto` for one per CPU.
pub const JOBS_ENV: &str = "KUSTOMIZE_BUILD_JOBS";

/// Program used to build each selected directory.
pub const KUSTOMIZE_BIN_ENV: &str = "KUSTOMIZE_BUILD_BIN";

/// Highest directory searched for the repository root.
pub const CEILING_DIR_ENV: &str = "KUSTOMIZE_BUILD_CEILING_DIR";

/// Values given on the command line; they take priority over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub working_dir: Option<PathBuf>,
    pub jobs: Option<String>,
    pub kustomize: Option<PathBuf>,
    pub build_args: Vec<String>,
    pub ceiling_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Absolute directory `pwd` globs are relative to.
    pub working_dir: PathBuf,
    /// Number of builds run at once; 1 builds sequentially during the walk.
    pub jobs: usize,
    /// Kustomize executable.
    pub kustomize: PathBuf,
    /// Extra arguments for `kustomize build`.
    pub build_args: Vec<String>,
    /// Absolute directory above which no repository root is searched.
    pub ceiling_dir: Option<PathBuf>,
}

impl Settings {
    /// Resolves settings from the process environment only.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(Overrides::default(), |name| std::env::var(name))
    }

    /// Resolves settings, preferring `overrides` and falling back to `lookup`
    /// for anything not given. Does not touch the filesystem.
    pub fn resolve<F>(overrides: Overrides, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let working_dir = match overrides.working_dir {
            Some(dir) => dir,
            None => lookup_var(&lookup, CONFIG_ROOT_ENV)?
                .map(PathBuf::from)
                .ok_or_else(|| ConfigError::MissingEnv {
                    name: CONFIG_ROOT_ENV.to_string(),
                })?,
        };

        if !working_dir.is_absolute() {
            return Err(ConfigError::InvalidSetting {
                name: CONFIG_ROOT_ENV.to_string(),
                value: working_dir.display().to_string(),
                reason: "must be an absolute path".to_string(),
            });
        }

        let jobs = match overrides.jobs {
            Some(value) => parse_jobs(&value)?,
            None => match lookup_var(&lookup, JOBS_ENV)? {
                Some(value) => parse_jobs(&value)?,
                None => 1,
            },
        };

        let kustomize = match overrides.kustomize {
            Some(program) => program,
            None => lookup_var(&lookup, KUSTOMIZE_BIN_ENV)?
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_KUSTOMIZE)),
        };

        let ceiling_dir = match overrides.ceiling_dir {
            Some(dir) => Some(dir),
            None => lookup_var(&lookup, CEILING_DIR_ENV)?.map(PathBuf::from),
        };
        if let Some(dir) = ceiling_dir.as_ref().filter(|dir| !dir.is_absolute()) {
            return Err(ConfigError::InvalidSetting {
                name: CEILING_DIR_ENV.to_string(),
                value: dir.display().to_string(),
                reason: "must be an absolute path".to_string(),
            });
        }

        Ok(Self {
            working_dir,
            jobs,
            kustomize,
            build_args: overrides.build_args,
            ceiling_dir,
        })
    }
}

/// Looks up `name`, treating unset and empty the same way.
fn lookup_var<F>(lookup: &F, name: &str) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    match lookup(name) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(ConfigError::EnvNotUnicode {
            name: name.to_string(),
        }),
    }
}

/// Parses a job count: a positive integer or `auto`.
pub fn parse_jobs(value: &str) -> Result<usize, ConfigError> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("auto") {
        return Ok(num_cpus::get().max(1));
    }

    match value.parse::<usize>() {
        Ok(0) => Err(ConfigError::InvalidSetting {
            name: JOBS_ENV.to_string(),
            value: value.to_string(),
            reason: "must be at least 1".to_string(),
        }),
        Ok(jobs) => Ok(jobs),
        Err(e) => Err(ConfigError::InvalidSetting {
            name: JOBS_ENV.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        }),
    }
}
