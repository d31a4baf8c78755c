pub mod error;
pub mod generator;
pub mod loader;
pub mod manifest;
pub mod matcher;
pub mod paths;
pub mod pool;
pub mod resource;
pub mod runner;
pub mod settings;
pub mod walker;

pub use error::{BuildError, ConfigError, GeneratorError, PathError, Result};
pub use generator::{generate_manifests, list_directories, Generator};
pub use loader::{load_spec, parse_spec};
pub use manifest::{Manifest, ManifestSet, YAML_SEPARATOR};
pub use matcher::{MatcherSet, PatternMatcher};
pub use paths::Roots;
pub use pool::BuildPool;
pub use resource::{Directory, DirectoryBase, KustomizeBuild, KustomizeBuildSpec, ObjectMeta};
pub use runner::{KustomizationRunner, KustomizeCommand};
pub use settings::{Overrides, Settings};
pub use walker::DirectoryWalker;
