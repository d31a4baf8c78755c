//! Translation of walked directories into the coordinate system of each
//! directory base.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

use crate::error::{GeneratorError, PathError};
use crate::resource::DirectoryBase;

/// Name of the directory marking a repository root.
pub const REPO_MARKER: &str = ".git";

/// The two anchors globs are resolved against. Resolved once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roots {
    repo_root: PathBuf,
    working_dir: PathBuf,
}

impl Roots {
    pub fn new(repo_root: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
            working_dir: working_dir.into(),
        }
    }

    /// Finds the repository root above `working_dir` and pairs the two.
    /// The search never looks above `ceiling`.
    pub fn discover(
        working_dir: impl Into<PathBuf>,
        ceiling: Option<&Path>,
    ) -> Result<Self, GeneratorError> {
        let working_dir = working_dir.into();
        let repo_root = find_repo_root(&working_dir, ceiling)?;
        Ok(Self::new(repo_root, working_dir))
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Returns the string `path` is matched as under `base`.
    pub fn translate(&self, base: DirectoryBase, path: &Path) -> Result<String, PathError> {
        match base {
            DirectoryBase::Git => {
                let relative =
                    path.strip_prefix(&self.repo_root)
                        .map_err(|_| PathError::NotRelative {
                            path: path.to_path_buf(),
                            base: self.repo_root.clone(),
                        })?;
                to_slash(relative)
            }
            DirectoryBase::Pwd => relative_to(path, &self.working_dir),
        }
    }
}

/// Walks up from the parent of `working_dir` until a directory holding
/// [`REPO_MARKER`] is found. `ceiling` is the last directory examined.
pub fn find_repo_root(working_dir: &Path, ceiling: Option<&Path>) -> Result<PathBuf, GeneratorError> {
    for (depth, dir) in working_dir.ancestors().enumerate() {
        if depth > 0 && dir.join(REPO_MARKER).exists() {
            tracing::debug!(repo_root = %dir.display(), "found repository root");
            return Ok(dir.to_path_buf());
        }
        if Some(dir) == ceiling {
            tracing::debug!(ceiling = %dir.display(), "stopped at ceiling directory");
            break;
        }
    }

    Err(GeneratorError::RepoRootNotFound {
        start: working_dir.to_path_buf(),
    })
}

/// Expresses `path` relative to `base`, both absolute. Leading `..`
/// segments are produced for anything that is not below `base`.
pub fn relative_to(path: &Path, base: &Path) -> Result<String, PathError> {
    for p in [path, base] {
        if !p.is_absolute() {
            return Err(PathError::NotAbsolute {
                path: p.to_path_buf(),
            });
        }
    }

    let not_relative = || PathError::NotRelative {
        path: path.to_path_buf(),
        base: base.to_path_buf(),
    };

    // `..` in the base cannot be undone without touching the filesystem.
    if base.components().any(|c| c == Component::ParentDir) {
        return Err(not_relative());
    }

    let relative = pathdiff::diff_paths(path, base).ok_or_else(not_relative)?;

    to_slash(&relative)
}

/// Renders a relative path with `/` separators; the empty path becomes `.`.
/// Names that are not valid UTF-8 are rendered lossily.
fn to_slash(path: &Path) -> Result<String, PathError> {
    let mut parts: Vec<Cow<'_, str>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => parts.push(Cow::Borrowed("..")),
            Component::Normal(name) => parts.push(name.to_string_lossy()),
            Component::RootDir | Component::Prefix(_) => {
                return Err(PathError::NotRelative {
                    path: path.to_path_buf(),
                    base: PathBuf::new(),
                })
            }
        }
    }

    if parts.is_empty() {
        Ok(".".to_string())
    } else {
        Ok(parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn roots() -> Roots {
        Roots::new("/repo", "/repo/k8s")
    }

    #[test]
    fn test_git_base_is_relative_to_repo_root() {
        let roots = roots();
        assert_eq!(
            roots.translate(DirectoryBase::Git, Path::new("/repo/a/api")).unwrap(),
            "a/api"
        );
        assert_eq!(
            roots.translate(DirectoryBase::Git, Path::new("/repo")).unwrap(),
            "."
        );
    }

    #[test]
    fn test_git_base_outside_repo_fails() {
        let err = roots()
            .translate(DirectoryBase::Git, Path::new("/elsewhere/a"))
            .unwrap_err();
        assert!(matches!(err, PathError::NotRelative { .. }));
    }

    #[test]
    fn test_pwd_base_climbs_out_of_working_dir() {
        let roots = roots();
        assert_eq!(
            roots.translate(DirectoryBase::Pwd, Path::new("/repo/b/api")).unwrap(),
            "../b/api"
        );
        assert_eq!(
            roots.translate(DirectoryBase::Pwd, Path::new("/repo")).unwrap(),
            ".."
        );
        assert_eq!(
            roots.translate(DirectoryBase::Pwd, Path::new("/repo/k8s")).unwrap(),
            "."
        );
        assert_eq!(
            roots
                .translate(DirectoryBase::Pwd, Path::new("/repo/k8s/overlays/prod"))
                .unwrap(),
            "overlays/prod"
        );
    }

    #[test]
    fn test_relative_to_rejects_relative_input() {
        let err = relative_to(Path::new("a/b"), Path::new("/repo")).unwrap_err();
        assert!(matches!(err, PathError::NotAbsolute { .. }));
    }

    #[test]
    fn test_relative_to_unresolvable_base() {
        let err = relative_to(Path::new("/repo/a"), Path::new("/repo/x/../y")).unwrap_err();
        assert!(matches!(err, PathError::NotRelative { .. }));
    }

    #[test]
    fn test_find_repo_root_skips_working_dir_itself() {
        let dir = TempDir::new().unwrap();
        let outer = dir.path();
        let inner = outer.join("nested");
        let working_dir = inner.join("k8s");
        fs::create_dir_all(outer.join(REPO_MARKER)).unwrap();
        fs::create_dir_all(working_dir.join(REPO_MARKER)).unwrap();

        assert_eq!(find_repo_root(&working_dir, Some(outer)).unwrap(), outer);
    }

    #[test]
    fn test_find_repo_root_stops_at_nearest_ancestor() {
        let dir = TempDir::new().unwrap();
        let repo = dir.path().join("repo");
        let working_dir = repo.join("deploy/k8s");
        fs::create_dir_all(dir.path().join(REPO_MARKER)).unwrap();
        fs::create_dir_all(repo.join(REPO_MARKER)).unwrap();
        fs::create_dir_all(&working_dir).unwrap();

        let roots = Roots::discover(&working_dir, None).unwrap();
        assert_eq!(roots.repo_root(), repo);
        assert_eq!(roots.working_dir(), working_dir);
    }

    #[test]
    fn test_find_repo_root_not_found_below_ceiling() {
        let dir = TempDir::new().unwrap();
        let working_dir = dir.path().join("repo/k8s");
        fs::create_dir_all(&working_dir).unwrap();

        let err = find_repo_root(&working_dir, Some(dir.path())).unwrap_err();
        match err {
            GeneratorError::RepoRootNotFound { start } => assert_eq!(start, working_dir),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ceiling_is_examined_but_nothing_above_it() {
        let dir = TempDir::new().unwrap();
        let repo = dir.path().join("repo");
        let working_dir = repo.join("k8s");
        fs::create_dir_all(dir.path().join(REPO_MARKER)).unwrap();
        fs::create_dir_all(&working_dir).unwrap();

        // The marker sits above the ceiling.
        assert!(find_repo_root(&working_dir, Some(&repo)).is_err());

        fs::create_dir_all(repo.join(REPO_MARKER)).unwrap();
        assert_eq!(find_repo_root(&working_dir, Some(&repo)).unwrap(), repo);
    }

    #[test]
    fn test_working_dir_as_ceiling_finds_nothing() {
        let dir = TempDir::new().unwrap();
        let working_dir = dir.path().join("k8s");
        fs::create_dir_all(dir.path().join(REPO_MARKER)).unwrap();
        fs::create_dir_all(&working_dir).unwrap();

        assert!(find_repo_root(&working_dir, Some(&working_dir)).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_unicode_names_are_rendered_lossily() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new("/repo").join(OsStr::from_bytes(b"vendor\xff"));
        assert_eq!(
            roots().translate(DirectoryBase::Git, &path).unwrap(),
            "vendor\u{FFFD}"
        );
        assert_eq!(
            roots().translate(DirectoryBase::Pwd, &path).unwrap(),
            "../vendor\u{FFFD}"
        );
    }
}
