//! Deterministic traversal of the repository tree.

use std::path::{Path, PathBuf};

use tracing::{info, trace};
use walkdir::WalkDir;

use crate::error::{GeneratorError, PathError, Result};
use crate::matcher::MatcherSet;
use crate::paths::Roots;

/// Walks every directory below the repository root, parents before children
/// and siblings in file-name order, and reports the selected ones.
pub struct DirectoryWalker<'a> {
    roots: &'a Roots,
    matchers: &'a MatcherSet,
}

impl<'a> DirectoryWalker<'a> {
    pub fn new(roots: &'a Roots, matchers: &'a MatcherSet) -> Self {
        Self { roots, matchers }
    }

    /// Returns whether any base selects `path`.
    ///
    /// Every base is translated and tested even after one matched, so a path
    /// that cannot be expressed in some base always surfaces as an error.
    pub fn is_selected(&self, path: &Path) -> std::result::Result<bool, PathError> {
        let mut selected = false;
        for (base, matcher) in self.matchers.iter() {
            let match_path = self.roots.translate(base, path)?;
            let verdict = matcher.matches(&match_path);
            trace!(base = %base, path = %match_path, verdict, "evaluated directory");
            selected |= verdict;
        }
        Ok(selected)
    }

    /// Calls `visit` for every selected directory in walk order. The first
    /// error, from the walk or from `visit`, stops the traversal.
    pub fn walk<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(&Path) -> Result<()>,
    {
        let root = self.roots.repo_root();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| GeneratorError::Walk {
                path: e.path().unwrap_or(root).to_path_buf(),
                source: e,
            })?;

            if !entry.file_type().is_dir() {
                continue;
            }

            if self.is_selected(entry.path())? {
                info!(directory = %entry.path().display(), "selected directory");
                visit(entry.path())?;
            }
        }

        Ok(())
    }

    /// Collects every selected directory in walk order.
    pub fn selected(&self) -> Result<Vec<PathBuf>> {
        let mut selected = Vec::new();
        self.walk(|path| {
            selected.push(path.to_path_buf());
            Ok(())
        })?;
        Ok(selected)
    }
}
