//! Turns a `KustomizeBuild` resource into the concatenated build output of
//! every directory it selects.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, info_span};

use crate::error::{GeneratorError, Result};
use crate::loader::load_spec;
use crate::manifest::ManifestSet;
use crate::matcher::MatcherSet;
use crate::paths::Roots;
use crate::pool::BuildPool;
use crate::resource::{DirectoryBase, KustomizeBuild};
use crate::runner::KustomizationRunner;
use crate::settings::Settings;
use crate::walker::DirectoryWalker;

pub struct Generator<'a, R: ?Sized> {
    runner: &'a R,
    jobs: usize,
    ceiling: Option<PathBuf>,
}

impl<'a, R: KustomizationRunner + ?Sized> Generator<'a, R> {
    /// Creates a generator that builds one directory at a time.
    pub fn new(runner: &'a R) -> Self {
        Self {
            runner,
            jobs: 1,
            ceiling: None,
        }
    }

    /// Sets how many builds may run at once. Values above 1 collect the
    /// selected directories first and build them on a [`BuildPool`].
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Keeps the repository root search from looking above `ceiling`.
    pub fn with_ceiling(mut self, ceiling: Option<PathBuf>) -> Self {
        self.ceiling = ceiling;
        self
    }

    /// Builds every selected directory and accumulates the documents in
    /// discovery order. Stops at the first error.
    pub fn generate(&self, resource: &KustomizeBuild, working_dir: &Path) -> Result<ManifestSet> {
        let span = info_span!("generate", name = resource.name(), jobs = self.jobs);
        let _enter = span.enter();

        // Patterns are validated before the filesystem is touched.
        let matchers = MatcherSet::from_spec(&resource.spec)?;
        let roots = Roots::discover(working_dir, self.ceiling.as_deref())?;
        info!(
            repo_root = %roots.repo_root().display(),
            working_dir = %roots.working_dir().display(),
            "resolved roots"
        );

        let mut manifests = ManifestSet::new();
        if matchers.is_empty() {
            debug!("no directories configured");
            return Ok(manifests);
        }

        let walker = DirectoryWalker::new(&roots, &matchers);
        if self.jobs == 1 {
            walker.walk(|dir| {
                manifests.extend(self.runner.run(dir)?);
                Ok(())
            })?;
        } else {
            let dirs = walker.selected()?;
            let built = BuildPool::new(self.runner, self.jobs).build_all(&dirs)?;
            for documents in built {
                manifests.extend(documents);
            }
        }

        info!(documents = manifests.len(), "generated manifests");
        Ok(manifests)
    }

    /// Generates and writes the whole stream to `out`. Nothing is written
    /// unless every build succeeded. Returns the number of documents.
    pub fn write_to<W: Write>(
        &self,
        resource: &KustomizeBuild,
        working_dir: &Path,
        out: &mut W,
    ) -> Result<usize> {
        let manifests = self.generate(resource, working_dir)?;
        out.write_all(&manifests.to_bytes())
            .and_then(|_| out.flush())
            .map_err(GeneratorError::Output)?;
        Ok(manifests.len())
    }
}

/// Loads the resource at `spec_path` and writes its manifests to `out`.
pub fn generate_manifests<R, W>(
    spec_path: &Path,
    settings: &Settings,
    runner: &R,
    out: &mut W,
) -> Result<usize>
where
    R: KustomizationRunner + ?Sized,
    W: Write,
{
    let resource = load_spec(spec_path)?;
    Generator::new(runner)
        .with_jobs(settings.jobs)
        .with_ceiling(settings.ceiling_dir.clone())
        .write_to(&resource, &settings.working_dir, out)
}

/// Lists the directories the resource at `spec_path` selects, relative to
/// the repository root.
pub fn list_directories(spec_path: &Path, settings: &Settings) -> Result<Vec<String>> {
    let resource = load_spec(spec_path)?;
    let matchers = MatcherSet::from_spec(&resource.spec)?;
    let roots = Roots::discover(&settings.working_dir, settings.ceiling_dir.as_deref())?;

    DirectoryWalker::new(&roots, &matchers)
        .selected()?
        .iter()
        .map(|dir| {
            roots
                .translate(DirectoryBase::Git, dir)
                .map_err(GeneratorError::from)
        })
        .collect()
}
