use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, error, info};

use crate::error::BuildError;
use crate::manifest::Manifest;
use crate::runner::KustomizationRunner;

struct BuildJob {
    index: usize,
    dir: PathBuf,
}

struct BuildResult {
    index: usize,
    result: Result<Vec<Manifest>, BuildError>,
}

/// Fixed-size pool of threads building directories concurrently.
///
/// Results are stored by the position of their directory in the input, so
/// the output order never depends on which build finishes first. After the
/// first failure no new builds are started.
pub struct BuildPool<'a, R: ?Sized> {
    runner: &'a R,
    worker_count: usize,
}

impl<'a, R: KustomizationRunner + ?Sized> BuildPool<'a, R> {
    /// # Panics
    /// Panics if `worker_count` is 0.
    pub fn new(runner: &'a R, worker_count: usize) -> Self {
        assert!(worker_count > 0, "worker_count must be > 0");
        Self {
            runner,
            worker_count,
        }
    }

    /// Builds every directory and returns the documents of each, in input order.
    ///
    /// On failure the error of the earliest directory among the failed builds
    /// is returned and no partial results are handed out.
    pub fn build_all(&self, dirs: &[PathBuf]) -> Result<Vec<Vec<Manifest>>, BuildError> {
        if dirs.is_empty() {
            return Ok(Vec::new());
        }

        let worker_count = self.worker_count.min(dirs.len());
        let (job_sender, job_receiver) = unbounded::<BuildJob>();
        let (result_sender, result_receiver) = unbounded::<BuildResult>();
        let shutdown = AtomicBool::new(false);

        for (index, dir) in dirs.iter().enumerate() {
            // The receiver is alive until the scope below ends.
            let _ = job_sender.send(BuildJob {
                index,
                dir: dir.clone(),
            });
        }
        drop(job_sender);

        let mut slots: Vec<Option<Vec<Manifest>>> = vec![None; dirs.len()];
        let mut failure: Option<(usize, BuildError)> = None;

        thread::scope(|scope| {
            let mut workers = Vec::with_capacity(worker_count);
            for worker_id in 0..worker_count {
                let job_rx = job_receiver.clone();
                let result_tx = result_sender.clone();
                let shutdown = &shutdown;
                let runner = self.runner;

                workers.push(scope.spawn(move || {
                    run_worker(worker_id, job_rx, result_tx, shutdown, runner);
                }));
            }
            drop(result_sender);

            info!("Started {} build workers for {} directories", worker_count, dirs.len());

            for BuildResult { index, result } in result_receiver.iter() {
                match result {
                    Ok(manifests) => slots[index] = Some(manifests),
                    Err(e) => {
                        let earlier = failure.as_ref().map_or(true, |(i, _)| index < *i);
                        if earlier {
                            failure = Some((index, e));
                        }
                    }
                }
            }

            for (i, worker) in workers.into_iter().enumerate() {
                if let Err(e) = worker.join() {
                    error!("Build worker {} panicked: {:?}", i, e);
                } else {
                    debug!("Build worker {} finished", i);
                }
            }
        });

        if let Some((_, e)) = failure {
            return Err(e);
        }

        slots
            .into_iter()
            .zip(dirs)
            .map(|(slot, dir)| slot.ok_or_else(|| interrupted(dir)))
            .collect()
    }
}

fn interrupted(dir: &Path) -> BuildError {
    BuildError::Interrupted {
        path: dir.to_path_buf(),
    }
}

fn run_worker<R: KustomizationRunner + ?Sized>(
    worker_id: usize,
    job_receiver: Receiver<BuildJob>,
    result_sender: Sender<BuildResult>,
    shutdown: &AtomicBool,
    runner: &R,
) {
    debug!("Build worker {} started", worker_id);

    for job in job_receiver.iter() {
        if shutdown.load(Ordering::Relaxed) {
            debug!("Build worker {} received shutdown signal", worker_id);
            break;
        }

        debug!("Build worker {} building {}", worker_id, job.dir.display());
        let result = runner.run(&job.dir);
        if result.is_err() {
            shutdown.store(true, Ordering::Relaxed);
        }

        if let Err(e) = result_sender.send(BuildResult {
            index: job.index,
            result,
        }) {
            error!("Build worker {} failed to send result: {}", worker_id, e);
            break;
        }
    }

    debug!("Build worker {} stopped", worker_id);
}
