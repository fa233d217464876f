//! Deferred evaluation of per-file selection graphs
//!
//! A `Deferred<T>` is a list of pure, re-runnable tasks, one per input file,
//! each producing a partial result that merges into the total. The graph is
//! built eagerly but does nothing until `compute` is called; evaluation is
//! delegated to a pluggable scheduler and touches no shared mutable state,
//! so re-running the same graph yields identical results.
//!
//! File-read failures abort evaluation with the first error, unless the
//! caller opts into a per-file report: then valid files still contribute and
//! the failures are listed alongside the partial result.

use std::error::Error;
use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

pub type TaskError = Box<dyn Error + Send + Sync>;
type Task<T> = Box<dyn Fn() -> Result<T, TaskError> + Send + Sync>;

/// Partial results that combine into a total: probe-array concatenation or
/// histogram addition.
pub trait Merge: Default {
    fn merge(&mut self, other: Self);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scheduler {
    SingleThreaded,
    /// Evaluate tasks on a rayon pool with this many worker threads.
    Threads(usize),
}

impl Default for Scheduler {
    fn default() -> Self { Scheduler::SingleThreaded }
}

/// Outcome of one evaluated source file.
#[derive(Clone, Debug)]
pub struct FileOutcome {
    pub source: PathBuf,
    /// `None` when the file contributed to the result.
    pub error: Option<String>,
}

/// Per-file outcomes of a `compute_with_report` evaluation.
#[derive(Clone, Debug, Default)]
pub struct RunReport {
    pub files: Vec<FileOutcome>,
}

impl RunReport {
    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files.iter().filter(|f| f.error.is_some())
    }
}

pub struct Deferred<T> {
    sources: Vec<PathBuf>,
    tasks: Vec<Task<T>>,
}

impl<T> Default for Deferred<T> {
    fn default() -> Self { Self::new() }
}

impl<T> Deferred<T> {

    pub fn new() -> Self { Self { sources: vec![], tasks: vec![] } }

    pub fn push(
        &mut self,
        source: PathBuf,
        task: impl Fn() -> Result<T, TaskError> + Send + Sync + 'static,
    ) {
        self.sources.push(source);
        self.tasks.push(Box::new(task));
    }

    pub fn n_tasks(&self) -> usize { self.tasks.len() }
    pub fn sources(&self) -> &[PathBuf] { &self.sources }
}

impl<T: Merge + Send> Deferred<T> {

    /// Evaluate the graph; the first file error aborts the whole computation.
    pub fn compute(&self, scheduler: Scheduler, progress: bool) -> Result<T, TaskError> {
        let bar = self.progress_bar(progress);
        let run = |task: &Task<T>| {
            let result = task();
            bar.inc(1);
            result
        };
        let merged = match scheduler {
            Scheduler::SingleThreaded => {
                let mut total = T::default();
                for task in &self.tasks {
                    total.merge(run(task)?);
                }
                Ok(total)
            }
            Scheduler::Threads(n) => {
                let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
                pool.install(|| {
                    self.tasks.par_iter()
                        .map(run)
                        .try_reduce(T::default, |mut a, b| { a.merge(b); Ok(a) })
                })
            }
        };
        bar.finish_and_clear();
        merged
    }

    /// Evaluate the graph, collecting per-file outcomes instead of aborting:
    /// results from readable files survive failures of the others.
    pub fn compute_with_report(&self, scheduler: Scheduler, progress: bool) -> (T, RunReport) {
        let bar = self.progress_bar(progress);
        let run = |(source, task): (&PathBuf, &Task<T>)| {
            let result = task();
            bar.inc(1);
            let error = result.as_ref().err().map(|e| e.to_string());
            (result.ok(), FileOutcome { source: source.clone(), error })
        };
        let zipped = self.sources.iter().zip(&self.tasks);
        let outcomes: Vec<(Option<T>, FileOutcome)> = match scheduler {
            Scheduler::SingleThreaded => zipped.map(run).collect(),
            Scheduler::Threads(n) => {
                match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
                    Ok(pool) => pool.install(|| {
                        self.sources.par_iter().zip(&self.tasks).map(run).collect()
                    }),
                    // Pool creation failure is an environment problem, not a
                    // file problem: fall back to in-place evaluation.
                    Err(_) => zipped.map(run).collect(),
                }
            }
        };
        bar.finish_and_clear();

        let mut total = T::default();
        let mut report = RunReport::default();
        for (partial, outcome) in outcomes {
            if let Some(p) = partial { total.merge(p); }
            report.files.push(outcome);
        }
        (total, report)
    }

    fn progress_bar(&self, visible: bool) -> ProgressBar {
        if !visible { return ProgressBar::hidden(); }
        let bar = ProgressBar::new(self.tasks.len() as u64);
        bar.set_style(ProgressStyle::default_bar()
                      .template("[{elapsed_precise}] {wide_bar} {pos}/{len} files ({eta_precise})")
                      .unwrap_or_else(|_| ProgressStyle::default_bar()));
        bar
    }
}
