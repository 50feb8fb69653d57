//! Batch runner.
//! Classifies and dispatches each target independently, records one
//! [`OperationResult`] per target in input order, and never aborts early.
//!
//! Concurrency:
//! - Default: strictly serial.
//! - `parallel`: targets that share a parent directory, or where one lies
//!   inside another, form one group. Groups run on the rayon pool, each group
//!   serially in input order, so no two workers ever touch the same directory.

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use tracing::{debug, error, info, info_span, warn};

use crate::config::Config;
use crate::errors::TransformError;
use crate::shutdown;
use crate::transform::{apply_target, normalize, PlannedMove, Tool, TransformTarget};

#[derive(Debug)]
pub enum Outcome {
    Success,
    Skipped(TransformError),
    Failed(TransformError),
}

/// What happened to one target.
#[derive(Debug)]
pub struct OperationResult {
    /// The path exactly as it was given.
    pub target: PathBuf,
    pub outcome: Outcome,
    pub destination: Option<PathBuf>,
    pub moves: Vec<PlannedMove>,
    pub warnings: Vec<String>,
    pub dry_run: bool,
}

impl OperationResult {
    fn rejected(target: &Path, err: TransformError, dry_run: bool) -> Self {
        let outcome = if err.is_skip() {
            Outcome::Skipped(err)
        } else {
            Outcome::Failed(err)
        };
        Self::unfinished(target, outcome, dry_run)
    }

    fn unfinished(target: &Path, outcome: Outcome, dry_run: bool) -> Self {
        Self {
            target: target.to_path_buf(),
            outcome,
            destination: None,
            moves: Vec::new(),
            warnings: Vec::new(),
            dry_run,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success)
    }

    pub fn error(&self) -> Option<&TransformError> {
        match &self.outcome {
            Outcome::Success => None,
            Outcome::Skipped(e) | Outcome::Failed(e) => Some(e),
        }
    }

    /// Human-readable reason for a non-success.
    pub fn reason(&self) -> Option<String> {
        self.error().map(ToString::to_string)
    }

    pub fn status_label(&self) -> &'static str {
        match self.outcome {
            Outcome::Success => "ok",
            Outcome::Skipped(_) => "skipped",
            Outcome::Failed(_) => "failed",
        }
    }
}

/// Ordered results of one invocation plus the success/failure tally.
#[derive(Debug)]
pub struct BatchReport {
    results: Vec<OperationResult>,
    succeeded: usize,
    failed: usize,
}

impl BatchReport {
    pub fn from_results(results: Vec<OperationResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        let failed = results.len() - succeeded;
        Self {
            results,
            succeeded,
            failed,
        }
    }

    pub fn results(&self) -> &[OperationResult] {
        &self.results
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    /// Skipped targets count as failed.
    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn exit_code(&self) -> i32 {
        if self.failed == 0 { 0 } else { 1 }
    }
}

pub struct BatchRunner<'a> {
    config: &'a Config,
    tool: Tool,
}

impl<'a> BatchRunner<'a> {
    pub fn new(config: &'a Config, tool: Tool) -> Self {
        Self { config, tool }
    }

    pub fn run(&self, targets: &[PathBuf]) -> BatchReport {
        self.run_with_progress(targets, |_| {})
    }

    /// Like [`run`](Self::run), calling `on_result` for each result as soon as
    /// its target finishes. In parallel mode that is completion order; the
    /// report itself is always in input order.
    pub fn run_with_progress<F>(&self, targets: &[PathBuf], mut on_result: F) -> BatchReport
    where
        F: FnMut(&OperationResult),
    {
        let results: Vec<OperationResult> = if self.config.parallel {
            self.run_grouped(targets, &mut on_result)
        } else {
            targets
                .iter()
                .map(|t| {
                    let result = self.process(t);
                    on_result(&result);
                    result
                })
                .collect()
        };

        let report = BatchReport::from_results(results);
        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Batch finished"
        );
        report
    }

    fn run_grouped<F>(&self, targets: &[PathBuf], on_result: &mut F) -> Vec<OperationResult>
    where
        F: FnMut(&OperationResult),
    {
        let groups = group_targets(targets);
        debug!(targets = targets.len(), groups = groups.len(), "parallel batch");

        let (tx, rx) = mpsc::channel::<(usize, OperationResult)>();
        let mut indexed = Vec::with_capacity(targets.len());
        thread::scope(|s| {
            s.spawn(|| {
                groups.par_iter().for_each_with(tx, |tx, group| {
                    for &i in group {
                        // The receiver outlives every sender.
                        let _ = tx.send((i, self.process(&targets[i])));
                    }
                });
            });
            for (i, result) in rx {
                on_result(&result);
                indexed.push((i, result));
            }
        });

        indexed.sort_by_key(|(i, _)| *i);
        indexed.into_iter().map(|(_, r)| r).collect()
    }

    fn process(&self, path: &Path) -> OperationResult {
        let span = info_span!("target", path = %path.display());
        let _enter = span.enter();
        let dry_run = self.config.dry_run;

        if shutdown::is_requested() {
            warn!("interrupt requested; not starting");
            return OperationResult::unfinished(
                path,
                Outcome::Skipped(TransformError::Interrupted),
                dry_run,
            );
        }

        let target = TransformTarget::classify(path, &self.config.source_extension);
        match apply_target(self.config, self.tool, &target) {
            Ok(applied) => OperationResult {
                target: path.to_path_buf(),
                outcome: Outcome::Success,
                destination: Some(applied.destination),
                moves: applied.moves,
                warnings: applied.warnings,
                dry_run,
            },
            Err(e) => {
                if e.is_skip() {
                    warn!(code = e.code(), error = %e, "Target skipped");
                } else {
                    error!(code = e.code(), error = %e, "Target failed");
                }
                OperationResult::rejected(path, e, dry_run)
            }
        }
    }
}

/// Target path with its parent canonicalized; the final component is kept as given
/// so a symlinked target is not replaced by what it points at.
fn anchored(path: &Path) -> PathBuf {
    let target = normalize(path);
    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let parent = dunce::canonicalize(&parent).unwrap_or(parent);
    match target.file_name() {
        Some(name) => parent.join(name),
        None => parent,
    }
}

/// Indices of targets that must run serially, each group in input order.
/// Two targets conflict when they share a parent directory or one lies inside the other.
fn group_targets(targets: &[PathBuf]) -> Vec<Vec<usize>> {
    let paths: Vec<PathBuf> = targets.iter().map(|t| anchored(t)).collect();
    let parents: Vec<&Path> = paths.iter().map(|p| p.parent().unwrap_or(p.as_path())).collect();

    // Union-find over target indices; the smallest index is the root.
    let mut leader: Vec<usize> = (0..targets.len()).collect();
    fn find(leader: &mut [usize], mut i: usize) -> usize {
        while leader[i] != i {
            leader[i] = leader[leader[i]];
            i = leader[i];
        }
        i
    }

    for i in 0..paths.len() {
        for j in 0..i {
            let related = parents[i] == parents[j]
                || paths[i].starts_with(&paths[j])
                || paths[j].starts_with(&paths[i]);
            if related {
                let (a, b) = (find(&mut leader, i), find(&mut leader, j));
                leader[a.max(b)] = a.min(b);
            }
        }
    }

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut slot_of_root = vec![usize::MAX; targets.len()];
    for i in 0..targets.len() {
        let root = find(&mut leader, i);
        if slot_of_root[root] == usize::MAX {
            slot_of_root[root] = groups.len();
            groups.push(Vec::new());
        }
        groups[slot_of_root[root]].push(i);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn report_counts_skips_as_failures() {
        let root = assert_fs::TempDir::new().unwrap();
        let a = root.child("a");
        a.create_dir_all().unwrap();
        let missing = root.path().join("missing");

        let config = Config::default();
        let report = BatchRunner::new(&config, Tool::Flatten).run(&[a.path().to_path_buf(), missing]);

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.results()[1].status_label(), "skipped");
        assert!(report.results()[1].reason().unwrap().contains("Not a directory"));
    }

    #[test]
    fn empty_batch_is_clean() {
        let config = Config::default();
        let report = BatchRunner::new(&config, Tool::Pack).run(&[]);
        assert_eq!(report.exit_code(), 0);
        assert!(report.results().is_empty());
    }

    #[test]
    fn siblings_share_a_group() {
        let root = assert_fs::TempDir::new().unwrap();
        root.child("x").create_dir_all().unwrap();
        root.child("y").create_dir_all().unwrap();
        let groups = group_targets(&[root.path().join("x"), root.path().join("y")]);
        assert_eq!(groups, vec![vec![0, 1]]);
    }

    #[test]
    fn nested_targets_share_a_group_in_input_order() {
        let root = assert_fs::TempDir::new().unwrap();
        root.child("a/b").create_dir_all().unwrap();
        root.child("c/d").create_dir_all().unwrap();
        let targets = vec![
            root.path().join("a/b"),
            root.path().join("c/d"),
            root.path().join("a"),
        ];
        assert_eq!(group_targets(&targets), vec![vec![0, 2], vec![1]]);
    }

    #[test]
    fn containment_is_transitive() {
        let root = assert_fs::TempDir::new().unwrap();
        root.child("a/b/c").create_dir_all().unwrap();
        root.child("a/e").create_dir_all().unwrap();
        let targets = vec![
            root.path().join("a/b/c"),
            root.path().join("a/e"),
            root.path().join("a/b"),
        ];
        // a/b/c is inside a/b, and a/b shares its parent with a/e.
        assert_eq!(group_targets(&targets), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn parallel_progress_sees_every_result() {
        let root = assert_fs::TempDir::new().unwrap();
        for name in ["p/one", "q/two", "r/three"] {
            root.child(name).create_dir_all().unwrap();
        }
        let targets: Vec<PathBuf> = ["p/one", "q/two", "r/three"]
            .iter()
            .map(|n| root.path().join(n))
            .collect();

        let config = Config {
            parallel: true,
            ..Config::default()
        };
        let mut seen = Vec::new();
        let report = BatchRunner::new(&config, Tool::Flatten)
            .run_with_progress(&targets, |r| seen.push(r.target.clone()));

        seen.sort();
        let mut expected = targets.clone();
        expected.sort();
        assert_eq!(seen, expected);
        let order: Vec<_> = report.results().iter().map(|r| r.target.clone()).collect();
        assert_eq!(order, targets);
    }

    #[test]
    fn progress_sees_every_result_in_order() {
        let root = assert_fs::TempDir::new().unwrap();
        root.child("one").create_dir_all().unwrap();
        root.child("two").create_dir_all().unwrap();
        let targets = vec![root.path().join("two"), root.path().join("one")];

        let config = Config::default();
        let mut seen = Vec::new();
        BatchRunner::new(&config, Tool::Flatten)
            .run_with_progress(&targets, |r| seen.push(r.target.clone()));
        assert_eq!(seen, targets);
    }
}
