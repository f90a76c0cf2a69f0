use crate::analyzer::detector::BottleneckDetector;
use crate::analyzer::run::{analyze_directory, Analysis};
use crate::config::RESULTS_PREFIX;
use crate::error::{AnalyzeError, Result};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directories directly under `root` whose names start with `results_`, sorted by name
pub fn discover_run_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();

    for entry in fs::read_dir(root).map_err(|e| AnalyzeError::io(root, e))? {
        let entry = entry.map_err(|e| AnalyzeError::io(root, e))?;
        let name = entry.file_name();
        let name_str = name.to_string_lossy();

        if name_str.starts_with(RESULTS_PREFIX) && entry.path().is_dir() {
            dirs.push(entry.path());
        }
    }

    dirs.sort();
    debug!("Found {} run directories under {}", dirs.len(), root.display());
    Ok(dirs)
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub analyzed: usize,
    pub failed: Vec<PathBuf>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Analyze every directory, reporting each outcome through `on_done` in input order.
///
/// A failing directory is recorded in the summary and never stops the batch.
pub fn analyze_batch<F>(
    dirs: &[PathBuf],
    detector: &BottleneckDetector,
    parallel: bool,
    mut on_done: F,
) -> BatchSummary
where
    F: FnMut(&Path, &Result<Analysis>),
{
    let mut summary = BatchSummary::default();
    let mut record = |dir: &Path, outcome: Result<Analysis>| {
        on_done(dir, &outcome);
        match outcome {
            Ok(_) => summary.analyzed += 1,
            Err(e) => {
                debug!("Failed to analyze {}: {}", dir.display(), e);
                summary.failed.push(dir.to_path_buf());
            }
        }
    };

    if parallel {
        let outcomes: Vec<Result<Analysis>> = dirs
            .par_iter()
            .map(|dir| analyze_directory(dir, detector))
            .collect();
        for (dir, outcome) in dirs.iter().zip(outcomes) {
            record(dir, outcome);
        }
    } else {
        for dir in dirs {
            record(dir, analyze_directory(dir, detector));
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_only_prefixed_directories() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("results_putall_4")).unwrap();
        fs::create_dir(root.path().join("results_getall_16")).unwrap();
        fs::create_dir(root.path().join("plots")).unwrap();
        fs::write(root.path().join("results_notes.txt"), "not a dir").unwrap();

        let dirs = discover_run_dirs(root.path()).unwrap();
        let names: Vec<_> = dirs
            .iter()
            .map(|d| d.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["results_getall_16", "results_putall_4"]);
    }

    #[test]
    fn failures_do_not_stop_the_batch() {
        let root = tempfile::tempdir().unwrap();
        let good = root.path().join("results_getall_8");
        let bad = root.path().join("results_getput_8");
        fs::create_dir(&good).unwrap();
        fs::create_dir(&bad).unwrap();
        fs::write(good.join("summary.csv"), "threads,throughput_rps\n8,1200\n").unwrap();
        fs::write(bad.join("summary.csv"), "threads,throughput_rps\n").unwrap();

        let dirs = discover_run_dirs(root.path()).unwrap();
        for parallel in [false, true] {
            let mut seen = Vec::new();
            let summary = analyze_batch(&dirs, &BottleneckDetector::new(2), parallel, |dir, outcome| {
                seen.push((dir.to_path_buf(), outcome.is_ok()));
            });

            assert_eq!(summary.analyzed, 1);
            assert_eq!(summary.failed, vec![bad.clone()]);
            assert!(!summary.is_success());
            assert_eq!(seen, vec![(good.clone(), true), (bad.clone(), false)]);
        }
        assert!(good.join("analysis.json").is_file());
        assert!(!bad.join("analysis.json").exists());
    }
}
