//! Per-workload thread sweeps assembled from run summaries.
//!
//! Each workload gets one table ordered by thread count, ready for whatever
//! charting tool consumes it.

use crate::analyzer::Bottleneck;
use crate::config::{RunName, ANALYSIS_JSON, SUMMARY_CSV};
use crate::error::{AnalyzeError, Result};
use crate::parse::parse_summary_csv;
use crate::record::{MetricRecord, MetricValue};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRow {
    pub threads: u32,
    pub throughput_rps: Option<f64>,
    pub avg_ms: Option<f64>,
    pub p50_ms: Option<f64>,
    pub p90_ms: Option<f64>,
    pub p99_ms: Option<f64>,
    pub bottleneck: Option<Bottleneck>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sweep {
    pub workloads: BTreeMap<String, Vec<SweepRow>>,
}

impl Sweep {
    pub fn is_empty(&self) -> bool {
        self.workloads.is_empty()
    }
}

/// A single plain path component, so `<out>/<workload>.csv` stays inside `out`
fn is_file_stem(workload: &str) -> bool {
    let mut components = Path::new(workload).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(c)), None) if c == workload
    )
}

fn sweep_row(name: &RunName, summary: &MetricRecord, bottleneck: Option<Bottleneck>) -> (String, SweepRow) {
    let workload = match summary.get("workload").and_then(MetricValue::as_str).map(str::trim) {
        Some(w) if is_file_stem(w) => w.to_string(),
        Some(w) if !w.is_empty() => {
            warn!("Workload {:?} is not usable as a file name, using {} instead", w, name.workload);
            name.workload.clone()
        }
        _ => name.workload.clone(),
    };
    let threads = summary
        .number("threads")
        .filter(|t| *t >= 0.0 && *t <= u32::MAX as f64)
        .map(|t| t as u32)
        .unwrap_or(name.threads);

    let row = SweepRow {
        threads,
        throughput_rps: summary.number("throughput_rps"),
        avg_ms: summary.number("avg_ms"),
        p50_ms: summary.number("p50_ms"),
        p90_ms: summary.number("p90_ms"),
        p99_ms: summary.number("p99_ms"),
        bottleneck,
    };
    (workload, row)
}

fn read_bottleneck(dir: &Path) -> Option<Bottleneck> {
    let text = fs::read_to_string(dir.join(ANALYSIS_JSON)).ok()?;
    let artifact: MetricRecord = serde_json::from_str(&text)
        .map_err(|e| debug!("Ignoring unreadable {} in {}: {}", ANALYSIS_JSON, dir.display(), e))
        .ok()?;
    artifact.get("bottleneck")?.as_str()?.parse().ok()
}

/// Group the summaries of every `results_<workload>_<threads>` directory under `root`
pub fn collect_sweep(root: &Path) -> Result<Sweep> {
    let mut sweep = Sweep::default();

    for entry in fs::read_dir(root).map_err(|e| AnalyzeError::io(root, e))? {
        let entry = entry.map_err(|e| AnalyzeError::io(root, e))?;
        let dir = entry.path();
        if !dir.is_dir() {
            continue;
        }
        let Ok(name) = entry.file_name().to_string_lossy().parse::<RunName>() else {
            continue;
        };

        let summary_path = dir.join(SUMMARY_CSV);
        if !summary_path.is_file() {
            debug!("{} has no {}, skipping", dir.display(), SUMMARY_CSV);
            continue;
        }
        let summary = match parse_summary_csv(&summary_path) {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Skipping {}: {}", dir.display(), e);
                continue;
            }
        };

        let (workload, row) = sweep_row(&name, &summary, read_bottleneck(&dir));
        sweep.workloads.entry(workload).or_default().push(row);
    }

    for rows in sweep.workloads.values_mut() {
        rows.sort_by_key(|r| r.threads);
    }
    Ok(sweep)
}

/// Write one `<workload>.csv` per workload into `out`, returning the written paths
pub fn write_sweep(sweep: &Sweep, out: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out).map_err(|e| AnalyzeError::io(out, e))?;

    let mut written = Vec::new();
    for (workload, rows) in &sweep.workloads {
        let path = out.join(format!("{}.csv", workload));
        let csv_err = |source| AnalyzeError::Csv {
            path: path.clone(),
            source,
        };

        let mut wtr = csv::Writer::from_path(&path).map_err(csv_err)?;
        for row in rows {
            wtr.serialize(row).map_err(csv_err)?;
        }
        wtr.flush().map_err(|e| AnalyzeError::io(&path, e))?;

        written.push(path);
    }
    Ok(written)
}
