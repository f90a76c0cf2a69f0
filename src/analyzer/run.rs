use crate::analyzer::detector::{Bottleneck, BottleneckDetector, ClassifierInputs};
use crate::config::{ANALYSIS_JSON, CPU_LOG, DISK_LOG, SUMMARY_CSV, VMSTAT_LOG};
use crate::error::{AnalyzeError, Result};
use crate::parse::{
    parse_cpu_log, parse_disk_log, parse_summary_csv, parse_vmstat_log, CpuLog, DiskLog,
    MetricSource, VmstatLog,
};
use crate::record::{MetricRecord, MetricValue};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Telemetry loaded from one run directory.
///
/// `None` means the file was not there; a parsed log with zero samples means
/// it was there but nothing in it matched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSources {
    pub cpu: Option<CpuLog>,
    pub disk: Option<DiskLog>,
    pub vmstat: Option<VmstatLog>,
    pub summary: Option<MetricRecord>,
}

impl RunSources {
    pub fn load(dir: &Path) -> Result<Self> {
        Ok(Self {
            cpu: load_optional(&dir.join(CPU_LOG), parse_cpu_log)?,
            disk: load_optional(&dir.join(DISK_LOG), parse_disk_log)?,
            vmstat: load_optional(&dir.join(VMSTAT_LOG), parse_vmstat_log)?,
            summary: load_optional(&dir.join(SUMMARY_CSV), parse_summary_csv)?,
        })
    }

    /// Merge in the order cpu, disk, vmstat, summary; the summary wins collisions
    pub fn merge(&self) -> MetricRecord {
        let mut record = MetricRecord::new();
        if let Some(cpu) = &self.cpu {
            record.merge(cpu.metrics());
        }
        if let Some(disk) = &self.disk {
            record.merge(disk.metrics());
        }
        if let Some(vmstat) = &self.vmstat {
            record.merge(vmstat.metrics());
        }
        if let Some(summary) = &self.summary {
            record.merge(summary.clone());
        }
        record
    }
}

fn load_optional<T>(path: &Path, parse: impl FnOnce(&Path) -> Result<T>) -> Result<Option<T>> {
    if !path.is_file() {
        debug!("{} not found, skipping", path.display());
        return Ok(None);
    }
    parse(path).map(Some)
}

/// Classified metrics for one run directory
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub dir: PathBuf,
    pub record: MetricRecord,
    pub bottleneck: Bottleneck,
}

impl Analysis {
    /// The record with the `bottleneck` label added, as written to disk
    pub fn artifact(&self) -> MetricRecord {
        let mut artifact = self.record.clone();
        artifact.insert("bottleneck", MetricValue::Text(self.bottleneck.label().to_string()));
        artifact
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.dir.join(ANALYSIS_JSON)
    }

    /// Artifact as JSON indented by four spaces
    pub fn to_pretty_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.artifact().serialize(&mut ser)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn persist(&self) -> Result<PathBuf> {
        let path = self.artifact_path();
        let mut json = self.to_pretty_json()?;
        json.push('\n');
        fs::write(&path, json).map_err(|e| AnalyzeError::io(&path, e))?;
        Ok(path)
    }
}

pub fn banner(dir: &Path) -> String {
    format!("=== Analyzing {} ===", dir.display())
}

/// Build the record for `dir` and classify it, without touching the artifact
pub fn analyze_sources(dir: &Path, detector: &BottleneckDetector) -> Result<Analysis> {
    if !dir.is_dir() {
        return Err(AnalyzeError::MissingDirectory {
            path: dir.to_path_buf(),
        });
    }

    let record = RunSources::load(dir)?.merge();
    let bottleneck = detector.detect(ClassifierInputs::from_record(&record));

    Ok(Analysis {
        dir: dir.to_path_buf(),
        record,
        bottleneck,
    })
}

/// Analyze one run directory and write its `analysis.json`
pub fn analyze_directory(dir: &Path, detector: &BottleneckDetector) -> Result<Analysis> {
    let analysis = analyze_sources(dir, detector)?;
    let path = analysis.persist()?;
    info!("{}: {} ({})", dir.display(), analysis.bottleneck, path.display());
    Ok(analysis)
}
