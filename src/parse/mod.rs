pub mod cpu;
pub mod disk;
pub mod summary;
pub mod vmstat;

pub use cpu::{parse_cpu_log, CpuLog, CpuSample};
pub use disk::{parse_disk_log, DiskLog};
pub use summary::parse_summary_csv;
pub use vmstat::{parse_vmstat_log, VmstatLog, VmstatRow};

use crate::error::{AnalyzeError, Result};
use crate::record::MetricRecord;
use std::fs;
use std::path::Path;

/// A parsed telemetry log that can contribute metrics to a run record
pub trait MetricSource {
    /// Averaged metrics, with documented defaults when nothing matched
    fn metrics(&self) -> MetricRecord;
}

/// Running arithmetic mean, updated incrementally so large samples cannot overflow a sum
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Mean {
    mean: f64,
    count: usize,
}

impl Mean {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.mean += (value - self.mean) / self.count as f64;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// `None` until at least one value has been pushed, or if the mean is not finite
    pub fn value(&self) -> Option<f64> {
        if self.count > 0 && self.mean.is_finite() {
            Some(self.mean)
        } else {
            None
        }
    }
}

/// Read a log as text, replacing invalid UTF-8 instead of failing the run
pub(crate) fn read_log(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| AnalyzeError::io(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Non-empty token made only of ASCII digits and dots, parsed as a float
pub(crate) fn parse_decimal(token: &str) -> Option<f64> {
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    parse_finite(token)
}

/// Float that JSON can carry: rejects `nan`, `inf` and overflowing literals
pub(crate) fn parse_finite(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}
