use crate::error::Result;
use crate::parse::{parse_decimal, read_log, Mean, MetricSource};
use crate::record::MetricRecord;
use std::path::Path;
use tracing::debug;

/// Token marking the aggregate row of a per-core report
const AGGREGATE_MARKER: &str = "all";
/// %usr %nice %sys %iowait %irq %soft %steal %guest %gnice %idle
const CPU_COLUMNS: usize = 10;
const USR_COLUMN: usize = 0;
const SYS_COLUMN: usize = 2;
const IDLE_COLUMN: usize = CPU_COLUMNS - 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuSample {
    pub usr: f64,
    pub sys: f64,
    pub idle: f64,
}

/// Extract a sample from an aggregate row, `None` for any other line
pub fn parse_cpu_line(line: &str) -> Option<CpuSample> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| **t == AGGREGATE_MARKER)
        .find_map(|(i, _)| sample_after_marker(&tokens[i + 1..]))
}

fn sample_after_marker(tokens: &[&str]) -> Option<CpuSample> {
    if tokens.len() < CPU_COLUMNS {
        return None;
    }
    let columns = tokens[..CPU_COLUMNS]
        .iter()
        .map(|t| parse_decimal(t))
        .collect::<Option<Vec<f64>>>()?;

    Some(CpuSample {
        usr: columns[USR_COLUMN],
        sys: columns[SYS_COLUMN],
        idle: columns[IDLE_COLUMN],
    })
}

/// Averages over the aggregate rows of a CPU utilization log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuLog {
    usr: Mean,
    sys: Mean,
    idle: Mean,
}

impl CpuLog {
    pub fn from_text(text: &str) -> Self {
        let mut log = Self::default();
        for sample in text.lines().filter_map(parse_cpu_line) {
            log.push(sample);
        }
        log
    }

    pub fn push(&mut self, sample: CpuSample) {
        self.usr.push(sample.usr);
        self.sys.push(sample.sys);
        self.idle.push(sample.idle);
    }

    pub fn samples(&self) -> usize {
        self.idle.count()
    }

    /// 100 minus mean idle, `None` when no aggregate rows matched
    pub fn busy(&self) -> Option<f64> {
        self.idle.value().map(|idle| 100.0 - idle)
    }
}

impl MetricSource for CpuLog {
    fn metrics(&self) -> MetricRecord {
        // No samples means the machine is assumed idle
        [
            ("cpu_usr_avg", self.usr.value().unwrap_or(0.0)),
            ("cpu_sys_avg", self.sys.value().unwrap_or(0.0)),
            ("cpu_idle_avg", self.idle.value().unwrap_or(100.0)),
            ("cpu_busy_avg", self.busy().unwrap_or(0.0)),
        ]
        .into_iter()
        .collect()
    }
}

pub fn parse_cpu_log(path: &Path) -> Result<CpuLog> {
    let text = read_log(path)?;
    let log = CpuLog::from_text(&text);
    debug!("Parsed {}: {} aggregate rows", path.display(), log.samples());
    Ok(log)
}
