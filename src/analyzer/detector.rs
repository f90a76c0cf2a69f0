use crate::config::{CPU_BUSY_THRESHOLD, DISK_UTIL_THRESHOLD, RUN_QUEUE_PER_CPU};
use crate::record::MetricRecord;
use serde::{Deserialize, Serialize};

/// Dominant resource limiting a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bottleneck {
    #[serde(rename = "CPU-bound")]
    CpuBound,
    #[serde(rename = "Disk I/O bound")]
    DiskIoBound,
    #[serde(rename = "Run-queue saturated (CPU contention)")]
    RunQueueSaturated,
    #[serde(rename = "No clear bottleneck (likely cache or network stall)")]
    NoClearBottleneck,
}

impl Bottleneck {
    pub fn label(&self) -> &'static str {
        match self {
            Bottleneck::CpuBound => "CPU-bound",
            Bottleneck::DiskIoBound => "Disk I/O bound",
            Bottleneck::RunQueueSaturated => "Run-queue saturated (CPU contention)",
            Bottleneck::NoClearBottleneck => "No clear bottleneck (likely cache or network stall)",
        }
    }
}

impl std::fmt::Display for Bottleneck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Bottleneck {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Bottleneck::CpuBound,
            Bottleneck::DiskIoBound,
            Bottleneck::RunQueueSaturated,
            Bottleneck::NoClearBottleneck,
        ]
        .into_iter()
        .find(|b| b.label() == s)
        .ok_or_else(|| anyhow::anyhow!("Unknown bottleneck label: {}", s))
    }
}

/// The three signals the classifier looks at
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClassifierInputs {
    pub cpu_busy: f64,
    pub disk_util: f64,
    pub run_queue: f64,
}

impl ClassifierInputs {
    /// Missing or non-numeric metrics count as 0, which leans towards
    /// `NoClearBottleneck` for runs with absent telemetry
    pub fn from_record(record: &MetricRecord) -> Self {
        Self {
            cpu_busy: record.number("cpu_busy_avg").unwrap_or(0.0),
            disk_util: record.number("disk_util_avg").unwrap_or(0.0),
            run_queue: record.number("vm_r_avg").unwrap_or(0.0),
        }
    }
}

/// Rule-based bottleneck detector.
///
/// The run-queue rule scales with the core count of the machine doing the
/// analysis, not the one that was benchmarked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BottleneckDetector {
    cpus: usize,
}

impl BottleneckDetector {
    pub fn new(cpus: usize) -> Self {
        Self { cpus }
    }

    pub fn cpus(&self) -> usize {
        self.cpus
    }

    pub fn run_queue_threshold(&self) -> f64 {
        RUN_QUEUE_PER_CPU * self.cpus as f64
    }

    /// First matching rule wins
    pub fn detect(&self, inputs: ClassifierInputs) -> Bottleneck {
        if inputs.cpu_busy > CPU_BUSY_THRESHOLD {
            return Bottleneck::CpuBound;
        }

        if inputs.disk_util > DISK_UTIL_THRESHOLD {
            return Bottleneck::DiskIoBound;
        }

        if inputs.run_queue > self.run_queue_threshold() {
            return Bottleneck::RunQueueSaturated;
        }

        Bottleneck::NoClearBottleneck
    }
}

impl Default for BottleneckDetector {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

pub fn classify_bottleneck(cpu_busy: f64, disk_util: f64, run_queue: f64, cpus: usize) -> Bottleneck {
    BottleneckDetector::new(cpus).detect(ClassifierInputs {
        cpu_busy,
        disk_util,
        run_queue,
    })
}
