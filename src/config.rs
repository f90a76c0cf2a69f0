use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Prefix shared by every run directory, e.g. `results_getall_400`
pub const RESULTS_PREFIX: &str = "results_";

pub const CPU_LOG: &str = "cpu.log";
pub const DISK_LOG: &str = "disk.log";
pub const VMSTAT_LOG: &str = "vmstat.log";
pub const SUMMARY_CSV: &str = "summary.csv";
pub const ANALYSIS_JSON: &str = "analysis.json";

/// CPU busy percentage above which a run is CPU-bound
pub const CPU_BUSY_THRESHOLD: f64 = 85.0;
/// Disk utilization percentage above which a run is disk-bound
pub const DISK_UTIL_THRESHOLD: f64 = 80.0;
/// Run-queue length per analyzer core above which the queue is saturated
pub const RUN_QUEUE_PER_CPU: f64 = 2.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub target: Target,
    pub parallel: bool,
    /// Processing units on the analyzing machine, used by the run-queue rule
    pub cpus: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    /// A single run directory
    Single(PathBuf),
    /// Every `results_*` directory under a root
    All { root: PathBuf },
}

impl Config {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            parallel: false,
            cpus: num_cpus::get(),
        }
    }
}

/// Workload and thread count encoded in a run directory name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunName {
    pub workload: String,
    pub threads: u32,
}

impl std::str::FromStr for RunName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix(RESULTS_PREFIX)
            .ok_or_else(|| anyhow::anyhow!("Run directory {} does not start with {}", s, RESULTS_PREFIX))?;
        let (workload, threads) = rest
            .rsplit_once('_')
            .ok_or_else(|| anyhow::anyhow!("Invalid run directory name: {}. Expected results_<workload>_<threads>", s))?;

        if workload.is_empty() {
            return Err(anyhow::anyhow!("Missing workload in run directory name: {}", s));
        }
        let threads: u32 = threads
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid thread count in run directory name: {}", s))?;

        Ok(RunName {
            workload: workload.to_string(),
            threads,
        })
    }
}

impl std::fmt::Display for RunName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}_{}", RESULTS_PREFIX, self.workload, self.threads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_directory_names() {
        let name: RunName = "results_getall_400".parse().unwrap();
        assert_eq!(name.workload, "getall");
        assert_eq!(name.threads, 400);
        assert_eq!(name.to_string(), "results_getall_400");
    }

    #[test]
    fn workload_may_contain_underscores() {
        let name: RunName = "results_get_put_16".parse().unwrap();
        assert_eq!(name.workload, "get_put");
        assert_eq!(name.threads, 16);
    }

    #[test]
    fn rejects_names_off_convention() {
        assert!("getall_400".parse::<RunName>().is_err());
        assert!("results_getall".parse::<RunName>().is_err());
        assert!("results__8".parse::<RunName>().is_err());
        assert!("results_getall_many".parse::<RunName>().is_err());
    }
}
