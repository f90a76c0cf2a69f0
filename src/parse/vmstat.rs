use crate::error::Result;
use crate::parse::{parse_finite, read_log, Mean, MetricSource};
use crate::record::MetricRecord;
use std::path::Path;
use tracing::debug;

/// r b swpd free buff cache si so bi bo in cs us sy id wa st
const VMSTAT_FIELDS: usize = 17;
const RUN_QUEUE_FIELD: usize = 0;
const USR_FIELD: usize = 12;
const SYS_FIELD: usize = 13;
const IDLE_FIELD: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VmstatRow {
    pub run_queue: f64,
    pub usr: f64,
    pub sys: f64,
    pub idle: f64,
}

/// Accept only data rows: 17 fields led by a non-negative integer.
///
/// The run queue is kept as a float so arbitrarily long integers still count;
/// non-finite cpu columns reject the row.
pub fn parse_vmstat_line(line: &str) -> Option<VmstatRow> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != VMSTAT_FIELDS {
        return None;
    }

    let run_queue = fields[RUN_QUEUE_FIELD];
    if !run_queue.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    Some(VmstatRow {
        run_queue: parse_finite(run_queue)?,
        usr: parse_finite(fields[USR_FIELD])?,
        sys: parse_finite(fields[SYS_FIELD])?,
        idle: parse_finite(fields[IDLE_FIELD])?,
    })
}

/// Averages over the data rows of a vmstat log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VmstatLog {
    run_queue: Mean,
    usr: Mean,
    sys: Mean,
    idle: Mean,
}

impl VmstatLog {
    pub fn from_text(text: &str) -> Self {
        let mut log = Self::default();
        for row in text.lines().filter_map(parse_vmstat_line) {
            log.push(row);
        }
        log
    }

    pub fn push(&mut self, row: VmstatRow) {
        self.run_queue.push(row.run_queue);
        self.usr.push(row.usr);
        self.sys.push(row.sys);
        self.idle.push(row.idle);
    }

    pub fn samples(&self) -> usize {
        self.run_queue.count()
    }

    pub fn run_queue(&self) -> Option<f64> {
        self.run_queue.value()
    }
}

impl MetricSource for VmstatLog {
    fn metrics(&self) -> MetricRecord {
        [
            ("vm_r_avg", self.run_queue.value().unwrap_or(0.0)),
            ("vm_usr_avg", self.usr.value().unwrap_or(0.0)),
            ("vm_sys_avg", self.sys.value().unwrap_or(0.0)),
            ("vm_idle_avg", self.idle.value().unwrap_or(0.0)),
        ]
        .into_iter()
        .collect()
    }
}

pub fn parse_vmstat_log(path: &Path) -> Result<VmstatLog> {
    let text = read_log(path)?;
    let log = VmstatLog::from_text(&text);
    debug!("Parsed {}: {} data rows", path.display(), log.samples());
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VMSTAT: &str = "\
procs -----------memory---------- ---swap-- -----io---- -system-- ------cpu-----
 r  b   swpd   free   buff  cache   si   so    bi    bo   in   cs us sy id wa st
 4  0      0 812340  10240 204800    0    0     5    20  900 1500 40 10 50  0  0
 8  1      0 811000  10240 204900    0    0     0    64 1100 2100 60 20 20  0  0
";

    #[test]
    fn parses_data_row() {
        let row = parse_vmstat_line(" 4  0      0 812340  10240 204800    0    0     5    20  900 1500 40 10 50  0  0");
        assert_eq!(
            row,
            Some(VmstatRow { run_queue: 4.0, usr: 40.0, sys: 10.0, idle: 50.0 })
        );
    }

    #[test]
    fn header_rows_are_excluded() {
        // The column header also has 17 fields but starts with "r"
        assert_eq!(
            parse_vmstat_line(" r  b   swpd   free   buff  cache   si   so    bi    bo   in   cs us sy id wa st"),
            None
        );
        assert_eq!(
            parse_vmstat_line("procs -----------memory---------- ---swap-- -----io---- -system-- ------cpu-----"),
            None
        );
        assert_eq!(
            parse_vmstat_line("-1  0      0 812340  10240 204800    0    0     5    20  900 1500 40 10 50  0  0"),
            None
        );
    }

    #[test]
    fn wrong_field_count_or_bad_cpu_columns_are_skipped() {
        assert_eq!(parse_vmstat_line(" 4  0      0 812340  10240 204800    0    0     5    20  900 1500 40 10 50  0"), None);
        assert_eq!(parse_vmstat_line(" 4  0      0 812340  10240 204800    0    0     5    20  900 1500 xx 10 50  0  0"), None);
    }

    #[test]
    fn non_finite_cpu_columns_are_skipped() {
        assert_eq!(parse_vmstat_line(" 4  0      0 812340  10240 204800    0    0     5    20  900 1500 nan 10 50  0  0"), None);
        assert_eq!(parse_vmstat_line(" 4  0      0 812340  10240 204800    0    0     5    20  900 1500 40 inf 50  0  0"), None);
        assert_eq!(parse_vmstat_line(" 4  0      0 812340  10240 204800    0    0     5    20  900 1500 40 10 1e999  0  0"), None);
    }

    #[test]
    fn huge_values_keep_metrics_finite() {
        let text = "\
 4  0      0 812340  10240 204800    0    0     5    20  900 1500 1e308 10 50  0  0
 4  0      0 812340  10240 204800    0    0     5    20  900 1500 1e308 10 50  0  0
";
        let log = VmstatLog::from_text(text);
        assert_eq!(log.samples(), 2);
        assert_eq!(log.metrics().number("vm_usr_avg"), Some(1e308));
    }

    #[test]
    fn run_queue_wider_than_u64_is_accepted() {
        let row = parse_vmstat_line("123456789012345678901234567890  0  0 812340  10240 204800  0  0  5  20  900 1500 40 10 50  0  0");
        let expected: f64 = "123456789012345678901234567890".parse().unwrap();
        assert_eq!(row.map(|r| r.run_queue), Some(expected));
    }

    #[test]
    fn averages_data_rows() {
        let log = VmstatLog::from_text(VMSTAT);
        assert_eq!(log.samples(), 2);

        let metrics = log.metrics();
        assert_eq!(metrics.number("vm_r_avg"), Some(6.0));
        assert_eq!(metrics.number("vm_usr_avg"), Some(50.0));
        assert_eq!(metrics.number("vm_sys_avg"), Some(15.0));
        assert_eq!(metrics.number("vm_idle_avg"), Some(35.0));
    }

    #[test]
    fn no_rows_defaults_to_zero() {
        let log = VmstatLog::from_text("procs ---memory---\n");
        assert_eq!(log.run_queue(), None);
        let metrics = log.metrics();
        for key in ["vm_r_avg", "vm_usr_avg", "vm_sys_avg", "vm_idle_avg"] {
            assert_eq!(metrics.number(key), Some(0.0), "{key}");
        }
    }
}
