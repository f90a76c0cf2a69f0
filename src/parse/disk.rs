use crate::error::Result;
use crate::parse::{parse_finite, read_log, Mean, MetricSource};
use crate::record::MetricRecord;
use std::path::Path;
use tracing::debug;

/// Accept an integer or a float with a single decimal point
pub fn parse_util_token(token: &str) -> Option<f64> {
    let digits = token.replacen('.', "", 1);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    parse_finite(token)
}

/// Utilization from the last column of a line
pub fn parse_disk_line(line: &str) -> Option<f64> {
    line.split_whitespace().last().and_then(parse_util_token)
}

/// Mean of the trailing utilization column of a disk report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiskLog {
    util: Mean,
}

impl DiskLog {
    pub fn from_text(text: &str) -> Self {
        let mut util = Mean::default();
        for value in text.lines().filter_map(parse_disk_line) {
            util.push(value);
        }
        Self { util }
    }

    pub fn samples(&self) -> usize {
        self.util.count()
    }

    pub fn util(&self) -> Option<f64> {
        self.util.value()
    }
}

impl MetricSource for DiskLog {
    fn metrics(&self) -> MetricRecord {
        [("disk_util_avg", self.util().unwrap_or(0.0))].into_iter().collect()
    }
}

pub fn parse_disk_log(path: &Path) -> Result<DiskLog> {
    let text = read_log(path)?;
    let log = DiskLog::from_text(&text);
    debug!("Parsed {}: {} utilization samples", path.display(), log.samples());
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn util_token_shapes() {
        assert_eq!(parse_util_token("42"), Some(42.0));
        assert_eq!(parse_util_token("42.75"), Some(42.75));
        assert_eq!(parse_util_token("5."), Some(5.0));
        assert_eq!(parse_util_token(".5"), Some(0.5));
        assert_eq!(parse_util_token("."), None);
        assert_eq!(parse_util_token("1.2.3"), None);
        assert_eq!(parse_util_token("-3.0"), None);
        assert_eq!(parse_util_token("1e3"), None);
        assert_eq!(parse_util_token("%util"), None);
        assert_eq!(parse_util_token(&"9".repeat(400)), None);
    }

    #[test]
    fn averages_trailing_column() {
        let iostat = "\
Device            r/s     w/s     rkB/s     wkB/s  %util
nvme0n1         10.00  200.00    40.00   8000.00  60.00
nvme0n1         12.00  180.00    48.00   7200.00  80.00

";
        let log = DiskLog::from_text(iostat);
        assert_eq!(log.samples(), 2);
        assert_eq!(log.metrics().number("disk_util_avg"), Some(70.0));
    }

    #[test]
    fn no_numeric_tokens_yields_zero() {
        let log = DiskLog::from_text("Device %util\nsda n/a\nsdb -1.0\n");
        assert_eq!(log.samples(), 0);
        assert_eq!(log.util(), None);
        assert_eq!(log.metrics().number("disk_util_avg"), Some(0.0));
    }
}
