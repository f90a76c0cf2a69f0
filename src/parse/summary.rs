use crate::error::{AnalyzeError, Result};
use crate::record::{MetricRecord, MetricValue};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Finite floats become numbers, everything else keeps its original text
pub fn coerce_field(field: &str) -> MetricValue {
    match field.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => MetricValue::Number(v),
        _ => MetricValue::Text(field.to_string()),
    }
}

/// First data row keyed by header, or `None` when there are no data rows
pub fn read_summary<R: Read>(reader: R) -> std::result::Result<Option<MetricRecord>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let row = match rdr.records().next() {
        Some(row) => row?,
        None => return Ok(None),
    };

    // Short rows drop the trailing columns; duplicate headers keep the last value
    let record: MetricRecord = headers
        .iter()
        .zip(row.iter())
        .map(|(name, field)| (name, coerce_field(field)))
        .collect();
    Ok(Some(record))
}

pub fn parse_summary_csv(path: &Path) -> Result<MetricRecord> {
    let file = File::open(path).map_err(|e| AnalyzeError::io(path, e))?;
    read_summary(file)
        .map_err(|source| AnalyzeError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| AnalyzeError::EmptySummary {
            path: path.to_path_buf(),
        })
}
