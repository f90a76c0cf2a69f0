pub mod analyzer;
pub mod config;
pub mod error;
pub mod parse;
pub mod record;
pub mod sweep;

pub use analyzer::{analyze_directory, classify_bottleneck, Analysis, Bottleneck, BottleneckDetector};
pub use error::{AnalyzeError, Result};
pub use record::{MetricRecord, MetricValue};
