pub mod batch;
pub mod detector;
pub mod run;

pub use batch::{analyze_batch, discover_run_dirs, BatchSummary};
pub use detector::{classify_bottleneck, Bottleneck, BottleneckDetector, ClassifierInputs};
pub use run::{analyze_directory, analyze_sources, banner, Analysis, RunSources};
