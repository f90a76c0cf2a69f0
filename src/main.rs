use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use run_analyzer::analyzer::{analyze_batch, banner, discover_run_dirs};
use run_analyzer::config::{Config, Target};
use run_analyzer::sweep::{collect_sweep, write_sweep};
use run_analyzer::{analyze_directory, Analysis, BottleneckDetector};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "run-analyzer")]
#[command(about = "Load-test telemetry analyzer with built-in bottleneck classification", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Run directory to analyze (e.g., results_getall_400)
    #[arg(conflicts_with = "all")]
    directory: Option<PathBuf>,

    /// Analyze every results_* directory under --root
    #[arg(long)]
    all: bool,

    /// Directory searched by --all
    #[arg(long, default_value = ".", requires = "all")]
    root: PathBuf,

    /// Analyze directories on a thread pool (with --all)
    #[arg(long, requires = "all")]
    parallel: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write per-workload thread sweep tables from run summaries
    Sweep {
        /// Directory containing the results_* run directories
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Output directory for <workload>.csv tables
        #[arg(short, long, default_value = "sweep")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Some(Commands::Sweep { root, out }) = &cli.command {
        return run_sweep(root, out);
    }

    let target = if cli.all {
        Target::All { root: cli.root.clone() }
    } else if let Some(dir) = &cli.directory {
        Target::Single(dir.clone())
    } else {
        eprintln!("{}", Cli::command().render_usage());
        eprintln!("Pass a run directory (e.g., results_getall_400) or --all");
        std::process::exit(1);
    };

    let mut config = Config::new(target);
    config.parallel = cli.parallel;

    let ok = run_analysis(&config)?;
    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

/// Returns `false` when any directory in a batch failed
fn run_analysis(config: &Config) -> anyhow::Result<bool> {
    let detector = BottleneckDetector::new(config.cpus);
    info!("Classifying with {} analyzer cores", detector.cpus());

    match &config.target {
        Target::Single(dir) => {
            println!("\n{}", banner(dir));
            let analysis = analyze_directory(dir, &detector)
                .with_context(|| format!("Failed to analyze {}", dir.display()))?;
            print_analysis(&analysis)?;
            Ok(true)
        }
        Target::All { root } => {
            let dirs = discover_run_dirs(root)
                .with_context(|| format!("Failed to scan {}", root.display()))?;
            if dirs.is_empty() {
                info!("No run directories found under {}", root.display());
            }

            let summary = analyze_batch(&dirs, &detector, config.parallel, |dir, outcome| {
                println!("\n{}", banner(dir));
                match outcome {
                    Ok(analysis) => {
                        if let Err(e) = print_analysis(analysis) {
                            error!("Failed to print {}: {}", dir.display(), e);
                        }
                    }
                    Err(e) => error!("Failed to analyze {}: {}", dir.display(), e),
                }
            });

            if !summary.is_success() {
                error!(
                    "{} of {} run directories failed",
                    summary.failed.len(),
                    summary.analyzed + summary.failed.len()
                );
            }
            Ok(summary.is_success())
        }
    }
}

fn print_analysis(analysis: &Analysis) -> anyhow::Result<()> {
    println!("{}", analysis.to_pretty_json()?);
    Ok(())
}

fn run_sweep(root: &Path, out: &Path) -> anyhow::Result<()> {
    let sweep = collect_sweep(root).with_context(|| format!("Failed to scan {}", root.display()))?;
    if sweep.is_empty() {
        println!("No run summaries found under {}", root.display());
        return Ok(());
    }

    println!("Workloads found: {:?}", sweep.workloads.keys().collect::<Vec<_>>());
    for path in write_sweep(&sweep, out)? {
        println!("Saved {}", path.display());
    }
    Ok(())
}

fn init_logging(cli: &Cli) {
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else if cli.quiet {
        tracing::Level::ERROR
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("run_analyzer={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
