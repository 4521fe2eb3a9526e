use anyhow::{Context, Result};
use clap::Parser;
use mouse_metrics::batch::{run_batch, BatchOptions};
use mouse_metrics::cli::Cli;
use mouse_metrics::config::AnalysisConfig;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn print_usage() {
    println!("\nPass one or more session CSV files to run the analysis.");
    println!("Example: mouse-metrics session1.csv session2.csv ...");
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    if args.files.is_empty() {
        print_usage();
        return Ok(());
    }

    let base = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    let config = args.apply_to(base);
    if let Err(msg) = config.validate() {
        anyhow::bail!("Invalid options: {}", msg);
    }

    let options = BatchOptions {
        output_root: args.output_root.clone(),
        comparison_dir: args.comparison_dir.clone(),
    };

    let stdout = std::io::stdout();
    let summary = run_batch(&args.files, &config, &options, &mut stdout.lock())?;
    tracing::info!(
        analyzed = summary.analyzed,
        missing = summary.missing,
        failed = summary.failed,
        "batch complete"
    );

    Ok(())
}
