use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fs;
use std::path::PathBuf;

use predm_report::config::{RunLayout, DEFAULT_RUN_ROOT};
use predm_report::io::write_csv_file;
use predm_report::lims::to_lims;
use predm_report::processing::collect_metrics_with_progress;
use predm_report::report::assemble;
use predm_report::sample_sheet::SampleIndex;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Pre-demultiplexing yield report for Ultima Genomics UG100 runs.\n\
             Writes <RUN_NAME>_sorted.csv (LIMS layout) and Reports/Top_Unknown_Barcodes.csv"
)]
struct Args {
    /// Name of the sequencing run (e.g. 422022-20250613_1638)
    run_name: String,

    /// Sample information CSV (comma delimited)
    sample_info: PathBuf,

    /// Directory holding one sub-directory per run
    #[arg(long, default_value = DEFAULT_RUN_ROOT)]
    run_root: PathBuf,

    /// Reports are written under <OUTPUT_ROOT>/<RUN_NAME>
    #[arg(short, long, default_value = ".")]
    output_root: PathBuf,

    /// Number of threads for parallel processing
    #[arg(short, long, default_value_t = 4)]
    threads: usize,

    /// Show a progress bar while scanning barcode directories
    #[arg(long, default_value_t = false)]
    progress: bool,

    /// Verbose output (info logging and elapsed time)
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn progress_bar(enabled: bool) -> Result<ProgressBar> {
    if !enabled {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} directories")?,
    );
    Ok(pb)
}

/// CLI entry point: load the sample sheet, scan the run, then write the LIMS
/// report and the unknown-barcode table. Prints where each file went.
fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    // Set up thread pool
    rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build_global()?;

    let layout = RunLayout::new(&args.run_name, &args.run_root, &args.output_root);

    // Start timer
    let start = std::time::Instant::now();

    let index = SampleIndex::from_path(&args.sample_info)
        .with_context(|| format!("Failed to load sample sheet {}", args.sample_info.display()))?;
    log::info!(
        "Indexed {} barcodes for {} samples from {}",
        index.num_barcodes(),
        index.num_samples(),
        args.sample_info.display()
    );

    let pb = progress_bar(args.progress)?;
    let rows = collect_metrics_with_progress(&layout.run_dir(), &index, &pb)?;
    let report = assemble(&rows);
    let lims = to_lims(&report.report_table);

    for dir in [layout.output_dir(), layout.reports_dir()] {
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let report_path = layout.report_path();
    let unknown_path = layout.unknown_barcodes_path();
    write_csv_file(&report_path, &lims)?;
    write_csv_file(&unknown_path, &report.overflow_table)?;

    println!("Results saved :: {}", report_path.display());
    println!("Unknown barcodes saved :: {}", unknown_path.display());
    println!(
        "{}\t{}\t{}\t{}",
        args.run_name,
        rows.len(),
        lims.len(),
        report.overflow_table.len()
    );

    if args.verbose {
        println!("Elapsed: {:.3}s", start.elapsed().as_secs_f64());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_args_parsing_defaults() {
        let args = Args::try_parse_from(["prog", "422022-20250613_1638", "samples.csv"]).unwrap();
        assert_eq!(args.run_name, "422022-20250613_1638");
        assert_eq!(args.sample_info, Path::new("samples.csv"));
        assert_eq!(args.run_root, Path::new(DEFAULT_RUN_ROOT));
        assert_eq!(args.output_root, Path::new("."));
        assert_eq!(args.threads, 4);
        assert!(!args.progress);
        assert!(!args.verbose);
    }

    #[test]
    fn test_args_require_both_positionals() {
        assert!(Args::try_parse_from(["prog"]).is_err());
        assert!(Args::try_parse_from(["prog", "run"]).is_err());

        let args = Args::try_parse_from([
            "prog", "run", "s.csv", "--run-root", "/runs", "-o", "/out", "-t", "2", "-v",
        ])
        .unwrap();
        assert_eq!(args.run_root, Path::new("/runs"));
        assert_eq!(args.output_root, Path::new("/out"));
        assert_eq!(args.threads, 2);
        assert!(args.verbose);
    }
}
