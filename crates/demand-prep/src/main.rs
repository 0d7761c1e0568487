//! CLI entry point for the demand cleaning pipeline.

use anyhow::{Result, anyhow};
use clap::Parser;
use demand_prep::{
    CleaningReport, Pipeline, PipelineConfig, PipelineResult, PrepError, ReportGenerator,
};
use dotenv::dotenv;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Exploratory cleaning pipeline for food-demand CSV data",
    long_about = "Merges every CSV file of a directory, profiles the result, removes \
                  empty and duplicate rows, imputes missing values, filters outliers \
                  with Tukey fences, renders diagnostic plots and writes the cleaned \
                  dataset.\n\n\
                  EXAMPLES:\n  \
                  # Clean every CSV in the current directory\n  \
                  demand-prep\n\n  \
                  # Read from data/, write plots and output to out/\n  \
                  demand-prep -i data -o out\n\n  \
                  # Explicit files, no plots\n  \
                  demand-prep train.csv meal_info.csv --no-plots\n\n  \
                  # Preview the merged input without cleaning\n  \
                  demand-prep -i data --dry-run"
)]
struct Args {
    /// CSV files to merge (overrides directory discovery)
    files: Vec<PathBuf>,

    /// Directory scanned for CSV files
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Output directory for plots and the cleaned dataset
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON file with pipeline settings; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Name of the cleaned dataset (without extension)
    #[arg(long)]
    output_name: Option<String>,

    /// Bin count for the histogram grid
    #[arg(long)]
    bins: Option<usize>,

    /// Number of items in the top-values bar chart
    #[arg(long)]
    top_n: Option<usize>,

    /// Column identifying the ordered item
    #[arg(long)]
    item_column: Option<String>,

    /// Categorical column plotted against the orders column
    #[arg(long)]
    category_column: Option<String>,

    /// Numeric demand column
    #[arg(long)]
    orders_column: Option<String>,

    /// Skip rendering PNG plots
    #[arg(long)]
    no_plots: bool,

    /// Merge and profile the input, then stop
    #[arg(long)]
    dry_run: bool,

    /// Output the JSON report to stdout instead of a human-readable summary
    ///
    /// Disables all logs so stdout only carries JSON.
    #[arg(long)]
    json: bool,

    /// Write the JSON report next to the cleaned dataset
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only show warnings, errors and the final result
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber.
///
/// With `json_output` no subscriber is installed.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);
    dotenv().ok();

    let config = build_config(&args)?;
    let pipeline = build_pipeline(&args, config)?;

    let sources = match resolve_sources(&args, &pipeline) {
        Ok(sources) => sources,
        Err(e) if e.is_no_input() => {
            print_json_error(&args, &e)?;
            error!("{}", e);
            return Err(anyhow!(
                "{}\nPass CSV files as arguments or point --input-dir at a directory containing them",
                e
            ));
        }
        Err(e) => {
            print_json_error(&args, &e)?;
            return Err(e.into());
        }
    };

    if args.dry_run {
        return run_dry_run(&pipeline, &sources, &args);
    }

    run_pipeline(&pipeline, &sources, &args)
}

/// Layer CLI flags over the optional JSON config file.
fn build_config(args: &Args) -> Result<PipelineConfig> {
    let base = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    let mut builder = PipelineConfig::builder().base(base);

    if let Some(ref dir) = args.input_dir {
        builder = builder.input_dir(dir);
    }
    if let Some(ref dir) = args.output {
        builder = builder.output_dir(dir);
    }
    if let Some(ref name) = args.output_name {
        builder = builder.output_name(name);
    }
    if let Some(bins) = args.bins {
        builder = builder.histogram_bins(bins);
    }
    if let Some(n) = args.top_n {
        builder = builder.top_n(n);
    }
    if let Some(ref column) = args.item_column {
        builder = builder.item_column(column);
    }
    if let Some(ref column) = args.category_column {
        builder = builder.category_column(column);
    }
    if let Some(ref column) = args.orders_column {
        builder = builder.orders_column(column);
    }
    if args.no_plots {
        builder = builder.render_plots(false);
    }

    Ok(builder.build()?)
}

fn build_pipeline(args: &Args, config: PipelineConfig) -> Result<Pipeline> {
    let mut builder = Pipeline::builder().config(config);

    // Stage reports go to stdout as each stage finishes, even when quiet
    if !args.json {
        let quiet = args.quiet;
        builder = builder.on_progress(move |update| {
            if !quiet {
                info!(
                    "[{:.0}%] {}: {}",
                    update.progress * 100.0,
                    update.stage.display_name(),
                    update.message
                );
            }
            if let Some(ref detail) = update.detail {
                println!("{}", detail);
            }
        });
    }

    Ok(builder.build()?)
}

/// Under `--json`, stdout carries the error document instead of a report.
fn print_json_error(args: &Args, error: &PrepError) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(&error.to_json_report())?);
    }
    Ok(())
}

fn resolve_sources(
    args: &Args,
    pipeline: &Pipeline,
) -> std::result::Result<Vec<PathBuf>, PrepError> {
    if args.files.is_empty() {
        return pipeline.discover_inputs();
    }

    for file in &args.files {
        if !file.exists() {
            return Err(PrepError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Input file not found: {}", file.display()),
            )));
        }
    }
    Ok(args.files.clone())
}

/// Print the merged profile and the files a full run would write.
///
/// Uses `println!` because this output is the purpose of `--dry-run`,
/// independent of the log level.
fn run_dry_run(pipeline: &Pipeline, sources: &[PathBuf], args: &Args) -> Result<()> {
    let config = pipeline.config();
    let profile = match pipeline.inspect(sources) {
        Ok(profile) => profile,
        Err(e) => {
            print_json_error(args, &e)?;
            return Err(e.into());
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    println!("\n{}", "=".repeat(80));
    println!("DRY RUN - Preview of the cleaning run");
    println!("{}", "=".repeat(80));

    println!("\nINPUT FILES");
    println!("{}", "-".repeat(40));
    for source in sources {
        println!("  - {}", source.display());
    }

    println!("{}", profile);

    println!("\nOUTPUT FILES (will be created)");
    println!("{}", "-".repeat(40));
    println!("  - {}", config.output_csv_path().display());
    if config.render_plots {
        println!(
            "  - {}/<column>_before_boxplot.png, <column>_after_boxplot.png",
            config.output_dir.display()
        );
        for file in [
            demand_prep::plots::HISTOGRAM_FILE,
            demand_prep::plots::TOP_VALUES_FILE,
            demand_prep::plots::SCATTER_FILE,
        ] {
            println!("  - {}", config.output_dir.join(file).display());
        }
    }
    if args.emit_report {
        println!("  - {}", config.report_path().display());
    }

    println!("\n{}", "=".repeat(80));
    println!("To execute the cleaning, run without --dry-run");
    println!("{}", "=".repeat(80));

    Ok(())
}

fn run_pipeline(pipeline: &Pipeline, sources: &[PathBuf], args: &Args) -> Result<()> {
    info!("{}", "=".repeat(80));
    info!("Starting cleaning pipeline over {} file(s)...", sources.len());
    info!("{}", "=".repeat(80));

    let result = match pipeline.run(sources) {
        Ok(result) => result,
        Err(e) => {
            print_json_error(args, &e)?;
            error!("Pipeline failed: {}", e);
            return Err(anyhow!("Pipeline failed: {}", e));
        }
    };

    let report = ReportGenerator::build_cleaning_report(&result);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if args.emit_report {
        let config = pipeline.config();
        let generator =
            ReportGenerator::new(config.output_dir.clone(), config.output_name.clone());
        let report_path = generator.write_report_to_file(&report)?;
        info!("Report written to: {}", report_path.display());
    }

    print_human_readable_summary(&result, &report);
    Ok(())
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

/// Print the processing summary.
///
/// The profile and missing-value counts were already printed by their stages.
fn print_human_readable_summary(result: &PipelineResult, report: &CleaningReport) {
    let summary = &report.processing_summary;

    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!("Input:  {} file(s)", report.input_files.len());
    for file in &report.input_files {
        println!("  - {}", file);
    }
    match result.output_file.as_deref() {
        Some(path) => println!(
            "Output: {} ({} rows x {} columns)",
            display_path(path),
            summary.rows_after,
            summary.columns_after
        ),
        None => println!(
            "Output: not written ({} rows x {} columns)",
            summary.rows_after, summary.columns_after
        ),
    }
    println!();

    println!("Processing Summary:");
    println!("  Duration: {}ms", summary.duration_ms);
    println!(
        "  Rows: {} -> {} ({} removed, {}%)",
        summary.rows_before, summary.rows_after, summary.rows_removed, summary.rows_removed_percent
    );
    println!(
        "  Empty rows: {}, duplicates: {}, outliers: {}",
        summary.empty_rows_dropped, summary.duplicate_rows_dropped, summary.outlier_rows_removed
    );
    println!(
        "  Columns: {} -> {}",
        summary.columns_before, summary.columns_after
    );
    if let Some(ref encoded) = report.encoded_column {
        println!("  Encoded column: {}", encoded);
    }
    println!("  Plots written: {}", report.plots.len());
    println!();

    if !report.outlier_fences.is_empty() {
        println!("Outlier Fences:");
        for fence in &report.outlier_fences {
            println!(
                "  {:<24} [{:.2}, {:.2}]  {} removed",
                fence.column, fence.lower, fence.upper, fence.rows_removed
            );
        }
        println!();
    }

    if !summary.warnings.is_empty() {
        println!("Warnings:");
        for warning in &summary.warnings {
            println!("  ! {}", warning);
        }
        println!();
    }

    println!("Use --json for machine-readable output");
    println!("Use --emit-report to save the JSON report");
    println!("{}", "=".repeat(80));
}
