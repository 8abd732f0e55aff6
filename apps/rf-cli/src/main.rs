use chrono::Datelike;
use clap::{Parser, Subcommand};
use rf_app::{
    AppResult, DamStatus, RunOptions, RunProgressEvent, RunRequest, RunStage, RunTimingSummary, query,
    run_service,
};
use rf_cascade::ExecutionMode;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(name = "rf-cli")]
#[command(about = "RegFlow CLI - Reservoir cascade and downstream flow routing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a run configuration and its input files
    Validate {
        /// Path to the run configuration YAML file
        config_path: PathBuf,
    },
    /// Run the reservoir cascade
    Run {
        /// Path to the run configuration YAML file
        config_path: PathBuf,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
        /// Operate independent sub-basins in parallel
        #[arg(long)]
        parallel: bool,
    },
    /// List cached runs of a configuration
    Runs {
        /// Path to the run configuration YAML file
        config_path: PathBuf,
    },
    /// Show details of a cached run
    ShowRun {
        /// Path to the run configuration YAML file
        config_path: PathBuf,
        /// Run ID to display
        run_id: String,
    },
    /// Export the daily storage of one dam
    ExportStorage {
        /// Path to the run configuration YAML file
        config_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Dam number
        dam_id: u32,
        /// Output file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Run {
            config_path,
            no_cache,
            parallel,
        } => cmd_run(&config_path, !no_cache, parallel),
        Commands::Runs { config_path } => cmd_runs(&config_path),
        Commands::ShowRun {
            config_path,
            run_id,
        } => cmd_show_run(&config_path, &run_id),
        Commands::ExportStorage {
            config_path,
            run_id,
            dam_id,
            output,
        } => cmd_export_storage(&config_path, &run_id, dam_id, output.as_deref()),
    }
}

fn cmd_validate(config_path: &Path) -> AppResult<()> {
    println!("Validating configuration: {}", config_path.display());
    let report = rf_app::validate_run(config_path)?;

    println!("  Name: {}", report.config_name);
    println!("  Dams: {}", report.dams);
    println!("  Grid cells: {}", report.cells);
    println!(
        "  Flow days: {} (period needs {})",
        report.field_days, report.period_days
    );
    if !report.missing_rule_curves.is_empty() {
        println!("  Dams without rule curve: {:?}", report.missing_rule_curves);
    }
    if !report.off_grid.is_empty() {
        println!("  Dams outside the grid: {:?}", report.off_grid);
    }
    if let Some(problem) = &report.ordering_problem {
        println!("  Ordering: {}", problem);
    }
    if !report.period_covered {
        println!("  Period is not covered by the flow field");
    }

    if report.is_runnable() {
        println!("✓ Configuration is valid");
    } else {
        println!("✗ Configuration cannot run");
    }
    Ok(())
}

fn cmd_run(config_path: &Path, use_cache: bool, parallel: bool) -> AppResult<()> {
    println!("Running cascade: {}", config_path.display());

    let request = RunRequest {
        config_path,
        options: RunOptions {
            use_cache,
            execution: parallel.then_some(ExecutionMode::ParallelSubBasins),
            ..RunOptions::default()
        },
    };

    let response = run_service::ensure_run_with_progress(
        &request,
        Some(&mut |event| render_cli_progress(&event)),
    )?;
    clear_progress_line();

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!("✓ Cascade completed: {}", response.run_id);
    }

    print_timing_summary(&response.timing);

    let summary = query::get_run_summary(&response.manifest);
    println!("  Dams operated: {}", summary.operated);
    println!("  Dams skipped: {}", summary.skipped);
    if summary.clipped_values > 0 {
        println!(
            "  Lagged values past the period end: {}",
            summary.clipped_values
        );
    }

    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(80));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    debug!(stage = ?event.stage, elapsed_s = event.elapsed_wall_s, "progress");
    if event.stage == RunStage::Completed {
        return;
    }
    print!(
        "\r[{}] {}  elapsed={:.1}s",
        event.stage.label(),
        event.message.as_deref().unwrap_or(""),
        event.elapsed_wall_s
    );
    let _ = io::stdout().flush();
}

fn print_timing_summary(timing: &RunTimingSummary) {
    println!("Timing summary:");
    if timing.load_cache_time_s > 0.0 {
        println!("  load cache: {:.3} s", timing.load_cache_time_s);
    } else {
        println!("  hash inputs: {:.3} s", timing.hash_time_s);
        println!("  load inputs: {:.3} s", timing.load_inputs_time_s);
        println!("  cascade: {:.3} s", timing.cascade_time_s);
        println!("  save: {:.3} s", timing.save_time_s);
    }
    println!("  total: {:.3} s", timing.total_time_s);
}

fn cmd_runs(config_path: &Path) -> AppResult<()> {
    let runs = run_service::list_runs(config_path)?;

    if runs.is_empty() {
        println!("No cached runs found");
    } else {
        println!("Cached runs:");
        for manifest in runs {
            println!("  {} ({})", manifest.run_id, manifest.timestamp);
        }
    }
    Ok(())
}

fn cmd_show_run(config_path: &Path, run_id: &str) -> AppResult<()> {
    println!("Loading run: {}", run_id);

    let manifest = run_service::load_run(config_path, run_id)?;
    let summary = query::get_run_summary(&manifest);

    println!("\nRun Summary:");
    println!("  Configuration: {}", manifest.config_name);
    println!("  Created: {}", manifest.timestamp);
    println!("  Engine: {}", manifest.engine_version);
    println!("  Period: {} - {}", summary.period.0, summary.period.1);
    println!("  Longest lag: {} days", summary.max_lag_days);
    println!("  Clipped values: {}", summary.clipped_values);
    let delta = run_service::load_delta(config_path, run_id)?;
    println!("  Cells changed: {}", query::changed_cells(&delta));

    println!("\nDams:");
    for dam in &manifest.dams {
        match &dam.status {
            DamStatus::Operated {
                first_day,
                days,
                cells_touched,
                ..
            } => println!(
                "  {} {} - operated from {} for {} days, {} cells downstream",
                dam.id, dam.name, first_day, days, cells_touched
            ),
            DamStatus::Skipped { reason } => {
                println!("  {} {} - skipped: {}", dam.id, dam.name, reason)
            }
        }
    }

    Ok(())
}

fn cmd_export_storage(
    config_path: &Path,
    run_id: &str,
    dam_id: u32,
    output: Option<&Path>,
) -> AppResult<()> {
    if let Some(path) = output {
        run_service::export_storage(config_path, run_id, dam_id, path)?;
        println!("✓ Exported storage of dam {} to {}", dam_id, path.display());
        return Ok(());
    }

    let (storage, _) = run_service::load_dam_series(config_path, run_id, dam_id)?;
    let mut text = String::from("year\tmonth\tday\tstorage_acre_ft\n");
    for (date, volume) in storage.iter() {
        text.push_str(&format!(
            "{}\t{}\t{}\t{}\n",
            date.year(),
            date.month(),
            date.day(),
            volume.acre_feet()
        ));
    }
    print!("{}", text);
    Ok(())
}
