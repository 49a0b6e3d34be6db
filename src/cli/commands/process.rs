//! Process command implementation
//!
//! Converts measurement logs into measurement and experiment archives and
//! reports per-file results.

use super::shared::{
    ProcessingStats, create_progress_bar, discover_input_files, is_critical_error,
    load_configuration, setup_logging,
};
use crate::cli::args::{OutputFormat, ProcessArgs};
use crate::constants::MEASUREMENT_EXTENSIONS;
use crate::processor::{HallProcessor, MeasurementReport};
use crate::{Error, Result};
use colored::*;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Process command runner
///
/// 1. Set up logging and configuration
/// 2. Discover input logs and create the archive directory
/// 3. Process each log, continuing past non-critical failures
/// 4. Report per-file results and summary statistics
pub async fn run_process(args: ProcessArgs) -> Result<ProcessingStats> {
    let start_time = Instant::now();
    let log_level = args.report.get_log_level();
    setup_logging(log_level, args.report.quiet);

    info!("Starting Hall measurement processing");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;
    let config = load_configuration(&args.archive, log_level)?;
    debug!("Loaded configuration: {:?}", config);
    config.ensure_output_directory()?;

    let files = discover_input_files(&args.inputs, MEASUREMENT_EXTENSIONS)
        .map_err(|e| Error::configuration(format!("{:#}", e)))?;
    let mut stats = ProcessingStats::default();

    if files.is_empty() {
        warn!("No measurement files found");
        stats.processing_time = start_time.elapsed();
        return Ok(stats);
    }
    info!("Processing {} measurement files", files.len());

    let processor = HallProcessor::from_config(&config);
    let progress = args
        .report
        .show_progress()
        .then(|| create_progress_bar(files.len() as u64, "Processing logs"));
    let mut reports = Vec::with_capacity(files.len());

    for file in &files {
        if let Some(pb) = &progress {
            pb.set_message(file.display().to_string());
        }

        match processor.process_measurement_file(file).await {
            Ok(report) => {
                stats.record_success(&report.stored, report.unresolved.len());
                reports.push(report);
            }
            Err(e) if is_critical_error(&e) => {
                if let Some(pb) = &progress {
                    pb.abandon();
                }
                return Err(e);
            }
            Err(e) => {
                error!("Failed to process {}: {}", file.display(), e);
                stats.record_failure(file, &e);
            }
        }

        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    stats.processing_time = start_time.elapsed();

    match args.report.output_format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "summary": stats,
                "files": reports,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Human if !args.report.quiet => {
            for report in &reports {
                print_report(report);
            }
            stats.print_summary("Measurement processing complete");
        }
        OutputFormat::Human => {}
    }

    Ok(stats)
}

fn print_report(report: &MeasurementReport) {
    let tags = if report.record.tags.is_empty() {
        "untagged".to_string()
    } else {
        report.record.tags.join(", ")
    };
    println!(
        "{} {} {} ({} measurements, {})",
        "✓".bright_green(),
        report.source.bright_white(),
        "→".bright_black(),
        report.record.measurements.len(),
        tags.bright_cyan()
    );
    for stored in &report.stored {
        println!(
            "    {} {:?}",
            stored.location.display(),
            stored.outcome
        );
    }
    for attribute in &report.unresolved {
        println!("    {} {}", "unresolved:".bright_yellow(), attribute);
    }
}
