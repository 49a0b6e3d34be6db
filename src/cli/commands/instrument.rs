//! Instrument command implementation
//!
//! Converts instrument templates into instrument archives.

use super::shared::{
    ProcessingStats, create_progress_bar, discover_input_files, is_critical_error,
    load_configuration, setup_logging,
};
use crate::cli::args::{InstrumentArgs, OutputFormat};
use crate::constants::TEMPLATE_EXTENSIONS;
use crate::processor::HallProcessor;
use crate::{Error, Result};
use colored::*;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Instrument command runner
pub async fn run_instrument(args: InstrumentArgs) -> Result<ProcessingStats> {
    let start_time = Instant::now();
    let log_level = args.report.get_log_level();
    setup_logging(log_level, args.report.quiet);

    info!("Starting instrument template processing");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;
    let config = load_configuration(&args.archive, log_level)?;
    config.ensure_output_directory()?;

    let files = discover_input_files(&args.inputs, TEMPLATE_EXTENSIONS)
        .map_err(|e| Error::configuration(format!("{:#}", e)))?;
    let mut stats = ProcessingStats::default();

    if files.is_empty() {
        warn!("No instrument templates found");
        stats.processing_time = start_time.elapsed();
        return Ok(stats);
    }

    let processor = HallProcessor::from_config(&config);
    let progress = args
        .report
        .show_progress()
        .then(|| create_progress_bar(files.len() as u64, "Mapping templates"));
    let mut reports = Vec::with_capacity(files.len());

    for file in &files {
        match processor.process_instrument_file(file).await {
            Ok(report) => {
                stats.record_success(
                    std::slice::from_ref(&report.stored),
                    report.unresolved.len(),
                );
                reports.push(report);
            }
            Err(e) if is_critical_error(&e) => {
                if let Some(pb) = &progress {
                    pb.abandon();
                }
                return Err(e);
            }
            Err(e) => {
                error!("Failed to map {}: {}", file.display(), e);
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
                println!(
                    "{} {} {} {} ({} attributes, {} unresolved)",
                    "✓".bright_green(),
                    report.source.bright_white(),
                    "→".bright_black(),
                    report.stored.location.display(),
                    report.attributes,
                    report.unresolved.len()
                );
                for attribute in &report.unresolved {
                    println!("    {} {}", "unresolved:".bright_yellow(), attribute);
                }
            }
            stats.print_summary("Instrument processing complete");
        }
        OutputFormat::Human => {}
    }

    Ok(stats)
}
