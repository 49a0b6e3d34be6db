//! Inspect command implementation
//!
//! Prints what the parser extracts from a log without assembling or storing
//! anything, which is the quickest way to see why a field ends up unresolved.

use super::shared::{ProcessingStats, setup_logging};
use crate::app::models::{DuplicateKeyPolicy, ParsedDocument};
use crate::app::services::hall_parser::{HallFileParser, ParseStats, decode_latin1};
use crate::app::services::measurement_assembler::classify;
use crate::cli::args::InspectArgs;
use crate::constants::MEASUREMENTS_SECTION;
use crate::{Error, Result};
use serde_json::{Value, json};
use std::time::Instant;
use tracing::info;

/// Inspect command runner
pub async fn run_inspect(args: InspectArgs) -> Result<ProcessingStats> {
    let start_time = Instant::now();
    setup_logging(args.get_log_level(), false);
    args.validate()?;

    let policy = args
        .duplicate_keys
        .map(DuplicateKeyPolicy::from)
        .unwrap_or_default();
    let parser = HallFileParser::with_duplicate_keys(policy);

    let bytes = tokio::fs::read(&args.file).await.map_err(|e| {
        Error::io(format!("Failed to read file {}", args.file.display()), e)
    })?;
    let result = parser.parse_sections(&decode_latin1(&bytes))?;
    info!(
        "Inspected {}: {} sections, {} steps",
        args.file.display(),
        result.stats.sections,
        result.stats.steps
    );

    let output = inspection(&result.document, &result.stats, args.all_sections)?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(ProcessingStats {
        files_processed: 1,
        processing_time: start_time.elapsed(),
        ..Default::default()
    })
}

/// JSON view of a parsed log: steps with their classification, optionally
/// preceded by every section
fn inspection(
    document: &ParsedDocument,
    stats: &ParseStats,
    all_sections: bool,
) -> Result<Value> {
    let mut steps = Vec::new();
    for step in document.steps(MEASUREMENTS_SECTION) {
        steps.push(json!({
            "key": step.key(),
            "kind": classify(&step.name).record_type(),
            "fields": serde_json::to_value(&step.fields)?,
        }));
    }

    let mut output = json!({
        "steps": steps,
        "stats": serde_json::to_value(stats)?,
    });
    if all_sections {
        output["sections"] = serde_json::to_value(&document.sections)?;
    }
    Ok(output)
}
