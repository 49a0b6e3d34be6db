//! Shared components for CLI commands
//!
//! This module contains common types, utilities, and functions used across
//! multiple CLI command implementations.

use crate::app::services::archive_store::{StoreOutcome, StoredRecord};
use crate::cli::args::ArchiveArgs;
use crate::config::Config;
use crate::{Error, Result};
use anyhow::Context;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Processing statistics for reporting across all commands
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessingStats {
    /// Number of input files processed successfully
    pub files_processed: usize,
    /// Number of input files that failed
    pub files_failed: usize,
    /// Archive files written for the first time
    pub records_created: usize,
    /// Archive files already present with identical content
    pub records_unchanged: usize,
    /// Archive files replaced with different content
    pub records_overwritten: usize,
    /// Source attributes that had no destination
    pub unresolved_attributes: usize,
    /// Total processing time
    #[serde(rename = "processing_time_ms", serialize_with = "serialize_millis")]
    pub processing_time: Duration,
    /// Input files that failed and why
    pub failures: Vec<FileFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub file: PathBuf,
    pub error: String,
}

fn serialize_millis<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u128(duration.as_millis())
}

impl ProcessingStats {
    /// Count one successfully processed input file
    pub fn record_success(&mut self, stored: &[StoredRecord], unresolved: usize) {
        self.files_processed += 1;
        self.unresolved_attributes += unresolved;
        for record in stored {
            match record.outcome {
                StoreOutcome::Created => self.records_created += 1,
                StoreOutcome::Unchanged => self.records_unchanged += 1,
                StoreOutcome::Overwritten => self.records_overwritten += 1,
            }
        }
    }

    /// Count one failed input file
    pub fn record_failure(&mut self, file: &Path, error: &Error) {
        self.files_failed += 1;
        self.failures.push(FileFailure {
            file: file.to_path_buf(),
            error: error.to_string(),
        });
    }

    pub fn has_failures(&self) -> bool {
        self.files_failed > 0
    }

    /// Print a colored human-readable summary
    pub fn print_summary(&self, title: &str) {
        println!("\n{}", title.bright_green().bold());
        println!(
            "  {} {}",
            "Files processed:".bright_cyan(),
            self.files_processed.to_string().bright_white().bold()
        );
        if self.files_failed > 0 {
            println!(
                "  {} {}",
                "Files failed:".bright_red(),
                self.files_failed.to_string().bright_white().bold()
            );
        }
        println!(
            "  {} {} created, {} unchanged, {} overwritten",
            "Archives:".bright_cyan(),
            self.records_created,
            self.records_unchanged,
            self.records_overwritten
        );
        if self.unresolved_attributes > 0 {
            println!(
                "  {} {}",
                "Unresolved attributes:".bright_yellow(),
                self.unresolved_attributes
            );
        }
        println!(
            "  {} {:.2}s",
            "Time:".bright_cyan(),
            self.processing_time.as_secs_f64()
        );
        for failure in &self.failures {
            println!(
                "  {} {}: {}",
                "✗".bright_red(),
                failure.file.display(),
                failure.error
            );
        }
    }
}

/// Set up structured logging on stderr
///
/// `RUST_LOG` takes precedence over `level`.
pub fn setup_logging(level: &str, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hall_processor={}", level)));

    let initialized = if quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    match initialized {
        Ok(()) => debug!("Logging initialized at level: {}", level),
        Err(_) => debug!("Logging already initialized"),
    }
}

/// Load configuration using layered approach (file -> env -> args)
pub fn load_configuration(archive: &ArchiveArgs, log_level: &str) -> Result<Config> {
    info!("Loading configuration");

    match &archive.config_file {
        Some(path) => info!("Using config file: {}", path.display()),
        None => debug!("No config file given, using the default location if present"),
    }

    let mut config = Config::load_layered(archive.config_file.as_deref())?;
    apply_cli_overrides(&mut config, archive, log_level);
    config.validate()?;

    Ok(config)
}

/// Apply CLI argument overrides to configuration
pub fn apply_cli_overrides(config: &mut Config, archive: &ArchiveArgs, log_level: &str) {
    if let Some(output_path) = &archive.output_path {
        config.archive.output_path = output_path.clone();
    }
    if let Some(upload_id) = &archive.upload_id {
        config.archive.upload_id = upload_id.clone();
    }
    if let Some(format) = archive.format {
        config.archive.format = format.into();
    }
    if let Some(policy) = archive.duplicate_keys {
        config.parsing.duplicate_keys = policy.into();
    }
    if archive.force_overwrite {
        config.archive.overwrite = true;
    }
    config.logging.level = log_level.to_string();
}

/// Expand files, directories and glob patterns into input files
///
/// Directories are walked recursively and filtered by extension; explicit
/// files are taken as given. The result is sorted and free of duplicates.
pub fn discover_input_files(
    inputs: &[PathBuf],
    extensions: &[&str],
) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            files.extend(walk_directory(input, extensions)?);
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            let pattern = input.to_string_lossy();
            let matches: Vec<PathBuf> = glob::glob(&pattern)
                .with_context(|| format!("Invalid input pattern '{}'", pattern))?
                .filter_map(|entry| entry.ok())
                .filter(|path| path.is_file())
                .collect();

            if matches.is_empty() {
                anyhow::bail!("No input files match '{}'", pattern);
            }
            files.extend(matches);
        }
    }

    files.sort();
    files.dedup();

    debug!("Discovered {} input files", files.len());
    for file in &files {
        debug!("  Found: {}", file.display());
    }

    Ok(files)
}

fn walk_directory(dir: &Path, extensions: &[&str]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        let path = entry.path();
        if entry.file_type().is_file() && has_extension(path, extensions) {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Check if an error is critical enough to stop processing
pub fn is_critical_error(error: &Error) -> bool {
    matches!(
        error,
        Error::Configuration { .. } | Error::ProcessingInterrupted { .. }
    )
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}
