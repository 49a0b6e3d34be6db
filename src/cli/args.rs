//! Command-line argument definitions for the Hall processor
//!
//! This module defines the CLI interface using the clap derive API. The
//! `process` and `instrument` commands share archive and reporting options.

use crate::app::models::DuplicateKeyPolicy;
use crate::app::services::archive_store::ArchiveFormat;
use crate::{Error, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the Hall measurement processor
///
/// Converts Lake Shore Hall measurement logs and instrument templates into
/// structured archive records with values resolved to SI base units.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "hall-processor",
    version,
    about = "Convert Lake Shore Hall measurement logs into structured archive records",
    long_about = "Parses the section and step based text export of Lake Shore Hall measurement \
                  systems, resolves every value and unit to SI base units, classifies the steps \
                  into typed measurements and writes measurement, experiment and instrument \
                  records as YAML or JSON archives."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands for the Hall processor
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Convert measurement logs into measurement and experiment records
    Process(ProcessArgs),
    /// Convert instrument templates into instrument records
    Instrument(InstrumentArgs),
    /// Print the parsed sections, steps and fields of a log as JSON
    Inspect(InspectArgs),
}

/// Arguments for the process command
#[derive(Debug, Clone, Parser)]
pub struct ProcessArgs {
    /// Measurement log files, directories or glob patterns
    ///
    /// Directories are searched recursively for `.txt` files.
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    #[command(flatten)]
    pub archive: ArchiveArgs,

    #[command(flatten)]
    pub report: ReportArgs,
}

/// Arguments for the instrument command
#[derive(Debug, Clone, Parser)]
pub struct InstrumentArgs {
    /// Instrument template files, directories or glob patterns
    ///
    /// Directories are searched recursively for `.yaml`, `.yml` and `.json`
    /// files.
    #[arg(value_name = "TEMPLATE", required = true)]
    pub inputs: Vec<PathBuf>,

    #[command(flatten)]
    pub archive: ArchiveArgs,

    #[command(flatten)]
    pub report: ReportArgs,
}

/// Arguments for the inspect command
#[derive(Debug, Clone, Parser)]
pub struct InspectArgs {
    /// Measurement log to inspect
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Include every section, not only Measurements
    #[arg(long = "all-sections", help = "Include header sections in the output")]
    pub all_sections: bool,

    /// Duplicate field handling
    #[arg(
        long = "duplicate-keys",
        value_enum,
        value_name = "POLICY",
        help = "How repeated field names in one block are resolved"
    )]
    pub duplicate_keys: Option<DuplicateKeys>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,
}

/// Archive destination and parser options
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct ArchiveArgs {
    /// Directory archive files are written to
    ///
    /// Will be created if it doesn't exist. If not specified, defaults to
    /// ./archives
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        help = "Directory for generated archive files"
    )]
    pub output_path: Option<PathBuf>,

    /// Upload id used to build entry references
    #[arg(long = "upload-id", value_name = "ID", help = "Upload id for entry references")]
    pub upload_id: Option<String>,

    /// Archive serialization
    #[arg(
        long = "format",
        value_enum,
        value_name = "FORMAT",
        help = "Archive file format"
    )]
    pub format: Option<ArchiveFileFormat>,

    /// Replace existing archives whose content differs
    ///
    /// By default an existing archive with different content is left alone
    /// and the file is reported as a conflict.
    #[arg(long = "force", help = "Overwrite existing archives with different content")]
    pub force_overwrite: bool,

    /// Duplicate field handling
    #[arg(
        long = "duplicate-keys",
        value_enum,
        value_name = "POLICY",
        help = "How repeated field names in one block are resolved"
    )]
    pub duplicate_keys: Option<DuplicateKeys>,

    /// Path to configuration file
    ///
    /// TOML configuration file. If not specified, looks for
    /// <config dir>/hall-processor/config.toml
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,
}

/// Verbosity and result reporting options
#[derive(Debug, Clone, ClapArgs)]
pub struct ReportArgs {
    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output format for results
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for results"
    )]
    pub output_format: OutputFormat,
}

/// Output format options for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

/// Archive file formats accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ArchiveFileFormat {
    Yaml,
    Json,
}

impl From<ArchiveFileFormat> for ArchiveFormat {
    fn from(format: ArchiveFileFormat) -> Self {
        match format {
            ArchiveFileFormat::Yaml => ArchiveFormat::Yaml,
            ArchiveFileFormat::Json => ArchiveFormat::Json,
        }
    }
}

/// Duplicate key policies accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DuplicateKeys {
    FirstWins,
    LastWins,
}

impl From<DuplicateKeys> for DuplicateKeyPolicy {
    fn from(policy: DuplicateKeys) -> Self {
        match policy {
            DuplicateKeys::FirstWins => DuplicateKeyPolicy::FirstWins,
            DuplicateKeys::LastWins => DuplicateKeyPolicy::LastWins,
        }
    }
}

impl Default for ReportArgs {
    fn default() -> Self {
        Self {
            verbose: 0,
            quiet: false,
            output_format: OutputFormat::Human,
        }
    }
}

impl ReportArgs {
    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            verbosity_level(self.verbose)
        }
    }

    /// Check if we should show progress bars (not in quiet or JSON mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.output_format == OutputFormat::Human
    }
}

impl ArchiveArgs {
    /// Validate the archive options for consistency
    pub fn validate(&self) -> Result<()> {
        if let Some(output_path) = &self.output_path {
            if output_path.is_file() {
                return Err(Error::configuration(format!(
                    "Output path is a file: {}",
                    output_path.display()
                )));
            }
        }

        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        Ok(())
    }
}

impl ProcessArgs {
    pub fn validate(&self) -> Result<()> {
        self.archive.validate()
    }
}

impl InstrumentArgs {
    pub fn validate(&self) -> Result<()> {
        self.archive.validate()
    }
}

impl InspectArgs {
    pub fn validate(&self) -> Result<()> {
        if !self.file.is_file() {
            return Err(Error::configuration(format!(
                "Input is not a file: {}",
                self.file.display()
            )));
        }
        Ok(())
    }

    pub fn get_log_level(&self) -> &'static str {
        verbosity_level(self.verbose)
    }
}

fn verbosity_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
