//! Configuration management and validation.
//!
//! Provides the processing configuration: duplicate key handling for the
//! parser, archive destination and format, and the default log level.
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `HALL_PROCESSOR_*` environment variables, then command-line overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::app::models::DuplicateKeyPolicy;
use crate::app::services::archive_store::ArchiveFormat;
use crate::constants::archive::DEFAULT_UPLOAD_ID;
use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_OUTPUT_DIR};
use crate::{Error, Result};

/// Environment variable overriding the archive directory
pub const ENV_OUTPUT: &str = "HALL_PROCESSOR_OUTPUT";

/// Environment variable overriding the upload id
pub const ENV_UPLOAD_ID: &str = "HALL_PROCESSOR_UPLOAD_ID";

/// Environment variable overriding the archive format
pub const ENV_FORMAT: &str = "HALL_PROCESSOR_FORMAT";

/// Global configuration for Hall processing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parsing: ParsingConfig,
    pub archive: ArchiveConfig,
    pub logging: LoggingConfig,
}

/// Parser behaviour
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// Resolution of repeated field names inside one block
    pub duplicate_keys: DuplicateKeyPolicy,
}

/// Archive destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Directory archive files are written to
    pub output_path: PathBuf,

    /// Upload id used for entry references
    pub upload_id: String,

    /// Serialization of archive files
    pub format: ArchiveFormat,

    /// Replace existing archives whose content differs
    pub overwrite: bool,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_DIR),
            upload_id: DEFAULT_UPLOAD_ID.to_string(),
            format: ArchiveFormat::default(),
            overwrite: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level used when neither `-v`/`-q` nor `RUST_LOG` say otherwise
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Config {
    /// `<user config dir>/hall-processor/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Read a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::file_not_found(path)
            } else {
                Error::io(format!("Failed to read config {}", path.display()), e)
            }
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Defaults, then the config file, then the process environment
    ///
    /// An explicit `config_file` must exist; the default location is only
    /// read when present.
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path().filter(|p| p.is_file()) {
                Some(path) => {
                    debug!("Loading configuration from {}", path.display());
                    Self::from_file(&path)?
                }
                None => Self::default(),
            },
        };

        let config = config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `HALL_PROCESSOR_*` overrides read through `lookup`
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(output) = lookup(ENV_OUTPUT).filter(|v| !v.is_empty()) {
            self.archive.output_path = PathBuf::from(output);
        }
        if let Some(upload_id) = lookup(ENV_UPLOAD_ID).filter(|v| !v.is_empty()) {
            self.archive.upload_id = upload_id;
        }
        if let Some(format) = lookup(ENV_FORMAT).filter(|v| !v.is_empty()) {
            self.archive.format = format.parse()?;
        }
        Ok(self)
    }

    /// Check the configuration for values the pipeline cannot use
    pub fn validate(&self) -> Result<()> {
        if self.archive.upload_id.trim().is_empty() {
            return Err(Error::configuration("upload id must not be empty"));
        }
        if self
            .archive
            .upload_id
            .chars()
            .any(|c| c == '/' || c.is_whitespace())
        {
            return Err(Error::configuration(format!(
                "upload id '{}' must not contain '/' or whitespace",
                self.archive.upload_id
            )));
        }
        if self.archive.output_path.as_os_str().is_empty() {
            return Err(Error::configuration("output path must not be empty"));
        }
        if self.archive.output_path.is_file() {
            return Err(Error::configuration(format!(
                "output path {} is a file",
                self.archive.output_path.display()
            )));
        }
        Ok(())
    }

    /// Create the archive directory if needed
    pub fn ensure_output_directory(&self) -> Result<()> {
        std::fs::create_dir_all(&self.archive.output_path).map_err(|e| {
            Error::io(
                format!(
                    "Failed to create output directory {}",
                    self.archive.output_path.display()
                ),
                e,
            )
        })
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.archive.output_path = path.into();
        self
    }

    pub fn with_upload_id(mut self, upload_id: impl Into<String>) -> Self {
        self.archive.upload_id = upload_id.into();
        self
    }

    pub fn with_format(mut self, format: ArchiveFormat) -> Self {
        self.archive.format = format;
        self
    }

    /// Replace archives whose content differs
    pub fn with_overwrite(mut self) -> Self {
        self.archive.overwrite = true;
        self
    }

    pub fn with_duplicate_keys(mut self, policy: DuplicateKeyPolicy) -> Self {
        self.parsing.duplicate_keys = policy;
        self
    }
}
