//! Archive store implementations
//!
//! A store writes one record per filename. Writing identical content again is
//! a no-op; differing content is only written when overwriting is requested.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

use super::compare::nan_equal;
use super::reference::hash_reference;
use crate::constants::archive::ARCHIVE_INFIX;
use crate::{Error, Result};

/// Serialization of stored records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    #[default]
    Yaml,
    Json,
}

impl ArchiveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Yaml => "yaml",
            ArchiveFormat::Json => "json",
        }
    }

    /// `<stem><suffix>.archive.<ext>`
    pub fn archive_filename(&self, stem: &str, suffix: &str) -> String {
        format!("{}{}{}.{}", stem, suffix, ARCHIVE_INFIX, self.extension())
    }

    /// Render content in this format
    pub fn render(&self, content: &Value) -> Result<String> {
        match self {
            ArchiveFormat::Yaml => Ok(serde_yaml::to_string(content)?),
            ArchiveFormat::Json => Ok(serde_json::to_string_pretty(content)?),
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ArchiveFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(ArchiveFormat::Yaml),
            "json" => Ok(ArchiveFormat::Json),
            other => Err(Error::configuration(format!(
                "unknown archive format '{}', expected yaml or json",
                other
            ))),
        }
    }
}

/// What a store call did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreOutcome {
    Created,
    Unchanged,
    Overwritten,
}

/// Result of storing one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredRecord {
    pub filename: String,
    pub reference: String,
    pub location: PathBuf,
    pub outcome: StoreOutcome,
}

/// Destination for archive records
pub trait ArchiveStore {
    /// Upload the stored records belong to
    fn upload_id(&self) -> &str;

    /// Serialization used for new records
    fn format(&self) -> ArchiveFormat;

    /// Store content under `filename`
    ///
    /// Identical existing content is left alone. Differing existing content
    /// is replaced when `overwrite` is set and refused with
    /// [`Error::StoreConflict`] otherwise.
    fn store(&self, content: &Value, filename: &str, overwrite: bool) -> Result<StoredRecord>;

    /// Reference a stored file will have
    fn reference(&self, filename: &str) -> String {
        hash_reference(self.upload_id(), filename)
    }
}

/// Store writing records into a local directory
#[derive(Debug, Clone)]
pub struct FileArchiveStore {
    root: PathBuf,
    upload_id: String,
    format: ArchiveFormat,
}

impl FileArchiveStore {
    pub fn new(root: impl Into<PathBuf>, upload_id: impl Into<String>, format: ArchiveFormat) -> Self {
        Self {
            root: root.into(),
            upload_id: upload_id.into(),
            format,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn write(&self, path: &Path, rendered: &str) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| {
            Error::io(
                format!("Failed to create archive directory {}", self.root.display()),
                e,
            )
        })?;
        fs::write(path, rendered)
            .map_err(|e| Error::io(format!("Failed to write archive {}", path.display()), e))
    }

    /// Compare against an existing file; `None` when there is no file
    fn existing_matches(&self, path: &Path, rendered: &str) -> Result<Option<bool>> {
        let existing = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::io(
                    format!("Failed to read archive {}", path.display()),
                    e,
                ));
            }
        };
        if existing == rendered {
            return Ok(Some(true));
        }

        // JSON is read through the YAML parser as well
        let existing: Value = match serde_yaml::from_str(&existing) {
            Ok(value) => value,
            Err(e) => {
                warn!("Existing archive {} is unreadable: {}", path.display(), e);
                return Ok(Some(false));
            }
        };
        let normalized: Value = serde_yaml::from_str(rendered)?;
        Ok(Some(nan_equal(&existing, &normalized)))
    }
}

impl ArchiveStore for FileArchiveStore {
    fn upload_id(&self) -> &str {
        &self.upload_id
    }

    fn format(&self) -> ArchiveFormat {
        self.format
    }

    fn store(&self, content: &Value, filename: &str, overwrite: bool) -> Result<StoredRecord> {
        let path = self.root.join(filename);
        let rendered = self.format.render(content)?;

        let outcome = match self.existing_matches(&path, &rendered)? {
            None => {
                self.write(&path, &rendered)?;
                info!("Created archive {}", path.display());
                StoreOutcome::Created
            }
            Some(true) => {
                debug!("Archive {} is unchanged", path.display());
                StoreOutcome::Unchanged
            }
            Some(false) if overwrite => {
                self.write(&path, &rendered)?;
                info!("Overwrote archive {}", path.display());
                StoreOutcome::Overwritten
            }
            Some(false) => return Err(Error::store_conflict(filename)),
        };

        Ok(StoredRecord {
            filename: filename.to_string(),
            reference: self.reference(filename),
            location: path,
            outcome,
        })
    }
}
