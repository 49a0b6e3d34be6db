//! Test utilities for archive storage testing

use serde_yaml::Value;
use tempfile::TempDir;

use crate::app::services::archive_store::{ArchiveFormat, FileArchiveStore};


/// Store rooted in a fresh temporary directory
pub fn temp_store(format: ArchiveFormat) -> (TempDir, FileArchiveStore) {
    let dir = TempDir::new().expect("temp dir");
    let store = FileArchiveStore::new(dir.path().join("archives"), "local", format);
    (dir, store)
}

/// Parse YAML test content
pub fn content(text: &str) -> Value {
    serde_yaml::from_str(text).expect("valid test content")
}
