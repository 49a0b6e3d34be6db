//! Archive record storage
//!
//! Records are written as YAML or JSON files named
//! `<stem><suffix>.archive.<ext>` and referenced by a stable hash of the
//! upload id and filename, so parent records can link to children before or
//! after they are written.
//!
//! ## Architecture
//!
//! - [`store`] - The [`ArchiveStore`] trait and the directory-backed store
//! - [`reference`] - Entry ids and reference strings
//! - [`compare`] - NaN-aware content comparison
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hall_processor::app::services::archive_store::{
//!     ArchiveFormat, ArchiveStore, FileArchiveStore,
//! };
//!
//! # fn example() -> hall_processor::Result<()> {
//! let store = FileArchiveStore::new("./archives", "local", ArchiveFormat::Yaml);
//! let content = serde_yaml::from_str("data: {name: sample}")?;
//! let stored = store.store(&content, "sample_meas.archive.yaml", false)?;
//!
//! println!("{} -> {}", stored.filename, stored.reference);
//! # Ok(())
//! # }
//! ```

pub mod compare;
pub mod reference;
pub mod store;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use compare::nan_equal;
pub use reference::{archive_reference, entry_id, hash_reference};
pub use store::{ArchiveFormat, ArchiveStore, FileArchiveStore, StoreOutcome, StoredRecord};
