//! Parsing statistics and result structures for Hall log processing

use serde::{Deserialize, Serialize};

use crate::app::models::{InsertOutcome, ParsedDocument};

/// Parsing result with the extracted document and statistics
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Sections in file order with their extracted fields
    pub document: ParsedDocument,

    /// Extraction statistics
    pub stats: ParseStats,
}

/// Counters collected while extracting a log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Sections found in the file
    pub sections: usize,

    /// Steps found in the Measurements section
    pub steps: usize,

    /// Key-value fields stored, table columns excluded
    pub fields: usize,

    /// Tab-separated tables extracted
    pub tables: usize,

    /// Contact-set blocks extracted
    pub contact_sets: usize,

    /// Lines without a separator stored as flags
    pub flags: usize,

    /// Repeated field names resolved by the duplicate key policy
    pub duplicate_keys: usize,
}

impl ParseStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a key-value insertion
    pub fn record_field(&mut self, outcome: InsertOutcome) {
        match outcome {
            InsertOutcome::Inserted => self.fields += 1,
            InsertOutcome::Replaced | InsertOutcome::Skipped => self.duplicate_keys += 1,
        }
    }

    /// Count a flag insertion
    pub fn record_flag(&mut self, outcome: InsertOutcome) {
        match outcome {
            InsertOutcome::Inserted => self.flags += 1,
            InsertOutcome::Replaced | InsertOutcome::Skipped => self.duplicate_keys += 1,
        }
    }

    /// Fold another set of counters into this one
    pub fn merge(&mut self, other: &ParseStats) {
        self.sections += other.sections;
        self.steps += other.steps;
        self.fields += other.fields;
        self.tables += other.tables;
        self.contact_sets += other.contact_sets;
        self.flags += other.flags;
        self.duplicate_keys += other.duplicate_keys;
    }
}
