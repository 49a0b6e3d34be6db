//! Data models for Hall measurement processing
//!
//! This module contains the intermediate structures produced by the log
//! tokenizer and extractor (sections, steps, field maps, contact sets) and the
//! archive-level records linking stored entries together. Typed measurement
//! variants live in [`measurement`], instrument configuration in
//! [`instrument`].

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::constants::UNIT_SUFFIX;
use crate::{Error, Result};

pub mod instrument;
pub mod measurement;

pub use instrument::{
    FieldController, InstrumentConfig, MeasurementDevice, SystemParameters,
    TemperatureController, TemperatureDomain,
};
pub use measurement::{
    GenericMeasurement, HallMeasurementRecord, IVCurveMeasurement, IVResults, Measurement,
    MeasurementKind, MeasurementTiming, QuantityValue, VariableFieldMeasurement,
    VariableFieldResults, VariableTemperatureMeasurement, VariableTemperatureResults,
};

// =============================================================================
// Field Values
// =============================================================================

/// Raw value extracted from a log line, table column or contact-set block
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Single value as written in the file
    Scalar(String),
    /// One column of a tab-separated table, one entry per data row
    List(Vec<String>),
    /// Contact-set blocks of an IV curve step
    ContactSets(Vec<ContactSet>),
}

impl FieldValue {
    /// Borrow the scalar text, if this is a scalar
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Borrow the column entries, if this is a list
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(values) => Some(values),
            _ => None,
        }
    }

    /// Borrow the contact sets, if this holds any
    pub fn as_contact_sets(&self) -> Option<&[ContactSet]> {
        match self {
            FieldValue::ContactSets(sets) => Some(sets),
            _ => None,
        }
    }

    /// True when the value carries no text at all
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Scalar(value) => value.trim().is_empty(),
            FieldValue::List(values) => values.is_empty(),
            FieldValue::ContactSets(sets) => sets.is_empty(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Scalar(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Scalar(value)
    }
}

// =============================================================================
// Duplicate Key Policy
// =============================================================================

/// How a repeated field name inside one block is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKeyPolicy {
    /// Keep the first occurrence, ignore later ones
    #[default]
    FirstWins,
    /// Replace earlier occurrences with the latest one
    LastWins,
}

impl FromStr for DuplicateKeyPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "first_wins" | "first" => Ok(DuplicateKeyPolicy::FirstWins),
            "last_wins" | "last" => Ok(DuplicateKeyPolicy::LastWins),
            other => Err(Error::configuration(format!(
                "Unknown duplicate key policy '{}'. Use 'first-wins' or 'last-wins'",
                other
            ))),
        }
    }
}

impl fmt::Display for DuplicateKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicateKeyPolicy::FirstWins => write!(f, "first-wins"),
            DuplicateKeyPolicy::LastWins => write!(f, "last-wins"),
        }
    }
}

/// Result of inserting into a [`FieldMap`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Replaced,
    Skipped,
}

// =============================================================================
// Field Map
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
struct FieldEntry {
    key: String,
    value: FieldValue,
    unit: Option<String>,
}

/// Ordered field map with `<field>_unit` siblings
///
/// A field and its unit are stored in the same entry, so they are always set
/// or replaced together. When serialized, a field with a unit is followed by
/// its `<field>_unit` sibling, reproducing the flat layout of the log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    entries: Vec<FieldEntry>,
    index: HashMap<String, usize>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a field without a unit annotation
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<FieldValue>,
        policy: DuplicateKeyPolicy,
    ) -> InsertOutcome {
        self.insert_with_unit(key, value, None, policy)
    }

    /// Insert a field together with its raw unit string
    pub fn insert_with_unit(
        &mut self,
        key: impl Into<String>,
        value: impl Into<FieldValue>,
        unit: Option<String>,
        policy: DuplicateKeyPolicy,
    ) -> InsertOutcome {
        let key = key.into();
        let entry = FieldEntry {
            key: key.clone(),
            value: value.into(),
            unit,
        };

        match self.index.get(&key) {
            Some(&position) => match policy {
                DuplicateKeyPolicy::FirstWins => InsertOutcome::Skipped,
                DuplicateKeyPolicy::LastWins => {
                    self.entries[position] = entry;
                    InsertOutcome::Replaced
                }
            },
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(entry);
                InsertOutcome::Inserted
            }
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.index.get(key).map(|&i| &self.entries[i].value)
    }

    /// Scalar text of a field, if present and scalar
    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_scalar)
    }

    /// Raw unit string recorded for a field
    pub fn unit(&self, key: &str) -> Option<&str> {
        self.index
            .get(key)
            .and_then(|&i| self.entries[i].unit.as_deref())
    }

    /// Field names in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }

    /// `(name, value, unit)` triples in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue, Option<&str>)> {
        self.entries
            .iter()
            .map(|entry| (entry.key.as_str(), &entry.value, entry.unit.as_deref()))
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let unit_count = self.entries.iter().filter(|e| e.unit.is_some()).count();
        let mut map = serializer.serialize_map(Some(self.entries.len() + unit_count))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.key, &entry.value)?;
            if let Some(unit) = &entry.unit {
                map.serialize_entry(&format!("{}{}", entry.key, UNIT_SUFFIX), unit)?;
            }
        }
        map.end()
    }
}

/// One contact pair's sweep data and fit parameters from an IV curve step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactSet {
    /// Contact pair label taken from the block's first line
    pub name: String,

    /// Scalar fit parameters and data columns of the block
    pub fields: FieldMap,
}

// =============================================================================
// Tokenized Content
// =============================================================================

/// A numbered step inside the Measurements section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawStep {
    pub index: u32,
    pub name: String,
    pub body: String,
}

impl RawStep {
    /// Key identifying the step, `"<name> (<index>)"`
    pub fn key(&self) -> String {
        step_key(&self.name, self.index)
    }
}

/// Body of a tokenized section
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawSectionBody {
    Flat(String),
    Steps(Vec<RawStep>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawSection {
    pub name: String,
    pub body: RawSectionBody,
}

/// Sections of a log in file order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SectionMap {
    sections: Vec<RawSection>,
}

impl SectionMap {
    pub fn new(sections: Vec<RawSection>) -> Self {
        Self { sections }
    }

    /// Look up a section by name; the last one wins when a name repeats
    pub fn get(&self, name: &str) -> Option<&RawSection> {
        self.sections.iter().rev().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RawSection> {
        self.sections.iter()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

// =============================================================================
// Extracted Content
// =============================================================================

/// A step with its extracted fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedStep {
    pub index: u32,
    pub name: String,
    pub fields: FieldMap,
}

impl ParsedStep {
    pub fn key(&self) -> String {
        step_key(&self.name, self.index)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParsedSectionContent {
    Flat(FieldMap),
    Steps(Vec<ParsedStep>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedSection {
    pub name: String,
    pub content: ParsedSectionContent,
}

/// Fully extracted log, sections in file order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedDocument {
    pub sections: Vec<ParsedSection>,
}

impl ParsedDocument {
    /// Look up a section by name; the last one wins when a name repeats
    pub fn section(&self, name: &str) -> Option<&ParsedSection> {
        self.sections.iter().rev().find(|s| s.name == name)
    }

    /// Steps of the named step-structured section, empty when absent or flat
    pub fn steps(&self, section: &str) -> &[ParsedStep] {
        match self.section(section).map(|s| &s.content) {
            Some(ParsedSectionContent::Steps(steps)) => steps,
            _ => &[],
        }
    }
}

fn step_key(name: &str, index: u32) -> String {
    format!("{} ({})", name, index)
}

// =============================================================================
// Diagnostics
// =============================================================================

/// A source attribute that had no destination in the target structure
///
/// Collected during assembly and instrument mapping; never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedAttribute {
    /// Structure that was being populated, e.g. `VariableFieldMeasurement`
    pub target: String,
    /// Source field name or template path
    pub attribute: String,
    /// Step key or template file the attribute came from
    pub context: String,
}

impl UnresolvedAttribute {
    pub fn new(
        target: impl Into<String>,
        attribute: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            target: target.into(),
            attribute: attribute.into(),
            context: context.into(),
        }
    }
}

impl fmt::Display for UnresolvedAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' has no destination in {} ({})",
            self.attribute, self.target, self.context
        )
    }
}

// =============================================================================
// Archive Records
// =============================================================================

/// Named link to a stored measurement record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementReference {
    pub name: String,
    pub reference: String,
}

/// Experiment record pointing at the stored measurement records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentRecord {
    pub name: String,
    pub measurement: Vec<MeasurementReference>,
}

/// Stored file layout: the record under `data` plus entry metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchiveEntry<T> {
    pub data: T,
    pub metadata: EntryMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub upload_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_name: Option<String>,
}

impl<T> ArchiveEntry<T> {
    pub fn new(data: T, upload_id: impl Into<String>) -> Self {
        Self {
            data,
            metadata: EntryMetadata {
                upload_id: upload_id.into(),
                entry_name: None,
            },
        }
    }

    pub fn with_entry_name(mut self, entry_name: impl Into<String>) -> Self {
        self.metadata.entry_name = Some(entry_name.into());
        self
    }
}

/// What the raw input file entry points at once processing has finished
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFileEntry {
    /// Display name, e.g. `"sample.txt measurement file"`
    pub entry_name: String,
    /// Reference to the stored measurement or instrument record
    pub reference: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_map_first_wins_keeps_original_unit() {
        let mut map = FieldMap::new();
        map.insert_with_unit(
            "Current",
            "1.0",
            Some("uA".to_string()),
            DuplicateKeyPolicy::FirstWins,
        );
        let outcome = map.insert("Current", "2.0", DuplicateKeyPolicy::FirstWins);

        assert_eq!(outcome, InsertOutcome::Skipped);
        assert_eq!(map.scalar("Current"), Some("1.0"));
        assert_eq!(map.unit("Current"), Some("uA"));
    }

    #[test]
    fn test_field_map_last_wins_replaces_value_and_unit_together() {
        let mut map = FieldMap::new();
        map.insert_with_unit(
            "Current",
            "1.0",
            Some("uA".to_string()),
            DuplicateKeyPolicy::LastWins,
        );
        let outcome = map.insert("Current", "2.0", DuplicateKeyPolicy::LastWins);

        assert_eq!(outcome, InsertOutcome::Replaced);
        assert_eq!(map.scalar("Current"), Some("2.0"));
        assert_eq!(map.unit("Current"), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_field_map_serializes_unit_sibling_after_field() {
        let mut map = FieldMap::new();
        map.insert_with_unit(
            "Dwell Time",
            "1",
            Some("Sec".to_string()),
            DuplicateKeyPolicy::FirstWins,
        );
        map.insert("Direction", "Up", DuplicateKeyPolicy::FirstWins);

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(
            json,
            r#"{"Dwell Time":"1","Dwell Time_unit":"Sec","Direction":"Up"}"#
        );
    }

    #[test]
    fn test_duplicate_key_policy_from_str() {
        assert_eq!(
            "first-wins".parse::<DuplicateKeyPolicy>().unwrap(),
            DuplicateKeyPolicy::FirstWins
        );
        assert_eq!(
            "last_wins".parse::<DuplicateKeyPolicy>().unwrap(),
            DuplicateKeyPolicy::LastWins
        );
        assert!("newest".parse::<DuplicateKeyPolicy>().is_err());
    }

    #[test]
    fn test_step_keys_and_section_lookup() {
        let step = RawStep {
            index: 3,
            name: "IV Curve Measurement".to_string(),
            body: String::new(),
        };
        assert_eq!(step.key(), "IV Curve Measurement (3)");

        let sections = SectionMap::new(vec![
            RawSection {
                name: "Sample".to_string(),
                body: RawSectionBody::Flat("a = 1".to_string()),
            },
            RawSection {
                name: "Sample".to_string(),
                body: RawSectionBody::Flat("a = 2".to_string()),
            },
        ]);
        assert_eq!(
            sections.get("Sample").map(|s| &s.body),
            Some(&RawSectionBody::Flat("a = 2".to_string()))
        );
    }
}
