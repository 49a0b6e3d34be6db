//! Key-value, table and contact-set extraction
//!
//! Step bodies are processed chunk by chunk, chunks being separated by blank
//! lines. A line is one of:
//! - `key = value` / `key: value`, split on the first separator, with an
//!   optional `[unit]` on the key or the value
//! - a table header, when it has no separator, more lines follow in the same
//!   chunk, and it carries tab-separated or bracketed column titles
//! - a flag, any other line without a separator, stored as mapping to itself
//!
//! A table ends extraction for the step. A chunk whose first line mentions
//! `Contact Sets` starts contact-set extraction, which also ends the step.

use tracing::{debug, trace};

use super::stats::ParseStats;
use crate::app::models::{ContactSet, DuplicateKeyPolicy, FieldMap, FieldValue};
use crate::constants::{CONTACT_SETS_MARKER, KEY_VALUE_SEPARATORS, fields};
use crate::{Error, Result};

/// Options controlling field extraction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    pub duplicate_keys: DuplicateKeyPolicy,
}

impl ExtractOptions {
    pub fn with_duplicate_keys(mut self, policy: DuplicateKeyPolicy) -> Self {
        self.duplicate_keys = policy;
        self
    }
}

/// A classified line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    KeyValue {
        key: &'a str,
        value: &'a str,
        unit: Option<&'a str>,
    },
    Bare(&'a str),
}

/// Classify a single trimmed line
pub fn classify_line(line: &str) -> Line<'_> {
    let Some(position) = line.find(KEY_VALUE_SEPARATORS) else {
        return Line::Bare(line);
    };
    let (raw_key, rest) = line.split_at(position);
    let raw_value = rest[1..].trim();

    if let Some((key, unit)) = split_bracketed(raw_key) {
        return Line::KeyValue {
            key,
            value: raw_value,
            unit: Some(unit),
        };
    }
    if let Some((value, unit)) = split_bracketed(raw_value) {
        return Line::KeyValue {
            key: raw_key.trim(),
            value,
            unit: Some(unit),
        };
    }
    Line::KeyValue {
        key: raw_key.trim(),
        value: raw_value,
        unit: None,
    }
}

/// Split `text [unit]` into its trimmed text and unit
pub fn split_bracketed(text: &str) -> Option<(&str, &str)> {
    let open = text.find('[')?;
    let close = open + text[open..].find(']')?;
    Some((text[..open].trim(), text[open + 1..close].trim()))
}

/// Extract the fields of one Measurements step body
pub fn extract_fields(
    body: &str,
    options: &ExtractOptions,
    stats: &mut ParseStats,
) -> Result<FieldMap> {
    let policy = options.duplicate_keys;
    let mut map = FieldMap::new();
    let chunks = split_chunks(body);

    for (chunk_index, chunk) in chunks.iter().enumerate() {
        if is_contact_sets_header(chunk[0]) {
            let sets = extract_contact_sets(&chunks[chunk_index..], options, stats)?;
            let outcome = map.insert(
                fields::CONTACT_SETS,
                FieldValue::ContactSets(sets),
                policy,
            );
            stats.record_field(outcome);
            return Ok(map);
        }

        if extract_lines(chunk, &mut map, policy, stats)? == Flow::TableEnded {
            return Ok(map);
        }
    }

    Ok(map)
}

/// Extract a flat section body: key-values and flags, no tables
pub fn extract_flat(
    body: &str,
    options: &ExtractOptions,
    stats: &mut ParseStats,
) -> Result<FieldMap> {
    let policy = options.duplicate_keys;
    let mut map = FieldMap::new();

    for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match classify_line(line) {
            Line::KeyValue { key, value, unit } => {
                let outcome = map.insert_with_unit(key, value, unit.map(str::to_string), policy);
                stats.record_field(outcome);
            }
            Line::Bare(flag) => {
                let outcome = map.insert(flag, flag, policy);
                stats.record_flag(outcome);
            }
        }
    }

    Ok(map)
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    TableEnded,
}

/// Non-empty runs of lines separated by blank lines, `\r` stripped
fn split_chunks(body: &str) -> Vec<Vec<&str>> {
    let mut chunks = Vec::new();
    let mut current = Vec::new();

    for line in body.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

fn is_contact_sets_header(line: &str) -> bool {
    line.contains(CONTACT_SETS_MARKER)
}

fn is_table_header(line: &str, has_following_lines: bool) -> bool {
    has_following_lines && (line.contains('\t') || split_bracketed(line).is_some())
}

/// Key-value and flag lines of one chunk, switching to table mode at a header
fn extract_lines(
    lines: &[&str],
    map: &mut FieldMap,
    policy: DuplicateKeyPolicy,
    stats: &mut ParseStats,
) -> Result<Flow> {
    for (i, raw_line) in lines.iter().enumerate() {
        let line = raw_line.trim();
        match classify_line(line) {
            Line::KeyValue { key, value, unit } => {
                let outcome = map.insert_with_unit(key, value, unit.map(str::to_string), policy);
                stats.record_field(outcome);
            }
            Line::Bare(text) if is_table_header(raw_line, i + 1 < lines.len()) => {
                trace!("Table header: '{}'", text);
                extract_table(&lines[i..], map, policy)?;
                stats.tables += 1;
                return Ok(Flow::TableEnded);
            }
            Line::Bare(flag) => {
                let outcome = map.insert(flag, flag, policy);
                stats.record_flag(outcome);
            }
        }
    }
    Ok(Flow::Continue)
}

/// Parse a header row plus data rows into one list field per column
fn extract_table(lines: &[&str], map: &mut FieldMap, policy: DuplicateKeyPolicy) -> Result<()> {
    let mut header: Vec<&str> = lines[0].split('\t').map(str::trim).collect();
    while header.last().is_some_and(|cell| cell.is_empty()) {
        header.pop();
    }

    let columns: Vec<(&str, Option<&str>)> = header
        .iter()
        .map(|cell| match split_bracketed(cell) {
            Some((name, unit)) => (name, Some(unit)),
            None => (cell.trim(), None),
        })
        .collect();

    let mut data: Vec<Vec<String>> = vec![Vec::new(); columns.len()];
    for (row_number, row) in lines[1..].iter().enumerate() {
        if row.trim().is_empty() {
            continue;
        }
        let cells: Vec<&str> = row.split('\t').map(str::trim).collect();
        if cells.len() < columns.len() {
            return Err(Error::parse(
                "table",
                format!(
                    "row {} has {} cells but the header has {} columns",
                    row_number + 1,
                    cells.len(),
                    columns.len()
                ),
            ));
        }
        for (column, cell) in data.iter_mut().zip(cells) {
            column.push(cell.to_string());
        }
    }

    debug!(
        "Extracted table with {} columns and {} rows",
        columns.len(),
        data.first().map_or(0, Vec::len)
    );

    for ((name, unit), values) in columns.into_iter().zip(data) {
        map.insert_with_unit(name, FieldValue::List(values), unit.map(str::to_string), policy);
    }
    Ok(())
}

/// Contact-set blocks from consecutive chunks that start with the marker
fn extract_contact_sets(
    chunks: &[Vec<&str>],
    options: &ExtractOptions,
    stats: &mut ParseStats,
) -> Result<Vec<ContactSet>> {
    let mut sets = Vec::new();

    for chunk in chunks {
        if !is_contact_sets_header(chunk[0]) {
            debug!(
                "Stopping contact-set extraction at '{}'",
                chunk[0].trim()
            );
            break;
        }
        sets.push(extract_contact_set(chunk, options, stats)?);
    }

    stats.contact_sets += sets.len();
    Ok(sets)
}

fn extract_contact_set(
    lines: &[&str],
    options: &ExtractOptions,
    stats: &mut ParseStats,
) -> Result<ContactSet> {
    let header = lines[0].trim();
    let name = contact_set_name(header)?;

    let mut set_fields = FieldMap::new();
    set_fields.insert(fields::NAME, name.as_str(), options.duplicate_keys);
    extract_lines(&lines[1..], &mut set_fields, options.duplicate_keys, stats)?;

    Ok(ContactSet {
        name,
        fields: set_fields,
    })
}

/// Text between the first and second separator of a contact-set header
fn contact_set_name(header: &str) -> Result<String> {
    let mut pieces = header.split(KEY_VALUE_SEPARATORS);
    pieces.next();
    pieces
        .next()
        .map(|name| name.trim().to_string())
        .ok_or_else(|| {
            Error::parse(
                CONTACT_SETS_MARKER,
                format!("contact-set header '{}' has no separator", header),
            )
        })
}
