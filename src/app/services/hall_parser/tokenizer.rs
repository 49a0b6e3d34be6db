//! Section and step tokenization
//!
//! Splits a decoded log into `[Section]` blocks and, inside the Measurements
//! section, into `<Step N: name>` blocks. Bodies are kept as raw text for the
//! extractor.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::app::models::{RawSection, RawSectionBody, RawStep, SectionMap};
use crate::constants::MEASUREMENTS_SECTION;
use crate::{Error, Result};

static SECTION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([^\[\]]+)\]$").expect("valid section regex"));

static STEP_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<Step\s*([^:>]*):\s*(.*)>$").expect("valid step regex"));

/// Split content into sections in file order
pub fn tokenize(content: &str) -> Result<SectionMap> {
    let mut sections = Vec::new();
    let mut seen = HashSet::new();
    let mut current: Option<(String, Vec<&str>)> = None;
    let mut preamble_lines = 0usize;

    for line in content.lines() {
        if let Some(name) = section_name(line) {
            if let Some((name, body)) = current.take() {
                sections.push(build_section(name, &body)?);
            }
            if !seen.insert(name.to_string()) {
                warn!("Section [{}] appears more than once, the last one wins", name);
            }
            current = Some((name.to_string(), Vec::new()));
            continue;
        }

        match current.as_mut() {
            Some((_, body)) => body.push(line),
            None => preamble_lines += 1,
        }
    }

    if let Some((name, body)) = current.take() {
        sections.push(build_section(name, &body)?);
    }

    if preamble_lines > 0 {
        debug!("Ignored {} lines before the first section", preamble_lines);
    }

    Ok(SectionMap::new(sections))
}

/// Name of a `[Name]` header line
pub fn section_name(line: &str) -> Option<&str> {
    SECTION_HEADER
        .captures(line.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

fn build_section(name: String, body: &[&str]) -> Result<RawSection> {
    let body = if name == MEASUREMENTS_SECTION {
        RawSectionBody::Steps(split_steps(body)?)
    } else {
        RawSectionBody::Flat(body.join("\n"))
    };
    Ok(RawSection { name, body })
}

/// Split a Measurements body into ordered steps
pub fn split_steps(lines: &[&str]) -> Result<Vec<RawStep>> {
    let mut steps = Vec::new();
    let mut current: Option<(u32, String, Vec<&str>)> = None;

    for line in lines {
        let trimmed = line.trim();
        if trimmed.starts_with("<Step") {
            let (index, name) = parse_step_header(trimmed)?;
            if let Some((index, name, body)) = current.take() {
                steps.push(RawStep {
                    index,
                    name,
                    body: body.join("\n"),
                });
            }
            current = Some((index, name, Vec::new()));
            continue;
        }

        if let Some((_, _, body)) = current.as_mut() {
            body.push(line);
        } else if !trimmed.is_empty() {
            debug!("Ignoring line before the first step: '{}'", trimmed);
        }
    }

    if let Some((index, name, body)) = current.take() {
        steps.push(RawStep {
            index,
            name,
            body: body.join("\n"),
        });
    }

    Ok(steps)
}

/// Parse `<Step N: name>` into its index and name
pub fn parse_step_header(line: &str) -> Result<(u32, String)> {
    let caps = STEP_HEADER.captures(line).ok_or_else(|| {
        Error::parse(
            MEASUREMENTS_SECTION,
            format!("malformed step header '{}'", line),
        )
    })?;

    let raw_index = caps.get(1).map_or("", |m| m.as_str()).trim();
    let index = raw_index.parse::<u32>().map_err(|_| {
        Error::parse(
            MEASUREMENTS_SECTION,
            format!("step index '{}' is not an integer in '{}'", raw_index, line),
        )
    })?;
    let name = caps.get(2).map_or("", |m| m.as_str()).trim().to_string();

    Ok((index, name))
}
