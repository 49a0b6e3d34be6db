//! Core Hall log parser implementation
//!
//! This module provides the parser orchestration: file reading and Latin-1
//! decoding, section tokenization, and per-section field extraction.

use std::path::Path;
use tracing::{debug, info};

use super::extractor::{ExtractOptions, extract_fields, extract_flat};
use super::stats::{ParseResult, ParseStats};
use super::tokenizer::tokenize;
use crate::app::models::{
    DuplicateKeyPolicy, ParsedDocument, ParsedSection, ParsedSectionContent, ParsedStep,
    RawSectionBody,
};
use crate::constants::MEASUREMENTS_SECTION;
use crate::{Error, Result};

/// Decode ISO-8859-1 bytes, one char per byte
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Parser for Lake Shore Hall measurement logs
#[derive(Debug, Clone, Default)]
pub struct HallFileParser {
    options: ExtractOptions,
}

impl HallFileParser {
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// Parser with the given duplicate key policy
    pub fn with_duplicate_keys(policy: DuplicateKeyPolicy) -> Self {
        Self::new(ExtractOptions::default().with_duplicate_keys(policy))
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Read, decode and parse a measurement log
    pub async fn parse_file(&self, file_path: &Path) -> Result<ParseResult> {
        info!("Parsing Hall measurement file: {}", file_path.display());

        let bytes = tokio::fs::read(file_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::file_not_found(file_path)
            } else {
                Error::io(format!("Failed to read file {}", file_path.display()), e)
            }
        })?;

        self.parse(&decode_latin1(&bytes))
    }

    /// Parse decoded content; the Measurements section is required
    pub fn parse(&self, content: &str) -> Result<ParseResult> {
        let result = self.parse_sections(content)?;

        if result.document.section(MEASUREMENTS_SECTION).is_none() {
            return Err(Error::parse(
                "document",
                format!("no [{}] section found", MEASUREMENTS_SECTION),
            ));
        }

        info!(
            "Parsed {} sections with {} steps",
            result.stats.sections, result.stats.steps
        );
        Ok(result)
    }

    /// Tokenize and extract every section without requiring Measurements
    pub fn parse_sections(&self, content: &str) -> Result<ParseResult> {
        let sections = tokenize(content)?;
        let mut stats = ParseStats::new();
        let mut document = ParsedDocument::default();

        for section in sections.iter() {
            stats.sections += 1;
            let content = match &section.body {
                RawSectionBody::Flat(body) => {
                    ParsedSectionContent::Flat(extract_flat(body, &self.options, &mut stats)?)
                }
                RawSectionBody::Steps(steps) => {
                    let mut parsed = Vec::with_capacity(steps.len());
                    for step in steps {
                        let fields = extract_fields(&step.body, &self.options, &mut stats)
                            .map_err(|e| match e {
                                Error::Parse { message, .. } => Error::parse(step.key(), message),
                                other => other,
                            })?;
                        debug!("Step '{}': {} fields", step.key(), fields.len());
                        parsed.push(ParsedStep {
                            index: step.index,
                            name: step.name.clone(),
                            fields,
                        });
                    }
                    stats.steps += parsed.len();
                    ParsedSectionContent::Steps(parsed)
                }
            };
            document.sections.push(ParsedSection {
                name: section.name.clone(),
                content,
            });
        }

        Ok(ParseResult { document, stats })
    }
}
