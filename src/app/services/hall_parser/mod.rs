//! Parser for Lake Shore Hall measurement logs
//!
//! This module turns the instrument's section-based text export into ordered
//! field maps. The format is irregular: `[Section]` headers, numbered
//! `<Step N: name>` blocks, `key = value [unit]` lines, tab-separated tables
//! and `Contact Sets:` blocks all appear in one file.
//!
//! ## Architecture
//!
//! - [`parser`] - File reading, Latin-1 decoding and orchestration
//! - [`tokenizer`] - Section and step splitting
//! - [`extractor`] - Key-value, table and contact-set extraction
//! - [`stats`] - Parsing statistics and result structures
//!
//! ## Usage
//!
//! ```rust
//! use hall_processor::app::services::hall_parser::HallFileParser;
//!
//! # async fn example() -> hall_processor::Result<()> {
//! let parser = HallFileParser::default();
//! let result = parser.parse_file(std::path::Path::new("sample.txt")).await?;
//!
//! println!("Parsed {} steps from {} sections",
//!          result.stats.steps,
//!          result.stats.sections);
//! # Ok(())
//! # }
//! ```

pub mod extractor;
pub mod parser;
pub mod stats;
pub mod tokenizer;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use extractor::{ExtractOptions, extract_fields, extract_flat};
pub use parser::{HallFileParser, decode_latin1};
pub use stats::{ParseResult, ParseStats};
pub use tokenizer::tokenize;
