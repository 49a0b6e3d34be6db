//! Typed measurement assembly from parsed Hall log steps
//!
//! Each `<Step N: name>` of the Measurements section becomes one
//! [`Measurement`](crate::app::models::Measurement) variant. Quantities are
//! resolved to base units on the way in; fields with no destination are
//! collected rather than failing the file.
//!
//! ## Architecture
//!
//! - [`classifier`] - Step name to measurement kind, first match wins
//! - [`field_table`] - Per-variant source field rules and value cursors
//! - [`assembler`] - Step and record assembly
//! - [`aggregate`] - Record-level tags and aggregate results
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hall_processor::app::services::hall_parser::HallFileParser;
//! use hall_processor::app::services::measurement_assembler::MeasurementAssembler;
//!
//! # async fn example() -> hall_processor::Result<()> {
//! let parsed = HallFileParser::default()
//!     .parse_file(std::path::Path::new("sample.txt"))
//!     .await?;
//! let assembly = MeasurementAssembler::default()
//!     .assemble_record("sample_meas", parsed.document.steps("Measurements"))?;
//!
//! println!("{} measurements, tags {:?}",
//!          assembly.record.measurements.len(),
//!          assembly.record.tags);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod assembler;
pub mod classifier;
pub mod field_table;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use aggregate::apply_aggregate_rules;
pub use assembler::{MeasurementAssembler, RecordAssembly, StepAssembly, best_fit_values};
pub use classifier::classify;
pub use field_table::{parse_elapsed_seconds, parse_timestamp};
