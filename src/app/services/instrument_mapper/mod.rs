//! Instrument configuration mapping from structured templates
//!
//! Instrument templates are nested YAML or JSON documents. They are flattened
//! into slash-delimited paths, normalized to snake case and routed onto the
//! [`InstrumentConfig`](crate::app::models::InstrumentConfig) by path
//! segment: the measurement state machine selects devices from a fixed
//! catalog, indexed temperature domains collect into a list, and the fixed
//! components take matching attribute names.
//!
//! ## Architecture
//!
//! - [`flatten`] - Template parsing and path flattening
//! - [`snake_case`] - Key normalization
//! - [`catalog`] - Device registration table
//! - [`mapper`] - Path routing onto the configuration
//!
//! ## Usage
//!
//! ```rust
//! use hall_processor::app::services::instrument_mapper::{
//!     TemplateFormat, map_instrument, parse_template,
//! };
//!
//! # fn example() -> hall_processor::Result<()> {
//! let template = parse_template(
//!     "Measurement State Machine:\n  Current Source: Keithley 6221\n",
//!     TemplateFormat::Yaml,
//! )?;
//! let mapping = map_instrument(&template, "setup.yaml");
//!
//! assert!(mapping.instrument.currentsource.is_some());
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod flatten;
pub mod mapper;
pub mod snake_case;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use catalog::{DEVICE_CATALOG, DeviceEntry, find_device, instantiate_device};
pub use flatten::{FlatTemplate, TemplateFormat, flatten_template, parse_template};
pub use mapper::{InstrumentMapping, map_instrument};
pub use snake_case::to_snake_case;
