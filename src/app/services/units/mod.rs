//! Unit normalization for Hall measurement values
//!
//! Converts the instrument's raw value and unit strings into SI base-unit
//! magnitudes.
//!
//! ## Architecture
//!
//! - [`normalizer`] - Cleanup table for mis-encoded unit strings and value
//!   resolution (`ERROR`, boolean tokens, scalars and columns)
//! - [`registry`] - Unit expression parser over SI base dimensions
//!
//! ## Usage
//!
//! ```rust
//! use hall_processor::app::models::FieldValue;
//! use hall_processor::app::services::units::{registry, resolve_quantity, Resolved};
//!
//! # fn example() -> hall_processor::Result<()> {
//! let value = FieldValue::Scalar("5".to_string());
//! let resolved = resolve_quantity(&value, Some("kG"), registry())?;
//! assert_eq!(resolved, Resolved::Scalar(0.5));
//! # Ok(())
//! # }
//! ```

pub mod normalizer;
pub mod registry;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use normalizer::{Resolved, normalize_unit, resolve_quantity, unit_factor};
pub use registry::{Dimension, UnitQuantity, UnitRegistry, registry};
