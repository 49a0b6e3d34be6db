//! Unit string cleanup and quantity resolution
//!
//! Raw unit strings from the log are repaired with a fixed replacement table
//! before they reach the [`UnitRegistry`]. Values are then resolved to base-unit
//! magnitudes, with the instrument's textual tokens (`ERROR`, `On`, `Yes`,
//! `Off`, `No`) handled before any numeric parsing.

use tracing::trace;

use super::registry::UnitRegistry;
use crate::app::models::FieldValue;
use crate::constants::{ERROR_TOKEN, FALSE_TOKENS, TRUE_TOKENS, UNIT_CLEANUP_TABLE};
use crate::{Error, Result};

/// A resolved field value
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// Absent, `ERROR`, `Off`/`No`, or a list with no usable entries
    Missing,
    Flag(bool),
    Scalar(f64),
    /// Column values in base units, `ERROR` entries kept in place as NaN
    Array(Vec<f64>),
}

impl Resolved {
    pub fn is_missing(&self) -> bool {
        matches!(self, Resolved::Missing)
    }
}

/// Apply the cleanup table to a raw unit string
pub fn normalize_unit(raw: &str) -> String {
    let mut unit = raw.trim().to_string();
    for (from, to) in UNIT_CLEANUP_TABLE {
        if unit.contains(from) {
            unit = unit.replace(from, to);
        }
    }
    unit
}

/// Base-unit factor for an optional raw unit; no unit or an empty one is 1
pub fn unit_factor(raw_unit: Option<&str>, registry: &UnitRegistry) -> Result<f64> {
    match raw_unit.map(normalize_unit) {
        Some(unit) if !unit.is_empty() => {
            let factor = registry.base_factor(&unit)?;
            trace!("Unit '{}' resolved to factor {}", unit, factor);
            Ok(factor)
        }
        _ => Ok(1.0),
    }
}

/// Resolve a raw field value and its optional raw unit to base units
pub fn resolve_quantity(
    value: &FieldValue,
    raw_unit: Option<&str>,
    registry: &UnitRegistry,
) -> Result<Resolved> {
    match value {
        FieldValue::Scalar(text) => resolve_scalar(text, raw_unit, registry),
        FieldValue::List(items) => resolve_list(items, raw_unit, registry),
        FieldValue::ContactSets(_) => Err(Error::parse(
            "quantity",
            "contact sets cannot be resolved as a quantity",
        )),
    }
}

fn resolve_scalar(text: &str, raw_unit: Option<&str>, registry: &UnitRegistry) -> Result<Resolved> {
    let text = text.trim();
    if text == ERROR_TOKEN || FALSE_TOKENS.contains(&text) {
        return Ok(Resolved::Missing);
    }
    if TRUE_TOKENS.contains(&text) {
        return Ok(Resolved::Flag(true));
    }

    let number = parse_number(text)?;
    let factor = unit_factor(raw_unit, registry)?;
    Ok(Resolved::Scalar(number * factor))
}

fn resolve_list(items: &[String], raw_unit: Option<&str>, registry: &UnitRegistry) -> Result<Resolved> {
    let mut values = Vec::with_capacity(items.len());
    let mut any_present = false;

    for item in items {
        let item = item.trim();
        if item == ERROR_TOKEN || item.is_empty() {
            values.push(f64::NAN);
        } else {
            values.push(parse_number(item)?);
            any_present = true;
        }
    }

    if !any_present {
        return Ok(Resolved::Missing);
    }

    let factor = unit_factor(raw_unit, registry)?;
    if factor != 1.0 {
        for v in values.iter_mut() {
            *v *= factor;
        }
    }
    Ok(Resolved::Array(values))
}

fn parse_number(text: &str) -> Result<f64> {
    text.parse::<f64>()
        .map_err(|_| Error::parse("quantity", format!("'{}' is not a number", text)))
}
