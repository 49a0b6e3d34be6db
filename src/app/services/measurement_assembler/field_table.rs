//! Field tables mapping source field names onto measurement attributes
//!
//! Each measurement variant has an explicit list of [`FieldRule`]s. A rule
//! names the source field as it appears in the log and a setter that reads
//! the value through a [`FieldCursor`].

use chrono::{NaiveDateTime, TimeDelta};

use crate::app::models::{FieldMap, FieldValue, QuantityValue};
use crate::app::services::units::{Resolved, UnitRegistry, resolve_quantity};
use crate::{Error, Result};

/// Source field name and the setter that applies it to `T`
pub struct FieldRule<T> {
    pub source: &'static str,
    pub apply: fn(&mut T, &FieldCursor<'_>) -> Result<()>,
}

impl<T> FieldRule<T> {
    pub fn new(source: &'static str, apply: fn(&mut T, &FieldCursor<'_>) -> Result<()>) -> Self {
        Self { source, apply }
    }
}

/// Find the rule for a source field
pub fn find_rule<'t, T>(rules: &'t [FieldRule<T>], source: &str) -> Option<&'t FieldRule<T>> {
    rules.iter().find(|rule| rule.source == source)
}

/// Read access to one field of a map, with unit resolution
pub struct FieldCursor<'a> {
    fields: &'a FieldMap,
    key: &'a str,
    context: &'a str,
    registry: &'a UnitRegistry,
}

impl<'a> FieldCursor<'a> {
    pub fn new(
        fields: &'a FieldMap,
        key: &'a str,
        context: &'a str,
        registry: &'a UnitRegistry,
    ) -> Self {
        Self {
            fields,
            key,
            context,
            registry,
        }
    }

    pub fn key(&self) -> &str {
        self.key
    }

    fn raw(&self) -> Option<&'a FieldValue> {
        self.fields.get(self.key)
    }

    fn resolved(&self) -> Result<Resolved> {
        let Some(value) = self.raw() else {
            return Ok(Resolved::Missing);
        };
        resolve_quantity(value, self.fields.unit(self.key), self.registry).map_err(|e| match e {
            Error::Parse { message, .. } => {
                Error::parse(self.context, format!("field '{}': {}", self.key, message))
            }
            other => other,
        })
    }

    fn shape_error(&self, expected: &str) -> Error {
        Error::format(
            self.key,
            self.text().unwrap_or_default(),
            format!("expected {} in {}", expected, self.context),
        )
    }

    /// Raw scalar text, trimmed
    pub fn text(&self) -> Option<String> {
        self.raw()
            .and_then(FieldValue::as_scalar)
            .map(|s| s.trim().to_string())
    }

    /// Scalar base-unit magnitude
    pub fn quantity(&self) -> Result<Option<f64>> {
        match self.resolved()? {
            Resolved::Missing => Ok(None),
            Resolved::Scalar(value) => Ok(Some(value)),
            Resolved::Flag(_) | Resolved::Array(_) => Err(self.shape_error("a number")),
        }
    }

    /// `On`/`Yes` as `true`; `Off`/`No` and absence as `None`
    pub fn flag(&self) -> Result<Option<bool>> {
        match self.resolved()? {
            Resolved::Missing => Ok(None),
            Resolved::Flag(value) => Ok(Some(value)),
            Resolved::Scalar(_) | Resolved::Array(_) => Err(self.shape_error("On/Off or Yes/No")),
        }
    }

    /// Presence of a flag line
    pub fn present(&self) -> Option<bool> {
        self.raw().map(|_| true)
    }

    /// Scalar or column magnitude
    pub fn values(&self) -> Result<Option<QuantityValue>> {
        match self.resolved()? {
            Resolved::Missing => Ok(None),
            Resolved::Scalar(value) => Ok(Some(QuantityValue::Scalar(value))),
            Resolved::Array(values) => Ok(Some(QuantityValue::Array(values))),
            Resolved::Flag(_) => Err(self.shape_error("a number or a column")),
        }
    }

    /// Column magnitude; a scalar becomes a single element
    pub fn array(&self) -> Result<Option<Vec<f64>>> {
        Ok(self.values()?.map(|v| v.to_vec()))
    }

    /// Elapsed `H:MM:SS` in seconds
    pub fn duration_seconds(&self) -> Result<Option<f64>> {
        self.text()
            .map(|text| parse_elapsed_seconds(self.key, &text))
            .transpose()
    }
}

/// Parse `H:MM:SS` (hours may exceed 23, seconds may be fractional)
pub fn parse_elapsed_seconds(field: &str, text: &str) -> Result<f64> {
    let invalid = |message: &str| Error::format(field, text, message);

    let parts: Vec<&str> = text.trim().split(':').collect();
    let [hours, minutes, seconds] = parts.as_slice() else {
        return Err(invalid("expected H:MM:SS"));
    };

    let hours: i64 = hours
        .trim()
        .parse()
        .map_err(|_| invalid("hours are not an integer"))?;
    let minutes: i64 = minutes
        .trim()
        .parse()
        .map_err(|_| invalid("minutes are not an integer"))?;
    let seconds: f64 = seconds
        .trim()
        .parse()
        .map_err(|_| invalid("seconds are not a number"))?;

    if hours < 0 || !(0..60).contains(&minutes) || !(0.0..60.0).contains(&seconds) {
        return Err(invalid("component out of range"));
    }

    let elapsed = TimeDelta::try_hours(hours)
        .zip(TimeDelta::try_minutes(minutes))
        .zip(TimeDelta::try_milliseconds((seconds * 1000.0).round() as i64))
        .and_then(|((h, m), s)| h.checked_add(&m)?.checked_add(&s))
        .ok_or_else(|| invalid("duration overflow"))?;

    Ok(elapsed.num_milliseconds() as f64 / 1000.0)
}

/// Date formats written by the instrument software, tried in order
const TIMESTAMP_FORMATS: &[&str] = &[
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%y %H%M%S",
    "%d.%m.%Y %H%M%S",
    "%d.%m.%Y %I%M%S %p",
];

/// Parse a completion or start time; `None` when no known format matches
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::DuplicateKeyPolicy;
    use crate::app::services::units::registry;
    use chrono::NaiveDate;

    #[test]
    fn test_elapsed_seconds() {
        assert_eq!(parse_elapsed_seconds("Elapsed Time", "0:01:05").unwrap(), 65.0);
        assert_eq!(parse_elapsed_seconds("Elapsed Time", "25:00:00").unwrap(), 90000.0);
        assert_eq!(parse_elapsed_seconds("Elapsed Time", "1:00:00.5").unwrap(), 3600.5);
    }

    #[test]
    fn test_malformed_elapsed_time_is_format_error() {
        for text in ["1:00", "a:00:00", "0:61:00", "0:00:60", "", "-1:00:00"] {
            assert!(
                matches!(
                    parse_elapsed_seconds("Elapsed Time", text),
                    Err(Error::Format { .. })
                ),
                "expected format error for '{}'",
                text
            );
        }
    }

    #[test]
    fn test_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 15)
            .and_then(|d| d.and_hms_opt(22, 23, 18))
            .unwrap();
        assert_eq!(parse_timestamp("03/15/2021 10:23:18 PM"), Some(expected));
        assert_eq!(parse_timestamp(" 03/15/2021 22:23:18 "), Some(expected));
        assert_eq!(parse_timestamp("15.03.2021 222318"), Some(expected));
        assert_eq!(parse_timestamp("03/15/21 222318"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("13/45/2021 10:23:18 AM"), None);
    }

    #[test]
    fn test_cursor_shapes() {
        let mut fields = FieldMap::new();
        let policy = DuplicateKeyPolicy::FirstWins;
        fields.insert_with_unit("Field", "5", Some("kG".to_string()), policy);
        fields.insert("Current Reversal", "On", policy);
        fields.insert(
            "Voltage",
            FieldValue::List(vec!["1".to_string(), "2".to_string()]),
            policy,
        );

        let cursor = FieldCursor::new(&fields, "Field", "test", registry());
        assert!((cursor.quantity().unwrap().unwrap() - 0.5).abs() < 1e-12);
        assert!(cursor.flag().is_err());

        let cursor = FieldCursor::new(&fields, "Current Reversal", "test", registry());
        assert_eq!(cursor.flag().unwrap(), Some(true));

        let cursor = FieldCursor::new(&fields, "Voltage", "test", registry());
        assert_eq!(cursor.array().unwrap(), Some(vec![1.0, 2.0]));
        assert!(cursor.quantity().is_err());

        let cursor = FieldCursor::new(&fields, "Absent", "test", registry());
        assert_eq!(cursor.quantity().unwrap(), None);
        assert_eq!(cursor.duration_seconds().unwrap(), None);
    }
}
