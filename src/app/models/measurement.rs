//! Typed measurement records
//!
//! Every physical quantity is stored as a base-unit magnitude. `None` marks a
//! value that was absent from the log or written as `ERROR`; nothing is ever
//! defaulted.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::constants::step_types;

/// Base-unit magnitude, either a single value or a column of values
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QuantityValue {
    Scalar(f64),
    Array(Vec<f64>),
}

impl QuantityValue {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            QuantityValue::Scalar(value) => Some(*value),
            QuantityValue::Array(_) => None,
        }
    }

    /// Values as a vector; a scalar becomes a single element
    pub fn to_vec(&self) -> Vec<f64> {
        match self {
            QuantityValue::Scalar(value) => vec![*value],
            QuantityValue::Array(values) => values.clone(),
        }
    }
}

/// Variant selected for a step by its name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MeasurementKind {
    Generic,
    VariableTemperature,
    VariableField,
    IvCurve,
}

impl MeasurementKind {
    /// Name of the record type produced for this kind
    pub fn record_type(&self) -> &'static str {
        match self {
            MeasurementKind::Generic => "GenericMeasurement",
            MeasurementKind::VariableTemperature => "VariableTemperatureMeasurement",
            MeasurementKind::VariableField => "VariableFieldMeasurement",
            MeasurementKind::IvCurve => "IVCurveMeasurement",
        }
    }

    /// Step-name substring that selects this kind
    pub fn step_marker(&self) -> Option<&'static str> {
        match self {
            MeasurementKind::Generic => None,
            MeasurementKind::VariableTemperature => Some(step_types::VARIABLE_TEMPERATURE),
            MeasurementKind::VariableField => Some(step_types::VARIABLE_FIELD),
            MeasurementKind::IvCurve => Some(step_types::IV_CURVE),
        }
    }
}

/// Start, completion and duration of a step
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeasurementTiming {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    /// `Time Completed`, or `Skipped at` when the step was skipped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_completed: Option<String>,

    /// `time_completed` as a local date and time, when it is in a known format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<NaiveDateTime>,

    /// Elapsed time in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_time: Option<f64>,
}

/// A typed measurement step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "m_def")]
pub enum Measurement {
    #[serde(rename = "GenericMeasurement")]
    Generic(GenericMeasurement),
    #[serde(rename = "VariableTemperatureMeasurement")]
    VariableTemperature(VariableTemperatureMeasurement),
    #[serde(rename = "VariableFieldMeasurement")]
    VariableField(VariableFieldMeasurement),
    #[serde(rename = "IVCurveMeasurement")]
    IvCurve(IVCurveMeasurement),
}

impl Measurement {
    pub fn name(&self) -> &str {
        match self {
            Measurement::Generic(m) => &m.name,
            Measurement::VariableTemperature(m) => &m.name,
            Measurement::VariableField(m) => &m.name,
            Measurement::IvCurve(m) => &m.name,
        }
    }

    pub fn kind(&self) -> MeasurementKind {
        match self {
            Measurement::Generic(_) => MeasurementKind::Generic,
            Measurement::VariableTemperature(_) => MeasurementKind::VariableTemperature,
            Measurement::VariableField(_) => MeasurementKind::VariableField,
            Measurement::IvCurve(_) => MeasurementKind::IvCurve,
        }
    }
}

/// Fallback for steps with no recognised type
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenericMeasurement {
    pub name: String,
}

// =============================================================================
// Variable Temperature
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VariableTemperatureMeasurement {
    pub name: String,
    #[serde(flatten)]
    pub timing: MeasurementTiming,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starting_temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ending_temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_step: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_at: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excitation_current: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resistance_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dwell_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_reversal: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry_selection: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<VariableTemperatureResults>,
}

/// Columns of a variable temperature data table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VariableTemperatureResults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<QuantityValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<QuantityValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resistivity: Option<QuantityValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hall_coefficient: Option<QuantityValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier_density: Option<QuantityValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hall_mobility: Option<QuantityValue>,
}

impl VariableTemperatureResults {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

// =============================================================================
// Variable Field
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VariableFieldMeasurement {
    pub name: String,
    #[serde(flatten)]
    pub timing: MeasurementTiming,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_field: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_field: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_step: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excitation_current: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resistance_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dwell_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_reversal: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry_selection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_reversal_positive_first: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_zero_field_resistivity: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zero_field_resistivity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_at_zero_resistivity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_at_zero_resistivity: Option<f64>,
    pub results: Vec<VariableFieldResults>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VariableFieldResults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<QuantityValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resistivity: Option<QuantityValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hall_coefficient: Option<QuantityValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier_density: Option<QuantityValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hall_mobility: Option<QuantityValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<QuantityValue>,
}

// =============================================================================
// IV Curve
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IVCurveMeasurement {
    pub name: String,
    #[serde(flatten)]
    pub timing: MeasurementTiming,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starting_current: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ending_current: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resistance_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dwell_time: Option<f64>,
    pub results: Vec<IVResults>,
}

/// Sweep data and linear fit of one contact set
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IVResults {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_fit_resistance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_fit_offset: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation: Option<f64>,
    /// `current * best_fit_resistance + best_fit_offset`, element-wise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_fit_values: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voltage: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<QuantityValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<QuantityValue>,
}

// =============================================================================
// Record
// =============================================================================

/// All measurements of one log file plus record-level classification
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HallMeasurementRecord {
    pub name: String,
    pub measurements: Vec<Measurement>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<VariableFieldResults>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl HallMeasurementRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Number of measurements of the given kind
    pub fn count_kind(&self, kind: MeasurementKind) -> usize {
        self.measurements.iter().filter(|m| m.kind() == kind).count()
    }

    /// Add a tag unless it is already present
    pub fn add_tag(&mut self, tag: &str) {
        if !self.tags.iter().any(|t| t == tag) {
            self.tags.push(tag.to_string());
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
