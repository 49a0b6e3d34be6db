//! Test utilities for measurement assembly testing
//!
//! Fixtures are shared with the parser tests so both layers see the same
//! log text.

use crate::app::models::{Measurement, MeasurementKind, ParsedStep};
use crate::app::services::hall_parser::tests::{log_with_steps, measurement_steps, parse};
use crate::app::services::measurement_assembler::{MeasurementAssembler, RecordAssembly};


pub use crate::app::services::hall_parser::tests::{
    GENERIC_STEP, IV_CURVE_STEP, VARIABLE_FIELD_STEP, VARIABLE_TEMPERATURE_STEP,
};

/// Parsed steps of a log built from the given step blocks
pub fn parsed_steps(steps: &[&str]) -> Vec<ParsedStep> {
    measurement_steps(&parse(&log_with_steps(steps))).to_vec()
}

/// Assemble a record from the given step blocks
pub fn assemble(steps: &[&str]) -> RecordAssembly {
    MeasurementAssembler::default()
        .assemble_record("sample_meas", &parsed_steps(steps))
        .expect("fixture should assemble")
}

/// First measurement of the given kind
pub fn first_of(assembly: &RecordAssembly, kind: MeasurementKind) -> &Measurement {
    assembly
        .record
        .measurements
        .iter()
        .find(|m| m.kind() == kind)
        .expect("measurement present")
}

/// Relative comparison for base-unit magnitudes
pub fn assert_close(actual: f64, expected: f64) {
    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {}, got {}",
        expected,
        actual
    );
}
