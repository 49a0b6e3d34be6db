//! Step classification by name
//!
//! Rules are substring matches tried in a fixed order; the first rule whose
//! marker occurs in the step name decides the variant.

use crate::app::models::MeasurementKind;

/// Classification rules in match order
pub const CLASSIFICATION_ORDER: [MeasurementKind; 3] = [
    MeasurementKind::VariableTemperature,
    MeasurementKind::VariableField,
    MeasurementKind::IvCurve,
];

/// Variant for a step name, [`MeasurementKind::Generic`] when nothing matches
pub fn classify(step_name: &str) -> MeasurementKind {
    CLASSIFICATION_ORDER
        .iter()
        .copied()
        .find(|kind| kind.step_marker().is_some_and(|marker| step_name.contains(marker)))
        .unwrap_or(MeasurementKind::Generic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_step_headers() {
        assert_eq!(
            classify("Variable Temperature Measurement"),
            MeasurementKind::VariableTemperature
        );
        assert_eq!(
            classify("Variable Field Measurement"),
            MeasurementKind::VariableField
        );
        assert_eq!(classify("IV Curve Measurement"), MeasurementKind::IvCurve);
        assert_eq!(classify("Wait For Temperature"), MeasurementKind::Generic);
        assert_eq!(classify("Set Field"), MeasurementKind::Generic);
    }

    #[test]
    fn test_substring_match_and_first_rule_wins() {
        assert_eq!(
            classify("Hall: Variable Field Measurement (high res)"),
            MeasurementKind::VariableField
        );
        assert_eq!(
            classify("Variable Temperature Measurement with Variable Field Measurement"),
            MeasurementKind::VariableTemperature
        );
    }

    #[test]
    fn test_match_is_case_sensitive() {
        assert_eq!(classify("iv curve measurement"), MeasurementKind::Generic);
    }
}
