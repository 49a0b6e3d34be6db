//! Record-level classification over the ordered measurement list

use tracing::{debug, info};

use crate::app::models::{HallMeasurementRecord, Measurement, MeasurementKind};
use crate::constants::tags;

/// Apply the tagging rules and copy the room-temperature result
///
/// Rules are cumulative; a record can carry several tags.
pub fn apply_aggregate_rules(record: &mut HallMeasurementRecord) {
    let field_count = record.count_kind(MeasurementKind::VariableField);
    let iv_count = record.count_kind(MeasurementKind::IvCurve);
    let temperature_count = record.count_kind(MeasurementKind::VariableTemperature);
    debug!(
        "Aggregating '{}': {} field, {} IV, {} temperature measurements",
        record.name, field_count, iv_count, temperature_count
    );

    if field_count == 1 && iv_count == 1 {
        let first_result = record.measurements.iter().find_map(|m| match m {
            Measurement::VariableField(field) => field.results.first().cloned(),
            _ => None,
        });
        if let Some(result) = first_result {
            record.results.push(result);
        }
        record.add_tag(tags::ROOM_TEMPERATURE);
        info!("Record '{}' tagged '{}'", record.name, tags::ROOM_TEMPERATURE);
    }

    if field_count > 1 {
        record.add_tag(tags::VARIABLE_FIELD);
        info!("Record '{}' tagged '{}'", record.name, tags::VARIABLE_FIELD);
    }

    if temperature_count >= 1 {
        record.add_tag(tags::VARIABLE_TEMPERATURE);
        info!("Record '{}' tagged '{}'", record.name, tags::VARIABLE_TEMPERATURE);
    }
}
