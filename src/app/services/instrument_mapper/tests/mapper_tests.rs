//! Tests for instrument mapping

use super::*;
use serde_yaml::Value;

#[test]
fn test_state_machine_sets_top_level_fields() {
    let instrument = map_yaml(INSTRUMENT_TEMPLATE).instrument;
    assert_eq!(instrument.model, Some(Value::from("Lake Shore 8404")));
    assert_eq!(instrument.software_version, Some(Value::from("4.3.1")));
    assert_eq!(instrument.current_source, Some(Value::from("Keithley 6221")));
}

#[test]
fn test_devices_are_instantiated_from_catalog() {
    let instrument = map_yaml(INSTRUMENT_TEMPLATE).instrument;

    let source = instrument.currentsource.as_ref().unwrap();
    assert_eq!(source.class_name, "Keithley6221CurrentSource");
    assert_eq!(source.get("serial_number"), Some(&Value::from(4311802)));
    assert_eq!(source.get("compliance_voltage"), Some(&Value::from(10)));
    assert_eq!(source.get("output_range"), Some(&Value::from("Best")));

    let voltmeter = instrument.voltmeter.as_ref().unwrap();
    assert_eq!(voltmeter.class_name, "Keithley2182ANanovoltmeter");
    assert_eq!(voltmeter.get("integration_time"), Some(&Value::from(5)));

    assert_eq!(
        instrument.electrometer.as_ref().unwrap().class_name,
        "Keithley6514Electrometer"
    );
    assert!(instrument.currentmeter.is_none());
}

#[test]
fn test_components_take_matching_fields() {
    let instrument = map_yaml(INSTRUMENT_TEMPLATE).instrument;
    assert_eq!(
        instrument.temperature_controller.control_mode,
        Some(Value::from("Closed Loop"))
    );
    assert_eq!(instrument.temperature_controller.setpoint, Some(Value::from(300)));
    assert_eq!(instrument.field_controller.maximum_field, Some(Value::from(1.7)));
    assert_eq!(
        instrument.system_parameters.sample_geometry,
        Some(Value::from("Van der Pauw"))
    );
}

#[test]
fn test_top_level_field_wins_over_component_field() {
    let instrument = map_yaml("Temperature Controller:\n  Model: Lake Shore 336\n").instrument;
    assert_eq!(instrument.model, Some(Value::from("Lake Shore 336")));
    assert_eq!(instrument.temperature_controller.model, None);
}

#[test]
fn test_temperature_domains_follow_first_appearance() {
    let instrument = map_yaml(INSTRUMENT_TEMPLATE).instrument;
    let indices: Vec<u32> = instrument.temperature_domain.iter().map(|d| d.index).collect();
    assert_eq!(indices, vec![2, 1]);

    assert_eq!(instrument.temperature_domain[0].sensor, Some(Value::from("Cernox")));
    assert_eq!(
        instrument.temperature_domain[1].minimum_temperature,
        Some(Value::from(300))
    );
}

#[test]
fn test_unmatched_paths_are_reported() {
    let mapping = map_yaml(INSTRUMENT_TEMPLATE);
    let reported: Vec<(&str, &str)> = mapping
        .unresolved
        .iter()
        .map(|a| (a.target.as_str(), a.attribute.as_str()))
        .collect();

    assert_eq!(
        reported,
        vec![
            (
                "MeasurementDevice",
                "/ENTRY[entry]/Measurement State Machine/Current Meter"
            ),
            ("InstrumentConfig", "/ENTRY[entry]/Keithley 6221/Display Brightness"),
        ]
    );
    assert!(mapping.unresolved.iter().all(|a| a.context == "fixture.yaml"));
}

#[test]
fn test_device_attributes_before_selection_are_unresolved() {
    let mapping = map_yaml(
        "Keithley 6221:
  Serial Number: 1
Measurement State Machine:
  Current Source: Keithley 6221
",
    );
    assert_eq!(mapping.unresolved.len(), 1);
    assert!(mapping.instrument.currentsource.unwrap().get("serial_number").is_none());
}
