//! Test utilities and fixtures for instrument template mapping

use crate::app::services::instrument_mapper::{
    FlatTemplate, InstrumentMapping, TemplateFormat, map_instrument, parse_template,
};

// Test modules
mod flatten_tests;
mod mapper_tests;

/// Template covering devices, components and temperature domains
pub const INSTRUMENT_TEMPLATE: &str = "\
Measurement State Machine:
  Model: Lake Shore 8404
  Software Version: 4.3.1
  Electro Meter: Keithley 6514
  Volt Meter: Keithley 2182A
  Current Source: Keithley 6221
  Current Meter: Agilent 34401
Keithley 6221:
  Serial Number: 4311802
  Compliance Voltage:
    value: 10
    unit: V
  Output Range: Best
  Display Brightness: Dim
Keithley 2182A:
  Integration Time: 5
Temperature Controller:
  Control Mode: Closed Loop
  Setpoint:
    value: 300
    unit: K
Field Controller:
  Magnet Type: Electromagnet
  Maximum Field:
    value: 1.7
    unit: T
System Parameters:
  Sample Geometry: Van der Pauw
  Probe Type: Room temperature
Temperature Domain 2:
  Name: Cryostat
  Sensor: Cernox
Temperature Domain 1:
  Name: Oven
  Minimum Temperature:
    value: 300
    unit: K
";

/// Flatten YAML template text
pub fn flatten_yaml(content: &str) -> FlatTemplate {
    parse_template(content, TemplateFormat::Yaml).expect("fixture template should parse")
}

/// Flatten and map YAML template text
pub fn map_yaml(content: &str) -> InstrumentMapping {
    map_instrument(&flatten_yaml(content), "fixture.yaml")
}
