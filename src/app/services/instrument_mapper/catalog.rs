//! Measurement device catalog
//!
//! Entries are tried in declaration order and the first one whose normalized
//! class name contains the normalized device tag wins, so a shorter tag such
//! as `Keithley 62` resolves to the earliest matching model.

use super::snake_case::to_snake_case;
use crate::app::models::MeasurementDevice;

/// One registered device class and the attributes it accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceEntry {
    pub class_name: &'static str,
    pub attributes: &'static [&'static str],
}

const SOURCE_ATTRIBUTES: &[&str] = &[
    "model",
    "serial_number",
    "firmware_version",
    "compliance_voltage",
    "output_range",
    "filter",
];

const METER_ATTRIBUTES: &[&str] = &[
    "model",
    "serial_number",
    "firmware_version",
    "measurement_range",
    "integration_time",
    "filter",
    "auto_zero",
];

const SOURCE_METER_ATTRIBUTES: &[&str] = &[
    "model",
    "serial_number",
    "firmware_version",
    "compliance_voltage",
    "compliance_current",
    "measurement_range",
    "integration_time",
    "output_range",
];

/// Registered devices in match order
pub const DEVICE_CATALOG: &[DeviceEntry] = &[
    DeviceEntry {
        class_name: "Keithley6220CurrentSource",
        attributes: SOURCE_ATTRIBUTES,
    },
    DeviceEntry {
        class_name: "Keithley6221CurrentSource",
        attributes: SOURCE_ATTRIBUTES,
    },
    DeviceEntry {
        class_name: "Keithley2182ANanovoltmeter",
        attributes: METER_ATTRIBUTES,
    },
    DeviceEntry {
        class_name: "Keithley2000Multimeter",
        attributes: METER_ATTRIBUTES,
    },
    DeviceEntry {
        class_name: "Keithley6485Picoammeter",
        attributes: METER_ATTRIBUTES,
    },
    DeviceEntry {
        class_name: "Keithley6514Electrometer",
        attributes: METER_ATTRIBUTES,
    },
    DeviceEntry {
        class_name: "Keithley6517BElectrometer",
        attributes: METER_ATTRIBUTES,
    },
    DeviceEntry {
        class_name: "Keithley2400SourceMeter",
        attributes: SOURCE_METER_ATTRIBUTES,
    },
];

/// First catalog entry matching a device tag such as `Keithley 6221`
pub fn find_device(tag: &str) -> Option<&'static DeviceEntry> {
    let needle = to_snake_case(&tag.replace(' ', ""));
    if needle.is_empty() {
        return None;
    }
    DEVICE_CATALOG
        .iter()
        .find(|entry| to_snake_case(entry.class_name).contains(&needle))
}

/// Instantiate the device for a tag; its path segment is the snake-cased tag
pub fn instantiate_device(tag: &str) -> Option<MeasurementDevice> {
    find_device(tag).map(|entry| {
        MeasurementDevice::new(
            entry.class_name,
            tag,
            to_snake_case(tag),
            entry.attributes,
        )
    })
}
