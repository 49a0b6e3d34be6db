//! Instrument configuration model
//!
//! Values are stored exactly as they appear in the template, so every
//! attribute is a raw [`serde_yaml::Value`]. Each component knows the names
//! it accepts through its `set` method; a `false` return means the attribute
//! has no destination on that component.

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use serde_yaml::Value;

/// Top-level instrument configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InstrumentConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software_version: Option<Value>,

    /// Device selected for each measurement role
    #[serde(skip_serializing_if = "Option::is_none")]
    pub electro_meter: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volt_meter: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_meter: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_source: Option<Value>,

    pub temperature_controller: TemperatureController,
    pub field_controller: FieldController,
    pub system_parameters: SystemParameters,

    /// Domains in order of first appearance in the template
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub temperature_domain: Vec<TemperatureDomain>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub electrometer: Option<MeasurementDevice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voltmeter: Option<MeasurementDevice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currentmeter: Option<MeasurementDevice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currentsource: Option<MeasurementDevice>,
}

impl InstrumentConfig {
    /// Set a top-level field by name
    pub fn set(&mut self, field: &str, value: Value) -> bool {
        let slot = match field {
            "model" => &mut self.model,
            "serial_number" => &mut self.serial_number,
            "software_version" => &mut self.software_version,
            "electro_meter" => &mut self.electro_meter,
            "volt_meter" => &mut self.volt_meter,
            "current_meter" => &mut self.current_meter,
            "current_source" => &mut self.current_source,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// Set a field on one of the fixed components
    pub fn set_component(&mut self, component: &str, field: &str, value: Value) -> bool {
        match component {
            "temperature_controller" => self.temperature_controller.set(field, value),
            "field_controller" => self.field_controller.set(field, value),
            "system_parameters" => self.system_parameters.set(field, value),
            _ => false,
        }
    }

    /// Device slot for a measurement role name such as `current_source`
    pub fn device_slot(&mut self, role: &str) -> Option<&mut Option<MeasurementDevice>> {
        match role {
            "electro_meter" => Some(&mut self.electrometer),
            "volt_meter" => Some(&mut self.voltmeter),
            "current_meter" => Some(&mut self.currentmeter),
            "current_source" => Some(&mut self.currentsource),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TemperatureController {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_mode: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setpoint: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ramp_rate: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heater_range: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_type: Option<Value>,
}

impl TemperatureController {
    pub fn set(&mut self, field: &str, value: Value) -> bool {
        let slot = match field {
            "model" => &mut self.model,
            "serial_number" => &mut self.serial_number,
            "control_mode" => &mut self.control_mode,
            "setpoint" => &mut self.setpoint,
            "ramp_rate" => &mut self.ramp_rate,
            "heater_range" => &mut self.heater_range,
            "sensor_type" => &mut self.sensor_type,
            _ => return false,
        };
        *slot = Some(value);
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldController {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magnet_type: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_field: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_ramp_rate: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pole_gap: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_supply: Option<Value>,
}

impl FieldController {
    pub fn set(&mut self, field: &str, value: Value) -> bool {
        let slot = match field {
            "model" => &mut self.model,
            "magnet_type" => &mut self.magnet_type,
            "maximum_field" => &mut self.maximum_field,
            "field_ramp_rate" => &mut self.field_ramp_rate,
            "pole_gap" => &mut self.pole_gap,
            "power_supply" => &mut self.power_supply,
            _ => return false,
        };
        *slot = Some(value);
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SystemParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_geometry: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_thickness: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_configuration: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_holder: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe_type: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cryostat: Option<Value>,
}

impl SystemParameters {
    pub fn set(&mut self, field: &str, value: Value) -> bool {
        let slot = match field {
            "sample_geometry" => &mut self.sample_geometry,
            "sample_thickness" => &mut self.sample_thickness,
            "contact_configuration" => &mut self.contact_configuration,
            "sample_holder" => &mut self.sample_holder,
            "probe_type" => &mut self.probe_type,
            "cryostat" => &mut self.cryostat,
            _ => return false,
        };
        *slot = Some(value);
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TemperatureDomain {
    /// Index `N` of the `temperature_domain_N` template group
    pub index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_temperature: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_temperature: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_loop: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heater_resistance: Option<Value>,
}

impl TemperatureDomain {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    pub fn set(&mut self, field: &str, value: Value) -> bool {
        let slot = match field {
            "name" => &mut self.name,
            "minimum_temperature" => &mut self.minimum_temperature,
            "maximum_temperature" => &mut self.maximum_temperature,
            "sensor" => &mut self.sensor,
            "control_loop" => &mut self.control_loop,
            "heater_resistance" => &mut self.heater_resistance,
            _ => return false,
        };
        *slot = Some(value);
        true
    }
}

/// A measurement device instantiated from the device catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementDevice {
    /// Catalog entry name, e.g. `Keithley6221CurrentSource`
    pub class_name: String,
    /// Template value that selected the device, e.g. `Keithley 6221`
    pub model: String,
    /// Path segment under which the template lists this device's fields
    #[serde(skip)]
    pub segment: String,
    #[serde(skip)]
    accepted: &'static [&'static str],
    #[serde(serialize_with = "serialize_attributes")]
    pub attributes: Vec<(String, Value)>,
}

fn serialize_attributes<S: Serializer>(
    attributes: &[(String, Value)],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(attributes.len()))?;
    for (name, value) in attributes {
        map.serialize_entry(name, value)?;
    }
    map.end()
}

impl MeasurementDevice {
    pub fn new(
        class_name: impl Into<String>,
        model: impl Into<String>,
        segment: impl Into<String>,
        accepted: &'static [&'static str],
    ) -> Self {
        Self {
            class_name: class_name.into(),
            model: model.into(),
            segment: segment.into(),
            accepted,
            attributes: Vec::new(),
        }
    }

    /// Attribute names this device accepts
    pub fn accepted_attributes(&self) -> &'static [&'static str] {
        self.accepted
    }

    /// Set an attribute if the device accepts it, replacing an earlier value
    pub fn set(&mut self, field: &str, value: Value) -> bool {
        if !self.accepted.contains(&field) {
            return false;
        }
        match self.attributes.iter_mut().find(|(name, _)| name == field) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((field.to_string(), value)),
        }
        true
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }
}
