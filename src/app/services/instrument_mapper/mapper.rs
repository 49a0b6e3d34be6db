//! Flattened template paths onto the instrument configuration

use regex::Regex;
use serde_yaml::Value;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use super::catalog::instantiate_device;
use super::flatten::FlatTemplate;
use super::snake_case::to_snake_case;
use crate::app::models::{InstrumentConfig, TemperatureDomain, UnresolvedAttribute};
use crate::constants::instrument::{
    COMPONENTS, DEVICE_ROLES, STATE_MACHINE_SEGMENT, UNITS_ATTRIBUTE,
};

static TEMPERATURE_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"temperature_domain_(\d+)/").expect("valid temperature domain regex")
});

/// Mapped configuration plus the template paths that found no destination
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstrumentMapping {
    pub instrument: InstrumentConfig,
    pub unresolved: Vec<UnresolvedAttribute>,
}

/// Map a flattened template; `source` names the template in reports
///
/// A device role whose tag matches no catalog entry keeps the raw tag on the
/// top-level field and is reported against `MeasurementDevice`.
pub fn map_instrument(template: &FlatTemplate, source: &str) -> InstrumentMapping {
    let mut state = MappingState::default();
    let mut unresolved = Vec::new();

    for (path, value) in template.iter() {
        let clean = to_snake_case(path);
        let field = clean.rsplit('/').next().unwrap_or_default();
        if field.starts_with(UNITS_ATTRIBUTE) {
            debug!("Skipping unit annotation '{}'", path);
            continue;
        }

        if let Err(target) = state.apply(&clean, field, value) {
            let attribute = UnresolvedAttribute::new(target, path, source);
            warn!("Unresolved attribute: {}", attribute);
            unresolved.push(attribute);
        }
    }

    let mut instrument = state.instrument;
    instrument.temperature_domain = state.domains;
    info!(
        "Mapped instrument template '{}' ({} unresolved)",
        source,
        unresolved.len()
    );
    InstrumentMapping {
        instrument,
        unresolved,
    }
}

#[derive(Debug, Default)]
struct MappingState {
    instrument: InstrumentConfig,
    /// Domains in order of first appearance of their index
    domains: Vec<TemperatureDomain>,
    /// Instantiated device roles and their template path segments
    devices: Vec<(&'static str, String)>,
}

impl MappingState {
    /// Apply one path; `Err` names the structure that had no destination
    fn apply(&mut self, clean: &str, field: &str, value: &Value) -> Result<(), &'static str> {
        let mut applied = false;

        let state_machine = format!("/{}/", STATE_MACHINE_SEGMENT);
        if let Some((_, remainder)) = clean.split_once(state_machine.as_str()) {
            applied |= self.instrument.set(field, value.clone());
            if let Some(role) = DEVICE_ROLES.iter().copied().find(|role| *role == remainder) {
                if !self.select_device(role, value) {
                    return Err("MeasurementDevice");
                }
            }
        }

        if let Some(captures) = TEMPERATURE_DOMAIN.captures(clean) {
            let index = captures[1].parse::<u32>().map_err(|_| "TemperatureDomain")?;
            let domain = self.domain(index);
            return if domain.set(field, value.clone()) || applied {
                Ok(())
            } else {
                Err("TemperatureDomain")
            };
        }

        for component in COMPONENTS {
            if clean.contains(&format!("/{}/", component)) {
                applied |= self.instrument.set(field, value.clone())
                    || self.instrument.set_component(component, field, value.clone());
            }
        }

        for (role, segment) in &self.devices {
            if clean.contains(&format!("/{}/", segment)) {
                if let Some(Some(device)) = self.instrument.device_slot(role) {
                    applied |= device.set(field, value.clone());
                }
            }
        }

        if applied { Ok(()) } else { Err("InstrumentConfig") }
    }

    fn domain(&mut self, index: u32) -> &mut TemperatureDomain {
        let position = match self.domains.iter().position(|d| d.index == index) {
            Some(position) => position,
            None => {
                self.domains.push(TemperatureDomain::new(index));
                self.domains.len() - 1
            }
        };
        &mut self.domains[position]
    }

    /// Instantiate the catalog device named by `value` into the role's slot
    fn select_device(&mut self, role: &'static str, value: &Value) -> bool {
        let Some(tag) = value.as_str() else {
            warn!("Device tag for {} is not text: {:?}", role, value);
            return false;
        };
        let Some(device) = instantiate_device(tag) else {
            warn!("No catalog device matches {} '{}'", role, tag);
            return false;
        };

        info!("The {} is {} ({})", role, tag, device.class_name);
        self.devices.retain(|(existing, _)| *existing != role);
        self.devices.push((role, device.segment.clone()));
        if let Some(slot) = self.instrument.device_slot(role) {
            *slot = Some(device);
        }
        true
    }
}
