//! Measurement assembly from extracted step fields
//!
//! Every variant is populated from its field table. Timing fields are shared
//! by all variants and handled up front; any other source field without a
//! rule is reported as an [`UnresolvedAttribute`].

use std::sync::LazyLock;
use tracing::{debug, warn};

use super::aggregate::apply_aggregate_rules;
use super::classifier::classify;
use super::field_table::{FieldCursor, FieldRule, find_rule, parse_timestamp};
use crate::Result;
use crate::app::models::{
    ContactSet, FieldMap, FieldValue, GenericMeasurement, HallMeasurementRecord,
    IVCurveMeasurement, IVResults, Measurement, MeasurementKind, MeasurementTiming, ParsedStep,
    UnresolvedAttribute, VariableFieldMeasurement, VariableFieldResults,
    VariableTemperatureMeasurement, VariableTemperatureResults,
};
use crate::app::services::units::{UnitRegistry, registry};
use crate::constants::fields;

/// Source fields consumed by the timing block of every variant
const TIMING_FIELDS: [&str; 4] = [
    fields::START_TIME,
    fields::TIME_COMPLETED,
    fields::SKIPPED_AT,
    fields::ELAPSED_TIME,
];

/// One assembled step and the attributes that found no destination
#[derive(Debug, Clone)]
pub struct StepAssembly {
    pub measurement: Measurement,
    pub unresolved: Vec<UnresolvedAttribute>,
}

/// A full record and all unresolved attributes of its steps
#[derive(Debug, Clone)]
pub struct RecordAssembly {
    pub record: HallMeasurementRecord,
    pub unresolved: Vec<UnresolvedAttribute>,
}

/// Builds typed measurements from parsed steps
#[derive(Debug, Clone, Copy)]
pub struct MeasurementAssembler<'r> {
    registry: &'r UnitRegistry,
}

impl Default for MeasurementAssembler<'static> {
    fn default() -> Self {
        Self::new(registry())
    }
}

impl<'r> MeasurementAssembler<'r> {
    pub fn new(registry: &'r UnitRegistry) -> Self {
        Self { registry }
    }

    /// Assemble every step in order and apply the record-level rules
    pub fn assemble_record(
        &self,
        name: impl Into<String>,
        steps: &[ParsedStep],
    ) -> Result<RecordAssembly> {
        let mut record = HallMeasurementRecord::new(name);
        let mut unresolved = Vec::new();

        for step in steps {
            let assembled = self.assemble(step)?;
            record.measurements.push(assembled.measurement);
            unresolved.extend(assembled.unresolved);
        }

        apply_aggregate_rules(&mut record);
        Ok(RecordAssembly { record, unresolved })
    }

    /// Assemble a single step into its measurement variant
    pub fn assemble(&self, step: &ParsedStep) -> Result<StepAssembly> {
        let key = step.key();
        let kind = classify(&step.name);
        debug!("Assembling '{}' as {}", key, kind.record_type());

        let mut unresolved = Vec::new();
        let measurement = match kind {
            MeasurementKind::Generic => Measurement::Generic(GenericMeasurement { name: key }),
            MeasurementKind::VariableTemperature => {
                let mut m = VariableTemperatureMeasurement {
                    name: range_name(
                        &key,
                        &step.fields,
                        fields::STARTING_TEMPERATURE,
                        fields::ENDING_TEMPERATURE,
                    ),
                    timing: self.timing(&step.fields, &key)?,
                    ..Default::default()
                };
                let scope = RuleScope::new(kind.record_type(), &step.fields, &key);
                self.apply_rules(&mut m, &VARIABLE_TEMPERATURE_RULES, scope, &mut unresolved)?;
                m.results.retain(|r| !r.is_empty());
                Measurement::VariableTemperature(m)
            }
            MeasurementKind::VariableField => {
                let mut m = VariableFieldMeasurement {
                    name: range_name(
                        &key,
                        &step.fields,
                        fields::MINIMUM_FIELD,
                        fields::MAXIMUM_FIELD,
                    ),
                    timing: self.timing(&step.fields, &key)?,
                    results: vec![VariableFieldResults::default()],
                    ..Default::default()
                };
                let scope = RuleScope::new(kind.record_type(), &step.fields, &key);
                self.apply_rules(&mut m, &VARIABLE_FIELD_RULES, scope, &mut unresolved)?;
                Measurement::VariableField(m)
            }
            MeasurementKind::IvCurve => {
                let mut m = IVCurveMeasurement {
                    timing: self.timing(&step.fields, &key)?,
                    ..Default::default()
                };
                let scope = RuleScope::new(kind.record_type(), &step.fields, &key)
                    .handling(&[fields::CONTACT_SETS]);
                self.apply_rules(&mut m, &IV_CURVE_RULES, scope, &mut unresolved)?;
                if let Some(sets) = step
                    .fields
                    .get(fields::CONTACT_SETS)
                    .and_then(FieldValue::as_contact_sets)
                {
                    for set in sets {
                        m.results.push(self.iv_results(set, &key, &mut unresolved)?);
                    }
                }
                m.name = key;
                Measurement::IvCurve(m)
            }
        };

        Ok(StepAssembly {
            measurement,
            unresolved,
        })
    }

    fn timing(&self, step_fields: &FieldMap, context: &str) -> Result<MeasurementTiming> {
        let cursor = |key| FieldCursor::new(step_fields, key, context, self.registry);

        let time_completed = cursor(fields::TIME_COMPLETED)
            .text()
            .or_else(|| cursor(fields::SKIPPED_AT).text());

        let completed_at = time_completed.as_deref().and_then(|text| {
            let parsed = parse_timestamp(text);
            if parsed.is_none() {
                debug!("{}: completion time '{}' is not a known date format", context, text);
            }
            parsed
        });

        Ok(MeasurementTiming {
            start_time: cursor(fields::START_TIME).text(),
            time_completed,
            completed_at,
            elapsed_time: cursor(fields::ELAPSED_TIME).duration_seconds()?,
        })
    }

    fn apply_rules<T>(
        &self,
        target: &mut T,
        rules: &[FieldRule<T>],
        scope: RuleScope<'_>,
        unresolved: &mut Vec<UnresolvedAttribute>,
    ) -> Result<()> {
        for key in scope.fields.keys() {
            if let Some(rule) = find_rule(rules, key) {
                let cursor = FieldCursor::new(scope.fields, key, scope.context, self.registry);
                (rule.apply)(target, &cursor)?;
            } else if !TIMING_FIELDS.contains(&key) && !scope.handled.contains(&key) {
                let attribute = UnresolvedAttribute::new(scope.target, key, scope.context);
                warn!("Unresolved attribute: {}", attribute);
                unresolved.push(attribute);
            }
        }
        Ok(())
    }

    fn iv_results(
        &self,
        set: &ContactSet,
        step_key: &str,
        unresolved: &mut Vec<UnresolvedAttribute>,
    ) -> Result<IVResults> {
        let context = format!("{} / {}", step_key, set.name);
        let mut results = IVResults {
            name: set.name.clone(),
            ..Default::default()
        };
        let scope = RuleScope::new("IVResults", &set.fields, &context).handling(&[fields::NAME]);
        self.apply_rules(&mut results, &IV_RESULT_RULES, scope, unresolved)?;
        results.best_fit_values = best_fit_values(&set.fields, &results);
        Ok(results)
    }
}

/// Fields a rule table is applied to, and the keys handled elsewhere
#[derive(Clone, Copy)]
struct RuleScope<'a> {
    target: &'a str,
    fields: &'a FieldMap,
    context: &'a str,
    handled: &'a [&'a str],
}

impl<'a> RuleScope<'a> {
    fn new(target: &'a str, fields: &'a FieldMap, context: &'a str) -> Self {
        Self {
            target,
            fields,
            context,
            handled: &[],
        }
    }

    fn handling(mut self, handled: &'a [&'a str]) -> Self {
        self.handled = handled;
        self
    }
}

/// `current * R + offset` when all three inputs were present and resolved
pub fn best_fit_values(raw: &FieldMap, results: &IVResults) -> Option<Vec<f64>> {
    let present = |key| raw.get(key).is_some_and(|v| !v.is_empty());
    if !(present(fields::CURRENT)
        && present(fields::BEST_FIT_RESISTANCE)
        && present(fields::BEST_FIT_OFFSET))
    {
        return None;
    }

    let current = results.current.as_ref()?;
    let resistance = results.best_fit_resistance?;
    let offset = results.best_fit_offset?;
    Some(current.iter().map(|i| i * resistance + offset).collect())
}

/// `"<key>: range <start> <unit> -> <end> <unit>"` from raw source text
fn range_name(key: &str, step_fields: &FieldMap, start: &str, end: &str) -> String {
    let bound = |field: &str| {
        step_fields.scalar(field).map(|value| match step_fields.unit(field) {
            Some(unit) if !unit.is_empty() => format!("{} {}", value.trim(), unit),
            _ => value.trim().to_string(),
        })
    };

    match (bound(start), bound(end)) {
        (Some(from), Some(to)) => format!("{}: range {} -> {}", key, from, to),
        _ => key.to_string(),
    }
}

// =============================================================================
// Field Tables
// =============================================================================

fn vt_results(m: &mut VariableTemperatureMeasurement) -> &mut VariableTemperatureResults {
    if m.results.is_empty() {
        m.results.push(VariableTemperatureResults::default());
    }
    &mut m.results[0]
}

fn vf_results(m: &mut VariableFieldMeasurement) -> &mut VariableFieldResults {
    if m.results.is_empty() {
        m.results.push(VariableFieldResults::default());
    }
    &mut m.results[0]
}

static VARIABLE_TEMPERATURE_RULES: LazyLock<Vec<FieldRule<VariableTemperatureMeasurement>>> =
    LazyLock::new(|| {
        vec![
            FieldRule::new("Starting Temperature", |m, c| {
                m.starting_temperature = c.quantity()?;
                Ok(())
            }),
            FieldRule::new("Ending Temperature", |m, c| {
                m.ending_temperature = c.quantity()?;
                Ok(())
            }),
            FieldRule::new("Temperature Step", |m, c| {
                m.temperature_step = c.quantity()?;
                Ok(())
            }),
            FieldRule::new("Spacing", |m, c| {
                m.spacing = c.text();
                Ok(())
            }),
            FieldRule::new("Field at", |m, c| {
                m.field_at = c.quantity()?;
                Ok(())
            }),
            FieldRule::new("Measurement Type", |m, c| {
                m.measurement_type = c.text();
                Ok(())
            }),
            FieldRule::new("Excitation Current", |m, c| {
                m.excitation_current = c.quantity()?;
                Ok(())
            }),
            FieldRule::new("Resistance Range", |m, c| {
                m.resistance_range = c.text();
                Ok(())
            }),
            FieldRule::new("Dwell Time", |m, c| {
                m.dwell_time = c.quantity()?;
                Ok(())
            }),
            FieldRule::new("Current Reversal", |m, c| {
                m.current_reversal = c.flag()?;
                Ok(())
            }),
            FieldRule::new("Geometry selection", |m, c| {
                m.geometry_selection = c.text();
                Ok(())
            }),
            FieldRule::new("Temperature", |m, c| {
                vt_results(m).temperature = c.values()?;
                Ok(())
            }),
            FieldRule::new("Field", |m, c| {
                vt_results(m).field = c.values()?;
                Ok(())
            }),
            FieldRule::new("Resistivity", |m, c| {
                vt_results(m).resistivity = c.values()?;
                Ok(())
            }),
            FieldRule::new("Hall Coefficient", |m, c| {
                vt_results(m).hall_coefficient = c.values()?;
                Ok(())
            }),
            FieldRule::new("Carrier Density", |m, c| {
                vt_results(m).carrier_density = c.values()?;
                Ok(())
            }),
            FieldRule::new("Hall Mobility", |m, c| {
                vt_results(m).hall_mobility = c.values()?;
                Ok(())
            }),
        ]
    });

static VARIABLE_FIELD_RULES: LazyLock<Vec<FieldRule<VariableFieldMeasurement>>> =
    LazyLock::new(|| {
        vec![
            FieldRule::new("Field profile", |m, c| {
                m.field_profile = c.text();
                Ok(())
            }),
            FieldRule::new("Minimum Field", |m, c| {
                m.minimum_field = c.quantity()?;
                Ok(())
            }),
            FieldRule::new("Maximum Field", |m, c| {
                m.maximum_field = c.quantity()?;
                Ok(())
            }),
            FieldRule::new("Field Step", |m, c| {
                m.field_step = c.quantity()?;
                Ok(())
            }),
            FieldRule::new("Direction", |m, c| {
                m.direction = c.text();
                Ok(())
            }),
            FieldRule::new("Measurement Type", |m, c| {
                m.measurement_type = c.text();
                Ok(())
            }),
            FieldRule::new("Excitation Current", |m, c| {
                m.excitation_current = c.quantity()?;
                Ok(())
            }),
            FieldRule::new("Resistance Range", |m, c| {
                m.resistance_range = c.text();
                Ok(())
            }),
            FieldRule::new("Dwell Time", |m, c| {
                m.dwell_time = c.quantity()?;
                Ok(())
            }),
            FieldRule::new("Current Reversal", |m, c| {
                m.current_reversal = c.flag()?;
                Ok(())
            }),
            FieldRule::new("Geometry selection", |m, c| {
                m.geometry_selection = c.text();
                Ok(())
            }),
            FieldRule::new("Field Reversal with Positive field first", |m, c| {
                m.field_reversal_positive_first = c.present();
                Ok(())
            }),
            FieldRule::new("Use Zero-field Resistivity to calculate Hall Mobility", |m, c| {
                m.use_zero_field_resistivity = c.flag()?;
                Ok(())
            }),
            FieldRule::new("Zero-field Resistivity", |m, c| {
                m.zero_field_resistivity = c.quantity()?;
                Ok(())
            }),
            FieldRule::new("at Field", |m, c| {
                m.field_at_zero_resistivity = c.quantity()?;
                Ok(())
            }),
            FieldRule::new("at Temperature", |m, c| {
                m.temperature_at_zero_resistivity = c.quantity()?;
                Ok(())
            }),
            FieldRule::new("Field", |m, c| {
                vf_results(m).field = c.values()?;
                Ok(())
            }),
            FieldRule::new("Resistivity", |m, c| {
                vf_results(m).resistivity = c.values()?;
                Ok(())
            }),
            FieldRule::new("Hall Coefficient", |m, c| {
                vf_results(m).hall_coefficient = c.values()?;
                Ok(())
            }),
            FieldRule::new("Carrier Density", |m, c| {
                vf_results(m).carrier_density = c.values()?;
                Ok(())
            }),
            FieldRule::new("Hall Mobility", |m, c| {
                vf_results(m).hall_mobility = c.values()?;
                Ok(())
            }),
            FieldRule::new("Temperature", |m, c| {
                vf_results(m).temperature = c.values()?;
                Ok(())
            }),
        ]
    });

static IV_CURVE_RULES: LazyLock<Vec<FieldRule<IVCurveMeasurement>>> = LazyLock::new(|| {
    vec![
        FieldRule::new("Starting Current", |m, c| {
            m.starting_current = c.quantity()?;
            Ok(())
        }),
        FieldRule::new("Ending Current", |m, c| {
            m.ending_current = c.quantity()?;
            Ok(())
        }),
        FieldRule::new("Current Step", |m, c| {
            m.current_step = c.quantity()?;
            Ok(())
        }),
        FieldRule::new("Resistance Range", |m, c| {
            m.resistance_range = c.text();
            Ok(())
        }),
        FieldRule::new("Dwell Time", |m, c| {
            m.dwell_time = c.quantity()?;
            Ok(())
        }),
    ]
});

static IV_RESULT_RULES: LazyLock<Vec<FieldRule<IVResults>>> = LazyLock::new(|| {
    vec![
        FieldRule::new("Best Fit Resistance", |r, c| {
            r.best_fit_resistance = c.quantity()?;
            Ok(())
        }),
        FieldRule::new("Best Fit Offset", |r, c| {
            r.best_fit_offset = c.quantity()?;
            Ok(())
        }),
        FieldRule::new("Correlation", |r, c| {
            r.correlation = c.quantity()?;
            Ok(())
        }),
        FieldRule::new("Current", |r, c| {
            r.current = c.array()?;
            Ok(())
        }),
        FieldRule::new("Voltage", |r, c| {
            r.voltage = c.array()?;
            Ok(())
        }),
        FieldRule::new("Field", |r, c| {
            r.field = c.values()?;
            Ok(())
        }),
        FieldRule::new("Temperature", |r, c| {
            r.temperature = c.values()?;
            Ok(())
        }),
    ]
});
