//! Test utilities and fixtures for Hall log parser testing
//!
//! The fixtures hold decoded text, so multi-byte glyphs appear the way a
//! Latin-1 decode of the instrument's UTF-8 output renders them (`Âµ`, `Î©`).

use crate::app::models::{FieldMap, ParsedStep};
use crate::app::services::hall_parser::{HallFileParser, ParseResult};

mod tokenizer_tests;

/// IV curve step with two contact sets
pub const IV_CURVE_STEP: &str = "<Step 1: IV Curve Measurement>
Start Time: 03/15/2021 10:22:13 AM
Time Completed: 03/15/2021 10:23:18 AM
Elapsed Time: 0:01:05
Starting Current = -100 [ÂµA]
Ending Current = 100 [ÂµA]
Current Step = 100 [ÂµA]
Resistance Range = Auto
Dwell Time [Sec] = 1

Contact Sets: A-B
Best Fit Resistance [Î©] = 10.5
Best Fit Offset [V] = 0.001
Correlation = 0.9998
Current [ÂµA]\tVoltage [V]\tField [kG]\tTemperature [K]
-100\t-0.00095\t0\t300
0\t0.001\t0\t300
100\t0.00205\t0\t300

Contact Sets: B-C
Best Fit Resistance [Î©] = ERROR
Best Fit Offset [V] = 0.002
Correlation = ERROR
Current [ÂµA]\tVoltage [V]\tField [kG]\tTemperature [K]
-100\tERROR\t0\t300
100\t0.003\t0\t300
";

/// Single-field Hall step with scalar results
pub const VARIABLE_FIELD_STEP: &str = "<Step 2: Variable Field Measurement>
Start Time: 03/15/2021 10:23:20 AM
Time Completed: 03/15/2021 10:25:50 AM
Elapsed Time: 0:02:30
Field profile = Fixed
Minimum Field = 5 [kG]
Maximum Field = 5 [kG]
Field Step = 0 [kG]
Direction = Positive
Measurement Type = Hall
Excitation Current = 100 [ÂµA]
Resistance Range = Auto
Dwell Time [Sec] = 2
Current Reversal = On
Geometry selection = Van der Pauw
Field Reversal with Positive field first
Use Zero-field Resistivity to calculate Hall Mobility = Yes
Zero-field Resistivity = 0.12 [Î© cm]
at Field = 0 [kG]
at Temperature = 300 [K]

Field [kG] = 5
Resistivity [Î© cm] = 0.12
Hall Coefficient [cmÂ³/C] = -25.3
Carrier Density [1/cmÂ³] = 2.47E17
Hall Mobility [cmÂ²/VS] = 210.8
Temperature [K] = 300.1
";

/// Temperature sweep with a data table
pub const VARIABLE_TEMPERATURE_STEP: &str = "<Step 4: Variable Temperature Measurement>
Start Time: 03/15/2021 11:00:00 AM
Time Completed: 03/16/2021 12:00:00 PM
Elapsed Time: 25:00:00
Starting Temperature = 10 [K]
Ending Temperature = 300 [K]
Temperature Step = 10 [K]
Spacing = Linear
Field at = 5 [kG]
Measurement Type = Resistivity and Hall
Excitation Current = 1 [mA]
Resistance Range = Auto
Dwell Time [Sec] = 5
Current Reversal = Off
Geometry selection = Van der Pauw

Temperature [K]\tField [kG]\tResistivity [Î© cm]\tHall Coefficient [cmÂ³/C]\tCarrier Density [1/cmÂ³]\tHall Mobility [cmÂ²/VS]
10\t5\t0.5\t-30\t2.1E17\t60
300\t5\tERROR\t-25\t2.5E17\t210
";

/// Step with no recognised measurement type
pub const GENERIC_STEP: &str = "<Step 3: Wait For Temperature>
Time Completed: 03/15/2021 10:59:00 AM
Elapsed Time: 0:33:10
";

/// Sections preceding the Measurements section
pub const HEADER_SECTIONS: &str = "Lake Shore Hall Measurement Export
[Sample]
Sample ID: 21-032-G
Thickness [cm] = 0.05
Geometry = Van der Pauw

[Measurements]
";

/// Room-temperature log: one IV curve, one field step and a wait step
pub fn room_temperature_log() -> String {
    format!(
        "{}{}\n{}\n{}",
        HEADER_SECTIONS, IV_CURVE_STEP, VARIABLE_FIELD_STEP, GENERIC_STEP
    )
}

/// Log containing only the given steps
pub fn log_with_steps(steps: &[&str]) -> String {
    let mut content = HEADER_SECTIONS.to_string();
    for step in steps {
        content.push_str(step);
        content.push('\n');
    }
    content
}

/// Parse content with the default parser
pub fn parse(content: &str) -> ParseResult {
    HallFileParser::default()
        .parse(content)
        .expect("fixture should parse")
}

/// Steps of the Measurements section
pub fn measurement_steps(result: &ParseResult) -> &[ParsedStep] {
    result.document.steps("Measurements")
}

/// Fields of the first step with the given name fragment
pub fn step_fields<'a>(result: &'a ParseResult, fragment: &str) -> &'a FieldMap {
    &measurement_steps(result)
        .iter()
        .find(|s| s.name.contains(fragment))
        .expect("step present")
        .fields
}
