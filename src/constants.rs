//! Application constants for the Hall processor
//!
//! This module contains the literal markers of the instrument log format,
//! the unit cleanup table, classification strings and archive naming
//! conventions used throughout the processor.

// =============================================================================
// Log Format Markers
// =============================================================================

/// Name of the section whose body is split into numbered steps
pub const MEASUREMENTS_SECTION: &str = "Measurements";

/// Marker that opens a contact-set block inside an IV curve step
pub const CONTACT_SETS_MARKER: &str = "Contact Sets";

/// Suffix of the sibling entry holding a field's raw unit string
pub const UNIT_SUFFIX: &str = "_unit";

/// Token the instrument writes when a value could not be measured
pub const ERROR_TOKEN: &str = "ERROR";

/// Textual values that resolve to boolean `true`
pub const TRUE_TOKENS: &[&str] = &["On", "Yes"];

/// Textual values that resolve to the missing marker
pub const FALSE_TOKENS: &[&str] = &["Off", "No"];

/// Characters separating a key from its value on a key-value line
pub const KEY_VALUE_SEPARATORS: [char; 2] = ['=', ':'];

// =============================================================================
// Unit Normalization
// =============================================================================

/// Ordered literal replacements applied to raw unit strings.
///
/// Files are decoded as ISO-8859-1, so UTF-8 glyphs such as `²` and `µ`
/// arrive with a leading `Â` which is stripped first.
pub const UNIT_CLEANUP_TABLE: &[(&str, &str)] = &[
    ("Â", ""),
    ("Î©", "ohm"),
    ("Ω", "ohm"),
    ("µ", "u"),
    ("μ", "u"),
    ("Sec", "s"),
    ("cm³", "cm ** 3"),
    ("cm²", "cm ** 2"),
    ("VS", "volt * second"),
    ("ohm cm", "ohm * cm"),
];

// =============================================================================
// Step Classification
// =============================================================================

/// Step-name substrings identifying each measurement variant
pub mod step_types {
    pub const VARIABLE_TEMPERATURE: &str = "Variable Temperature Measurement";
    pub const VARIABLE_FIELD: &str = "Variable Field Measurement";
    pub const IV_CURVE: &str = "IV Curve Measurement";
}

/// Record-level classification tags
pub mod tags {
    pub const ROOM_TEMPERATURE: &str = "Room Temperature";
    pub const VARIABLE_FIELD: &str = "Variable Field";
    pub const VARIABLE_TEMPERATURE: &str = "Variable Temperature";
}

/// Source field names with special handling during assembly
pub mod fields {
    pub const NAME: &str = "Name";
    pub const START_TIME: &str = "Start Time";
    pub const TIME_COMPLETED: &str = "Time Completed";
    pub const SKIPPED_AT: &str = "Skipped at";
    pub const ELAPSED_TIME: &str = "Elapsed Time";
    pub const CONTACT_SETS: &str = "Contact Sets";
    pub const STARTING_TEMPERATURE: &str = "Starting Temperature";
    pub const ENDING_TEMPERATURE: &str = "Ending Temperature";
    pub const MINIMUM_FIELD: &str = "Minimum Field";
    pub const MAXIMUM_FIELD: &str = "Maximum Field";
    pub const CURRENT: &str = "Current";
    pub const BEST_FIT_RESISTANCE: &str = "Best Fit Resistance";
    pub const BEST_FIT_OFFSET: &str = "Best Fit Offset";
}

// =============================================================================
// Archive Naming
// =============================================================================

pub mod archive {
    /// Suffix appended to the input file stem for measurement records
    pub const MEASUREMENT_SUFFIX: &str = "_meas";

    /// Suffix appended to the input file stem for experiment records
    pub const EXPERIMENT_SUFFIX: &str = "_exp";

    /// Suffix appended to the input file stem for instrument records
    pub const INSTRUMENT_SUFFIX: &str = "_instrument";

    /// Infix between record name and format extension
    pub const ARCHIVE_INFIX: &str = ".archive";

    /// Length of the web-safe entry id derived from upload id and filename
    pub const ENTRY_ID_LENGTH: usize = 28;

    /// Upload id used when none is configured
    pub const DEFAULT_UPLOAD_ID: &str = "local";
}

// =============================================================================
// Instrument Templates
// =============================================================================

pub mod instrument {
    /// Root prefix of flattened template paths
    pub const TEMPLATE_ROOT: &str = "/ENTRY[entry]";

    /// Separator of flattened template paths
    pub const PATH_SEPARATOR: &str = "/";

    /// Path segment holding top-level instrument fields and device roles
    pub const STATE_MACHINE_SEGMENT: &str = "measurement_state_machine";

    /// Device roles under the state machine segment, in slot order
    pub const DEVICE_ROLES: &[&str] = &[
        "electro_meter",
        "volt_meter",
        "current_meter",
        "current_source",
    ];

    /// Fixed components populated by attribute-name match
    pub const COMPONENTS: &[&str] = &[
        "system_parameters",
        "temperature_controller",
        "field_controller",
    ];

    /// Attribute-name suffix of unit annotations in flattened templates
    pub const UNITS_ATTRIBUTE: &str = "@units";
}

// =============================================================================
// Defaults
// =============================================================================

/// Default output directory for archive files
pub const DEFAULT_OUTPUT_DIR: &str = "./archives";

/// Configuration directory name under the user config dir
pub const CONFIG_DIR_NAME: &str = "hall-processor";

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Extensions of measurement log files picked up from directories
pub const MEASUREMENT_EXTENSIONS: &[&str] = &["txt"];

/// Extensions of instrument template files picked up from directories
pub const TEMPLATE_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];
