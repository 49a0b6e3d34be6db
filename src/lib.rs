//! Hall Processor Library
//!
//! A Rust library for converting Lake Shore Hall-effect measurement logs and
//! instrument configuration templates into structured, unit-resolved archive
//! records.
//!
//! This library provides tools for:
//! - Tokenizing section/step based instrument logs into ordered field maps
//! - Extracting key-value lines, tab-separated tables and contact-set blocks
//! - Resolving raw values and unit strings to SI base-unit magnitudes
//! - Classifying steps into typed measurements and tagging whole records
//! - Mapping flattened instrument templates onto a nested configuration
//! - Storing records idempotently and linking them by stable references

pub mod config;
pub mod constants;
pub mod error;
pub mod processor;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod archive_store;
        pub mod hall_parser;
        pub mod instrument_mapper;
        pub mod measurement_assembler;
        pub mod units;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{
    FieldMap, FieldValue, HallMeasurementRecord, InstrumentConfig, Measurement,
    UnresolvedAttribute,
};
pub use config::Config;
pub use error::{Error, Result};
pub use processor::HallProcessor;
