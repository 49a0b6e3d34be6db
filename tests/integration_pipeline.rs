//! Integration tests for the file-to-archive pipeline
//!
//! These tests drive the public API over the fixture files in `tests/data`,
//! which are stored as UTF-8 the way the instrument writes them and decoded
//! as Latin-1 by the parser.

use chrono::NaiveDate;
use clap::Parser;
use hall_processor::app::models::{Measurement, MeasurementKind};
use hall_processor::app::services::archive_store::{
    ArchiveFormat, FileArchiveStore, StoreOutcome, hash_reference,
};
use hall_processor::cli::args::Args;
use hall_processor::cli::commands;
use hall_processor::constants::tags;
use hall_processor::{Error, HallProcessor};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn processor(root: &Path) -> HallProcessor<FileArchiveStore> {
    HallProcessor::new(FileArchiveStore::new(root, "upload-7", ArchiveFormat::Yaml))
}

/// Room-temperature log: IV curve plus a single field step
///
/// Purpose: Validate the complete parse, assemble and store path on a real-shaped file
/// Benefit: Catches regressions in unit cleanup of Latin-1 decoded glyphs
#[tokio::test]
async fn test_room_temperature_log_end_to_end() {
    let dir = TempDir::new().unwrap();
    let report = processor(dir.path())
        .process_measurement_file(&fixture("room_temperature.txt"))
        .await
        .expect("fixture should process");

    let record = &report.record;
    assert_eq!(record.name, "room_temperature_meas");
    assert_eq!(record.measurements.len(), 3);
    assert_eq!(record.tags, vec![tags::ROOM_TEMPERATURE.to_string()]);
    assert_eq!(record.results.len(), 1);

    let Measurement::IvCurve(iv) = &record.measurements[0] else {
        panic!("first step should be an IV curve");
    };
    assert_eq!(iv.results.len(), 2);
    let fit = iv.results[0].best_fit_values.as_ref().expect("A-B has a fit");
    assert!((fit[0] - (-100e-6 * 10.5 + 0.001)).abs() < 1e-12);
    assert!(iv.results[1].best_fit_values.is_none());

    let Measurement::VariableField(vf) = &record.measurements[1] else {
        panic!("second step should be a field measurement");
    };
    assert_eq!(vf.results.len(), 1);
    assert_eq!(record.results[0], vf.results[0]);

    assert_eq!(record.measurements[2].kind(), MeasurementKind::Generic);
    assert_eq!(record.measurements[2].name(), "Wait For Temperature (3)");

    assert_eq!(report.stats.sections, 3);
    assert_eq!(report.stats.contact_sets, 2);
    assert_eq!(
        report.raw_file.entry_name,
        "room_temperature.txt measurement file"
    );
    assert_eq!(
        report.raw_file.reference,
        hash_reference("upload-7", "room_temperature_meas.archive.yaml")
    );
    assert!(dir.path().join("room_temperature_meas.archive.yaml").is_file());
    assert!(dir.path().join("room_temperature_exp.archive.yaml").is_file());
}

/// CRLF log with two field steps and a skipped temperature sweep
#[tokio::test]
async fn test_field_sweep_log_tags() {
    let dir = TempDir::new().unwrap();
    let report = processor(dir.path())
        .process_measurement_file(&fixture("field_sweep.txt"))
        .await
        .expect("fixture should process");

    let record = &report.record;
    assert_eq!(record.count_kind(MeasurementKind::VariableField), 2);
    assert_eq!(record.count_kind(MeasurementKind::VariableTemperature), 1);
    assert!(record.has_tag(tags::VARIABLE_FIELD));
    assert!(record.has_tag(tags::VARIABLE_TEMPERATURE));
    assert!(!record.has_tag(tags::ROOM_TEMPERATURE));
    assert!(record.results.is_empty());

    let Measurement::VariableTemperature(vt) = &record.measurements[2] else {
        panic!("third step should be a temperature sweep");
    };
    assert_eq!(vt.name, "Variable Temperature Measurement (3): range 10 K -> 300 K");
    assert_eq!(vt.timing.elapsed_time, Some(90000.0));
    assert_eq!(
        vt.timing.time_completed.as_deref(),
        Some("03/16/2021 12:00:00 PM")
    );
    let skipped_at = NaiveDate::from_ymd_opt(2021, 3, 16)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap();
    assert_eq!(vt.timing.completed_at, Some(skipped_at));
}

/// Reprocessing is a no-op; changed content needs overwrite
#[tokio::test]
async fn test_reprocessing_and_conflicts() {
    let dir = TempDir::new().unwrap();
    let input = fixture("room_temperature.txt");

    let first = processor(dir.path())
        .process_measurement_file(&input)
        .await
        .unwrap();
    assert!(first.stored.iter().all(|s| s.outcome == StoreOutcome::Created));

    let second = processor(dir.path())
        .process_measurement_file(&input)
        .await
        .unwrap();
    assert!(
        second
            .stored
            .iter()
            .all(|s| s.outcome == StoreOutcome::Unchanged)
    );

    let edited = dir.path().join("room_temperature.txt");
    let content = std::fs::read(&input).unwrap();
    let content = String::from_utf8(content)
        .unwrap()
        .replace("Hall Mobility [cm²/VS] = 210.8", "Hall Mobility [cm²/VS] = 199.0");
    std::fs::write(&edited, content).unwrap();

    let conflict = processor(dir.path()).process_measurement_file(&edited).await;
    assert!(matches!(conflict, Err(Error::StoreConflict { .. })));

    let overwritten = processor(dir.path())
        .with_overwrite(true)
        .process_measurement_file(&edited)
        .await
        .unwrap();
    assert_eq!(overwritten.stored[0].outcome, StoreOutcome::Overwritten);
}

/// Instrument template mapped onto devices, components and domains
#[tokio::test]
async fn test_instrument_template_end_to_end() {
    let dir = TempDir::new().unwrap();
    let report = processor(dir.path())
        .process_instrument_file(&fixture("instrument_template.yaml"))
        .await
        .expect("template should map");

    let instrument = &report.instrument;
    assert!(instrument.electrometer.is_some());
    assert!(instrument.voltmeter.is_some());
    assert!(instrument.currentsource.is_some());
    assert!(instrument.currentmeter.is_none());
    assert_eq!(instrument.temperature_domain.len(), 1);
    assert_eq!(
        report.raw_file.entry_name,
        "instrument_template.yaml instrument file"
    );
    assert!(
        dir.path()
            .join("instrument_template_instrument.archive.yaml")
            .is_file()
    );
}

/// The process command over a directory, with JSON archives
#[tokio::test]
async fn test_process_command_over_directory() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("archives");
    let data = fixture("");

    let argv: Vec<OsString> = vec![
        "hall-processor".into(),
        "process".into(),
        data.into_os_string(),
        "--output".into(),
        output.clone().into_os_string(),
        "--format".into(),
        "json".into(),
        "--upload-id".into(),
        "cli-upload".into(),
        "--quiet".into(),
    ];
    let args = Args::try_parse_from(argv).unwrap();

    let stats = commands::run(args).await.expect("command should succeed");

    assert_eq!(stats.files_processed, 2);
    assert_eq!(stats.files_failed, 0);
    assert_eq!(stats.records_created, 4);
    assert!(output.join("room_temperature_meas.archive.json").is_file());
    assert!(output.join("field_sweep_exp.archive.json").is_file());
}

/// A log without a Measurements section fails that file only
#[tokio::test]
async fn test_process_command_continues_past_bad_file() {
    let dir = TempDir::new().unwrap();
    let bad = dir.path().join("broken.txt");
    std::fs::write(&bad, "[Sample]\nSample ID: X\n").unwrap();
    let good = dir.path().join("good.txt");
    std::fs::copy(fixture("room_temperature.txt"), &good).unwrap();
    let output = dir.path().join("out");

    let argv: Vec<OsString> = vec![
        "hall-processor".into(),
        "process".into(),
        dir.path().as_os_str().to_os_string(),
        "-o".into(),
        output.into_os_string(),
        "-q".into(),
    ];
    let args = Args::try_parse_from(argv).unwrap();

    let stats = commands::run(args).await.unwrap();

    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.files_failed, 1);
    assert!(stats.has_failures());
    assert!(stats.failures[0].file.ends_with("broken.txt"));
}
