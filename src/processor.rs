//! File-level processing pipeline.
//!
//! Drives one input file through parsing, assembly and storage. A
//! measurement log produces a measurement record and an experiment record
//! referencing it; an instrument template produces a single instrument
//! record. Every report carries the raw file entry that links the input to
//! what was stored.

use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::app::models::{
    ArchiveEntry, ExperimentRecord, HallMeasurementRecord, InstrumentConfig,
    MeasurementReference, RawFileEntry, UnresolvedAttribute,
};
use crate::app::services::archive_store::{ArchiveStore, FileArchiveStore, StoredRecord};
use crate::app::services::hall_parser::{HallFileParser, ParseResult, ParseStats};
use crate::app::services::instrument_mapper::{TemplateFormat, map_instrument, parse_template};
use crate::app::services::measurement_assembler::MeasurementAssembler;
use crate::config::Config;
use crate::constants::MEASUREMENTS_SECTION;
use crate::constants::archive::{EXPERIMENT_SUFFIX, INSTRUMENT_SUFFIX, MEASUREMENT_SUFFIX};
use crate::{Error, Result};

/// Outcome of processing one measurement log
#[derive(Debug, Clone, Serialize)]
pub struct MeasurementReport {
    /// Input file name
    pub source: String,
    pub raw_file: RawFileEntry,
    pub record: HallMeasurementRecord,
    pub unresolved: Vec<UnresolvedAttribute>,
    pub stats: ParseStats,
    /// Measurement record first, then the experiment record
    pub stored: Vec<StoredRecord>,
}

/// Outcome of processing one instrument template
#[derive(Debug, Clone, Serialize)]
pub struct InstrumentReport {
    pub source: String,
    pub raw_file: RawFileEntry,
    pub instrument: InstrumentConfig,
    pub unresolved: Vec<UnresolvedAttribute>,
    /// Number of flattened template paths
    pub attributes: usize,
    pub stored: StoredRecord,
}

/// Pipeline from raw input files to stored archive records
pub struct HallProcessor<S: ArchiveStore> {
    parser: HallFileParser,
    assembler: MeasurementAssembler<'static>,
    store: S,
    overwrite: bool,
}

impl HallProcessor<FileArchiveStore> {
    /// Processor writing into the configured archive directory
    pub fn from_config(config: &Config) -> Self {
        let store = FileArchiveStore::new(
            &config.archive.output_path,
            config.archive.upload_id.clone(),
            config.archive.format,
        );
        Self::new(store)
            .with_parser(HallFileParser::with_duplicate_keys(
                config.parsing.duplicate_keys,
            ))
            .with_overwrite(config.archive.overwrite)
    }
}

impl<S: ArchiveStore> HallProcessor<S> {
    pub fn new(store: S) -> Self {
        Self {
            parser: HallFileParser::default(),
            assembler: MeasurementAssembler::default(),
            store,
            overwrite: false,
        }
    }

    pub fn with_parser(mut self, parser: HallFileParser) -> Self {
        self.parser = parser;
        self
    }

    /// Replace differing archives instead of refusing them
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read, parse and store a measurement log
    pub async fn process_measurement_file(&self, path: &Path) -> Result<MeasurementReport> {
        let file_name = file_name(path)?;
        let parsed = self.parser.parse_file(path).await?;
        self.store_measurement(&file_name, parsed)
    }

    /// Parse and store already decoded log content
    pub fn process_measurement_content(
        &self,
        file_name: &str,
        content: &str,
    ) -> Result<MeasurementReport> {
        let parsed = self.parser.parse(content)?;
        self.store_measurement(file_name, parsed)
    }

    /// Read, map and store an instrument template
    pub async fn process_instrument_file(&self, path: &Path) -> Result<InstrumentReport> {
        let file_name = file_name(path)?;
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::file_not_found(path)
            } else {
                Error::io(format!("Failed to read template {}", path.display()), e)
            }
        })?;
        self.process_instrument_content(&file_name, &content)
    }

    /// Map and store template content; the format follows the file extension
    pub fn process_instrument_content(
        &self,
        file_name: &str,
        content: &str,
    ) -> Result<InstrumentReport> {
        info!("Mapping instrument template {}", file_name);
        let stem = file_stem(file_name)?;
        let format = TemplateFormat::from_path(Path::new(file_name))?;
        let template = parse_template(content, format)?;
        let mapping = map_instrument(&template, file_name);

        let filename = self
            .store
            .format()
            .archive_filename(&stem, INSTRUMENT_SUFFIX);
        let entry = ArchiveEntry::new(&mapping.instrument, self.store.upload_id())
            .with_entry_name(format!("{}{}", stem, INSTRUMENT_SUFFIX));
        let stored = self.store_entry(&entry, &filename)?;

        Ok(InstrumentReport {
            source: file_name.to_string(),
            raw_file: RawFileEntry {
                entry_name: format!("{} instrument file", file_name),
                reference: stored.reference.clone(),
            },
            instrument: mapping.instrument,
            unresolved: mapping.unresolved,
            attributes: template.len(),
            stored,
        })
    }

    fn store_measurement(&self, file_name: &str, parsed: ParseResult) -> Result<MeasurementReport> {
        let stem = file_stem(file_name)?;
        let record_name = format!("{}{}", stem, MEASUREMENT_SUFFIX);
        let steps = parsed.document.steps(MEASUREMENTS_SECTION);
        debug!("Assembling {} steps from {}", steps.len(), file_name);

        let assembly = self.assembler.assemble_record(&record_name, steps)?;
        for attribute in &assembly.unresolved {
            debug!("Unresolved: {}", attribute);
        }
        if !assembly.unresolved.is_empty() {
            warn!(
                "{}: {} attributes had no destination",
                file_name,
                assembly.unresolved.len()
            );
        }

        let format = self.store.format();
        let measurement_filename = format.archive_filename(&stem, MEASUREMENT_SUFFIX);
        let entry = ArchiveEntry::new(&assembly.record, self.store.upload_id())
            .with_entry_name(&record_name);
        let measurement = self.store_entry(&entry, &measurement_filename)?;

        let experiment = ExperimentRecord {
            name: format!("{}{}", stem, EXPERIMENT_SUFFIX),
            measurement: vec![MeasurementReference {
                name: record_name,
                reference: measurement.reference.clone(),
            }],
        };
        let experiment_filename = format.archive_filename(&stem, EXPERIMENT_SUFFIX);
        let entry = ArchiveEntry::new(&experiment, self.store.upload_id())
            .with_entry_name(&experiment.name);
        let experiment = self.store_entry(&entry, &experiment_filename)?;

        info!(
            "{}: {} measurements, tags {:?}",
            file_name,
            assembly.record.measurements.len(),
            assembly.record.tags
        );

        Ok(MeasurementReport {
            source: file_name.to_string(),
            raw_file: RawFileEntry {
                entry_name: format!("{} measurement file", file_name),
                reference: measurement.reference.clone(),
            },
            record: assembly.record,
            unresolved: assembly.unresolved,
            stats: parsed.stats,
            stored: vec![measurement, experiment],
        })
    }

    fn store_entry<T: Serialize>(
        &self,
        entry: &ArchiveEntry<T>,
        filename: &str,
    ) -> Result<StoredRecord> {
        let content = serde_yaml::to_value(entry)?;
        self.store.store(&content, filename, self.overwrite)
    }
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| Error::configuration(format!("{} has no file name", path.display())))
}

fn file_stem(file_name: &str) -> Result<String> {
    Path::new(file_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| Error::configuration(format!("'{}' has no file stem", file_name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::archive_store::{ArchiveFormat, StoreOutcome, hash_reference};
    use crate::app::services::hall_parser::tests::room_temperature_log;
    use crate::app::services::instrument_mapper::tests::INSTRUMENT_TEMPLATE;
    use crate::constants::tags;
    use tempfile::TempDir;

    fn processor(dir: &TempDir) -> HallProcessor<FileArchiveStore> {
        HallProcessor::new(FileArchiveStore::new(
            dir.path(),
            "upload-1",
            ArchiveFormat::Yaml,
        ))
    }

    #[test]
    fn test_measurement_log_stores_record_and_experiment() {
        let dir = TempDir::new().unwrap();
        let processor = processor(&dir);

        let report = processor
            .process_measurement_content("sample.txt", &room_temperature_log())
            .unwrap();

        assert_eq!(report.record.name, "sample_meas");
        assert_eq!(report.record.measurements.len(), 3);
        assert_eq!(report.record.tags, vec![tags::ROOM_TEMPERATURE.to_string()]);
        assert_eq!(report.stored.len(), 2);
        assert_eq!(report.stored[0].filename, "sample_meas.archive.yaml");
        assert_eq!(report.stored[1].filename, "sample_exp.archive.yaml");
        assert!(dir.path().join("sample_meas.archive.yaml").exists());

        assert_eq!(report.raw_file.entry_name, "sample.txt measurement file");
        assert_eq!(
            report.raw_file.reference,
            hash_reference("upload-1", "sample_meas.archive.yaml")
        );
    }

    #[test]
    fn test_experiment_references_measurement_record() {
        let dir = TempDir::new().unwrap();
        let report = processor(&dir)
            .process_measurement_content("sample.txt", &room_temperature_log())
            .unwrap();

        let text = std::fs::read_to_string(dir.path().join("sample_exp.archive.yaml")).unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
        let reference = &value["data"]["measurement"][0];

        assert_eq!(reference["name"].as_str(), Some("sample_meas"));
        assert_eq!(
            reference["reference"].as_str(),
            Some(report.stored[0].reference.as_str())
        );
        assert_eq!(value["metadata"]["upload_id"].as_str(), Some("upload-1"));
    }

    #[test]
    fn test_reprocessing_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let processor = processor(&dir);

        processor
            .process_measurement_content("sample.txt", &room_temperature_log())
            .unwrap();
        let again = processor
            .process_measurement_content("sample.txt", &room_temperature_log())
            .unwrap();

        assert!(
            again
                .stored
                .iter()
                .all(|s| s.outcome == StoreOutcome::Unchanged)
        );
    }

    #[test]
    fn test_changed_content_conflicts_unless_overwriting() {
        let dir = TempDir::new().unwrap();
        processor(&dir)
            .process_measurement_content("sample.txt", &room_temperature_log())
            .unwrap();

        let changed = room_temperature_log()
            .replace("Best Fit Offset [V] = 0.001", "Best Fit Offset [V] = 0.004");
        let result = processor(&dir).process_measurement_content("sample.txt", &changed);
        assert!(matches!(result, Err(Error::StoreConflict { .. })));

        let report = processor(&dir)
            .with_overwrite(true)
            .process_measurement_content("sample.txt", &changed)
            .unwrap();
        assert_eq!(report.stored[0].outcome, StoreOutcome::Overwritten);
        assert_eq!(report.stored[1].outcome, StoreOutcome::Unchanged);
    }

    #[test]
    fn test_log_without_measurements_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let result =
            processor(&dir).process_measurement_content("empty.txt", "[Sample]\nName = S1\n");

        assert!(matches!(result, Err(Error::Parse { .. })));
        assert!(!dir.path().join("empty_meas.archive.yaml").exists());
    }

    #[test]
    fn test_instrument_template_is_stored() {
        let dir = TempDir::new().unwrap();
        let report = processor(&dir)
            .process_instrument_content("setup.yaml", INSTRUMENT_TEMPLATE)
            .unwrap();

        assert_eq!(report.stored.filename, "setup_instrument.archive.yaml");
        assert_eq!(report.raw_file.entry_name, "setup.yaml instrument file");
        assert_eq!(report.raw_file.reference, report.stored.reference);
        assert!(report.attributes > 0);
    }

    #[test]
    fn test_instrument_template_needs_known_extension() {
        let dir = TempDir::new().unwrap();
        let result = processor(&dir).process_instrument_content("setup.ini", INSTRUMENT_TEMPLATE);

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_missing_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let result = processor(&dir)
            .process_measurement_file(&dir.path().join("absent.txt"))
            .await;

        assert!(matches!(result, Err(Error::FileNotFound { .. })));
    }

    #[tokio::test]
    async fn test_json_archives_from_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("run 7.txt");
        std::fs::write(&input, room_temperature_log()).unwrap();

        let processor = HallProcessor::new(FileArchiveStore::new(
            dir.path().join("out"),
            "upload-1",
            ArchiveFormat::Json,
        ));
        let report = processor.process_measurement_file(&input).await.unwrap();

        assert_eq!(report.stored[0].filename, "run 7_meas.archive.json");
        let text = std::fs::read_to_string(&report.stored[0].location).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["data"]["name"], "run 7_meas");
    }
}
