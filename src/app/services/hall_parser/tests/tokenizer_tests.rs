//! Tests for section and step tokenization

use crate::Error;
use crate::app::models::RawSectionBody;
use crate::app::services::hall_parser::tokenizer::{parse_step_header, section_name, tokenize};

#[test]
fn test_sections_in_file_order_and_preamble_ignored() {
    let content = "exported by Hall software\n[Sample]\nSample ID: X\n[Setup]\nMode = Hall\n";
    let sections = tokenize(content).unwrap();

    let names: Vec<&str> = sections.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Sample", "Setup"]);
    assert_eq!(
        sections.get("Sample").map(|s| &s.body),
        Some(&RawSectionBody::Flat("Sample ID: X".to_string()))
    );
}

#[test]
fn test_steps_keep_order_and_keys() {
    let content = "[Measurements]\n<Step 1: IV Curve Measurement>\na = 1\n<Step 2: Wait>\n<Step 10: Variable Field Measurement>\nb = 2\n";
    let sections = tokenize(content).unwrap();

    let Some(RawSectionBody::Steps(steps)) = sections.get("Measurements").map(|s| &s.body) else {
        panic!("Measurements should be split into steps");
    };
    let keys: Vec<String> = steps.iter().map(|s| s.key()).collect();
    assert_eq!(
        keys,
        vec![
            "IV Curve Measurement (1)",
            "Wait (2)",
            "Variable Field Measurement (10)"
        ]
    );
    assert_eq!(steps[0].body, "a = 1");
    assert_eq!(steps[1].body, "");
}

#[test]
fn test_crlf_line_endings() {
    let content = "[Sample]\r\nSample ID: X\r\n[Measurements]\r\n<Step 1: Wait>\r\nElapsed Time: 0:00:01\r\n";
    let sections = tokenize(content).unwrap();

    assert_eq!(sections.len(), 2);
    let Some(RawSectionBody::Steps(steps)) = sections.get("Measurements").map(|s| &s.body) else {
        panic!("expected steps");
    };
    assert_eq!(steps[0].key(), "Wait (1)");
    assert_eq!(steps[0].body, "Elapsed Time: 0:00:01");
}

#[test]
fn test_non_integer_step_index_is_parse_error() {
    let content = "[Measurements]\n<Step two: Wait>\n";
    assert!(matches!(tokenize(content), Err(Error::Parse { .. })));

    assert!(matches!(
        parse_step_header("<Step 1 Wait>"),
        Err(Error::Parse { .. })
    ));
}

#[test]
fn test_step_header_whitespace_variants() {
    assert_eq!(
        parse_step_header("<Step3:Wait For Field>").unwrap(),
        (3, "Wait For Field".to_string())
    );
    assert_eq!(
        parse_step_header("<Step  12:   IV Curve Measurement >").unwrap(),
        (12, "IV Curve Measurement".to_string())
    );
}

#[test]
fn test_section_name_requires_whole_line() {
    assert_eq!(section_name("[Measurements]"), Some("Measurements"));
    assert_eq!(section_name("  [Sample Info]  "), Some("Sample Info"));
    assert_eq!(section_name("Thickness [cm] = 0.05"), None);
    assert_eq!(section_name("[]"), None);
}

#[test]
fn test_duplicate_sections_last_wins_on_lookup() {
    let content = "[Sample]\nSample ID: first\n[Sample]\nSample ID: second\n";
    let sections = tokenize(content).unwrap();

    assert_eq!(sections.len(), 2);
    assert_eq!(
        sections.get("Sample").map(|s| &s.body),
        Some(&RawSectionBody::Flat("Sample ID: second".to_string()))
    );
}
