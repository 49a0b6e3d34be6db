//! Tests for template flattening

use super::*;
use crate::Error;
use serde_yaml::Value;
use std::path::Path;

fn paths(template: &FlatTemplate) -> Vec<&str> {
    template.iter().map(|(path, _)| path).collect()
}

#[test]
fn test_nested_mappings_join_under_entry_root() {
    let template = flatten_yaml("Sample:\n  Holder:\n    Type: Standard\n");
    assert_eq!(paths(&template), vec!["/ENTRY[entry]/Sample/Holder/Type"]);
    assert_eq!(
        template.get("/ENTRY[entry]/Sample/Holder/Type"),
        Some(&Value::from("Standard"))
    );
}

#[test]
fn test_value_unit_mapping_outside_sections() {
    let template = flatten_yaml("Setpoint:\n  value: 300\n  unit: K\n");
    assert_eq!(
        paths(&template),
        vec!["/ENTRY[entry]/Setpoint", "/ENTRY[entry]/Setpoint/@units"]
    );
    assert_eq!(template.get("/ENTRY[entry]/Setpoint"), Some(&Value::from(300)));
    assert_eq!(
        template.get("/ENTRY[entry]/Setpoint/@units"),
        Some(&Value::from("K"))
    );
}

#[test]
fn test_list_sections_are_uniquified() {
    let template = flatten_yaml(
        "Sweeps:
  - Field: {value: 5, unit: kG}
    Points: 11
  - Field: {value: 10, unit: kG}
    Points: 21
",
    );

    assert_eq!(
        paths(&template),
        vec![
            "/ENTRY[entry]/Sweeps/Field",
            "/ENTRY[entry]/Sweeps/Field/@units",
            "/ENTRY[entry]/Sweeps/Points",
            "/ENTRY[entry]/Sweeps/Field1",
            "/ENTRY[entry]/Sweeps/Field1/@units",
            "/ENTRY[entry]/Sweeps/Points1",
        ]
    );
    assert_eq!(template.get("/ENTRY[entry]/Sweeps/Field1"), Some(&Value::from(10)));
    assert_eq!(template.get("/ENTRY[entry]/Sweeps/Points1"), Some(&Value::from(21)));
}

#[test]
fn test_plain_lists_pass_through() {
    let template = flatten_yaml("Ranges: [1, 10, 100]\n");
    let Some(Value::Sequence(items)) = template.get("/ENTRY[entry]/Ranges") else {
        panic!("expected the list to be kept as one value");
    };
    assert_eq!(items.len(), 3);
}

#[test]
fn test_json_templates() {
    let template = parse_template(
        r#"{"Temperature Controller": {"Setpoint": {"value": 300, "unit": "K"}}}"#,
        TemplateFormat::Json,
    )
    .unwrap();
    assert_eq!(
        template.get("/ENTRY[entry]/Temperature Controller/Setpoint"),
        Some(&Value::from(300))
    );
}

#[test]
fn test_non_mapping_root_is_rejected() {
    let result = parse_template("- a\n- b\n", TemplateFormat::Yaml);
    assert!(matches!(result, Err(Error::Parse { .. })));
}

#[test]
fn test_format_from_extension() {
    assert_eq!(
        TemplateFormat::from_path(Path::new("setup.YAML")).unwrap(),
        TemplateFormat::Yaml
    );
    assert_eq!(
        TemplateFormat::from_path(Path::new("setup.json")).unwrap(),
        TemplateFormat::Json
    );
    assert!(TemplateFormat::from_path(Path::new("setup.txt")).is_err());
}
