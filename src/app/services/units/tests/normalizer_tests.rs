//! Tests for unit cleanup and quantity resolution

use super::*;
use crate::Error;
use crate::app::models::FieldValue;
use crate::app::services::units::{Resolved, normalize_unit, registry, resolve_quantity};

fn scalar(text: &str) -> FieldValue {
    FieldValue::Scalar(text.to_string())
}

fn list(items: &[&str]) -> FieldValue {
    FieldValue::List(items.iter().map(|s| s.to_string()).collect())
}

#[test]
fn test_normalize_unit_repairs_latin1_mojibake() {
    assert_eq!(normalize_unit("Âµ A"), "u A");
    assert_eq!(normalize_unit("ÂµA"), "uA");
    assert_eq!(normalize_unit("Î©"), "ohm");
    assert_eq!(normalize_unit("Î© cm"), "ohm * cm");
    assert_eq!(normalize_unit("cmÂ³/C"), "cm ** 3/C");
    assert_eq!(normalize_unit("1/cmÂ³"), "1/cm ** 3");
    assert_eq!(normalize_unit("cmÂ²/VS"), "cm ** 2/volt * second");
    assert_eq!(normalize_unit("Sec"), "s");
}

#[test]
fn test_normalize_unit_is_idempotent() {
    let samples = [
        "Âµ A", "Î©", "Ω cm", "cmÂ³/C", "cm²/VS", "Sec", "kG", "ohm cm", "", "K",
    ];
    for raw in samples {
        let once = normalize_unit(raw);
        assert_eq!(normalize_unit(&once), once, "not idempotent for '{}'", raw);
    }
}

#[test]
fn test_error_scalar_is_missing_regardless_of_unit() {
    let resolved = resolve_quantity(&scalar("ERROR"), Some("not a unit"), registry()).unwrap();
    assert_eq!(resolved, Resolved::Missing);

    let resolved = resolve_quantity(&scalar("ERROR"), None, registry()).unwrap();
    assert!(resolved.is_missing());
}

#[test]
fn test_boolean_tokens() {
    assert_eq!(
        resolve_quantity(&scalar("On"), None, registry()).unwrap(),
        Resolved::Flag(true)
    );
    assert_eq!(
        resolve_quantity(&scalar("Yes"), None, registry()).unwrap(),
        Resolved::Flag(true)
    );
    assert_eq!(
        resolve_quantity(&scalar("Off"), None, registry()).unwrap(),
        Resolved::Missing
    );
    assert_eq!(
        resolve_quantity(&scalar("No"), None, registry()).unwrap(),
        Resolved::Missing
    );
}

#[test]
fn test_scalar_with_unit_is_converted_to_base_units() {
    match resolve_quantity(&scalar("100"), Some("ÂµA"), registry()).unwrap() {
        Resolved::Scalar(v) => assert_close(v, 1e-4),
        other => panic!("expected scalar, got {:?}", other),
    }
    match resolve_quantity(&scalar("5"), Some("kG"), registry()).unwrap() {
        Resolved::Scalar(v) => assert_close(v, 0.5),
        other => panic!("expected scalar, got {:?}", other),
    }
    match resolve_quantity(&scalar("2.5"), None, registry()).unwrap() {
        Resolved::Scalar(v) => assert_close(v, 2.5),
        other => panic!("expected scalar, got {:?}", other),
    }
}

#[test]
fn test_empty_unit_means_factor_one() {
    match resolve_quantity(&scalar("0.9998"), Some(""), registry()).unwrap() {
        Resolved::Scalar(v) => assert_close(v, 0.9998),
        other => panic!("expected scalar, got {:?}", other),
    }
}

#[test]
fn test_list_keeps_error_positions_as_nan() {
    let resolved = resolve_quantity(&list(&["1", "ERROR", "3"]), Some("mA"), registry()).unwrap();
    match resolved {
        Resolved::Array(values) => {
            assert_eq!(values.len(), 3);
            assert_close(values[0], 1e-3);
            assert!(values[1].is_nan());
            assert_close(values[2], 3e-3);
        }
        other => panic!("expected array, got {:?}", other),
    }
}

#[test]
fn test_all_error_list_is_missing() {
    let resolved = resolve_quantity(&list(&["ERROR", "ERROR"]), Some("V"), registry()).unwrap();
    assert_eq!(resolved, Resolved::Missing);

    let resolved = resolve_quantity(&list(&[]), None, registry()).unwrap();
    assert_eq!(resolved, Resolved::Missing);
}

#[test]
fn test_non_numeric_value_is_parse_error() {
    let result = resolve_quantity(&scalar("Fast"), None, registry());
    assert!(matches!(result, Err(Error::Parse { .. })));

    let result = resolve_quantity(&list(&["1", "abc"]), None, registry());
    assert!(matches!(result, Err(Error::Parse { .. })));
}

#[test]
fn test_unknown_unit_is_unit_error() {
    let result = resolve_quantity(&scalar("1"), Some("furlong"), registry());
    assert!(matches!(result, Err(Error::Unit { .. })));
}
