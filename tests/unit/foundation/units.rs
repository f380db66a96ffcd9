use super::*;

#[test]
fn numbers_pass_through() {
    assert_eq!(resolve_units(&UnitValue::from(42.0), 1000.0).unwrap(), 42.0);
    assert_eq!(resolve_units(&UnitValue::from(-3), 10.0).unwrap(), -3.0);
}

#[test]
fn plain_number_strings_are_pixels() {
    assert_eq!(resolve_units(&"120".into(), 10.0).unwrap(), 120.0);
    assert_eq!(resolve_units(&"2.5".into(), 10.0).unwrap(), 2.5);
}

#[test]
fn px_and_percent_suffixes() {
    assert_eq!(resolve_units(&"30px".into(), 999.0).unwrap(), 30.0);
    assert_eq!(resolve_units(&"50%".into(), 200.0).unwrap(), 100.0);
    assert_eq!(resolve_units(&"150%".into(), 40.0).unwrap(), 60.0);
}

#[test]
fn bad_suffix_or_number_is_invalid_units() {
    for bad in ["50xx", "px", "%", "abc%", "10 em", "", "NaN", "inf%"] {
        let err = resolve_units(&bad.into(), 200.0).unwrap_err();
        assert!(
            matches!(err, CopsError::InvalidUnits(_)),
            "{bad:?} gave {err:?}"
        );
    }
}

#[test]
fn resolution_is_pure() {
    let v = UnitValue::from("33%");
    let a = resolve_units(&v, 300.0).unwrap();
    let b = resolve_units(&v, 300.0).unwrap();
    assert_eq!(a, b);
}

#[test]
fn json_values_convert_or_report_type() {
    let n = UnitValue::try_from(&serde_json::json!(12)).unwrap();
    assert_eq!(n, UnitValue::Number(12.0));
    let s = UnitValue::try_from(&serde_json::json!("10%")).unwrap();
    assert_eq!(s, UnitValue::Text("10%".to_owned()));

    let err = UnitValue::try_from(&serde_json::json!(true)).unwrap_err();
    assert_eq!(err, CopsError::UnsupportedUnitType("boolean".to_owned()));
    let err = UnitValue::try_from(&serde_json::json!({"px": 1})).unwrap_err();
    assert!(matches!(err, CopsError::UnsupportedUnitType(_)));
}

#[test]
fn non_finite_numbers_are_rejected() {
    let err = resolve_units(&UnitValue::Number(f64::NAN), 10.0).unwrap_err();
    assert!(matches!(err, CopsError::InvalidUnits(_)));
    assert!(resolve_units(&UnitValue::from("inf"), 10.0).is_err());
}
