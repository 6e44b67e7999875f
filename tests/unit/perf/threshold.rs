use super::*;

fn key(op: OpKind, format: ColorFormat, platform: Platform) -> ThresholdKey {
    ThresholdKey {
        op,
        format,
        platform,
    }
}

#[test]
fn builtin_has_every_accelerated_x86_routine() {
    let table = ThresholdTable::builtin();
    for (op, format) in [
        (OpKind::Fill, ColorFormat::Argb8888),
        (OpKind::Fill, ColorFormat::Rgb565),
        (OpKind::FillWithOpacity, ColorFormat::Argb8888),
        (OpKind::ImageComposite, ColorFormat::Rgb565),
        (OpKind::ImageComposite, ColorFormat::Argb8888),
    ] {
        let entry = table.lookup(&key(op, format, Platform::X86_64)).unwrap();
        assert!(entry.common >= entry.corner, "{}", entry.key());
    }
}

#[test]
fn lookup_is_exact() {
    let table = ThresholdTable::builtin();
    let k = key(OpKind::FillWithOpacity, ColorFormat::Rgb565, Platform::X86_64);
    match table.lookup(&k) {
        Err(HarnessError::MissingThresholdEntry { key }) => assert_eq!(key, k),
        other => panic!("expected missing entry, got {other:?}"),
    }
    assert!(
        table
            .lookup(&key(OpKind::Fill, ColorFormat::Argb8888, Platform::Portable))
            .is_err()
    );
}

#[test]
fn required_picks_the_scenario() {
    let entry = ThresholdTable::builtin()
        .lookup(&key(OpKind::FillWithOpacity, ColorFormat::Argb8888, Platform::X86_64))
        .copied()
        .unwrap();
    assert_eq!(entry.required(BenchScenario::Common), 2.0);
    assert_eq!(entry.required(BenchScenario::Corner), 1.5);
}

#[test]
fn duplicate_keys_are_rejected() {
    let e = ThresholdTable::builtin().entries()[0];
    assert!(ThresholdTable::from_entries(vec![e, e]).is_err());
}

#[test]
fn non_positive_ratios_are_rejected() {
    let mut e = ThresholdTable::builtin().entries()[0];
    e.corner = 0.0;
    assert!(ThresholdTable::from_entries(vec![e]).is_err());
    e.corner = f64::NAN;
    assert!(ThresholdTable::from_entries(vec![e]).is_err());
}

#[test]
fn json_round_trip_keeps_the_table() {
    let table = ThresholdTable::builtin();
    let json = table.to_json_pretty().unwrap();
    assert!(json.contains(r#""op": "fill_with_opacity""#));
    assert!(json.contains(r#""platform": "x86_64""#));
    assert_eq!(ThresholdTable::from_json_str(&json).unwrap(), table);
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = ThresholdTable::from_json_str(r#"[{"op": "fill"}]"#).unwrap_err();
    assert!(matches!(err, HarnessError::Serde(_)));
}

#[test]
fn key_display() {
    assert_eq!(
        key(OpKind::ImageComposite, ColorFormat::Rgb565, Platform::Aarch64).to_string(),
        "image_composite/rgb565/aarch64"
    );
}
