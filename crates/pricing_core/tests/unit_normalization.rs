use pricing_core::Unit;

#[test]
fn known_labels_normalize() {
    assert_eq!(Unit::to_unit(Some("קג")), Unit::Kg);
    assert_eq!(Unit::to_unit(Some("ק\"ג")), Unit::Kg);
    assert_eq!(Unit::to_unit(Some("גרמים")), Unit::Gr);
    assert_eq!(Unit::to_unit(Some("ליטר")), Unit::Liter);
    assert_eq!(Unit::to_unit(Some("מ\"ל")), Unit::Ml);
    assert_eq!(Unit::to_unit(Some("יחידה")), Unit::Unit);
    assert_eq!(Unit::to_unit(Some("מטר")), Unit::Meter);
}

#[test]
fn surrounding_whitespace_is_ignored() {
    assert_eq!(Unit::to_unit(Some("  קג\t")), Unit::Kg);
    assert_eq!(Unit::to_unit(Some("\nליטרים ")), Unit::Liter);
}

#[test]
fn missing_or_unrecognized_labels_are_unknown() {
    assert_eq!(Unit::to_unit(None), Unit::Unknown);
    assert_eq!(Unit::to_unit(Some("")), Unit::Unknown);
    assert_eq!(Unit::to_unit(Some("   ")), Unit::Unknown);
    assert_eq!(Unit::to_unit(Some("kg")), Unit::Unknown);
    assert_eq!(Unit::to_unit(Some("קג ארוז")), Unit::Unknown);
}

#[test]
fn normalization_is_idempotent_on_alias_lists() {
    for unit in [
        Unit::Kg,
        Unit::Gr,
        Unit::Liter,
        Unit::Ml,
        Unit::Unit,
        Unit::Meter,
    ] {
        assert!(!unit.aliases().is_empty(), "{unit:?} has no aliases");
        for alias in unit.aliases() {
            assert_eq!(Unit::to_unit(Some(*alias)), unit);
        }
    }
}

#[test]
fn codes_are_stable() {
    assert_eq!(Unit::default(), Unit::Unknown);
    assert_eq!(Unit::Unknown.code(), 0);
    assert_eq!(Unit::Kg.code(), 1);
    assert_eq!(Unit::Meter.code(), 6);
    assert_eq!(Unit::Meter.as_str(), "m");
}
