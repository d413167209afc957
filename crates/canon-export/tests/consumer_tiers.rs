mod common;

use canon_export::{ConsumerDocument, PrimaryTier, Resolution, SummaryTier};
use common::fixture_bytes;
use serde_json::Value;

fn fixture_value() -> Value {
    serde_json::from_slice(&fixture_bytes()).unwrap()
}

fn open(value: &Value) -> ConsumerDocument {
    ConsumerDocument::from_slice(&serde_json::to_vec(value).unwrap()).unwrap()
}

fn element(resolution: Resolution) -> canon_export::ElementView {
    match resolution {
        Resolution::Element(view) => view,
        Resolution::Placeholder { address, reason } => {
            panic!("{address} did not resolve: {reason}")
        }
    }
}

#[test]
fn full_document_resolves_every_tier() {
    let document = ConsumerDocument::from_slice(&fixture_bytes()).unwrap();
    let view = element(document.resolve("formula.higgs_mass"));
    let PrimaryTier::Formula { label, category, .. } = &view.primary else {
        panic!("expected a formula");
    };
    assert_eq!(label, "Scalar mass from the vacuum scale (3.2)");
    assert_eq!(category, "PREDICTION");
    assert!(matches!(view.summary, Some(SummaryTier::Terms { ref terms }) if terms.len() == 3));
    assert_eq!(view.derivation.map(|d| d.steps.len()), Some(2));
}

#[test]
fn missing_upper_tiers_degrade_to_primary() {
    let mut value = fixture_value();
    let record = value["formulas"]["higgs_mass"].as_object_mut().unwrap();
    record.remove("derivation");
    record.remove("terms");
    let view = element(open(&value).resolve("formula.higgs_mass"));
    assert!(matches!(view.primary, PrimaryTier::Formula { .. }));
    assert!(view.summary.is_none());
    assert!(view.derivation.is_none());
}

#[test]
fn malformed_upper_tiers_are_dropped() {
    let mut value = fixture_value();
    value["formulas"]["higgs_mass"]["terms"] = Value::from(42);
    value["formulas"]["higgs_mass"]["derivation"] = Value::from("steps");
    let view = element(open(&value).resolve("formula.higgs_mass"));
    assert!(view.summary.is_none());
    assert!(view.derivation.is_none());
}

#[test]
fn parameters_resolve_under_their_category() {
    let document = ConsumerDocument::from_slice(&fixture_bytes()).unwrap();
    let view = element(document.resolve("couplings.lambda_h"));
    let PrimaryTier::Parameter { value, status, note, .. } = &view.primary else {
        panic!("expected a parameter");
    };
    assert_eq!(*value, 0.129);
    assert_eq!(status, "CALIBRATED");
    assert!(note.is_some());
    assert!(document.resolve("masses.lambda_h").is_placeholder());
}

#[test]
fn unresolvable_addresses_render_placeholders() {
    let document = ConsumerDocument::from_slice(&fixture_bytes()).unwrap();
    for raw in ["formula.nowhere", "masses.m_h_legacy", "nonsense", "formula."] {
        let resolution = document.resolve(raw);
        assert!(resolution.is_placeholder(), "{raw}");
        assert!(resolution.to_string().starts_with(&format!("[{raw}: unavailable")));
    }
}

#[test]
fn missing_primary_field_is_a_placeholder() {
    let mut value = fixture_value();
    value["formulas"]["energy_mass"]
        .as_object_mut()
        .unwrap()
        .remove("label");
    let document = open(&value);
    assert!(document.resolve("formula.energy_mass").is_placeholder());
    assert!(!document.resolve("formula.golden_identity").is_placeholder());
}

#[test]
fn newer_major_versions_are_refused() {
    let mut value = fixture_value();
    value["schema_version"]["major"] = Value::from(2);
    let err = ConsumerDocument::from_slice(&serde_json::to_vec(&value).unwrap()).unwrap_err();
    assert_eq!(err.info().code, "canon_export.schema_version");
}

#[test]
fn addresses_cover_published_entities() {
    let document = ConsumerDocument::from_slice(&fixture_bytes()).unwrap();
    let addresses = document.addresses();
    assert!(addresses.contains(&"formula.higgs_mass".to_string()));
    assert!(addresses.contains(&"constants.c_light".to_string()));
    assert!(!addresses.iter().any(|address| address.ends_with("m_h_legacy")));
}
