use canon_core::serde::{from_json_slice, from_yaml_slice, to_canonical_json_bytes};
use canon_core::{
    stable_hash_string, Address, DisclosureTier, Formula, FormulaCategory, Parameter,
    ParameterStatus, ReferenceKind, SchemaVersion,
};
use serde_json::json;

const HIGGS_YAML: &str = r#"
id: higgs_mass
label: "Scalar mass (3.2)"
latex: "m_H = \\sqrt{2 \\lambda} v"
plain: "m_H = sqrt(2 lambda) v"
category: PREDICTION
derivation:
  parent_formulas: [energy_mass]
absent_by_design: [summary]
"#;

#[test]
fn canonical_bytes_sort_keys_recursively() {
    let value = json!({"b": {"z": 1, "a": [ {"y": 2, "x": 1} ]}, "a": true});
    let bytes = to_canonical_json_bytes(&value).unwrap();
    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        r#"{"a":true,"b":{"a":[{"x":1,"y":2}],"z":1}}"#
    );
}

#[test]
fn hash_ignores_key_order() {
    let first = json!({"id": "m_h", "value": 125.1});
    let second = json!({"value": 125.1, "id": "m_h"});
    let hash = stable_hash_string(&first).unwrap();
    assert_eq!(hash, stable_hash_string(&second).unwrap());
    assert_eq!(hash.len(), 64);
}

#[test]
fn formula_yaml_fills_defaults() {
    let formula: Formula = from_yaml_slice(HIGGS_YAML.as_bytes()).unwrap();
    assert_eq!(formula.category, FormulaCategory::Prediction);
    assert!(formula.export);
    assert!(formula.mathml.is_empty());
    assert!(formula.terms.is_empty());
    assert_eq!(formula.derivation.parent_formulas, vec!["energy_mass"]);
    assert!(!formula.derivation.has_content());
    assert_eq!(formula.absent_by_design, vec![DisclosureTier::Summary]);
    assert_eq!(formula.equation_number().as_deref(), Some("3.2"));

    let bytes = to_canonical_json_bytes(&formula).unwrap();
    let back: Formula = from_json_slice(&bytes).unwrap();
    assert_eq!(back, formula);
}

#[test]
fn parameter_json_uses_screaming_status_and_snake_kinds() {
    let parameter: Parameter = from_json_slice(
        br#"{
            "id": "v_ew", "symbol": "v", "value": 246.22, "status": "INPUT",
            "note": "from G_F", "category": "electroweak",
            "experimental": {"experimental_value": 246.22, "uncertainty": 0.01}
        }"#,
    )
    .unwrap();
    assert_eq!(parameter.status, ParameterStatus::Input);
    assert!(parameter.status.requires_note());
    assert!(!parameter.status.is_claim());
    let experimental = parameter.experimental.as_ref().unwrap();
    assert_eq!(experimental.kind, ReferenceKind::Measurement);
    assert!(parameter.links().is_empty());
}

#[test]
fn unknown_category_is_a_serde_error() {
    let err = from_yaml_slice::<Formula>(b"id: x\nlabel: x\nlatex: x\nplain: x\ncategory: GUESS\n")
        .unwrap_err();
    assert_eq!(err.family(), "serde");
    assert_eq!(err.info().code, "yaml_deserialize");
}

#[test]
fn addresses_serialise_as_strings() {
    let address: Address = "masses.m_h".parse().unwrap();
    assert_eq!(serde_json::to_value(&address).unwrap(), json!("masses.m_h"));
    let back: Address = serde_json::from_value(json!("formula.higgs_mass")).unwrap();
    assert_eq!(back, Address::Formula("higgs_mass".to_string()));
    assert!(serde_json::from_value::<Address>(json!("no-dot")).is_err());
    assert!(Address::validate_category("formula").is_err());
    assert!(Address::validate_category("a.b").is_err());
    assert!(Address::validate_category("masses").is_ok());
}

#[test]
fn schema_versions_are_compatible_within_a_major() {
    let current = SchemaVersion::new(1, 0, 0);
    assert!(current.can_read(&SchemaVersion::new(1, 4, 2)));
    assert!(!current.can_read(&SchemaVersion::new(2, 0, 0)));
    assert_eq!(SchemaVersion::default(), current);
}
