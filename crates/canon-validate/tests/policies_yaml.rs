use canon_validate::Policy;

#[test]
fn empty_document_yields_default_policy() {
    let policy: Policy = serde_yaml::from_str("{}").unwrap();
    assert_eq!(policy, Policy::default());
    assert_eq!(policy.sigma.pass, 2.0);
    assert_eq!(policy.relative.check, 0.05);
}

#[test]
fn source_overrides_fall_back_to_defaults() {
    let yaml = "sources:\n  lattice:\n    pass: 1.0\n    check: 3.0\n";
    let policy: Policy = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(policy.sigma_for("lattice").pass, 1.0);
    assert_eq!(policy.sigma_for("PDG"), policy.sigma);
    assert!((policy.round(2.8571428571428) - 2.857142857).abs() < 1e-12);
}
