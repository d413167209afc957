use canon_audit::{AuditPolicy, TierOmission};

#[test]
fn empty_document_yields_defaults() {
    let policy: AuditPolicy = serde_yaml::from_str("{}").unwrap();
    assert_eq!(policy, AuditPolicy::default());
    assert!(policy.report_mutual_cycles);
    assert_eq!(policy.tier_omission, TierOmission::Warning);
}

#[test]
fn agreement_uses_relative_tolerance() {
    let policy: AuditPolicy =
        serde_yaml::from_str("value_agreement_rel_tol: 1.0e-3\ntier_omission: blocking\n").unwrap();
    assert_eq!(policy.tier_omission, TierOmission::Blocking);
    assert!(policy.agrees(1000.0, 1000.5));
    assert!(!policy.agrees(1000.0, 1002.0));
    assert!(policy.agrees(0.0, 0.0));
}
