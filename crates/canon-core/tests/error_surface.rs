use canon_core::errors::{CanonError, ErrorInfo};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("id", "m_h")
        .with_context("field", "uncertainty")
}

#[test]
fn every_family_exposes_its_payload() {
    let errors = [
        CanonError::DuplicateId(sample_info("canon_registry.duplicate_id", "taken")),
        CanonError::Schema(sample_info("canon_registry.schema", "label is required")),
        CanonError::NotFound(sample_info("canon.not_found", "missing")),
        CanonError::Graph(sample_info("canon_graph.build", "cycle")),
        CanonError::Data(sample_info("canon_validate.missing_uncertainty", "missing")),
        CanonError::Export(sample_info("canon_export.blocked", "refused")),
        CanonError::Serde(sample_info("json_deserialize", "bad json")),
        CanonError::Io(sample_info("canon_export.write", "disk full")),
    ];
    let families: Vec<&str> = errors.iter().map(CanonError::family).collect();
    assert_eq!(
        families,
        ["duplicate-id", "schema", "not-found", "graph", "data", "export", "serde", "io"]
    );
    for err in &errors {
        assert_eq!(err.entity_id(), Some("m_h"));
        assert!(err.info().context.contains_key("field"));
    }
}

#[test]
fn display_lists_context_and_hint_in_order() {
    let err = CanonError::Data(
        sample_info("canon_validate.missing_uncertainty", "measurement has no uncertainty")
            .with_hint("declare `kind: exact` for mathematical identities"),
    );
    assert_eq!(
        err.to_string(),
        "data error: measurement has no uncertainty (code: canon_validate.missing_uncertainty) \
         | context: [field=uncertainty, id=m_h] \
         | hint: declare `kind: exact` for mathematical identities"
    );
}

#[test]
fn errors_serialise_with_family_tag() {
    let err = CanonError::not_found("F0");
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["family"], "NotFound");
    assert_eq!(json["detail"]["code"], "canon.not_found");
    assert_eq!(json["detail"]["context"]["id"], "F0");
    assert!(json["detail"].get("hint").is_none());
    let back: CanonError = serde_json::from_value(json).unwrap();
    assert_eq!(back, err);
}

#[test]
fn schema_constructor_records_the_id() {
    let err = CanonError::schema("lambda_h", "canon_registry.schema", "CALIBRATED requires note");
    assert!(matches!(err, CanonError::Schema(_)));
    assert_eq!(err.entity_id(), Some("lambda_h"));
}
