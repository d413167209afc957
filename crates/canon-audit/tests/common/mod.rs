#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use canon_audit::{check, AuditInputs, AuditPolicy, Finding};
use canon_core::{
    Derivation, ExperimentalComparison, Formula, FormulaCategory, Parameter, ParameterStatus,
    ReferenceKind, Term,
};
use canon_registry::{load_definitions, LoadPlan, Registry, RegistryBuild};
use canon_validate::{validate_all, Policy};

pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .canonicalize()
        .unwrap()
}

pub fn fixture_build() -> RegistryBuild {
    let roots = vec![workspace_root().join("fixtures/definitions")];
    let definitions = load_definitions(&roots, &LoadPlan::default()).unwrap();
    Registry::from_definitions(&definitions)
}

pub fn audit(registry: &Registry, policy: &AuditPolicy) -> Vec<Finding> {
    let graph = canon_graph::build(registry);
    let run = validate_all(registry, &Policy::default());
    check(&AuditInputs::new(registry, &graph, &run), policy)
}

pub fn codes(findings: &[Finding]) -> Vec<&str> {
    findings.iter().map(|finding| finding.code.as_str()).collect()
}

/// A formula that satisfies every tier and contract check.
pub fn complete_formula(id: &str, number: &str) -> Formula {
    let mut terms = BTreeMap::new();
    terms.insert(
        "x".to_string(),
        Term {
            name: "Unknown".to_string(),
            description: "Solved quantity".to_string(),
            ..Term::default()
        },
    );
    Formula {
        id: id.to_string(),
        label: format!("Relation {id} ({number})"),
        number: None,
        latex: "x = 1".to_string(),
        mathml: "<math><mi>x</mi><mo>=</mo><mn>1</mn></math>".to_string(),
        plain: "x = 1".to_string(),
        category: FormulaCategory::Theory,
        section: "1".to_string(),
        description: "A complete relation.".to_string(),
        note: None,
        terms,
        derivation: Derivation {
            steps: vec!["Postulate.".to_string()],
            ..Derivation::default()
        },
        related_formulas: Vec::new(),
        uses_parameters: Vec::new(),
        outputs_parameters: Vec::new(),
        mutually_derived: Vec::new(),
        computed_value: None,
        unit: None,
        experimental: None,
        bound: None,
        superseded_by: None,
        export: true,
        absent_by_design: Vec::new(),
    }
}

/// A FIXED parameter that satisfies every tier and contract check.
pub fn complete_parameter(id: &str, value: f64) -> Parameter {
    Parameter {
        id: id.to_string(),
        symbol: id.to_string(),
        name: format!("Parameter {id}"),
        description: Some("A complete parameter.".to_string()),
        value,
        unit: String::new(),
        order_of_magnitude: None,
        status: ParameterStatus::Fixed,
        note: Some("Defined constant.".to_string()),
        category: "constants".to_string(),
        quantity: None,
        formula_id: None,
        simulation_reference: None,
        experimental: None,
        bound: None,
        superseded_by: None,
        export: true,
        absent_by_design: Vec::new(),
    }
}

pub fn measured(value: f64, uncertainty: Option<f64>) -> ExperimentalComparison {
    ExperimentalComparison {
        experimental_value: value,
        uncertainty,
        source_citation: "PDG".to_string(),
        kind: ReferenceKind::Measurement,
    }
}

pub fn registry_of(formulas: Vec<Formula>, parameters: Vec<Parameter>) -> Registry {
    let mut registry = Registry::new();
    assert!(registry.register_all(formulas).is_empty());
    assert!(registry.register_all(parameters).is_empty());
    registry
}
