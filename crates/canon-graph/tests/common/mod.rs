#![allow(dead_code)]

use std::path::PathBuf;

use canon_core::{Derivation, Formula, FormulaCategory, Parameter, ParameterStatus};
use canon_registry::Registry;

pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .canonicalize()
        .unwrap()
}

pub fn formula(id: &str, parents: &[&str]) -> Formula {
    Formula {
        id: id.to_string(),
        label: format!("Relation {id}"),
        number: None,
        latex: "y = x".to_string(),
        mathml: "<math><mi>y</mi></math>".to_string(),
        plain: "y = x".to_string(),
        category: FormulaCategory::Theory,
        section: String::new(),
        description: String::new(),
        note: None,
        terms: Default::default(),
        derivation: Derivation {
            parent_formulas: parents.iter().map(|p| p.to_string()).collect(),
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

pub fn parameter(id: &str, formula_id: Option<&str>) -> Parameter {
    Parameter {
        id: id.to_string(),
        symbol: id.to_string(),
        name: String::new(),
        description: None,
        value: 1.0,
        unit: String::new(),
        order_of_magnitude: None,
        status: ParameterStatus::Derived,
        note: None,
        category: "values".to_string(),
        quantity: None,
        formula_id: formula_id.map(str::to_string),
        simulation_reference: None,
        experimental: None,
        bound: None,
        superseded_by: None,
        export: true,
        absent_by_design: Vec::new(),
    }
}

pub fn registry_of(formulas: Vec<Formula>, parameters: Vec<Parameter>) -> Registry {
    let mut registry = Registry::new();
    assert!(registry.register_all(formulas).is_empty());
    assert!(registry.register_all(parameters).is_empty());
    registry
}
