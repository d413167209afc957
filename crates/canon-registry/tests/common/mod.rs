#![allow(dead_code)]

use std::path::PathBuf;

use canon_core::{Formula, FormulaCategory, Parameter, ParameterStatus};

pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .canonicalize()
        .unwrap()
}

pub fn formula(id: &str, category: FormulaCategory) -> Formula {
    Formula {
        id: id.to_string(),
        label: format!("Relation {id} (1.1)"),
        number: None,
        latex: "a = b".to_string(),
        mathml: "<math><mi>a</mi><mo>=</mo><mi>b</mi></math>".to_string(),
        plain: "a = b".to_string(),
        category,
        section: "1".to_string(),
        description: String::new(),
        note: None,
        terms: Default::default(),
        derivation: Default::default(),
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

pub fn parameter(id: &str, status: ParameterStatus) -> Parameter {
    Parameter {
        id: id.to_string(),
        symbol: id.to_string(),
        name: String::new(),
        description: None,
        value: 0.5,
        unit: String::new(),
        order_of_magnitude: None,
        status,
        note: None,
        category: "couplings".to_string(),
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
