#![allow(dead_code)]

use std::path::PathBuf;

use canon_core::{
    Bound, BoundKind, ExperimentalComparison, Formula, FormulaCategory, Parameter,
    ParameterStatus, ReferenceKind,
};
use canon_registry::{load_definitions, LoadPlan, Registry};

pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .canonicalize()
        .unwrap()
}

pub fn fixture_registry() -> Registry {
    let roots = vec![workspace_root().join("fixtures/definitions")];
    let definitions = load_definitions(&roots, &LoadPlan::default()).unwrap();
    let build = Registry::from_definitions(&definitions);
    assert!(build.rejections.is_empty(), "{:?}", build.rejections);
    build.registry
}

pub fn measured(value: f64, uncertainty: Option<f64>) -> ExperimentalComparison {
    ExperimentalComparison {
        experimental_value: value,
        uncertainty,
        source_citation: "PDG".to_string(),
        kind: ReferenceKind::Measurement,
    }
}

pub fn exact(value: f64) -> ExperimentalComparison {
    ExperimentalComparison {
        experimental_value: value,
        uncertainty: Some(0.0),
        source_citation: "closed form".to_string(),
        kind: ReferenceKind::Exact,
    }
}

pub fn lower_bound(value: f64, margin: f64) -> Bound {
    Bound {
        kind: BoundKind::Lower,
        value,
        margin,
        source_citation: "Super-K".to_string(),
    }
}

pub fn parameter(id: &str, value: f64) -> Parameter {
    Parameter {
        id: id.to_string(),
        symbol: id.to_uppercase(),
        name: String::new(),
        description: None,
        value,
        unit: "GeV".to_string(),
        order_of_magnitude: None,
        status: ParameterStatus::Predicted,
        note: None,
        category: "masses".to_string(),
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

pub fn formula(id: &str, computed: Option<f64>) -> Formula {
    Formula {
        id: id.to_string(),
        label: format!("{id} (1.1)"),
        number: None,
        latex: "x = 1".to_string(),
        mathml: "<math><mi>x</mi><mo>=</mo><mn>1</mn></math>".to_string(),
        plain: "x = 1".to_string(),
        category: FormulaCategory::Theory,
        section: "1".to_string(),
        description: String::new(),
        note: None,
        terms: Default::default(),
        derivation: Default::default(),
        related_formulas: Vec::new(),
        uses_parameters: Vec::new(),
        outputs_parameters: Vec::new(),
        mutually_derived: Vec::new(),
        computed_value: computed,
        unit: None,
        experimental: None,
        bound: None,
        superseded_by: None,
        export: true,
        absent_by_design: Vec::new(),
    }
}
