mod common;

use canon_core::{CanonError, EntityKind};
use canon_graph::{build, EdgeKind, GraphEdge, Unresolved};
use canon_registry::{load_definitions, LoadPlan, Registry};
use common::{formula, parameter, registry_of, workspace_root};

#[test]
fn children_are_inferred_from_parents() {
    let registry = registry_of(vec![formula("F0", &[]), formula("F1", &["F0"])], vec![]);
    let graph = build(&registry).unwrap();
    assert_eq!(graph.children_of("F0"), vec!["F1"]);
    assert_eq!(graph.parents_of("F1"), vec!["F0"]);
    assert!(graph.children_of("F1").is_empty());
    assert_eq!(
        graph.edges(),
        vec![GraphEdge {
            from: "F0".to_string(),
            to: "F1".to_string(),
            kind: EdgeKind::ParentOf,
        }]
    );
}

#[test]
fn missing_parent_is_reported_with_its_field() {
    let registry = registry_of(vec![formula("F1", &["F0"])], vec![]);
    let err = build(&registry).unwrap_err();
    assert_eq!(err.unresolved.len(), 1);
    assert_eq!(err.unresolved[0].cause, Unresolved::Missing);
    assert_eq!(err.lines(), vec!["F1.parent_formulas[0] unresolved: F0"]);
}

#[test]
fn every_broken_link_is_reported_in_one_pass() {
    let mut higgs = formula("higgs", &["ghost"]);
    higgs.uses_parameters = vec!["F0".to_string(), "nowhere".to_string()];
    higgs.outputs_parameters = vec!["m".to_string()];
    let registry = registry_of(
        vec![formula("F0", &[]), higgs],
        vec![parameter("m", Some("missing_formula"))],
    );
    let err = build(&registry).unwrap_err();
    let lines = err.lines();
    assert_eq!(lines.len(), 4, "{lines:?}");
    assert!(lines.contains(&"higgs.parent_formulas[0] unresolved: ghost".to_string()));
    assert!(lines.contains(
        &"higgs.uses_parameters[0] unresolved: F0 (expected parameter, found formula)".to_string()
    ));
    assert!(lines.contains(&"m.formula_id unresolved: missing_formula".to_string()));
    let wrong_kind = err
        .unresolved
        .iter()
        .find(|reference| reference.target == "F0")
        .unwrap();
    assert_eq!(
        wrong_kind.cause,
        Unresolved::WrongKind {
            expected: EntityKind::Parameter,
            found: EntityKind::Formula,
        }
    );
}

#[test]
fn graph_errors_convert_with_a_full_listing() {
    let registry = registry_of(vec![formula("F1", &["F0"])], vec![]);
    let err: CanonError = build(&registry).unwrap_err().into();
    assert_eq!(err.family(), "graph");
    assert_eq!(err.info().code, "canon_graph.build");
    assert_eq!(
        err.info().context["problem_0000"],
        "F1.parent_formulas[0] unresolved: F0"
    );
}

#[test]
fn producers_come_from_either_declaration() {
    let mut producer = formula("fit", &[]);
    producer.outputs_parameters = vec!["a".to_string()];
    let mut consumer = formula("use", &[]);
    consumer.uses_parameters = vec!["a".to_string(), "b".to_string()];
    let registry = registry_of(
        vec![producer, consumer, formula("solve", &[])],
        vec![parameter("a", None), parameter("b", Some("solve"))],
    );
    let graph = build(&registry).unwrap();
    assert_eq!(graph.producers_of("a"), vec!["fit"]);
    assert_eq!(graph.producers_of("b"), vec!["solve"]);
    assert_eq!(graph.outputs_of("solve"), vec!["b"]);
    assert_eq!(graph.consumers_of("a"), vec!["use"]);
    assert_eq!(graph.ancestors("use"), vec!["fit", "solve"]);
    let order = graph.topological_order();
    assert_eq!(order.last().map(String::as_str), Some("use"));
}

#[test]
fn related_links_are_symmetric_and_never_cycles() {
    let mut a = formula("a", &[]);
    a.related_formulas = vec!["b".to_string()];
    let mut b = formula("b", &["a"]);
    b.related_formulas = vec!["a".to_string()];
    let registry = registry_of(vec![a, b], vec![]);
    let graph = build(&registry).unwrap();
    assert_eq!(graph.related_of("a"), vec!["b"]);
    assert_eq!(graph.related_of("b"), vec!["a"]);
    let related: Vec<_> = graph
        .edges()
        .into_iter()
        .filter(|edge| edge.kind == EdgeKind::Related)
        .collect();
    assert_eq!(related.len(), 1);
}

#[test]
fn fixture_graph_builds() {
    let roots = vec![workspace_root().join("fixtures/definitions")];
    let definitions = load_definitions(&roots, &LoadPlan::default()).unwrap();
    let build_result = Registry::from_definitions(&definitions);
    let graph = build(&build_result.registry).unwrap();
    assert_eq!(
        graph.mutual_pairs(),
        &[("coupling_ratio".to_string(), "mass_ratio".to_string())]
    );
    assert_eq!(graph.parents_of("higgs_mass"), vec!["coupling_fit", "energy_mass"]);
    assert_eq!(graph.producers_of("m_h"), vec!["higgs_mass"]);
    assert_eq!(graph.node_kind("m_h"), Some(EntityKind::Parameter));
}
