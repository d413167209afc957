//! Cross-reference, export-scope, supersession and producer checks.

use std::collections::{BTreeMap, BTreeSet};

use canon_core::errors::CanonError;
use canon_core::{Entity, LinkKind, ParameterStatus};
use canon_graph::{DerivationGraph, GraphBuildError};
use canon_registry::Registry;

use crate::findings::{Severity, Sink};
use crate::policy::AuditPolicy;

/// Registration and load failures are blocking: the entity is missing.
pub(crate) fn rejections(rejections: &[CanonError], sink: &mut Sink) {
    for err in rejections {
        let code = format!("registry.{}", err.family());
        sink.push(Severity::Blocking, &code, err.entity_id(), err.to_string());
    }
}

/// Broken links and forbidden cycles from the graph build.
pub(crate) fn graph(
    graph: Result<&DerivationGraph, &GraphBuildError>,
    policy: &AuditPolicy,
    sink: &mut Sink,
) {
    match graph {
        Ok(graph) => {
            if policy.report_mutual_cycles {
                for (a, b) in graph.mutual_pairs() {
                    sink.warning(
                        "graph.mutual_cycle",
                        a,
                        format!("`{a}` and `{b}` are mutually derived; the cycle between them is exempt"),
                    );
                }
            }
        }
        Err(err) => {
            for unresolved in &err.unresolved {
                sink.blocking("reference.unresolved", &unresolved.source, unresolved.to_string());
            }
            for cycle in &err.cycles {
                let subject = cycle.formulas.first().map(String::as_str);
                sink.push(Severity::Blocking, "graph.cycle", subject, cycle.to_string());
            }
        }
    }
}

/// An exported entity may only point at exported entities.
pub(crate) fn export_scope(registry: &Registry, sink: &mut Sink) {
    for entity in registry.entities().filter(|entity| entity.is_exported()) {
        for link in entity.links() {
            let Ok(target) = registry.lookup(&link.target) else {
                continue;
            };
            if !target.is_exported() {
                sink.blocking(
                    "reference.export_scope",
                    entity.id(),
                    format!(
                        "{}.{} points at `{}`, which is not exported",
                        link.source, link.field, link.target
                    ),
                );
            }
        }
    }
}

/// Supersession pointers: no self reference, no loops, no stale references.
pub(crate) fn supersession(registry: &Registry, sink: &mut Sink) {
    let pointers: BTreeMap<&str, &str> = registry
        .entities()
        .filter_map(|entity| entity.superseded_by().map(|next| (entity.id(), next)))
        .collect();

    let mut reported_loops: BTreeSet<Vec<&str>> = BTreeSet::new();
    for (&id, &next) in &pointers {
        if id == next {
            sink.blocking("supersession.self", id, "entity is superseded by itself");
            continue;
        }
        let mut chain = vec![id];
        let mut current = next;
        while let Some(&following) = pointers.get(current) {
            if let Some(pos) = chain.iter().position(|seen| *seen == current) {
                let mut members = chain[pos..].to_vec();
                members.sort_unstable();
                if reported_loops.insert(members.clone()) {
                    sink.blocking(
                        "supersession.loop",
                        members[0],
                        format!("supersession chain loops through {}", members.join(", ")),
                    );
                }
                break;
            }
            chain.push(current);
            current = following;
        }
    }

    for entity in registry.entities() {
        if entity.superseded_by().is_some() {
            continue;
        }
        for link in entity.links() {
            if link.kind == LinkKind::SupersededBy {
                continue;
            }
            if let Some(replacement) = pointers.get(link.target.as_str()) {
                sink.warning(
                    "supersession.stale_reference",
                    entity.id(),
                    format!(
                        "{}.{} points at superseded `{}`; use `{replacement}`",
                        link.source, link.field, link.target
                    ),
                );
            }
        }
    }
}

/// `formula_id` and `outputs_parameters` must tell the same story.
pub(crate) fn producers(registry: &Registry, sink: &mut Sink) {
    let mut outputs: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for formula in registry.formulas() {
        for parameter in &formula.outputs_parameters {
            outputs
                .entry(parameter.as_str())
                .or_default()
                .insert(formula.id.as_str());
        }
    }

    for entity in registry.entities() {
        let Entity::Parameter(parameter) = entity else {
            continue;
        };
        let id = parameter.id.as_str();
        let listed = outputs.get(id);
        if let Some(listed) = listed.filter(|set| set.len() > 1) {
            let names: Vec<&str> = listed.iter().copied().collect();
            sink.warning(
                "producer.multiple",
                id,
                format!("output by several formulas: {}", names.join(", ")),
            );
        }
        if let (Some(declared), Some(listed)) = (parameter.formula_id.as_deref(), listed) {
            if !listed.contains(declared) {
                sink.warning(
                    "producer.mismatch",
                    id,
                    format!("formula_id is `{declared}` but `{declared}` does not list it in outputs_parameters"),
                );
            }
        }
        let claims_derivation = matches!(
            parameter.status,
            ParameterStatus::Derived | ParameterStatus::Predicted
        );
        if claims_derivation
            && parameter.superseded_by.is_none()
            && parameter.formula_id.is_none()
            && listed.is_none()
            && parameter.simulation_reference.is_none()
        {
            sink.warning(
                "producer.missing",
                id,
                format!(
                    "{} parameter names no producing formula or simulation",
                    parameter.status
                ),
            );
        }
    }
}
