//! Value agreement: one physical quantity, one number.

use std::collections::BTreeMap;

use canon_core::{Entity, Parameter};
use canon_registry::Registry;

use crate::findings::Sink;
use crate::policy::AuditPolicy;

/// Numeric value an entity stands for, if any.
fn literal_of(entity: &Entity) -> Option<f64> {
    match entity {
        Entity::Parameter(parameter) => Some(parameter.value),
        Entity::Formula(formula) => formula.computed_value,
    }
}

/// Parameters sharing a `quantity` key must carry the same value.
pub(crate) fn quantities(registry: &Registry, policy: &AuditPolicy, sink: &mut Sink) {
    let mut groups: BTreeMap<&str, Vec<&Parameter>> = BTreeMap::new();
    for parameter in registry.parameters() {
        if parameter.superseded_by.is_some() {
            continue;
        }
        if let Some(quantity) = parameter.quantity.as_deref() {
            groups.entry(quantity).or_default().push(parameter);
        }
    }
    for (quantity, members) in groups.iter().filter(|(_, members)| members.len() > 1) {
        let first = members[0];
        for other in &members[1..] {
            if policy.agrees(first.value, other.value) {
                sink.warning(
                    "agreement.quantity_duplicate",
                    &other.id,
                    format!(
                        "quantity `{quantity}` is defined by both `{}` and `{}`",
                        first.id, other.id
                    ),
                );
            } else {
                sink.blocking(
                    "agreement.quantity_conflict",
                    &other.id,
                    format!(
                        "quantity `{quantity}` is {} in `{}` but {} in `{}`",
                        first.value, first.id, other.value, other.id
                    ),
                );
            }
        }
    }
}

/// Literal values quoted in terms must match the entity they reference.
pub(crate) fn term_literals(registry: &Registry, policy: &AuditPolicy, sink: &mut Sink) {
    for formula in registry.formulas() {
        for (symbol, term) in &formula.terms {
            let (Some(quoted), Some(reference)) = (term.value, term.reference.as_deref()) else {
                continue;
            };
            let Some(actual) = registry.lookup(reference).ok().and_then(literal_of) else {
                continue;
            };
            if !policy.agrees(quoted, actual) {
                sink.blocking(
                    "agreement.term_literal",
                    &formula.id,
                    format!("term `{symbol}` quotes {quoted} but `{reference}` is {actual}"),
                );
            }
        }
    }
}

/// A formula's computed value must match the single parameter it outputs.
pub(crate) fn outputs(registry: &Registry, policy: &AuditPolicy, sink: &mut Sink) {
    for formula in registry.formulas() {
        let (Some(computed), [output]) =
            (formula.computed_value, formula.outputs_parameters.as_slice())
        else {
            continue;
        };
        let Ok(parameter) = registry.parameter(output) else {
            continue;
        };
        if !policy.agrees(computed, parameter.value) {
            sink.blocking(
                "agreement.output",
                &formula.id,
                format!(
                    "computes {computed} but its output `{output}` holds {}",
                    parameter.value
                ),
            );
        }
    }
}

/// Parameters backed by a registered simulation must carry its value.
pub(crate) fn simulations(registry: &Registry, policy: &AuditPolicy, sink: &mut Sink) {
    for parameter in registry.parameters() {
        let Some(reference) = parameter.simulation_reference.as_deref() else {
            continue;
        };
        let Some(result) = registry.simulation(reference) else {
            continue;
        };
        if !policy.agrees(parameter.value, result.value) {
            sink.blocking(
                "agreement.simulation",
                &parameter.id,
                format!(
                    "value {} differs from simulation `{reference}` result {}",
                    parameter.value, result.value
                ),
            );
        }
    }
}
