use std::collections::BTreeMap;

use canon_registry::Registry;

use crate::findings::Sink;

/// Equation numbers and labels visible to consumers must be unique.
pub(crate) fn numbering(registry: &Registry, sink: &mut Sink) {
    let mut numbers: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    let mut labels: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for formula in registry.formulas().filter(|formula| formula.export) {
        if let Some(number) = formula.equation_number() {
            numbers.entry(number).or_default().push(&formula.id);
        }
        labels
            .entry(formula.label.trim())
            .or_default()
            .push(&formula.id);
    }
    for (number, ids) in numbers.iter().filter(|(_, ids)| ids.len() > 1) {
        sink.blocking(
            "numbering.duplicate",
            ids[0],
            format!("equation number ({number}) is used by {}", ids.join(", ")),
        );
    }
    for (label, ids) in labels.iter().filter(|(_, ids)| ids.len() > 1) {
        sink.warning(
            "numbering.duplicate_label",
            ids[0],
            format!("label `{label}` is shared by {}", ids.join(", ")),
        );
    }
}
