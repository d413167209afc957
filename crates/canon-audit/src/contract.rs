//! Required-field and disclosure-tier checks.

use canon_core::{DisclosureTier, Entity, Formula, FormulaCategory, Parameter};

use crate::findings::{Severity, Sink};
use crate::policy::{AuditPolicy, TierOmission};

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn missing_note(note: Option<&str>) -> bool {
    note.map_or(true, blank)
}

/// Fields each category or status contractually requires.
pub(crate) fn required_fields(entity: &Entity, sink: &mut Sink) {
    match entity {
        Entity::Formula(formula) => formula_contract(formula, sink),
        Entity::Parameter(parameter) => parameter_contract(parameter, sink),
    }
}

fn formula_contract(formula: &Formula, sink: &mut Sink) {
    let id = formula.id.as_str();
    if formula.category.requires_note() && missing_note(formula.note.as_deref()) {
        sink.blocking(
            "contract.note",
            id,
            format!("{} formula requires an explanatory note", formula.category),
        );
    }
    if formula.category == FormulaCategory::Derived {
        if formula.derivation.steps.is_empty() {
            sink.blocking(
                "contract.derivation_steps",
                id,
                "DERIVED formula has no derivation steps",
            );
        }
        if formula.derivation.parent_formulas.is_empty()
            && formula.derivation.established_physics.is_empty()
        {
            sink.warning(
                "contract.derivation_origin",
                id,
                "DERIVED formula names neither parent formulas nor established physics",
            );
        }
    }
    if formula.category == FormulaCategory::Prediction
        && formula.computed_value.is_none()
        && formula.outputs_parameters.is_empty()
    {
        sink.warning(
            "contract.prediction_output",
            id,
            "PREDICTION formula neither computes a value nor outputs a parameter",
        );
    }
}

fn parameter_contract(parameter: &Parameter, sink: &mut Sink) {
    if parameter.status.requires_note() && missing_note(parameter.note.as_deref()) {
        sink.blocking(
            "contract.note",
            &parameter.id,
            format!("{} requires note", parameter.status),
        );
    }
}

fn expected_magnitude(value: f64) -> Option<i32> {
    if value == 0.0 || !value.is_finite() {
        return None;
    }
    Some(value.abs().log10().floor() as i32)
}

/// Declared orders of magnitude that disagree with the value by more than one.
pub(crate) fn magnitudes(entity: &Entity, sink: &mut Sink) {
    let mut compare = |subject: &str, what: String, declared: Option<i32>, value: Option<f64>| {
        let (Some(declared), Some(expected)) = (declared, value.and_then(expected_magnitude))
        else {
            return;
        };
        if (declared - expected).abs() > 1 {
            sink.warning(
                "magnitude.mismatch",
                subject,
                format!("{what} declares order of magnitude {declared} but its value has {expected}"),
            );
        }
    };
    match entity {
        Entity::Parameter(parameter) => compare(
            &parameter.id,
            "value".to_string(),
            parameter.order_of_magnitude,
            Some(parameter.value),
        ),
        Entity::Formula(formula) => {
            for (symbol, term) in &formula.terms {
                compare(
                    &formula.id,
                    format!("term `{symbol}`"),
                    term.order_of_magnitude,
                    term.value,
                );
            }
        }
    }
}

struct TierState {
    tier: DisclosureTier,
    present: bool,
    absent_by_design: bool,
}

/// Disclosure tiers of an exported entity.
///
/// Tier 1 can never be declared absent. Tiers 2 and 3 must be present or
/// listed in `absent_by_design`.
pub(crate) fn tiers(entity: &Entity, policy: &AuditPolicy, sink: &mut Sink) {
    let (id, tier_one_gaps, declared, summary, derivation) = match entity {
        Entity::Formula(formula) => {
            let mut gaps = Vec::new();
            for (field, value) in [
                ("label", &formula.label),
                ("latex", &formula.latex),
                ("mathml", &formula.mathml),
                ("plain", &formula.plain),
                ("description", &formula.description),
            ] {
                if blank(value) {
                    gaps.push(field);
                }
            }
            (
                formula.id.as_str(),
                gaps,
                &formula.absent_by_design,
                !formula.terms.is_empty(),
                formula.derivation.has_content(),
            )
        }
        Entity::Parameter(parameter) => {
            let mut gaps = Vec::new();
            if blank(&parameter.symbol) {
                gaps.push("symbol");
            }
            if blank(&parameter.name) {
                gaps.push("name");
            }
            let provenance = parameter.formula_id.is_some()
                || parameter.simulation_reference.is_some()
                || parameter.experimental.is_some()
                || parameter.bound.is_some()
                || !missing_note(parameter.note.as_deref());
            (
                parameter.id.as_str(),
                gaps,
                &parameter.absent_by_design,
                parameter.description.as_deref().is_some_and(|d| !blank(d)),
                provenance,
            )
        }
    };

    if !tier_one_gaps.is_empty() {
        sink.blocking(
            "tier.primary_missing",
            id,
            format!("always-visible fields missing: {}", tier_one_gaps.join(", ")),
        );
    }

    let severity = match policy.tier_omission {
        TierOmission::Warning => Severity::Warning,
        TierOmission::Blocking => Severity::Blocking,
    };
    for state in [
        TierState {
            tier: DisclosureTier::Summary,
            present: summary,
            absent_by_design: declared.contains(&DisclosureTier::Summary),
        },
        TierState {
            tier: DisclosureTier::Derivation,
            present: derivation,
            absent_by_design: declared.contains(&DisclosureTier::Derivation),
        },
    ] {
        let name = match state.tier {
            DisclosureTier::Summary => "summary",
            DisclosureTier::Derivation => "derivation",
        };
        match (state.present, state.absent_by_design) {
            (false, false) => sink.push(
                severity,
                &format!("tier.{name}_missing"),
                Some(id),
                format!("{name} tier is empty and not declared absent by design"),
            ),
            (true, true) => sink.warning(
                "tier.absent_but_present",
                id,
                format!("{name} tier is declared absent by design but has content"),
            ),
            _ => {}
        }
    }
}
