use std::collections::BTreeMap;

use canon_core::errors::{CanonError, ErrorInfo};
use canon_core::{
    Bound, BoundCheck, BoundKind, Deviation, Entity, EntityRef, ExperimentalComparison, Formula,
    Parameter, ReferenceKind, ValidationRecord, ValidationStatus,
};
use canon_registry::Registry;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::policies::Policy;

fn data_info(subject: &EntityRef, code: &str, message: impl Into<String>) -> ErrorInfo {
    ErrorInfo::new(code, message.into())
        .with_context("id", subject.id.as_str())
        .with_context("kind", subject.kind.to_string())
}

fn data_error(subject: &EntityRef, code: &str, message: impl Into<String>) -> CanonError {
    CanonError::Data(data_info(subject, code, message))
}

/// Numeric claim extracted from a formula or parameter.
#[derive(Debug, Clone, Copy)]
struct Claim<'a> {
    subject: &'a EntityRef,
    computed: Option<f64>,
    units: Option<&'a str>,
    experimental: Option<&'a ExperimentalComparison>,
    bound: Option<&'a Bound>,
}

impl Claim<'_> {
    fn blank_record(&self) -> ValidationRecord {
        ValidationRecord {
            subject: self.subject.clone(),
            computed: self.computed,
            reference: None,
            uncertainty: None,
            deviation: None,
            bound: None,
            status: ValidationStatus::Speculative,
            exact: false,
            units: self.units.map(str::to_string),
            source_citation: None,
            note: None,
        }
    }

    fn require_computed(&self) -> Result<f64, CanonError> {
        self.computed.ok_or_else(|| {
            data_error(
                self.subject,
                "canon_validate.missing_computed",
                "a reference is declared but no computed value is available",
            )
        })
    }
}

fn citation(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Bitwise comparison; any nonzero difference is a FAIL, never a CHECK.
fn exact_match(record: &mut ValidationRecord, computed: f64, reference: f64) {
    record.exact = true;
    if computed == reference {
        record.deviation = Some(Deviation::Absolute(0.0));
        record.status = ValidationStatus::Pass;
    } else {
        let delta = (computed - reference).abs();
        record.deviation = Some(if reference == 0.0 {
            Deviation::Absolute(delta)
        } else {
            Deviation::Relative(delta / reference.abs())
        });
        record.status = ValidationStatus::Fail;
        record.note = Some("exact identity violated".to_string());
    }
}

fn compare(
    claim: &Claim<'_>,
    experimental: &ExperimentalComparison,
    policy: &Policy,
) -> Result<ValidationRecord, CanonError> {
    let computed = claim.require_computed()?;
    let reference = experimental.experimental_value;
    let mut record = claim.blank_record();
    record.reference = Some(reference);
    record.uncertainty = experimental.uncertainty;
    record.source_citation = citation(&experimental.source_citation);
    let delta = (computed - reference).abs();

    match experimental.kind {
        ReferenceKind::Exact => {
            if experimental.uncertainty.is_some_and(|u| u != 0.0) {
                return Err(data_error(
                    claim.subject,
                    "canon_validate.exact_with_uncertainty",
                    "an exact reference cannot carry a nonzero uncertainty",
                ));
            }
            exact_match(&mut record, computed, reference);
        }
        ReferenceKind::Measurement => {
            let uncertainty = match experimental.uncertainty {
                None => {
                    return Err(data_error(
                        claim.subject,
                        "canon_validate.missing_uncertainty",
                        "measurement reference has no uncertainty",
                    ))
                }
                Some(u) if u == 0.0 => {
                    exact_match(&mut record, computed, reference);
                    return Ok(record);
                }
                Some(u) => u,
            };
            let sigma = delta / uncertainty;
            let thresholds = policy.sigma_for(&experimental.source_citation);
            record.status = if sigma <= thresholds.pass {
                ValidationStatus::Pass
            } else if sigma <= thresholds.check {
                ValidationStatus::Check
            } else {
                ValidationStatus::Fail
            };
            record.deviation = Some(Deviation::Sigma(policy.round(sigma)));
        }
        ReferenceKind::Relative => {
            if reference == 0.0 {
                return Err(data_error(
                    claim.subject,
                    "canon_validate.zero_reference",
                    "relative comparison against a zero reference is undefined",
                ));
            }
            let relative = delta / reference.abs();
            record.status = if relative <= policy.relative.pass {
                ValidationStatus::Pass
            } else if relative <= policy.relative.check {
                ValidationStatus::Check
            } else {
                ValidationStatus::Fail
            };
            record.deviation = Some(Deviation::Relative(policy.round(relative)));
        }
    }
    Ok(record)
}

fn check_bound(
    claim: &Claim<'_>,
    bound: &Bound,
    policy: &Policy,
) -> Result<ValidationRecord, CanonError> {
    let computed = claim.require_computed()?;
    let required = bound.margin * bound.value.abs();
    let satisfied = match bound.kind {
        BoundKind::Lower => computed - bound.value >= required,
        BoundKind::Upper => bound.value - computed >= required,
    };
    let ratio = (bound.value != 0.0).then(|| policy.round(computed / bound.value));
    let mut record = claim.blank_record();
    record.reference = Some(bound.value);
    record.source_citation = citation(&bound.source_citation);
    record.bound = Some(BoundCheck {
        kind: bound.kind,
        bound: bound.value,
        margin: bound.margin,
        ratio,
    });
    record.status = if satisfied {
        ValidationStatus::Pass
    } else {
        ValidationStatus::Fail
    };
    if !satisfied {
        let side = match bound.kind {
            BoundKind::Lower => "lower",
            BoundKind::Upper => "upper",
        };
        record.note = Some(format!("{side} bound not satisfied with required margin"));
    }
    Ok(record)
}

fn evaluate(claim: Claim<'_>, policy: &Policy) -> Result<ValidationRecord, CanonError> {
    let record = match (claim.experimental, claim.bound) {
        (Some(experimental), None) => compare(&claim, experimental, policy)?,
        (Some(experimental), Some(bound)) => {
            let mut record = compare(&claim, experimental, policy)?;
            let bounded = check_bound(&claim, bound, policy)?;
            record.bound = bounded.bound;
            if bounded.status > record.status {
                record.status = bounded.status;
                record.note = bounded.note;
            }
            record
        }
        (None, Some(bound)) => check_bound(&claim, bound, policy)?,
        (None, None) => {
            let mut record = claim.blank_record();
            record.note = Some("no reference value available".to_string());
            record
        }
    };
    record.check_invariants()?;
    Ok(record)
}

/// Validates a parameter's value against its reference or bound.
pub fn validate_parameter(
    parameter: &Parameter,
    policy: &Policy,
) -> Result<ValidationRecord, CanonError> {
    let subject = EntityRef::parameter(parameter.id.as_str());
    let units = (!parameter.unit.is_empty()).then_some(parameter.unit.as_str());
    evaluate(
        Claim {
            subject: &subject,
            computed: Some(parameter.value),
            units,
            experimental: parameter.experimental.as_ref(),
            bound: parameter.bound.as_ref(),
        },
        policy,
    )
}

/// Validates a formula's computed value against its reference or bound.
pub fn validate_formula(formula: &Formula, policy: &Policy) -> Result<ValidationRecord, CanonError> {
    let subject = EntityRef::formula(formula.id.as_str());
    evaluate(
        Claim {
            subject: &subject,
            computed: formula.computed_value,
            units: formula.unit.as_deref(),
            experimental: formula.experimental.as_ref(),
            bound: formula.bound.as_ref(),
        },
        policy,
    )
}

/// Validates a registry entity.
///
/// The result depends only on the entity and the policy, so repeated calls
/// yield identical records.
pub fn validate(entity: &Entity, policy: &Policy) -> Result<ValidationRecord, CanonError> {
    match entity {
        Entity::Formula(formula) => validate_formula(formula, policy),
        Entity::Parameter(parameter) => validate_parameter(parameter, policy),
    }
}

/// Whether an entity makes a numeric claim that should carry a record.
pub fn is_validation_subject(entity: &Entity) -> bool {
    match entity {
        Entity::Formula(formula) => {
            formula.computed_value.is_some()
                || formula.experimental.is_some()
                || formula.bound.is_some()
        }
        Entity::Parameter(parameter) => {
            parameter.status.is_claim()
                || parameter.experimental.is_some()
                || parameter.bound.is_some()
        }
    }
}

/// Per-status record counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// PASS records.
    pub pass: usize,
    /// Subset of `pass` established against exact identities.
    pub exact: usize,
    /// CHECK records.
    pub check: usize,
    /// FAIL records.
    pub fail: usize,
    /// SPECULATIVE records.
    pub speculative: usize,
}

impl StatusCounts {
    /// Tallies records by status.
    pub fn tally<'a>(records: impl IntoIterator<Item = &'a ValidationRecord>) -> Self {
        let mut counts = Self::default();
        for record in records {
            match record.status {
                ValidationStatus::Pass => {
                    counts.pass += 1;
                    if record.exact {
                        counts.exact += 1;
                    }
                }
                ValidationStatus::Check => counts.check += 1,
                ValidationStatus::Fail => counts.fail += 1,
                ValidationStatus::Speculative => counts.speculative += 1,
            }
        }
        counts
    }
}

/// Records and data errors from validating a whole registry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationRun {
    /// Records keyed by subject id.
    pub records: BTreeMap<String, ValidationRecord>,
    /// Data errors; entities listed here carry no record.
    pub errors: Vec<CanonError>,
}

impl ValidationRun {
    /// Per-status counts of the records.
    pub fn counts(&self) -> StatusCounts {
        StatusCounts::tally(self.records.values())
    }
}

/// Validates every claim-carrying entity, collecting data errors per entity.
pub fn validate_all(registry: &Registry, policy: &Policy) -> ValidationRun {
    let mut run = ValidationRun::default();
    for entity in registry.entities().filter(|entity| is_validation_subject(entity)) {
        match validate(entity, policy) {
            Ok(record) => {
                debug!(
                    id = entity.id(),
                    status = record.status.as_str(),
                    "validated"
                );
                run.records.insert(entity.id().to_string(), record);
            }
            Err(err) => run.errors.push(err),
        }
    }
    let counts = run.counts();
    info!(
        pass = counts.pass,
        check = counts.check,
        fail = counts.fail,
        speculative = counts.speculative,
        errors = run.errors.len(),
        "validation complete"
    );
    run
}

#[cfg(test)]
mod tests {
    use super::*;
    use canon_core::ParameterStatus;

    fn parameter(value: f64, experimental: Option<ExperimentalComparison>) -> Parameter {
        Parameter {
            id: "m_h".to_string(),
            symbol: "m_H".to_string(),
            name: "Higgs mass".to_string(),
            description: None,
            value,
            unit: "GeV".to_string(),
            order_of_magnitude: Some(2),
            status: ParameterStatus::Predicted,
            note: None,
            category: "masses".to_string(),
            quantity: None,
            formula_id: None,
            simulation_reference: None,
            experimental,
            bound: None,
            superseded_by: None,
            export: true,
            absent_by_design: Vec::new(),
        }
    }

    fn measurement(value: f64, uncertainty: Option<f64>) -> ExperimentalComparison {
        ExperimentalComparison {
            experimental_value: value,
            uncertainty,
            source_citation: "PDG".to_string(),
            kind: ReferenceKind::Measurement,
        }
    }

    #[test]
    fn sigma_classification_matches_the_reference_scenario() {
        let policy = Policy::default();
        let exact_hit = validate_parameter(
            &parameter(125.10, Some(measurement(125.10, Some(0.14)))),
            &policy,
        )
        .unwrap();
        assert_eq!(exact_hit.status, ValidationStatus::Pass);
        assert_eq!(exact_hit.deviation, Some(Deviation::Sigma(0.0)));

        let off = validate_parameter(
            &parameter(125.50, Some(measurement(125.10, Some(0.14)))),
            &policy,
        )
        .unwrap();
        assert_eq!(off.status, ValidationStatus::Check);
        let sigma = off.deviation.unwrap().magnitude();
        assert!((sigma - 2.857).abs() < 1e-3);
    }

    #[test]
    fn missing_uncertainty_is_a_data_error() {
        let err = validate_parameter(&parameter(1.0, Some(measurement(1.0, None))), &Policy::default())
            .unwrap_err();
        assert_eq!(err.info().code, "canon_validate.missing_uncertainty");

    }

    #[test]
    fn zero_uncertainty_takes_the_exact_path() {
        let record = validate_parameter(
            &parameter(1.0, Some(measurement(1.0, Some(0.0)))),
            &Policy::default(),
        )
        .unwrap();
        assert_eq!(record.status, ValidationStatus::Pass);
        assert!(record.exact);
        assert_eq!(record.deviation, Some(Deviation::Absolute(0.0)));
    }

    #[test]
    fn speculative_without_reference() {
        let record = validate_parameter(&parameter(3.0, None), &Policy::default()).unwrap();
        assert_eq!(record.status, ValidationStatus::Speculative);
        assert_eq!(record.deviation, None);
    }
}
