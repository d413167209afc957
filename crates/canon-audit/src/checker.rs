use canon_core::errors::CanonError;
use canon_core::ValidationStatus;
use canon_graph::{DerivationGraph, GraphBuildError};
use canon_registry::Registry;
use canon_validate::{is_validation_subject, ValidationRun};
use tracing::{debug, info};

use crate::agreement;
use crate::contract;
use crate::findings::{Finding, FindingCounts, Severity, Sink};
use crate::numbering;
use crate::policy::AuditPolicy;
use crate::references;

/// Input bundle passed to [`check`].
#[derive(Debug, Clone, Copy)]
pub struct AuditInputs<'a> {
    pub registry: &'a Registry,
    /// Built graph, or the aggregate error explaining why it could not be built.
    pub graph: Result<&'a DerivationGraph, &'a GraphBuildError>,
    pub validation: &'a ValidationRun,
    /// Definitions that never reached the registry.
    pub rejections: &'a [CanonError],
}

impl<'a> AuditInputs<'a> {
    pub fn new(
        registry: &'a Registry,
        graph: &'a Result<DerivationGraph, GraphBuildError>,
        validation: &'a ValidationRun,
    ) -> Self {
        Self {
            registry,
            graph: graph.as_ref(),
            validation,
            rejections: &[],
        }
    }

    pub fn with_rejections(mut self, rejections: &'a [CanonError]) -> Self {
        self.rejections = rejections;
        self
    }
}

fn validation_findings(inputs: &AuditInputs<'_>, sink: &mut Sink) {
    let run = inputs.validation;
    for err in &run.errors {
        sink.push(
            Severity::Blocking,
            "validation.data_error",
            err.entity_id(),
            err.to_string(),
        );
    }
    for (id, record) in &run.records {
        if record.status == ValidationStatus::Fail {
            let detail = record
                .note
                .clone()
                .unwrap_or_else(|| "computed value disagrees with its reference".to_string());
            sink.warning("validation.fail", id, detail);
        }
    }
    for entity in inputs.registry.entities() {
        let id = entity.id();
        if !is_validation_subject(entity) || run.records.contains_key(id) {
            continue;
        }
        if run.errors.iter().any(|err| err.entity_id() == Some(id)) {
            continue;
        }
        sink.blocking(
            "validation.missing",
            id,
            "entity makes a numeric claim but carries no validation record",
        );
    }
}

/// Runs every consistency check and returns the findings.
///
/// Never fails: a broken registry produces findings, not errors. Findings
/// are sorted blocking first so the result is stable across runs.
pub fn check(inputs: &AuditInputs<'_>, policy: &AuditPolicy) -> Vec<Finding> {
    let registry = inputs.registry;
    let mut sink = Sink::default();

    references::rejections(inputs.rejections, &mut sink);
    for entity in registry.entities() {
        contract::required_fields(entity, &mut sink);
        contract::magnitudes(entity, &mut sink);
        if entity.is_exported() {
            contract::tiers(entity, policy, &mut sink);
        }
    }
    references::graph(inputs.graph, policy, &mut sink);
    references::export_scope(registry, &mut sink);
    references::supersession(registry, &mut sink);
    references::producers(registry, &mut sink);
    numbering::numbering(registry, &mut sink);
    agreement::quantities(registry, policy, &mut sink);
    agreement::term_literals(registry, policy, &mut sink);
    agreement::outputs(registry, policy, &mut sink);
    agreement::simulations(registry, policy, &mut sink);
    validation_findings(inputs, &mut sink);

    let findings = sink.finish();
    for finding in &findings {
        debug!(
            severity = %finding.severity,
            code = %finding.code,
            subject = finding.subject.as_deref().unwrap_or("-"),
            "{}",
            finding.message
        );
    }
    let counts = FindingCounts::tally(&findings);
    info!(
        blocking = counts.blocking,
        warning = counts.warning,
        "consistency check complete"
    );
    findings
}
