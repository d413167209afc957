use std::collections::{BTreeMap, BTreeSet};

use canon_audit::{has_blocking, Finding, FindingCounts};
use canon_core::errors::{CanonError, ErrorInfo};
use canon_core::{Address, Entity, ExportProvenance, Formula, Parameter};
use canon_graph::DerivationGraph;
use canon_registry::Registry;
use canon_validate::{StatusCounts, ValidationRun};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::document::{
    ExportDocument, ExportSummary, FormulaRecord, GraphSection, ParameterRecord,
    PublishedValidation, SCHEMA_VERSION,
};

/// Output options of the exporter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Fixed RFC 3339 timestamp for reproducible output; wall clock when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    /// Indent the published JSON.
    #[serde(default)]
    pub pretty: bool,
}

impl ExportOptions {
    /// Timestamp to stamp on the document.
    pub fn timestamp(&self) -> Result<String, CanonError> {
        match &self.generated_at {
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .map(|stamp| stamp.to_rfc3339_opts(SecondsFormat::Secs, false))
                .map_err(|err| {
                    CanonError::Export(
                        ErrorInfo::new("canon_export.timestamp", err.to_string())
                            .with_context("generated_at", raw.as_str()),
                    )
                }),
            None => Ok(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false)),
        }
    }
}

/// Run metadata stamped on the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportContext {
    pub generated_at: String,
    pub provenance: ExportProvenance,
}

pub(crate) fn refuse(findings: &[Finding]) -> CanonError {
    let blocking: Vec<&Finding> = findings.iter().filter(|f| f.is_blocking()).collect();
    let mut info = ErrorInfo::new(
        "canon_export.blocked",
        format!("{} blocking finding(s); nothing was exported", blocking.len()),
    )
    .with_hint("run `canon check` to list every finding");
    for (idx, finding) in blocking.iter().enumerate() {
        info = info.with_context(format!("finding_{idx:04}"), finding.to_string());
    }
    CanonError::Export(info)
}

fn exported_ids(ids: Vec<&str>, exported: &BTreeSet<&str>) -> Vec<String> {
    ids.into_iter()
        .filter(|id| exported.contains(id))
        .map(str::to_string)
        .collect()
}

fn formula_record(
    formula: &Formula,
    graph: &DerivationGraph,
    exported: &BTreeSet<&str>,
) -> Result<FormulaRecord, CanonError> {
    let derivation = &formula.derivation;
    FormulaRecord {
        id: formula.id.clone(),
        address: Address::Formula(formula.id.clone()).to_string(),
        label: formula.label.clone(),
        number: formula.equation_number(),
        latex: formula.latex.clone(),
        mathml: formula.mathml.clone(),
        plain: formula.plain.clone(),
        category: formula.category,
        section: formula.section.clone(),
        description: formula.description.clone(),
        note: formula.note.clone(),
        terms: (!formula.terms.is_empty()).then(|| formula.terms.clone()),
        derivation: derivation.has_content().then(|| derivation.clone()),
        absent_by_design: formula.absent_by_design.clone(),
        parent_formulas: exported_ids(graph.parents_of(&formula.id), exported),
        child_formulas: exported_ids(graph.children_of(&formula.id), exported),
        related_formulas: exported_ids(graph.related_of(&formula.id), exported),
        uses_parameters: exported_ids(graph.uses_of(&formula.id), exported),
        outputs_parameters: exported_ids(graph.outputs_of(&formula.id), exported),
        mutually_derived: formula.mutually_derived.clone(),
        computed_value: formula.computed_value,
        unit: formula.unit.clone(),
        superseded_by: formula.superseded_by.clone(),
        record_hash: String::new(),
    }
    .seal()
}

fn parameter_record(
    parameter: &Parameter,
    registry: &Registry,
    graph: &DerivationGraph,
    exported: &BTreeSet<&str>,
) -> Result<ParameterRecord, CanonError> {
    let simulation = parameter
        .simulation_reference
        .as_deref()
        .and_then(|reference| registry.simulation(reference))
        .cloned();
    ParameterRecord {
        id: parameter.id.clone(),
        address: Address::Parameter {
            category: parameter.category.clone(),
            id: parameter.id.clone(),
        }
        .to_string(),
        symbol: parameter.symbol.clone(),
        name: parameter.name.clone(),
        value: parameter.value,
        unit: parameter.unit.clone(),
        order_of_magnitude: parameter.order_of_magnitude,
        status: parameter.status,
        note: parameter.note.clone(),
        category: parameter.category.clone(),
        description: parameter.description.clone(),
        quantity: parameter.quantity.clone(),
        produced_by: exported_ids(graph.producers_of(&parameter.id), exported),
        used_by: exported_ids(graph.consumers_of(&parameter.id), exported),
        simulation_reference: parameter.simulation_reference.clone(),
        simulation,
        experimental: parameter.experimental.clone(),
        bound: parameter.bound.clone(),
        superseded_by: parameter.superseded_by.clone(),
        absent_by_design: parameter.absent_by_design.clone(),
        record_hash: String::new(),
    }
    .seal()
}

/// Builds the export document.
///
/// Refuses with [`CanonError::Export`] when any finding is blocking; warnings
/// are carried in the document. Only entities flagged for export appear, and
/// every published link points at a published entity.
pub fn export(
    registry: &Registry,
    graph: &DerivationGraph,
    validation: &ValidationRun,
    findings: &[Finding],
    context: &ExportContext,
) -> Result<ExportDocument, CanonError> {
    if has_blocking(findings) {
        let err = refuse(findings);
        warn!(error = %err, "export refused");
        return Err(err);
    }

    let exported: BTreeSet<&str> = registry
        .entities()
        .filter(|entity| entity.is_exported())
        .map(Entity::id)
        .collect();

    let mut formulas = BTreeMap::new();
    let mut parameters = BTreeMap::new();
    let mut categories: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for entity in registry.entities().filter(|entity| entity.is_exported()) {
        match entity {
            Entity::Formula(formula) => {
                let record = formula_record(formula, graph, &exported)?;
                formulas.insert(formula.id.clone(), record);
            }
            Entity::Parameter(parameter) => {
                let record = parameter_record(parameter, registry, graph, &exported)?;
                categories
                    .entry(parameter.category.clone())
                    .or_default()
                    .push(parameter.id.clone());
                parameters.insert(parameter.id.clone(), record);
            }
        }
    }
    for ids in categories.values_mut() {
        ids.sort();
    }

    let validations = validation
        .records
        .iter()
        .filter(|(id, _)| exported.contains(id.as_str()))
        .map(|(id, record)| Ok((id.clone(), PublishedValidation::seal(record.clone())?)))
        .collect::<Result<BTreeMap<_, _>, CanonError>>()?;

    let edges = graph
        .edges()
        .into_iter()
        .filter(|edge| exported.contains(edge.from.as_str()) && exported.contains(edge.to.as_str()))
        .collect();
    let topological_order = graph
        .topological_order()
        .into_iter()
        .filter(|id| exported.contains(id.as_str()))
        .collect();
    let mutual_pairs = graph
        .mutual_pairs()
        .iter()
        .filter(|(a, b)| exported.contains(a.as_str()) && exported.contains(b.as_str()))
        .cloned()
        .collect();

    let summary = ExportSummary {
        formulas: formulas.len(),
        parameters: parameters.len(),
        validations: StatusCounts::tally(
            validations.values().map(|published: &PublishedValidation| &published.record),
        ),
        findings: FindingCounts::tally(findings),
    };

    let document = ExportDocument {
        schema_version: SCHEMA_VERSION,
        generated_at: context.generated_at.clone(),
        content_hash: String::new(),
        provenance: context.provenance.clone(),
        summary,
        categories,
        formulas,
        parameters,
        validations,
        graph: GraphSection {
            edges,
            topological_order,
            mutual_pairs,
        },
        findings: findings.to_vec(),
    }
    .seal()?;

    info!(
        formulas = document.summary.formulas,
        parameters = document.summary.parameters,
        validations = document.validations.len(),
        warnings = document.summary.findings.warning,
        content_hash = %document.content_hash,
        "export document built"
    );
    Ok(document)
}
