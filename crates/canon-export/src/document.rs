use std::collections::BTreeMap;

use canon_audit::{Finding, FindingCounts};
use canon_core::errors::CanonError;
use canon_core::hash::stable_hash_string;
use canon_core::{
    Bound, Derivation, DisclosureTier, ExperimentalComparison, ExportProvenance, FormulaCategory,
    ParameterStatus, SchemaVersion, SimulationResult, Term, ValidationRecord,
};
use canon_graph::GraphEdge;
use canon_validate::StatusCounts;
use serde::{Deserialize, Serialize};

/// Schema version written by this exporter.
pub const SCHEMA_VERSION: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// Published formula.
///
/// Tier 1 fields are always present. `terms` is tier 2 and `derivation`
/// tier 3; both are omitted when empty so consumers fall back to tier 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaRecord {
    pub id: String,
    pub address: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    pub latex: String,
    pub mathml: String,
    pub plain: String,
    pub category: FormulaCategory,
    #[serde(default)]
    pub section: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<BTreeMap<String, Term>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derivation: Option<Derivation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub absent_by_design: Vec<DisclosureTier>,
    #[serde(default)]
    pub parent_formulas: Vec<String>,
    /// Inverse of `parent_formulas`, derived by the graph builder.
    #[serde(default)]
    pub child_formulas: Vec<String>,
    #[serde(default)]
    pub related_formulas: Vec<String>,
    #[serde(default)]
    pub uses_parameters: Vec<String>,
    #[serde(default)]
    pub outputs_parameters: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mutually_derived: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superseded_by: Option<String>,
    /// Hash of the record with this field blank.
    #[serde(default)]
    pub record_hash: String,
}

/// Published parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRecord {
    pub id: String,
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_of_magnitude: Option<i32>,
    pub status: ParameterStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    /// Formulas that output the parameter.
    #[serde(default)]
    pub produced_by: Vec<String>,
    /// Formulas that consume the parameter.
    #[serde(default)]
    pub used_by: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation: Option<SimulationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental: Option<ExperimentalComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound: Option<Bound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superseded_by: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub absent_by_design: Vec<DisclosureTier>,
    #[serde(default)]
    pub record_hash: String,
}

/// Published validation record with its own content hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedValidation {
    pub record: ValidationRecord,
    #[serde(default)]
    pub record_hash: String,
}

/// Resolved graph as published.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSection {
    pub edges: Vec<GraphEdge>,
    /// Formulas ordered so dependencies precede dependents.
    pub topological_order: Vec<String>,
    pub mutual_pairs: Vec<(String, String)>,
}

/// Header counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub formulas: usize,
    pub parameters: usize,
    pub validations: StatusCounts,
    pub findings: FindingCounts,
}

/// The canonical document consumed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub schema_version: SchemaVersion,
    /// RFC 3339 timestamp; excluded from `content_hash`.
    pub generated_at: String,
    /// Hash over everything except `generated_at` and itself.
    pub content_hash: String,
    pub provenance: ExportProvenance,
    pub summary: ExportSummary,
    /// Navigation categories mapped to the parameter ids they hold.
    pub categories: BTreeMap<String, Vec<String>>,
    pub formulas: BTreeMap<String, FormulaRecord>,
    pub parameters: BTreeMap<String, ParameterRecord>,
    pub validations: BTreeMap<String, PublishedValidation>,
    pub graph: GraphSection,
    /// Warnings flagged in-band.
    pub findings: Vec<Finding>,
}

impl FormulaRecord {
    pub(crate) fn seal(mut self) -> Result<Self, CanonError> {
        self.record_hash.clear();
        self.record_hash = stable_hash_string(&self)?;
        Ok(self)
    }
}

impl ParameterRecord {
    pub(crate) fn seal(mut self) -> Result<Self, CanonError> {
        self.record_hash.clear();
        self.record_hash = stable_hash_string(&self)?;
        Ok(self)
    }
}

impl PublishedValidation {
    pub(crate) fn seal(record: ValidationRecord) -> Result<Self, CanonError> {
        let record_hash = stable_hash_string(&record)?;
        Ok(Self {
            record,
            record_hash,
        })
    }
}

impl ExportDocument {
    /// Hash of the document with the timestamp and hash blanked out.
    pub fn compute_content_hash(&self) -> Result<String, CanonError> {
        let mut unsealed = self.clone();
        unsealed.generated_at.clear();
        unsealed.content_hash.clear();
        stable_hash_string(&unsealed)
    }

    pub(crate) fn seal(mut self) -> Result<Self, CanonError> {
        self.content_hash = self.compute_content_hash()?;
        Ok(self)
    }

    /// Whether `content_hash` matches the document body.
    pub fn verify_content_hash(&self) -> Result<bool, CanonError> {
        Ok(self.compute_content_hash()? == self.content_hash)
    }

    /// Serialises the document as canonical JSON.
    pub fn to_bytes(&self, pretty: bool) -> Result<Vec<u8>, CanonError> {
        if pretty {
            canon_core::serde::to_canonical_json_pretty(self)
        } else {
            canon_core::serde::to_canonical_json_bytes(self)
        }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, CanonError> {
        canon_core::serde::from_json_slice(bytes)
    }
}
