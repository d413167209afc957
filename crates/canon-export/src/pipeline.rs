use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use canon_audit::{check, has_blocking, AuditInputs, AuditPolicy, Finding};
use canon_core::errors::{CanonError, ErrorInfo};
use canon_core::hash::stable_hash_string;
use canon_core::serde::from_yaml_slice;
use canon_core::ExportProvenance;
use canon_graph::{DerivationGraph, GraphBuildError};
use canon_registry::{load_definitions, LoadPlan, Registry};
use canon_validate::{validate_all, Policy, ValidationRun};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::document::ExportDocument;
use crate::exporter::{export, refuse, ExportContext, ExportOptions};
use crate::publish::publish;

/// Configuration for one pipeline run; every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub definitions: LoadPlan,
    #[serde(default)]
    pub validation: Policy,
    #[serde(default)]
    pub audit: AuditPolicy,
    #[serde(default)]
    pub export: ExportOptions,
}

impl PipelineConfig {
    /// Loads the configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, CanonError> {
        let bytes = fs::read(path).map_err(|err| {
            CanonError::Io(
                ErrorInfo::new("canon_export.config", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        from_yaml_slice(&bytes)
    }

    fn policy_hash(&self) -> Result<String, CanonError> {
        stable_hash_string(&(&self.validation, &self.audit))
    }
}

/// Every stage output of one run, kept for inspection and export.
#[derive(Debug)]
pub struct PipelineRun {
    pub registry: Registry,
    /// Load failures and rejected registrations.
    pub rejections: Vec<CanonError>,
    pub graph: Result<DerivationGraph, GraphBuildError>,
    pub validation: ValidationRun,
    pub findings: Vec<Finding>,
    pub input_hash: String,
}

/// Loads definitions and runs registry, graph, validation and audit.
///
/// Per-entity problems never abort the run; they surface as findings.
pub fn run_pipeline(roots: &[PathBuf], config: &PipelineConfig) -> Result<PipelineRun, CanonError> {
    let definitions = load_definitions(roots, &config.definitions)?;
    let build = Registry::from_definitions(&definitions);
    let graph = canon_graph::build(&build.registry);
    let validation = validate_all(&build.registry, &config.validation);
    let findings = {
        let inputs =
            AuditInputs::new(&build.registry, &graph, &validation).with_rejections(&build.rejections);
        check(&inputs, &config.audit)
    };
    info!(
        entities = build.registry.len(),
        findings = findings.len(),
        "pipeline stages complete"
    );
    Ok(PipelineRun {
        registry: build.registry,
        rejections: build.rejections,
        graph,
        validation,
        findings,
        input_hash: definitions.input_hash,
    })
}

impl PipelineRun {
    /// Builds the export document, refusing on blocking findings.
    pub fn export(&self, config: &PipelineConfig) -> Result<ExportDocument, CanonError> {
        if has_blocking(&self.findings) {
            return Err(refuse(&self.findings));
        }
        let graph = self
            .graph
            .as_ref()
            .map_err(|err| CanonError::from(err.clone()))?;
        let mut tool_versions = BTreeMap::new();
        tool_versions.insert(
            env!("CARGO_PKG_NAME").to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        );
        let context = ExportContext {
            generated_at: config.export.timestamp()?,
            provenance: ExportProvenance {
                input_hash: self.input_hash.clone(),
                policy_hash: config.policy_hash()?,
                tool_versions,
            },
        };
        export(
            &self.registry,
            graph,
            &self.validation,
            &self.findings,
            &context,
        )
    }

    /// Exports and atomically publishes to `out`.
    ///
    /// On refusal the file at `out` is left untouched.
    pub fn publish(&self, config: &PipelineConfig, out: &Path) -> Result<ExportDocument, CanonError> {
        let document = self.export(config)?;
        publish(&document, out, config.export.pretty)?;
        Ok(document)
    }
}
