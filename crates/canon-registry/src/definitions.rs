use std::fs;
use std::path::{Path, PathBuf};

use canon_core::errors::{CanonError, ErrorInfo};
use canon_core::hash::stable_hash_string;
use canon_core::serde::{from_json_slice, from_yaml_slice};
use canon_core::{Formula, Parameter, SimulationResult};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::registry::Registry;

fn load_error(code: &str, message: impl std::fmt::Display) -> CanonError {
    CanonError::Io(ErrorInfo::new(code, message.to_string()))
}

/// Contents of one authoring file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinitionFile {
    #[serde(default)]
    pub formulas: Vec<Formula>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub simulations: Vec<SimulationResult>,
}

/// Plan describing which files under the roots hold definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadPlan {
    /// Glob patterns relative to each root.
    #[serde(default = "LoadPlan::default_include")]
    pub include: Vec<String>,
}

impl LoadPlan {
    fn default_include() -> Vec<String> {
        vec![
            "**/*.yaml".to_string(),
            "**/*.yml".to_string(),
            "**/*.json".to_string(),
        ]
    }
}

impl Default for LoadPlan {
    fn default() -> Self {
        Self {
            include: Self::default_include(),
        }
    }
}

/// One parsed authoring file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub definitions: DefinitionFile,
}

/// Every authoring file found under the roots, in sorted path order.
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    pub sources: Vec<SourceFile>,
    /// Files that could not be read or decoded.
    pub errors: Vec<CanonError>,
    /// Stable hash over the decoded definitions.
    pub input_hash: String,
}

/// Result of building a registry from definitions.
#[derive(Debug, Clone, Default)]
pub struct RegistryBuild {
    pub registry: Registry,
    /// Load failures and rejected registrations, in encounter order.
    pub rejections: Vec<CanonError>,
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, CanonError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).map_err(|err| load_error("canon_registry.glob", err))?);
    }
    builder
        .build()
        .map_err(|err| load_error("canon_registry.glob_build", err))
}

fn decode(path: &Path, bytes: &[u8]) -> Result<DefinitionFile, CanonError> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let decoded = if is_json {
        from_json_slice(bytes)
    } else {
        from_yaml_slice(bytes)
    };
    decoded.map_err(|err| {
        CanonError::Serde(
            err.info()
                .clone()
                .with_context("path", path.display().to_string()),
        )
    })
}

/// Discovers and decodes definition files under the provided roots.
///
/// Unreadable or undecodable files are collected in [`Definitions::errors`]
/// so the remaining files can still be registered and audited.
pub fn load_definitions(roots: &[PathBuf], plan: &LoadPlan) -> Result<Definitions, CanonError> {
    if roots.is_empty() {
        return Err(load_error(
            "canon_registry.missing_roots",
            "at least one definitions root must be provided",
        ));
    }
    let globset = build_globset(&plan.include)?;
    let mut paths = Vec::new();
    for root in roots {
        if root.is_file() {
            paths.push(root.clone());
            continue;
        }
        if !root.exists() {
            return Err(CanonError::Io(
                ErrorInfo::new(
                    "canon_registry.missing_root",
                    "definitions root does not exist",
                )
                .with_context("path", root.display().to_string()),
            ));
        }
        for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(root) else {
                continue;
            };
            if globset.is_match(rel) {
                paths.push(entry.path().to_path_buf());
            }
        }
    }
    paths.sort();
    paths.dedup();

    let mut definitions = Definitions::default();
    for path in paths {
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "unreadable definition file");
                definitions.errors.push(CanonError::Io(
                    ErrorInfo::new("canon_registry.read", err.to_string())
                        .with_context("path", path.display().to_string()),
                ));
                continue;
            }
        };
        match decode(&path, &bytes) {
            Ok(file) => {
                debug!(
                    path = %path.display(),
                    formulas = file.formulas.len(),
                    parameters = file.parameters.len(),
                    "decoded definition file"
                );
                definitions.sources.push(SourceFile {
                    path,
                    definitions: file,
                });
            }
            Err(err) => {
                warn!(error = %err, "undecodable definition file");
                definitions.errors.push(err);
            }
        }
    }
    let hashed: Vec<&DefinitionFile> = definitions
        .sources
        .iter()
        .map(|source| &source.definitions)
        .collect();
    definitions.input_hash = stable_hash_string(&hashed)?;
    info!(
        files = definitions.sources.len(),
        failed = definitions.errors.len(),
        "loaded definitions"
    );
    Ok(definitions)
}

impl Registry {
    /// Builds a registry from loaded definitions, collecting every rejection.
    pub fn from_definitions(definitions: &Definitions) -> RegistryBuild {
        let mut registry = Registry::new();
        let mut rejections = definitions.errors.clone();
        for source in &definitions.sources {
            let file = &source.definitions;
            let path = source.path.display().to_string();
            let rejected = registry
                .register_all(file.formulas.iter().cloned())
                .into_iter()
                .chain(registry.register_all(file.parameters.iter().cloned()));
            let mut file_rejections: Vec<CanonError> = rejected.collect();
            for simulation in &file.simulations {
                if let Err(err) = registry.register_simulation(simulation.clone()) {
                    file_rejections.push(err);
                }
            }
            rejections.extend(
                file_rejections
                    .into_iter()
                    .map(|err| with_path(err, &path)),
            );
        }
        info!(
            entities = registry.len(),
            rejected = rejections.len(),
            "registry built"
        );
        RegistryBuild {
            registry,
            rejections,
        }
    }
}

fn with_path(err: CanonError, path: &str) -> CanonError {
    let attach = |info: ErrorInfo| info.with_context("path", path);
    match err {
        CanonError::DuplicateId(info) => CanonError::DuplicateId(attach(info)),
        CanonError::Schema(info) => CanonError::Schema(attach(info)),
        other => other,
    }
}
