use std::fmt;

use canon_core::errors::{CanonError, ErrorInfo};
use canon_core::{EntityKind, LinkKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a declared reference could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Unresolved {
    /// No entity is registered under the target id.
    Missing,
    /// The target exists but has the wrong kind.
    WrongKind {
        expected: EntityKind,
        found: EntityKind,
    },
}

/// A declared reference that did not resolve against the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedReference {
    pub source: String,
    pub field: String,
    pub target: String,
    pub kind: LinkKind,
    pub cause: Unresolved,
}

impl fmt::Display for UnresolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} unresolved: {}", self.source, self.field, self.target)?;
        if let Unresolved::WrongKind { expected, found } = &self.cause {
            write!(f, " (expected {expected}, found {found})")?;
        }
        Ok(())
    }
}

/// A derivation cycle that is not covered by a `mutually_derived` exemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Formulas in the strongly connected component, sorted.
    pub formulas: Vec<String>,
    /// One concrete dependency path through the component, e.g. `[a, b, a]`.
    pub path: Vec<String>,
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "derivation cycle: {}", self.path.join(" -> "))
    }
}

/// Every broken link and forbidden cycle found while building the graph.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Error)]
#[error("{} unresolved reference(s), {} derivation cycle(s)", unresolved.len(), cycles.len())]
pub struct GraphBuildError {
    pub unresolved: Vec<UnresolvedReference>,
    pub cycles: Vec<CycleReport>,
}

impl GraphBuildError {
    pub fn is_empty(&self) -> bool {
        self.unresolved.is_empty() && self.cycles.is_empty()
    }

    /// One human readable line per problem.
    pub fn lines(&self) -> Vec<String> {
        self.unresolved
            .iter()
            .map(ToString::to_string)
            .chain(self.cycles.iter().map(ToString::to_string))
            .collect()
    }
}

impl From<GraphBuildError> for CanonError {
    fn from(err: GraphBuildError) -> Self {
        let mut info = ErrorInfo::new("canon_graph.build", err.to_string());
        for (idx, line) in err.lines().into_iter().enumerate() {
            info = info.with_context(format!("problem_{idx:04}"), line);
        }
        CanonError::Graph(info)
    }
}
