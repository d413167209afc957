//! Structured error types shared across canon crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`CanonError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (identifiers, field names, values).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the author resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the registry pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum CanonError {
    /// An identifier was registered twice.
    #[error("duplicate id: {0}")]
    DuplicateId(ErrorInfo),
    /// A definition lacks fields required by its category or status.
    #[error("schema error: {0}")]
    Schema(ErrorInfo),
    /// A lookup did not resolve.
    #[error("not found: {0}")]
    NotFound(ErrorInfo),
    /// Derivation graph construction failed.
    #[error("graph error: {0}")]
    Graph(ErrorInfo),
    /// Numeric inconsistency detected during validation.
    #[error("data error: {0}")]
    Data(ErrorInfo),
    /// The exporter refused to publish.
    #[error("export error: {0}")]
    Export(ErrorInfo),
    /// Serialization and decoding errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// Filesystem errors around authoring inputs and published documents.
    #[error("io error: {0}")]
    Io(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl CanonError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            CanonError::DuplicateId(info)
            | CanonError::Schema(info)
            | CanonError::NotFound(info)
            | CanonError::Graph(info)
            | CanonError::Data(info)
            | CanonError::Export(info)
            | CanonError::Serde(info)
            | CanonError::Io(info) => info,
        }
    }

    /// Short family name used when errors are turned into audit findings.
    pub fn family(&self) -> &'static str {
        match self {
            CanonError::DuplicateId(_) => "duplicate-id",
            CanonError::Schema(_) => "schema",
            CanonError::NotFound(_) => "not-found",
            CanonError::Graph(_) => "graph",
            CanonError::Data(_) => "data",
            CanonError::Export(_) => "export",
            CanonError::Serde(_) => "serde",
            CanonError::Io(_) => "io",
        }
    }

    /// Identifier of the entity the error concerns, if recorded.
    pub fn entity_id(&self) -> Option<&str> {
        self.info().context.get("id").map(String::as_str)
    }

    /// Convenience constructor for [`CanonError::Schema`].
    pub fn schema(id: &str, code: &str, message: impl Into<String>) -> Self {
        CanonError::Schema(ErrorInfo::new(code, message).with_context("id", id))
    }

    /// Convenience constructor for [`CanonError::NotFound`].
    pub fn not_found(id: &str) -> Self {
        CanonError::NotFound(
            ErrorInfo::new("canon.not_found", format!("no entity registered under `{id}`"))
                .with_context("id", id),
        )
    }
}
