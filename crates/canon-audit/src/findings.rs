use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a finding. Only `Blocking` prevents export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Blocking,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Blocking => f.write_str("BLOCKING"),
            Severity::Warning => f.write_str("WARNING"),
        }
    }
}

/// One audit result.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    /// Stable dotted code, e.g. `agreement.quantity_conflict`.
    pub code: String,
    /// Id of the entity the finding is about, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}

impl Finding {
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Blocking
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.code)?;
        if let Some(subject) = &self.subject {
            write!(f, " {subject}")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Per-severity finding counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingCounts {
    pub blocking: usize,
    pub warning: usize,
}

impl FindingCounts {
    pub fn tally(findings: &[Finding]) -> Self {
        let blocking = findings.iter().filter(|f| f.is_blocking()).count();
        Self {
            blocking,
            warning: findings.len() - blocking,
        }
    }
}

/// Whether any finding prevents export.
pub fn has_blocking(findings: &[Finding]) -> bool {
    findings.iter().any(Finding::is_blocking)
}

/// Accumulates findings for one checker pass.
#[derive(Debug, Default)]
pub(crate) struct Sink {
    findings: Vec<Finding>,
}

impl Sink {
    pub(crate) fn push(
        &mut self,
        severity: Severity,
        code: &str,
        subject: Option<&str>,
        message: impl Into<String>,
    ) {
        self.findings.push(Finding {
            severity,
            code: code.to_string(),
            subject: subject.map(str::to_string),
            message: message.into(),
        });
    }

    pub(crate) fn blocking(&mut self, code: &str, subject: &str, message: impl Into<String>) {
        self.push(Severity::Blocking, code, Some(subject), message);
    }

    pub(crate) fn warning(&mut self, code: &str, subject: &str, message: impl Into<String>) {
        self.push(Severity::Warning, code, Some(subject), message);
    }

    /// Sorted, deduplicated findings: blocking first, then by code and subject.
    pub(crate) fn finish(self) -> Vec<Finding> {
        let mut findings = self.findings;
        findings.sort();
        findings.dedup();
        findings
    }
}
