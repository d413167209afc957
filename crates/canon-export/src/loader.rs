//! Consumer side of the export document.
//!
//! Resolution never fails: an address that does not resolve, or an element
//! whose always-visible fields are unreadable, yields a placeholder. Summary
//! and derivation tiers are read leniently and dropped when malformed.

use std::collections::BTreeMap;
use std::fmt;

use canon_core::errors::{CanonError, ErrorInfo};
use canon_core::{Address, Derivation, SchemaVersion, Term};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::document::SCHEMA_VERSION;

/// Always-visible fields of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrimaryTier {
    Formula {
        label: String,
        latex: String,
        mathml: String,
        plain: String,
        category: String,
        description: String,
    },
    Parameter {
        symbol: String,
        name: String,
        value: f64,
        unit: String,
        status: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
}

/// On-demand summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SummaryTier {
    Terms { terms: BTreeMap<String, Term> },
    Description { description: String },
}

/// Element content resolved from an address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementView {
    pub address: String,
    pub primary: PrimaryTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derivation: Option<Derivation>,
}

/// Outcome of resolving an address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    Element(ElementView),
    /// Visible stand-in for an address that could not be rendered.
    Placeholder { address: String, reason: String },
}

impl Resolution {
    fn placeholder(address: &str, reason: impl Into<String>) -> Self {
        Resolution::Placeholder {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Resolution::Placeholder { .. })
    }
}

/// Export document opened for rendering.
#[derive(Debug, Clone)]
pub struct ConsumerDocument {
    formulas: Map<String, Value>,
    parameters: Map<String, Value>,
}

fn object_field(root: &Value, key: &str) -> Map<String, Value> {
    root.get(key)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

fn text(record: &Value, key: &str) -> Option<String> {
    record.get(key).and_then(Value::as_str).map(str::to_string)
}

fn lenient<T: DeserializeOwned>(record: &Value, key: &str) -> Option<T> {
    let value = record.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            debug!(field = key, error = %err, "dropping unreadable tier");
            None
        }
    }
}

impl ConsumerDocument {
    /// Opens a document, refusing only unreadable JSON or an unknown major version.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CanonError> {
        let root: Value = canon_core::serde::from_json_slice(bytes)?;
        if let Some(version) = lenient::<SchemaVersion>(&root, "schema_version") {
            if !SCHEMA_VERSION.can_read(&version) {
                return Err(CanonError::Serde(
                    ErrorInfo::new(
                        "canon_export.schema_version",
                        format!(
                            "document schema {}.{}.{} is not readable by this loader",
                            version.major, version.minor, version.patch
                        ),
                    )
                    .with_hint("regenerate the document with a matching exporter"),
                ));
            }
        }
        Ok(Self {
            formulas: object_field(&root, "formulas"),
            parameters: object_field(&root, "parameters"),
        })
    }

    /// Resolves an address such as `formula.<id>` or `<category>.<id>`.
    pub fn resolve(&self, raw: &str) -> Resolution {
        let address: Address = match raw.parse() {
            Ok(address) => address,
            Err(_) => return Resolution::placeholder(raw, "malformed address"),
        };
        match &address {
            Address::Formula(id) => match self.formulas.get(id) {
                Some(record) => formula_view(raw, record),
                None => Resolution::placeholder(raw, format!("no formula `{id}`")),
            },
            Address::Parameter { category, id } => match self.parameters.get(id) {
                Some(record) if text(record, "category").as_deref() == Some(category.as_str()) => {
                    parameter_view(raw, record)
                }
                Some(_) => Resolution::placeholder(raw, format!("`{id}` is not in `{category}`")),
                None => Resolution::placeholder(raw, format!("no parameter `{id}`")),
            },
        }
    }

    /// Every address the document can resolve, sorted.
    pub fn addresses(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .formulas
            .values()
            .chain(self.parameters.values())
            .filter_map(|record| text(record, "address"))
            .collect();
        out.sort();
        out
    }
}

fn formula_view(address: &str, record: &Value) -> Resolution {
    let fields = ["label", "latex", "mathml", "plain", "category", "description"];
    let values: Option<Vec<String>> = fields.iter().map(|key| text(record, key)).collect();
    let Some([label, latex, mathml, plain, category, description]) =
        values.and_then(|values| <[String; 6]>::try_from(values).ok())
    else {
        return Resolution::placeholder(address, "formula is missing always-visible fields");
    };
    let summary = lenient::<BTreeMap<String, Term>>(record, "terms")
        .filter(|terms| !terms.is_empty())
        .map(|terms| SummaryTier::Terms { terms });
    Resolution::Element(ElementView {
        address: address.to_string(),
        primary: PrimaryTier::Formula {
            label,
            latex,
            mathml,
            plain,
            category,
            description,
        },
        summary,
        derivation: lenient(record, "derivation"),
    })
}

fn parameter_view(address: &str, record: &Value) -> Resolution {
    let (Some(symbol), Some(value), Some(status)) = (
        text(record, "symbol"),
        record.get("value").and_then(Value::as_f64),
        text(record, "status"),
    ) else {
        return Resolution::placeholder(address, "parameter is missing always-visible fields");
    };
    let summary = text(record, "description").map(|description| SummaryTier::Description {
        description,
    });
    Resolution::Element(ElementView {
        address: address.to_string(),
        primary: PrimaryTier::Parameter {
            symbol,
            name: text(record, "name").unwrap_or_default(),
            value,
            unit: text(record, "unit").unwrap_or_default(),
            status,
            note: text(record, "note"),
        },
        summary,
        derivation: None,
    })
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = match self {
            Resolution::Placeholder { address, reason } => {
                return write!(f, "[{address}: unavailable ({reason})]");
            }
            Resolution::Element(view) => view,
        };
        match &view.primary {
            PrimaryTier::Formula {
                label,
                plain,
                category,
                description,
                ..
            } => {
                writeln!(f, "{label} [{category}]")?;
                writeln!(f, "  {plain}")?;
                writeln!(f, "  {description}")?;
            }
            PrimaryTier::Parameter {
                symbol,
                name,
                value,
                unit,
                status,
                note,
            } => {
                writeln!(f, "{symbol} = {value} {unit} [{status}] {name}")?;
                if let Some(note) = note {
                    writeln!(f, "  note: {note}")?;
                }
            }
        }
        match &view.summary {
            Some(SummaryTier::Terms { terms }) => {
                for (symbol, term) in terms {
                    writeln!(f, "  {symbol}: {} {}", term.name, term.description)?;
                }
            }
            Some(SummaryTier::Description { description }) => writeln!(f, "  {description}")?,
            None => {}
        }
        if let Some(derivation) = &view.derivation {
            for (idx, step) in derivation.steps.iter().enumerate() {
                writeln!(f, "  {}. {step}", idx + 1)?;
            }
        }
        Ok(())
    }
}
