//! Typed definitions for formulas, parameters and the links between them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed classification of a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormulaCategory {
    /// Textbook physics taken as given.
    Established,
    /// Framework postulate.
    Theory,
    /// Obtained from parent formulas by explicit steps.
    Derived,
    /// Produces a number to be compared against experiment.
    Prediction,
    /// Contains a constant fitted to data.
    Calibrated,
    /// Defines an input quantity.
    Input,
}

impl FormulaCategory {
    /// Categories that must explain why they are not free predictions.
    pub fn requires_note(self) -> bool {
        matches!(self, FormulaCategory::Calibrated | FormulaCategory::Input)
    }
}

/// How a parameter value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParameterStatus {
    /// Computed from other quantities by a formula.
    Derived,
    /// Output of the framework intended for experimental comparison.
    Predicted,
    /// Taken from experiment or convention.
    Input,
    /// Fitted to data.
    Calibrated,
    /// Defined constant.
    Fixed,
}

impl ParameterStatus {
    /// Statuses that must carry an explanatory note.
    pub fn requires_note(self) -> bool {
        matches!(self, ParameterStatus::Input | ParameterStatus::Calibrated)
    }

    /// Statuses that claim the value was produced by the framework.
    pub fn is_claim(self) -> bool {
        matches!(
            self,
            ParameterStatus::Derived | ParameterStatus::Predicted | ParameterStatus::Calibrated
        )
    }
}

impl fmt::Display for ParameterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParameterStatus::Derived => "DERIVED",
            ParameterStatus::Predicted => "PREDICTED",
            ParameterStatus::Input => "INPUT",
            ParameterStatus::Calibrated => "CALIBRATED",
            ParameterStatus::Fixed => "FIXED",
        };
        f.write_str(name)
    }
}

impl fmt::Display for FormulaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormulaCategory::Established => "ESTABLISHED",
            FormulaCategory::Theory => "THEORY",
            FormulaCategory::Derived => "DERIVED",
            FormulaCategory::Prediction => "PREDICTION",
            FormulaCategory::Calibrated => "CALIBRATED",
            FormulaCategory::Input => "INPUT",
        };
        f.write_str(name)
    }
}

/// Disclosure tiers that may be omitted on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisclosureTier {
    /// Tier 2: terms / summary shown on hover.
    Summary,
    /// Tier 3: full derivation shown on expansion.
    Derivation,
}

/// One symbol appearing in a formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Term {
    /// Display name of the symbol.
    pub name: String,
    /// One-line description.
    #[serde(default)]
    pub description: String,
    /// Unit, if dimensional.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Base-ten exponent of the typical magnitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_of_magnitude: Option<i32>,
    /// Literal value quoted alongside the symbol.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Cross-reference to the formula or parameter defining the symbol.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Derivation metadata (tier 3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Derivation {
    /// Formulas this one is derived from.
    #[serde(default)]
    pub parent_formulas: Vec<String>,
    /// Free-text citation keys for textbook physics relied on.
    #[serde(default)]
    pub established_physics: Vec<String>,
    /// Ordered, self-contained derivation steps.
    #[serde(default)]
    pub steps: Vec<String>,
    /// Stated assumptions.
    #[serde(default)]
    pub assumptions: Vec<String>,
    /// Approximations made along the way.
    #[serde(default)]
    pub approximations: Vec<String>,
    /// Bibliographic references.
    #[serde(default)]
    pub references: Vec<String>,
}

impl Derivation {
    /// Whether any tier-3 content is present.
    pub fn has_content(&self) -> bool {
        !self.steps.is_empty()
            || !self.assumptions.is_empty()
            || !self.approximations.is_empty()
            || !self.references.is_empty()
            || !self.established_physics.is_empty()
    }
}

/// Interpretation of a reference value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// Measurement with a symmetric one-sigma uncertainty.
    #[default]
    Measurement,
    /// Exact mathematical identity (zero uncertainty by construction).
    Exact,
    /// Compared by relative error, no uncertainty available.
    Relative,
}

/// Experimental comparison block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentalComparison {
    /// Reference value.
    pub experimental_value: f64,
    /// One-sigma uncertainty of the reference value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<f64>,
    /// Citation for the reference value.
    #[serde(default)]
    pub source_citation: String,
    /// How the reference value is compared.
    #[serde(default)]
    pub kind: ReferenceKind,
}

/// Direction of a one-sided bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundKind {
    /// The computed value must exceed the bound.
    Lower,
    /// The computed value must stay below the bound.
    Upper,
}

/// One-sided experimental bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    /// Lower or upper.
    pub kind: BoundKind,
    /// Bound value.
    pub value: f64,
    /// Required fractional margin relative to `|value|`.
    #[serde(default)]
    pub margin: f64,
    /// Citation for the bound.
    #[serde(default)]
    pub source_citation: String,
}

/// A named mathematical relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formula {
    /// Stable identifier, never reused.
    pub id: String,
    /// Human readable label, may embed an equation number.
    pub label: String,
    /// Explicit equation number; extracted from the label when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    /// Typeset markup representation.
    pub latex: String,
    /// Portable markup representation.
    #[serde(default)]
    pub mathml: String,
    /// Plain-text fallback representation.
    pub plain: String,
    /// Closed classification.
    pub category: FormulaCategory,
    /// Section locator.
    #[serde(default)]
    pub section: String,
    /// Prose description (tier 1).
    #[serde(default)]
    pub description: String,
    /// Why the formula is not a free prediction (CALIBRATED and INPUT).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Symbols keyed by their typeset form (tier 2).
    #[serde(default)]
    pub terms: BTreeMap<String, Term>,
    /// Parents and steps (tier 3).
    #[serde(default)]
    pub derivation: Derivation,
    /// Symmetric suggestion links; exempt from cycle checks.
    #[serde(default)]
    pub related_formulas: Vec<String>,
    /// Parameters consumed by the formula.
    #[serde(default)]
    pub uses_parameters: Vec<String>,
    /// Parameters produced by the formula.
    #[serde(default)]
    pub outputs_parameters: Vec<String>,
    /// Formulas jointly constrained with this one (opt-in cycle exemption).
    #[serde(default)]
    pub mutually_derived: Vec<String>,
    /// Numeric value the formula evaluates to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed_value: Option<f64>,
    /// Unit of `computed_value`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Reference the computed value is validated against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental: Option<ExperimentalComparison>,
    /// One-sided limit the computed value must respect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound: Option<Bound>,
    /// Replacement formula, when retired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superseded_by: Option<String>,
    /// Whether the formula is published in the export document.
    #[serde(default = "default_true")]
    pub export: bool,
    /// Tiers deliberately left empty.
    #[serde(default)]
    pub absent_by_design: Vec<DisclosureTier>,
}

/// A named numeric quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Stable identifier, never reused.
    pub id: String,
    /// Display symbol.
    pub symbol: String,
    /// Human readable name.
    #[serde(default)]
    pub name: String,
    /// Prose description (tier 2).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The single authoritative value.
    pub value: f64,
    /// Unit; empty for dimensionless quantities.
    #[serde(default)]
    pub unit: String,
    /// Declared base-ten exponent, checked against `value`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_of_magnitude: Option<i32>,
    /// How the value was obtained.
    pub status: ParameterStatus,
    /// Why the value is not a free prediction (INPUT and CALIBRATED).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Navigation category; never carries numeric meaning.
    pub category: String,
    /// Physical quantity key shared by every definition of the same quantity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    /// Formula that outputs this parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula_id: Option<String>,
    /// Opaque pointer to the external computation that produced the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation_reference: Option<String>,
    /// Reference the value is validated against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental: Option<ExperimentalComparison>,
    /// One-sided limit the value must respect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound: Option<Bound>,
    /// Replacement parameter, when retired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superseded_by: Option<String>,
    /// Whether the parameter is published in the export document.
    #[serde(default = "default_true")]
    pub export: bool,
    /// Tiers deliberately left empty.
    #[serde(default)]
    pub absent_by_design: Vec<DisclosureTier>,
}

/// Result of an external computation referenced by parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Opaque reference matched against `Parameter::simulation_reference`.
    pub reference: String,
    /// Value the run produced.
    pub value: f64,
    /// One-sigma uncertainty of the run, if estimated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<f64>,
    /// Unit of `value`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Free-form description of the run (code, commit, seed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produced_by: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Kind discriminator for registry entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A [`Formula`].
    Formula,
    /// A [`Parameter`].
    Parameter,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Formula => f.write_str("formula"),
            EntityKind::Parameter => f.write_str("parameter"),
        }
    }
}

/// Reference to a registry entity by kind and id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// Entity kind.
    pub kind: EntityKind,
    /// Entity id.
    pub id: String,
}

impl EntityRef {
    /// Reference to a formula.
    pub fn formula(id: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Formula,
            id: id.into(),
        }
    }

    /// Reference to a parameter.
    pub fn parameter(id: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Parameter,
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Formula or parameter accepted by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    /// A registered formula.
    Formula(Formula),
    /// A registered parameter.
    Parameter(Parameter),
}

impl Entity {
    /// Identifier, unique across both kinds.
    pub fn id(&self) -> &str {
        match self {
            Entity::Formula(formula) => &formula.id,
            Entity::Parameter(parameter) => &parameter.id,
        }
    }

    /// Kind discriminator.
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Formula(_) => EntityKind::Formula,
            Entity::Parameter(_) => EntityKind::Parameter,
        }
    }

    /// Kind and id as an owned reference.
    pub fn entity_ref(&self) -> EntityRef {
        EntityRef {
            kind: self.kind(),
            id: self.id().to_string(),
        }
    }

    /// The formula, if this is one.
    pub fn as_formula(&self) -> Option<&Formula> {
        match self {
            Entity::Formula(formula) => Some(formula),
            Entity::Parameter(_) => None,
        }
    }

    /// The parameter, if this is one.
    pub fn as_parameter(&self) -> Option<&Parameter> {
        match self {
            Entity::Parameter(parameter) => Some(parameter),
            Entity::Formula(_) => None,
        }
    }

    /// Replacement id, when retired.
    pub fn superseded_by(&self) -> Option<&str> {
        match self {
            Entity::Formula(formula) => formula.superseded_by.as_deref(),
            Entity::Parameter(parameter) => parameter.superseded_by.as_deref(),
        }
    }

    /// Whether the entity is published.
    pub fn is_exported(&self) -> bool {
        match self {
            Entity::Formula(formula) => formula.export,
            Entity::Parameter(parameter) => parameter.export,
        }
    }

    /// Every declared outbound link, in declaration order.
    pub fn links(&self) -> Vec<Link> {
        match self {
            Entity::Formula(formula) => formula.links(),
            Entity::Parameter(parameter) => parameter.links(),
        }
    }
}

impl From<Formula> for Entity {
    fn from(formula: Formula) -> Self {
        Entity::Formula(formula)
    }
}

impl From<Parameter> for Entity {
    fn from(parameter: Parameter) -> Self {
        Entity::Parameter(parameter)
    }
}

/// Relation carried by a declared link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// `derivation.parent_formulas`
    Parent,
    /// `uses_parameters`
    UsesParameter,
    /// `outputs_parameters`
    OutputsParameter,
    /// `related_formulas`
    Related,
    /// `mutually_derived`
    MutuallyDerived,
    /// `formula_id` on a parameter.
    ProducedBy,
    /// `terms.<symbol>.reference`
    TermReference,
    /// `superseded_by`
    SupersededBy,
}

impl LinkKind {
    /// Kind of entity the link target must be, if constrained.
    pub fn expected_target(self) -> Option<EntityKind> {
        match self {
            LinkKind::Parent
            | LinkKind::Related
            | LinkKind::MutuallyDerived
            | LinkKind::ProducedBy => Some(EntityKind::Formula),
            LinkKind::UsesParameter | LinkKind::OutputsParameter => Some(EntityKind::Parameter),
            LinkKind::TermReference | LinkKind::SupersededBy => None,
        }
    }
}

/// A declared outbound reference from one entity to another.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Link {
    /// Source entity id.
    pub source: String,
    /// Field path on the source, e.g. `parent_formulas[0]`.
    pub field: String,
    /// Target entity id as declared.
    pub target: String,
    /// Relation the link carries.
    pub kind: LinkKind,
}

fn indexed(source: &str, field: &str, targets: &[String], kind: LinkKind, out: &mut Vec<Link>) {
    for (idx, target) in targets.iter().enumerate() {
        out.push(Link {
            source: source.to_string(),
            field: format!("{field}[{idx}]"),
            target: target.clone(),
            kind,
        });
    }
}

impl Formula {
    /// Every declared outbound link of the formula.
    pub fn links(&self) -> Vec<Link> {
        let mut out = Vec::new();
        indexed(
            &self.id,
            "parent_formulas",
            &self.derivation.parent_formulas,
            LinkKind::Parent,
            &mut out,
        );
        indexed(
            &self.id,
            "uses_parameters",
            &self.uses_parameters,
            LinkKind::UsesParameter,
            &mut out,
        );
        indexed(
            &self.id,
            "outputs_parameters",
            &self.outputs_parameters,
            LinkKind::OutputsParameter,
            &mut out,
        );
        indexed(
            &self.id,
            "related_formulas",
            &self.related_formulas,
            LinkKind::Related,
            &mut out,
        );
        indexed(
            &self.id,
            "mutually_derived",
            &self.mutually_derived,
            LinkKind::MutuallyDerived,
            &mut out,
        );
        for (symbol, term) in &self.terms {
            if let Some(target) = &term.reference {
                out.push(Link {
                    source: self.id.clone(),
                    field: format!("terms.{symbol}.reference"),
                    target: target.clone(),
                    kind: LinkKind::TermReference,
                });
            }
        }
        if let Some(target) = &self.superseded_by {
            out.push(Link {
                source: self.id.clone(),
                field: "superseded_by".to_string(),
                target: target.clone(),
                kind: LinkKind::SupersededBy,
            });
        }
        out
    }

    /// Equation number, explicit or extracted from the label.
    pub fn equation_number(&self) -> Option<String> {
        self.number
            .clone()
            .or_else(|| extract_equation_number(&self.label))
    }
}

impl Parameter {
    /// Every declared outbound link of the parameter.
    pub fn links(&self) -> Vec<Link> {
        let mut out = Vec::new();
        if let Some(target) = &self.formula_id {
            out.push(Link {
                source: self.id.clone(),
                field: "formula_id".to_string(),
                target: target.clone(),
                kind: LinkKind::ProducedBy,
            });
        }
        if let Some(target) = &self.superseded_by {
            out.push(Link {
                source: self.id.clone(),
                field: "superseded_by".to_string(),
                target: target.clone(),
                kind: LinkKind::SupersededBy,
            });
        }
        out
    }
}

/// Extracts the last parenthesised dotted number from a label, e.g. `(3.12)`.
pub fn extract_equation_number(label: &str) -> Option<String> {
    let mut found = None;
    let mut rest = label;
    while let Some(open) = rest.find('(') {
        let after = &rest[open + 1..];
        let Some(close) = after.find(')') else {
            break;
        };
        let inner = after[..close].trim();
        let is_number = !inner.is_empty()
            && inner.split('.').all(|part| {
                !part.is_empty() && part.chars().all(|ch| ch.is_ascii_digit())
            });
        if is_number {
            found = Some(inner.to_string());
        }
        rest = &after[close + 1..];
    }
    found
}

/// Returns whether an identifier uses only `[A-Za-z0-9_-]`.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}
