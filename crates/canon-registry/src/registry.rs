use std::collections::BTreeMap;

use canon_core::errors::{CanonError, ErrorInfo};
use canon_core::model::{is_valid_id, ExperimentalComparison};
use canon_core::{
    Address, Bound, Entity, EntityKind, EntityRef, Formula, Parameter, SimulationResult,
};
use tracing::{debug, warn};

/// In-memory index of every accepted formula and parameter.
///
/// Ids are write-once and shared between formulas and parameters. Iteration
/// follows registration order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entities: Vec<Entity>,
    index: BTreeMap<String, usize>,
    simulations: BTreeMap<String, SimulationResult>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a formula or parameter.
    ///
    /// Fails with [`CanonError::DuplicateId`] when the id is taken and with
    /// [`CanonError::Schema`] when a field required by the declared
    /// category/status is absent. A rejected entity leaves the registry
    /// untouched.
    pub fn register(&mut self, entity: impl Into<Entity>) -> Result<EntityRef, CanonError> {
        let entity = entity.into();
        let id = entity.id().to_string();
        if !is_valid_id(&id) {
            return Err(CanonError::Schema(
                ErrorInfo::new(
                    "canon_registry.invalid_id",
                    format!("`{id}` is not a valid identifier"),
                )
                .with_context("id", id.as_str())
                .with_hint("ids use only ASCII letters, digits, `_` and `-`"),
            ));
        }
        if let Some(existing) = self.index.get(&id) {
            let kind = self.entities[*existing].kind();
            return Err(CanonError::DuplicateId(
                ErrorInfo::new(
                    "canon_registry.duplicate_id",
                    format!("id `{id}` is already registered"),
                )
                .with_context("id", id.as_str())
                .with_context("existing_kind", kind.to_string())
                .with_hint("ids are write-once; supersede the old entity instead"),
            ));
        }
        let problems = match &entity {
            Entity::Formula(formula) => formula_problems(formula),
            Entity::Parameter(parameter) => parameter_problems(parameter),
        };
        if !problems.is_empty() {
            return Err(CanonError::Schema(
                ErrorInfo::new("canon_registry.schema", problems.join("; "))
                    .with_context("id", id.as_str())
                    .with_context("kind", entity.kind().to_string()),
            ));
        }
        debug!(id = %id, kind = %entity.kind(), "registered entity");
        let entity_ref = entity.entity_ref();
        self.index.insert(id, self.entities.len());
        self.entities.push(entity);
        Ok(entity_ref)
    }

    /// Registers every entity, collecting rejections instead of stopping.
    pub fn register_all<I, E>(&mut self, entities: I) -> Vec<CanonError>
    where
        I: IntoIterator<Item = E>,
        E: Into<Entity>,
    {
        let mut rejections = Vec::new();
        for entity in entities {
            if let Err(err) = self.register(entity) {
                warn!(error = %err, "rejected definition");
                rejections.push(err);
            }
        }
        rejections
    }

    /// Registers the result of an external computation.
    pub fn register_simulation(&mut self, result: SimulationResult) -> Result<(), CanonError> {
        if result.reference.trim().is_empty() {
            return Err(CanonError::Schema(ErrorInfo::new(
                "canon_registry.simulation_reference",
                "simulation result requires a non-empty reference",
            )));
        }
        if !result.value.is_finite() {
            return Err(CanonError::Schema(
                ErrorInfo::new(
                    "canon_registry.simulation_value",
                    "simulation value must be finite",
                )
                .with_context("id", result.reference.as_str()),
            ));
        }
        if self.simulations.contains_key(&result.reference) {
            return Err(CanonError::DuplicateId(
                ErrorInfo::new(
                    "canon_registry.duplicate_simulation",
                    format!("simulation `{}` is already registered", result.reference),
                )
                .with_context("id", result.reference.as_str()),
            ));
        }
        self.simulations.insert(result.reference.clone(), result);
        Ok(())
    }

    /// Looks up an entity by id.
    pub fn lookup(&self, id: &str) -> Result<&Entity, CanonError> {
        self.index
            .get(id)
            .map(|idx| &self.entities[*idx])
            .ok_or_else(|| CanonError::not_found(id))
    }

    /// Looks up a formula by id.
    pub fn formula(&self, id: &str) -> Result<&Formula, CanonError> {
        self.lookup(id)?.as_formula().ok_or_else(|| wrong_kind(id, EntityKind::Formula))
    }

    /// Looks up a parameter by id.
    pub fn parameter(&self, id: &str) -> Result<&Parameter, CanonError> {
        self.lookup(id)?
            .as_parameter()
            .ok_or_else(|| wrong_kind(id, EntityKind::Parameter))
    }

    /// Returns whether the id is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Kind of the entity registered under `id`.
    pub fn kind_of(&self, id: &str) -> Option<EntityKind> {
        self.index.get(id).map(|idx| self.entities[*idx].kind())
    }

    /// Lazily yields every entity of the given kind in registration order.
    pub fn all_of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> + '_ {
        self.entities
            .iter()
            .filter(move |entity| entity.kind() == kind)
    }

    /// Every entity in registration order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.iter()
    }

    /// Every formula in registration order.
    pub fn formulas(&self) -> impl Iterator<Item = &Formula> + '_ {
        self.entities.iter().filter_map(Entity::as_formula)
    }

    /// Every parameter in registration order.
    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> + '_ {
        self.entities.iter().filter_map(Entity::as_parameter)
    }

    /// Simulation result registered under the opaque reference, if any.
    pub fn simulation(&self, reference: &str) -> Option<&SimulationResult> {
        self.simulations.get(reference)
    }

    /// Every registered simulation result ordered by reference.
    pub fn simulations(&self) -> impl Iterator<Item = &SimulationResult> + '_ {
        self.simulations.values()
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no entity has been registered.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

fn wrong_kind(id: &str, expected: EntityKind) -> CanonError {
    CanonError::NotFound(
        ErrorInfo::new(
            "canon_registry.wrong_kind",
            format!("`{id}` is registered but is not a {expected}"),
        )
        .with_context("id", id),
    )
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn comparison_problems(
    comparison: Option<&ExperimentalComparison>,
    bound: Option<&Bound>,
    problems: &mut Vec<String>,
) {
    if let Some(comparison) = comparison {
        if !comparison.experimental_value.is_finite() {
            problems.push("experimental_value must be finite".to_string());
        }
        if let Some(uncertainty) = comparison.uncertainty {
            if !uncertainty.is_finite() || uncertainty < 0.0 {
                problems.push("uncertainty must be finite and non-negative".to_string());
            }
        }
    }
    if let Some(bound) = bound {
        if !bound.value.is_finite() {
            problems.push("bound value must be finite".to_string());
        }
        if !bound.margin.is_finite() || bound.margin < 0.0 {
            problems.push("bound margin must be finite and non-negative".to_string());
        }
    }
}

fn formula_problems(formula: &Formula) -> Vec<String> {
    let mut problems = Vec::new();
    if blank(&formula.label) {
        problems.push("label is required".to_string());
    }
    for (field, value) in [
        ("latex", &formula.latex),
        ("mathml", &formula.mathml),
        ("plain", &formula.plain),
    ] {
        if blank(value) {
            problems.push(format!("{field} representation is required"));
        }
    }
    if formula.category.requires_note() && formula.note.as_deref().map_or(true, blank) {
        problems.push(format!("{} requires note", formula.category));
    }
    for (symbol, term) in &formula.terms {
        if blank(symbol) {
            problems.push("term symbols must be non-empty".to_string());
        } else if blank(&term.name) {
            problems.push(format!("term `{symbol}` requires a display name"));
        }
    }
    if formula.computed_value.is_some_and(|value| !value.is_finite()) {
        problems.push("computed_value must be finite".to_string());
    }
    comparison_problems(
        formula.experimental.as_ref(),
        formula.bound.as_ref(),
        &mut problems,
    );
    problems
}

fn parameter_problems(parameter: &Parameter) -> Vec<String> {
    let mut problems = Vec::new();
    if blank(&parameter.symbol) {
        problems.push("symbol is required".to_string());
    }
    if !parameter.value.is_finite() {
        problems.push("value must be finite".to_string());
    }
    if let Err(err) = Address::validate_category(&parameter.category) {
        problems.push(err.info().message.clone());
    }
    if parameter.status.requires_note() && parameter.note.as_deref().map_or(true, blank) {
        problems.push(format!("{} requires note", parameter.status));
    }
    comparison_problems(
        parameter.experimental.as_ref(),
        parameter.bound.as_ref(),
        &mut problems,
    );
    problems
}
