use std::collections::{BTreeMap, BTreeSet};

use canon_core::{EntityKind, Link, LinkKind};
use canon_registry::Registry;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cycles::{find_cycles, DependencyCycles};
use crate::error::{GraphBuildError, Unresolved, UnresolvedReference};

/// Kind of a resolved graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// formula → parameter it outputs.
    Outputs,
    /// parameter → formula that consumes it.
    UsedBy,
    /// parent formula → derived formula.
    ParentOf,
    /// Symmetric suggestion link, stored once with `from < to`.
    Related,
}

/// A resolved, directed edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
}

/// Ordered adjacency sets keyed by entity id.
pub type Adjacency = BTreeMap<String, BTreeSet<String>>;

fn insert_edge(adjacency: &mut Adjacency, from: &str, to: &str) {
    adjacency
        .entry(from.to_string())
        .or_default()
        .insert(to.to_string());
}

fn neighbours<'a>(adjacency: &'a Adjacency, id: &str) -> Vec<&'a str> {
    adjacency
        .get(id)
        .map(|set| set.iter().map(String::as_str).collect())
        .unwrap_or_default()
}

/// Bidirectional derivation graph over formulas and parameters.
#[derive(Debug, Clone, Default)]
pub struct DerivationGraph {
    nodes: BTreeMap<String, EntityKind>,
    parents: Adjacency,
    children: Adjacency,
    outputs: Adjacency,
    producers: Adjacency,
    uses: Adjacency,
    consumers: Adjacency,
    related: Adjacency,
    mutual_pairs: Vec<(String, String)>,
}

/// Builds the derivation graph, reporting every broken link in one pass.
///
/// Pass 1 indexes every declared outbound link; pass 2 resolves each target
/// against the registry and accumulates inverse edges, so `child_formulas`
/// is always derived from `parent_formulas`.
pub fn build(registry: &Registry) -> Result<DerivationGraph, GraphBuildError> {
    let declared: Vec<Link> = registry.entities().flat_map(|entity| entity.links()).collect();
    debug!(links = declared.len(), "indexed declared links");

    let mut graph = DerivationGraph::default();
    for entity in registry.entities() {
        graph.nodes.insert(entity.id().to_string(), entity.kind());
    }

    let mut report = GraphBuildError::default();
    let mut mutual_claims: BTreeSet<(String, String)> = BTreeSet::new();
    for link in &declared {
        let Some(found) = registry.kind_of(&link.target) else {
            report.unresolved.push(unresolved(link, Unresolved::Missing));
            continue;
        };
        if let Some(expected) = link.kind.expected_target() {
            if expected != found {
                report
                    .unresolved
                    .push(unresolved(link, Unresolved::WrongKind { expected, found }));
                continue;
            }
        }
        let (source, target) = (link.source.as_str(), link.target.as_str());
        match link.kind {
            LinkKind::Parent => {
                link_pair(&mut graph.parents, &mut graph.children, source, target);
            }
            LinkKind::UsesParameter => {
                link_pair(&mut graph.uses, &mut graph.consumers, source, target);
            }
            LinkKind::OutputsParameter => {
                link_pair(&mut graph.outputs, &mut graph.producers, source, target);
            }
            LinkKind::ProducedBy => {
                link_pair(&mut graph.outputs, &mut graph.producers, target, source);
            }
            LinkKind::Related => {
                if source != target {
                    insert_edge(&mut graph.related, source, target);
                    insert_edge(&mut graph.related, target, source);
                }
            }
            LinkKind::MutuallyDerived => {
                mutual_claims.insert((source.to_string(), target.to_string()));
            }
            LinkKind::TermReference | LinkKind::SupersededBy => {}
        }
    }
    for (a, b) in &mutual_claims {
        if a < b && mutual_claims.contains(&(b.clone(), a.clone())) {
            graph.mutual_pairs.push((a.clone(), b.clone()));
        }
    }

    let DependencyCycles { forbidden, .. } =
        find_cycles(&graph.dependencies(), &graph.mutual_pairs);
    report.cycles = forbidden;

    if report.is_empty() {
        info!(
            nodes = graph.nodes.len(),
            mutual_pairs = graph.mutual_pairs.len(),
            "derivation graph built"
        );
        Ok(graph)
    } else {
        Err(report)
    }
}

fn unresolved(link: &Link, cause: Unresolved) -> UnresolvedReference {
    UnresolvedReference {
        source: link.source.clone(),
        field: link.field.clone(),
        target: link.target.clone(),
        kind: link.kind,
        cause,
    }
}

fn link_pair(forward: &mut Adjacency, inverse: &mut Adjacency, from: &str, to: &str) {
    insert_edge(forward, from, to);
    insert_edge(inverse, to, from);
}

impl DerivationGraph {
    /// Kind of the node registered under `id`.
    pub fn node_kind(&self, id: &str) -> Option<EntityKind> {
        self.nodes.get(id).copied()
    }

    /// Declared parents of a formula.
    pub fn parents_of(&self, formula: &str) -> Vec<&str> {
        neighbours(&self.parents, formula)
    }

    /// Formulas that list `formula` as a parent.
    pub fn children_of(&self, formula: &str) -> Vec<&str> {
        neighbours(&self.children, formula)
    }

    /// Parameters a formula outputs, from either side of the declaration.
    pub fn outputs_of(&self, formula: &str) -> Vec<&str> {
        neighbours(&self.outputs, formula)
    }

    /// Parameters a formula consumes.
    pub fn uses_of(&self, formula: &str) -> Vec<&str> {
        neighbours(&self.uses, formula)
    }

    /// Formulas that output a parameter.
    pub fn producers_of(&self, parameter: &str) -> Vec<&str> {
        neighbours(&self.producers, parameter)
    }

    /// Formulas that consume a parameter.
    pub fn consumers_of(&self, parameter: &str) -> Vec<&str> {
        neighbours(&self.consumers, parameter)
    }

    /// Symmetrised related formulas.
    pub fn related_of(&self, formula: &str) -> Vec<&str> {
        neighbours(&self.related, formula)
    }

    /// Formula pairs exempt from the cycle check, each ordered `(a, b)` with `a < b`.
    pub fn mutual_pairs(&self) -> &[(String, String)] {
        &self.mutual_pairs
    }

    /// Formula-level dependencies: parents plus producers of used parameters.
    pub fn dependencies(&self) -> Adjacency {
        let mut deps = Adjacency::new();
        for (id, kind) in &self.nodes {
            if *kind != EntityKind::Formula {
                continue;
            }
            let entry = deps.entry(id.clone()).or_default();
            entry.extend(self.parents_of(id).into_iter().map(str::to_string));
            for parameter in self.uses_of(id) {
                entry.extend(self.producers_of(parameter).into_iter().map(str::to_string));
            }
        }
        deps
    }

    /// Every formula the given formula transitively depends on, sorted.
    pub fn ancestors(&self, formula: &str) -> Vec<String> {
        let deps = self.dependencies();
        let mut seen = BTreeSet::new();
        let mut stack = vec![formula.to_string()];
        while let Some(current) = stack.pop() {
            for dep in deps.get(&current).into_iter().flatten() {
                if dep != formula && seen.insert(dep.clone()) {
                    stack.push(dep.clone());
                }
            }
        }
        seen.into_iter().collect()
    }

    /// Formulas ordered so dependencies precede dependents.
    ///
    /// Edges inside a mutually derived pair are ignored; ties break by id.
    pub fn topological_order(&self) -> Vec<String> {
        let exempt: BTreeSet<(&str, &str)> = self
            .mutual_pairs
            .iter()
            .flat_map(|(a, b)| [(a.as_str(), b.as_str()), (b.as_str(), a.as_str())])
            .collect();
        let deps = self.dependencies();
        let mut pending: BTreeMap<&str, BTreeSet<&str>> = deps
            .iter()
            .map(|(id, set)| {
                let kept = set
                    .iter()
                    .map(String::as_str)
                    .filter(|dep| *dep != id.as_str() && !exempt.contains(&(id.as_str(), *dep)))
                    .collect();
                (id.as_str(), kept)
            })
            .collect();
        let mut order = Vec::with_capacity(pending.len());
        loop {
            let ready: Vec<&str> = pending
                .iter()
                .filter(|(_, deps)| deps.is_empty())
                .map(|(id, _)| *id)
                .collect();
            if ready.is_empty() {
                break;
            }
            for id in &ready {
                pending.remove(id);
                order.push((*id).to_string());
            }
            for deps in pending.values_mut() {
                for id in &ready {
                    deps.remove(id);
                }
            }
        }
        // Only reachable on graphs that failed the cycle check.
        order.extend(pending.keys().map(|id| (*id).to_string()));
        order
    }

    /// All resolved edges in deterministic order.
    pub fn edges(&self) -> Vec<GraphEdge> {
        let mut edges = BTreeSet::new();
        let mut push = |adjacency: &Adjacency, kind: EdgeKind| {
            for (from, targets) in adjacency {
                for to in targets {
                    if kind == EdgeKind::Related && from > to {
                        continue;
                    }
                    edges.insert(GraphEdge {
                        from: from.clone(),
                        to: to.clone(),
                        kind,
                    });
                }
            }
        };
        push(&self.outputs, EdgeKind::Outputs);
        push(&self.consumers, EdgeKind::UsedBy);
        push(&self.children, EdgeKind::ParentOf);
        push(&self.related, EdgeKind::Related);
        edges.into_iter().collect()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
