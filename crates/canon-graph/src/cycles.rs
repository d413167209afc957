//! Cycle detection over formula-level dependencies.
//!
//! Components are found with a depth-first strongly-connected-component
//! search so that a cycle sharing nodes with an exempt pair is still caught.
//! A component is exempt only when it holds exactly two formulas that
//! declare each other `mutually_derived`.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::CycleReport;
use crate::graph::Adjacency;

/// Cycles found in the dependency graph, split by exemption.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyCycles {
    pub forbidden: Vec<CycleReport>,
    /// Mutually derived pairs that do form a cycle.
    pub exempt: Vec<(String, String)>,
}

struct Search<'a> {
    deps: &'a Adjacency,
    next_index: usize,
    index: BTreeMap<&'a str, usize>,
    lowlink: BTreeMap<&'a str, usize>,
    on_stack: BTreeSet<&'a str>,
    stack: Vec<&'a str>,
    components: Vec<Vec<&'a str>>,
}

impl<'a> Search<'a> {
    fn visit(&mut self, node: &'a str) {
        self.index.insert(node, self.next_index);
        self.lowlink.insert(node, self.next_index);
        self.next_index += 1;
        self.stack.push(node);
        self.on_stack.insert(node);

        let deps = self.deps;
        for dep in deps.get(node).into_iter().flatten() {
            let dep = dep.as_str();
            if !self.index.contains_key(dep) {
                self.visit(dep);
                let low = self.lowlink[node].min(self.lowlink[dep]);
                self.lowlink.insert(node, low);
            } else if self.on_stack.contains(dep) {
                let low = self.lowlink[node].min(self.index[dep]);
                self.lowlink.insert(node, low);
            }
        }

        if self.lowlink[node] == self.index[node] {
            let mut component = Vec::new();
            while let Some(member) = self.stack.pop() {
                self.on_stack.remove(member);
                component.push(member);
                if member == node {
                    break;
                }
            }
            component.sort_unstable();
            self.components.push(component);
        }
    }
}

/// Finds every dependency cycle and classifies it against the exempt pairs.
pub fn find_cycles(deps: &Adjacency, mutual_pairs: &[(String, String)]) -> DependencyCycles {
    let mut search = Search {
        deps,
        next_index: 0,
        index: BTreeMap::new(),
        lowlink: BTreeMap::new(),
        on_stack: BTreeSet::new(),
        stack: Vec::new(),
        components: Vec::new(),
    };
    for node in deps.keys() {
        if !search.index.contains_key(node.as_str()) {
            search.visit(node);
        }
    }

    let mut cycles = DependencyCycles::default();
    let mut components = search.components;
    components.sort();
    for component in components {
        let self_loop = component.len() == 1
            && deps
                .get(component[0])
                .is_some_and(|set| set.contains(component[0]));
        if component.len() < 2 && !self_loop {
            continue;
        }
        if component.len() == 2 {
            let pair = (component[0].to_string(), component[1].to_string());
            if mutual_pairs.contains(&pair) {
                cycles.exempt.push(pair);
                continue;
            }
        }
        let members: BTreeSet<&str> = component.iter().copied().collect();
        cycles.forbidden.push(CycleReport {
            formulas: component.iter().map(|id| id.to_string()).collect(),
            path: trace_path(component[0], &members, deps),
        });
    }
    cycles
}

/// Follows dependencies inside one component until the start node recurs.
fn trace_path(start: &str, members: &BTreeSet<&str>, deps: &Adjacency) -> Vec<String> {
    let mut path = vec![start.to_string()];
    let mut visited = BTreeSet::from([start]);
    let mut frontier: Vec<(&str, Vec<&str>)> = vec![(start, next_in(start, members, deps))];
    while let Some((_, candidates)) = frontier.last_mut() {
        let Some(next) = candidates.pop() else {
            frontier.pop();
            path.pop();
            continue;
        };
        if next == start {
            path.push(start.to_string());
            return path;
        }
        if visited.insert(next) {
            path.push(next.to_string());
            frontier.push((next, next_in(next, members, deps)));
        }
    }
    vec![start.to_string()]
}

fn next_in<'a>(node: &str, members: &BTreeSet<&str>, deps: &'a Adjacency) -> Vec<&'a str> {
    let mut next: Vec<&'a str> = deps
        .get(node)
        .into_iter()
        .flatten()
        .map(String::as_str)
        .filter(|dep| members.contains(dep))
        .collect();
    // popped from the back, so the smallest id is tried first
    next.reverse();
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adjacency(edges: &[(&str, &str)]) -> Adjacency {
        let mut deps = Adjacency::new();
        for (from, to) in edges {
            deps.entry(from.to_string())
                .or_default()
                .insert(to.to_string());
            deps.entry(to.to_string()).or_default();
        }
        deps
    }

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let deps = adjacency(&[("c", "b"), ("b", "a")]);
        assert_eq!(find_cycles(&deps, &[]), DependencyCycles::default());
    }

    #[test]
    fn mutual_pair_is_exempt_only_when_declared() {
        let deps = adjacency(&[("a", "b"), ("b", "a")]);
        let declared = vec![("a".to_string(), "b".to_string())];
        let cycles = find_cycles(&deps, &declared);
        assert!(cycles.forbidden.is_empty());
        assert_eq!(cycles.exempt, declared);

        let cycles = find_cycles(&deps, &[]);
        assert_eq!(cycles.forbidden.len(), 1);
        assert_eq!(cycles.forbidden[0].path, vec!["a", "b", "a"]);
    }

    #[test]
    fn third_formula_breaks_the_exemption() {
        let deps = adjacency(&[("a", "b"), ("b", "a"), ("a", "c"), ("c", "b")]);
        let declared = vec![("a".to_string(), "b".to_string())];
        let cycles = find_cycles(&deps, &declared);
        assert_eq!(cycles.forbidden.len(), 1);
        assert_eq!(cycles.forbidden[0].formulas, vec!["a", "b", "c"]);
    }

    #[test]
    fn self_loop_is_forbidden() {
        let deps = adjacency(&[("a", "a")]);
        let cycles = find_cycles(&deps, &[]);
        assert_eq!(cycles.forbidden[0].path, vec!["a", "a"]);
    }
}
