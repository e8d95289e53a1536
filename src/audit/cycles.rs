//! Namespace-level cycle detection.
//!
//! The dependency graph is a derived, disposable view over the record set:
//! built for one audit run, discarded afterwards. The search is an
//! iterative DFS with an explicit stack and owned visited/on-stack sets,
//! reporting at most one cycle per DFS tree.

use crate::model::{AuditRule, TypeRecord, Violation};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, BTreeSet, HashSet};

pub(crate) fn detect_cycles(
    types: &BTreeMap<String, TypeRecord>,
    rule: &AuditRule,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    // Degenerate case: a type depending on itself.
    for (name, record) in types {
        if record.dependencies.contains(name) {
            violations.push(
                Violation::new(
                    rule,
                    format!("Cyclic dependency detected: {name} -> {name}"),
                    name,
                    &record.file_path,
                )
                .suggest("Refactor to break the self-reference"),
            );
        }
    }

    let graph = NamespaceGraph::build(types);
    for cycle in graph.cycles() {
        violations.push(
            Violation::new(
                rule,
                format!("Cyclic dependency detected: {}", cycle.join(" -> ")),
                cycle[0].clone(),
                "Multiple files",
            )
            .suggest("Break the cycle by extracting shared types or introducing interfaces"),
        );
    }

    violations
}

struct NamespaceGraph {
    graph: DiGraph<String, ()>,
}

impl NamespaceGraph {
    /// Edges run source-namespace to dependency-namespace; an edge is only
    /// added when both endpoints resolve through the registry and the
    /// namespaces differ.
    fn build(types: &BTreeMap<String, TypeRecord>) -> Self {
        let mut edges: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for record in types.values() {
            for dependency in &record.dependencies {
                if let Some(target) = types.get(dependency) {
                    if target.namespace != record.namespace {
                        edges
                            .entry(record.namespace.clone())
                            .or_default()
                            .insert(target.namespace.clone());
                    }
                }
            }
        }

        let mut graph = DiGraph::new();
        let mut indices: BTreeMap<String, NodeIndex> = BTreeMap::new();
        for (source, targets) in &edges {
            for namespace in std::iter::once(source).chain(targets.iter()) {
                if !indices.contains_key(namespace) {
                    let index = graph.add_node(namespace.clone());
                    indices.insert(namespace.clone(), index);
                }
            }
        }
        for (source, targets) in &edges {
            for target in targets {
                graph.add_edge(indices[source], indices[target], ());
            }
        }

        Self { graph }
    }

    fn cycles(&self) -> Vec<Vec<String>> {
        let mut cycles = Vec::new();
        let mut visited: HashSet<NodeIndex> = HashSet::new();

        let mut roots: Vec<NodeIndex> = self.graph.node_indices().collect();
        roots.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));

        for root in roots {
            if visited.contains(&root) {
                continue;
            }
            if let Some(cycle) = self.find_cycle_from(root, &mut visited) {
                cycles.push(cycle.into_iter().map(|i| self.graph[i].clone()).collect());
            }
        }

        cycles
    }

    /// Depth-first search from `root` with an explicit frame stack.
    /// Returns the first back-edge cycle found, as the path from the
    /// re-entered node back to itself.
    fn find_cycle_from(
        &self,
        root: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
    ) -> Option<Vec<NodeIndex>> {
        let mut stack: Vec<(NodeIndex, Vec<NodeIndex>, usize)> = Vec::new();
        let mut on_stack: HashSet<NodeIndex> = HashSet::new();
        let mut path: Vec<NodeIndex> = Vec::new();

        visited.insert(root);
        on_stack.insert(root);
        path.push(root);
        stack.push((root, self.sorted_neighbors(root), 0));

        loop {
            let next = {
                let Some(frame) = stack.last_mut() else {
                    break;
                };
                if frame.2 < frame.1.len() {
                    let next = frame.1[frame.2];
                    frame.2 += 1;
                    Some(next)
                } else {
                    None
                }
            };

            match next {
                Some(next) if !visited.contains(&next) => {
                    visited.insert(next);
                    on_stack.insert(next);
                    path.push(next);
                    let neighbors = self.sorted_neighbors(next);
                    stack.push((next, neighbors, 0));
                }
                Some(next) if on_stack.contains(&next) => {
                    let start = path.iter().position(|n| *n == next).unwrap_or(0);
                    let mut cycle = path[start..].to_vec();
                    cycle.push(next);
                    return Some(cycle);
                }
                Some(_) => {}
                None => {
                    if let Some((node, _, _)) = stack.pop() {
                        on_stack.remove(&node);
                        path.pop();
                    }
                }
            }
        }

        None
    }

    fn sorted_neighbors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors(node).collect();
        neighbors.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
        neighbors.dedup();
        neighbors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::rules;
    use crate::model::TypeKind;

    fn rule() -> AuditRule {
        crate::audit::rules::default_rules()
            .into_iter()
            .find(|r| r.id == rules::NO_CYCLIC_DEPENDENCIES)
            .unwrap()
    }

    fn record_with_dep(name: &str, namespace: &str, dep: &str) -> TypeRecord {
        let mut record = TypeRecord::new(name, namespace, format!("{name}.cs"), TypeKind::Class);
        record.dependencies.insert(dep.to_string());
        record
    }

    fn registry(records: Vec<TypeRecord>) -> BTreeMap<String, TypeRecord> {
        records
            .into_iter()
            .map(|r| (r.name.clone(), r))
            .collect()
    }

    #[test]
    fn test_three_namespace_cycle_yields_one_violation() {
        let types = registry(vec![
            record_with_dep("AType", "A", "BType"),
            record_with_dep("BType", "B", "CType"),
            record_with_dep("CType", "C", "AType"),
        ]);

        let violations = detect_cycles(&types, &rule());
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("A"));
        assert!(violations[0].message.contains("->"));
    }

    #[test]
    fn test_acyclic_chain_yields_nothing() {
        let types = registry(vec![
            record_with_dep("AType", "A", "BType"),
            record_with_dep("BType", "B", "CType"),
            TypeRecord::new("CType", "C", "CType.cs", TypeKind::Class),
        ]);

        assert!(detect_cycles(&types, &rule()).is_empty());
    }

    #[test]
    fn test_self_dependency_detected() {
        let types = registry(vec![record_with_dep("Looper", "A", "Looper")]);

        let violations = detect_cycles(&types, &rule());
        assert!(!violations.is_empty());
        assert!(violations[0].message.contains("Looper -> Looper"));
    }

    #[test]
    fn test_two_namespace_cycle_path_reported() {
        let types = registry(vec![
            record_with_dep("AType", "A", "BType"),
            record_with_dep("BType", "B", "AType"),
        ]);

        let violations = detect_cycles(&types, &rule());
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "Cyclic dependency detected: A -> B -> A"
        );
    }
}
