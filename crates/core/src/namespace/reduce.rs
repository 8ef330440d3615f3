//! Two-phase collapsing of sparse branches.

use std::collections::BTreeSet;

use tracing::debug;

use super::tree::{NamespaceId, NamespaceTree};
use crate::graph::TypeGraph;

impl NamespaceTree {
    /// Members of `id` that count as declared types.
    pub fn declared_count(&self, graph: &TypeGraph, id: NamespaceId) -> usize {
        self.get(id)
            .members
            .iter()
            .filter(|ty| graph.node(**ty).kind.counts_as_declared())
            .count()
    }

    /// Collapse sparse namespaces bottom-up and return how many were detached.
    ///
    /// For each namespace, after its children were reduced:
    /// 1. a child is absorbed when its full name is in `collapse`, or when it is
    ///    a leaf with fewer than `min_types` declared types;
    /// 2. if the namespace itself still has fewer than `min_types` declared
    ///    types and at most `min_siblings` children, none of which has children
    ///    of its own, those children are absorbed as well.
    pub fn reduce(
        &mut self,
        graph: &TypeGraph,
        collapse: &BTreeSet<String>,
        min_types: usize,
        min_siblings: usize,
    ) -> usize {
        let root = self.root();
        let collapsed = self.reduce_at(root, graph, collapse, min_types, min_siblings);
        debug!(collapsed, remaining = self.iter().count(), "Namespaces reduced.");
        collapsed
    }

    fn reduce_at(
        &mut self,
        id: NamespaceId,
        graph: &TypeGraph,
        collapse: &BTreeSet<String>,
        min_types: usize,
        min_siblings: usize,
    ) -> usize {
        let mut collapsed = 0;
        let children: Vec<NamespaceId> = self.get(id).children.values().copied().collect();
        for child in &children {
            collapsed += self.reduce_at(*child, graph, collapse, min_types, min_siblings);
        }

        for child in children {
            if self.get(child).detached {
                continue;
            }
            let declared = self.declared_count(graph, child);
            let reason = if collapse.contains(&self.full_name(child)) {
                Some("collapse list".to_string())
            } else if self.get(child).children.is_empty() && declared < min_types {
                Some(format!("{declared} declared type(s) below {min_types}"))
            } else {
                None
            };
            if let Some(reason) = reason {
                self.collapse(id, child, &reason);
                collapsed += 1;
            }
        }

        let remaining: Vec<NamespaceId> = self.get(id).children.values().copied().collect();
        let sparse = !remaining.is_empty()
            && remaining.len() <= min_siblings
            && self.declared_count(graph, id) < min_types
            && remaining
                .iter()
                .all(|child| self.get(*child).children.is_empty());
        if sparse {
            for child in remaining {
                self.collapse(id, child, "sparse parent");
                collapsed += 1;
            }
        }
        collapsed
    }

    fn collapse(&mut self, parent: NamespaceId, child: NamespaceId, reason: &str) {
        let full_name = self.full_name(child);
        let members = self.get(child).members.len();
        self.merge_into(parent, child);
        self.push_log(
            parent,
            format!("collapsed {full_name} ({reason}), {members} member(s)"),
        );
        debug!(namespace = %full_name, into = %self.full_name(parent), reason, "Namespace collapsed.");
    }
}
