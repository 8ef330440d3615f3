//! Placement of declarations into namespaces.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use super::tree::{NamespaceId, NamespaceTree};
use crate::config::NamespaceSettings;
use crate::error::NamingConflict;
use crate::graph::{ExportableType, TypeGraph, TypeId};
use crate::overrides::Overrides;
use crate::spec::ApiSpec;

/// Operation ids whose route subtree reaches each node.
pub fn route_usage(graph: &TypeGraph, spec: &ApiSpec) -> BTreeMap<TypeId, BTreeSet<String>> {
    let operations: BTreeSet<&str> = spec.operations.iter().map(|op| op.id.as_str()).collect();
    graph.collect(|path, prior: Option<&BTreeSet<String>>, _| {
        let mut routes = prior.cloned().unwrap_or_default();
        if let Some(step) = path.get(1)
            && operations.contains(step.key.as_str())
        {
            routes.insert(step.key.clone());
        }
        routes
    })
}

impl NamespaceTree {
    /// Place every live declaration of `graph` and return how many were placed.
    pub fn assign(
        &mut self,
        graph: &TypeGraph,
        spec: &ApiSpec,
        overrides: &Overrides,
        settings: &NamespaceSettings,
    ) -> usize {
        let usage = route_usage(graph, spec);
        let routes: BTreeMap<&str, (NamespaceId, bool)> = spec
            .operations
            .iter()
            .map(|op| (op.id.as_str(), self.for_route(op, overrides, settings)))
            .collect();

        let mut placed = 0;
        for node in graph.declarations() {
            let used_by = usage.get(&node.id).cloned().unwrap_or_default();
            let (namespace, reason) = self.choose(node, &used_by, &routes, overrides);
            self.push_log(
                namespace,
                format!("placed {} ({}) via {reason}", node.label(), node.kind.label()),
            );
            self.place(node.id, namespace);
            placed += 1;
        }
        debug!(placed, namespaces = self.iter().count(), "Namespaces assigned.");
        placed
    }

    fn choose(
        &mut self,
        node: &ExportableType,
        used_by: &BTreeSet<String>,
        routes: &BTreeMap<&str, (NamespaceId, bool)>,
        overrides: &Overrides,
    ) -> (NamespaceId, String) {
        let type_overrides: Vec<NamespaceId> = node
            .titles
            .iter()
            .filter_map(|title| overrides.type_namespace(title))
            .map(|path| self.parse(path))
            .collect();
        if !type_overrides.is_empty() {
            let namespace = self.resolve_explicit(node, &type_overrides);
            return (namespace, "type override".to_string());
        }

        let candidates: Vec<(NamespaceId, bool)> = used_by
            .iter()
            .filter_map(|route| routes.get(route.as_str()).copied())
            .collect();
        let explicit: Vec<NamespaceId> = candidates
            .iter()
            .filter(|(_, explicit)| *explicit)
            .map(|(namespace, _)| *namespace)
            .collect();
        let route_list = used_by.iter().cloned().collect::<Vec<_>>().join(", ");

        if !explicit.is_empty() {
            let namespace = self.resolve_explicit(node, &explicit);
            return (namespace, format!("route override [{route_list}]"));
        }
        match candidates.split_first() {
            None => (self.root(), "no route".to_string()),
            Some(((first, _), rest)) => {
                let namespace = rest
                    .iter()
                    .fold(*first, |joined, (candidate, _)| self.join(joined, *candidate));
                (namespace, format!("routes [{route_list}]"))
            }
        }
    }

    /// One explicit claim is used as is; disagreeing claims are joined and logged.
    fn resolve_explicit(&mut self, node: &ExportableType, claims: &[NamespaceId]) -> NamespaceId {
        let mut distinct: Vec<NamespaceId> = Vec::new();
        for claim in claims {
            if !distinct.contains(claim) {
                distinct.push(*claim);
            }
        }
        let Some((first, rest)) = distinct.split_first() else {
            return self.root();
        };
        let joined = rest
            .iter()
            .fold(*first, |joined, claim| self.join(joined, *claim));
        if !rest.is_empty() {
            let conflict = NamingConflict {
                subject: node.label(),
                claims: distinct.iter().map(|ns| self.full_name(*ns)).collect(),
                resolution: self.full_name(joined),
            };
            warn!(%conflict, "Conflicting explicit namespaces.");
            self.push_log(joined, conflict.to_string());
        }
        joined
    }
}
