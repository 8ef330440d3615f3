//! Type graph: an arena of [`ExportableType`] nodes rooted at a synthetic root.
//!
//! - `node`: node, kind and member types
//! - `builder`: bottom-up construction from the API description
//! - `reuse`: structural deduplication (maximal reuse)
//! - `visit`: path-sensitive, cycle-tolerant bottom-up traversal

mod builder;
mod node;
mod reuse;
mod visit;

pub use builder::{DEFINITION_KEY_PREFIX, GraphBuilder, SchemaShape, build_graph};
pub use node::{
    EnumBody, ExportableType, Member, NodeState, NumericRange, Primitive, PrimitiveType,
    ResolvedName, TypeId, TypeKind,
};
pub use visit::PathStep;

use std::collections::{BTreeSet, HashMap};

use crate::error::NamingConflict;

/// Arena of type nodes.
#[derive(Debug, Clone)]
pub struct TypeGraph {
    nodes: Vec<ExportableType>,
    root: TypeId,
    primitives: HashMap<Primitive, TypeId>,
}

impl Default for TypeGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeGraph {
    /// Create a graph holding only the synthetic root.
    pub fn new() -> Self {
        let root = TypeId(0);
        let mut node = ExportableType::new(root, TypeKind::ObjectLiteral);
        node.pinned = true;
        Self {
            nodes: vec![node],
            root,
            primitives: HashMap::new(),
        }
    }

    /// The synthetic root holding one member per route and definition.
    pub fn root(&self) -> TypeId {
        self.root
    }

    /// Number of allocated nodes, dead ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when only the root exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Look up a node. Ids are only ever minted by this arena.
    pub fn node(&self, id: TypeId) -> &ExportableType {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: TypeId) -> &mut ExportableType {
        &mut self.nodes[id.index()]
    }

    /// All nodes, dead ones included, in allocation order.
    pub fn nodes(&self) -> impl Iterator<Item = &ExportableType> {
        self.nodes.iter()
    }

    /// Live nodes in allocation order.
    pub fn live_nodes(&self) -> impl Iterator<Item = &ExportableType> {
        self.nodes.iter().filter(|node| node.is_live())
    }

    /// Live, unpinned declarations in allocation order.
    pub fn declarations(&self) -> impl Iterator<Item = &ExportableType> {
        self.nodes.iter().filter(|node| node.is_declaration())
    }

    /// Follow merge redirects to the surviving node.
    pub fn resolve(&self, mut id: TypeId) -> TypeId {
        while let NodeState::Dead { merged_into } = self.node(id).state {
            id = merged_into;
        }
        id
    }

    pub(crate) fn alloc(&mut self, kind: TypeKind, title: Option<&str>) -> TypeId {
        let id = TypeId(self.nodes.len() as u32);
        let mut node = ExportableType::new(id, kind);
        if let Some(title) = title {
            node.add_title(title);
        }
        self.nodes.push(node);
        id
    }

    /// Shared node for a primitive; allocated on first use only.
    pub(crate) fn intern_primitive(&mut self, primitive: Primitive) -> TypeId {
        if let Some(id) = self.primitives.get(&primitive) {
            return *id;
        }
        let id = self.alloc(TypeKind::Primitive(primitive.clone()), None);
        self.primitives.insert(primitive, id);
        id
    }

    /// Append a member and its back-edge.
    pub(crate) fn add_member(&mut self, parent: TypeId, member: Member) {
        let child = member.ty;
        let key = member.key.clone();
        self.node_mut(parent).members.push(member);
        self.node_mut(child).dependents.push((key, parent));
    }

    /// Set the final name of a node.
    ///
    /// Explicit names are sticky: a later non-explicit rename is ignored, and a
    /// different explicit rename is reported as a conflict and not applied.
    pub fn rename_type(
        &mut self,
        id: TypeId,
        name: &str,
        explicit: bool,
    ) -> Result<(), NamingConflict> {
        let node = self.node_mut(id);
        if let Some(current) = &node.resolved_name
            && current.explicit
        {
            if !explicit || current.name == name {
                return Ok(());
            }
            return Err(NamingConflict {
                subject: node.label(),
                claims: vec![current.name.clone(), name.to_string()],
                resolution: current.name.clone(),
            });
        }
        node.resolved_name = Some(ResolvedName {
            name: name.to_string(),
            explicit,
        });
        Ok(())
    }

    /// Nodes reachable from the root.
    pub fn reachable(&self) -> BTreeSet<TypeId> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            stack.extend(self.node(id).members.iter().map(|member| member.ty));
        }
        seen
    }

    /// Verify that every dependency edge has exactly one matching back-edge and
    /// that no dead node is reachable.
    pub fn check_invariants(&self) -> Result<(), String> {
        for node in self.live_nodes() {
            for member in &node.members {
                let forward = node
                    .members
                    .iter()
                    .filter(|m| m.ty == member.ty && m.key == member.key)
                    .count();
                let backward = self
                    .node(member.ty)
                    .dependents
                    .iter()
                    .filter(|(key, parent)| *parent == node.id && *key == member.key)
                    .count();
                if forward != backward {
                    return Err(format!(
                        "edge {} -[{}]-> {} has {backward} back-edge(s), expected {forward}",
                        node.id, member.key, member.ty
                    ));
                }
            }
            for (key, parent) in &node.dependents {
                let parent_node = self.node(*parent);
                if !parent_node.is_live()
                    || !parent_node
                        .members
                        .iter()
                        .any(|m| m.ty == node.id && &m.key == key)
                {
                    return Err(format!(
                        "back-edge {} <-[{key}]- {parent} has no forward edge",
                        node.id
                    ));
                }
            }
        }
        for id in self.reachable() {
            if !self.node(id).is_live() {
                return Err(format!("dead node {id} is reachable from the root"));
            }
        }
        Ok(())
    }
}
