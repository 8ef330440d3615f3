//! Namespace arena.

use std::collections::BTreeMap;

use crate::graph::TypeId;

/// Stable arena index of a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NamespaceId(pub u32);

impl NamespaceId {
    /// Position in the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One bucket in the output hierarchy.
#[derive(Debug, Clone)]
pub struct Namespace {
    /// Arena index of this namespace.
    pub id: NamespaceId,
    /// Lower-cased path segment; empty for the root.
    pub name: String,
    /// `None` only for the root.
    pub parent: Option<NamespaceId>,
    /// Attached children by segment name.
    pub children: BTreeMap<String, NamespaceId>,
    /// Declarations placed here, in placement order.
    pub members: Vec<TypeId>,
    /// Trace of placements, collapses and conflicts.
    pub log: Vec<String>,
    /// Folded into another namespace by reduction.
    pub detached: bool,
}

/// Single-rooted namespace tree plus the type -> namespace index.
#[derive(Debug, Clone)]
pub struct NamespaceTree {
    namespaces: Vec<Namespace>,
    placements: BTreeMap<TypeId, NamespaceId>,
}

impl Default for NamespaceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceTree {
    /// A tree holding only the unnamed root.
    pub fn new() -> Self {
        Self {
            namespaces: vec![Namespace {
                id: NamespaceId(0),
                name: String::new(),
                parent: None,
                children: BTreeMap::new(),
                members: Vec::new(),
                log: Vec::new(),
                detached: false,
            }],
            placements: BTreeMap::new(),
        }
    }

    /// The unnamed root.
    pub fn root(&self) -> NamespaceId {
        NamespaceId(0)
    }

    /// Look up a namespace, detached ones included.
    pub fn get(&self, id: NamespaceId) -> &Namespace {
        &self.namespaces[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: NamespaceId) -> &mut Namespace {
        &mut self.namespaces[id.index()]
    }

    /// Child `segment` of `parent`, created if missing.
    pub fn ensure(&mut self, parent: NamespaceId, segment: &str) -> NamespaceId {
        let segment = segment.to_ascii_lowercase();
        if let Some(child) = self.get(parent).children.get(&segment) {
            return *child;
        }
        let id = NamespaceId(self.namespaces.len() as u32);
        self.namespaces.push(Namespace {
            id,
            name: segment.clone(),
            parent: Some(parent),
            children: BTreeMap::new(),
            members: Vec::new(),
            log: Vec::new(),
            detached: false,
        });
        self.get_mut(parent).children.insert(segment, id);
        id
    }

    /// Walk (creating as needed) a dotted path from the root.
    pub fn parse(&mut self, path: &str) -> NamespaceId {
        path.split('.')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .fold(self.root(), |parent, segment| self.ensure(parent, segment))
    }

    /// Existing namespace at a dotted path, without creating anything.
    pub fn find(&self, path: &str) -> Option<NamespaceId> {
        path.split('.')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .try_fold(self.root(), |parent, segment| {
                self.get(parent)
                    .children
                    .get(&segment.to_ascii_lowercase())
                    .copied()
            })
    }

    /// Chain from the root down to `id`, both included.
    pub fn ancestors(&self, id: NamespaceId) -> Vec<NamespaceId> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.get(current).parent {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }

    /// Dot-joined segment chain, excluding the root.
    pub fn full_name(&self, id: NamespaceId) -> String {
        self.ancestors(id)
            .into_iter()
            .skip(1)
            .map(|ns| self.get(ns).name.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Segment names along the chain, excluding the root.
    pub fn segments(&self, id: NamespaceId) -> Vec<&str> {
        self.ancestors(id)
            .into_iter()
            .skip(1)
            .map(|ns| self.get(ns).name.as_str())
            .collect()
    }

    /// Deepest common ancestor of `a` and `b`.
    pub fn join(&self, a: NamespaceId, b: NamespaceId) -> NamespaceId {
        let b_chain = self.ancestors(b);
        let mut current = Some(a);
        while let Some(id) = current {
            if b_chain.contains(&id) {
                return id;
            }
            current = self.get(id).parent;
        }
        self.root()
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor(&self, ancestor: NamespaceId, id: NamespaceId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }

    /// Attached namespaces in depth-first, name order.
    pub fn iter(&self) -> impl Iterator<Item = &Namespace> {
        let mut order = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.get(id).children.values().rev().copied());
        }
        order.into_iter().map(|id| self.get(id))
    }

    /// Record `ty` as a member of `namespace`.
    pub(crate) fn place(&mut self, ty: TypeId, namespace: NamespaceId) {
        if let Some(previous) = self.placements.insert(ty, namespace) {
            self.get_mut(previous).members.retain(|member| *member != ty);
        }
        self.get_mut(namespace).members.push(ty);
    }

    /// Namespace currently holding `ty`.
    pub fn namespace_of(&self, ty: TypeId) -> Option<NamespaceId> {
        self.placements.get(&ty).copied()
    }

    /// Every placement, by type id.
    pub fn placements(&self) -> &BTreeMap<TypeId, NamespaceId> {
        &self.placements
    }

    pub(crate) fn push_log(&mut self, id: NamespaceId, line: impl Into<String>) {
        self.get_mut(id).log.push(line.into());
    }

    /// Move members, log and children of `source` into `target` and detach
    /// `source`. Children with the same segment name are merged recursively.
    pub(crate) fn merge_into(&mut self, target: NamespaceId, source: NamespaceId) {
        let members = std::mem::take(&mut self.get_mut(source).members);
        for ty in &members {
            self.placements.insert(*ty, target);
        }
        self.get_mut(target).members.extend(members);

        let log = std::mem::take(&mut self.get_mut(source).log);
        self.get_mut(target).log.extend(log);

        let children = std::mem::take(&mut self.get_mut(source).children);
        for (segment, child) in children {
            let existing = self.get(target).children.get(&segment).copied();
            match existing {
                Some(existing) if existing != child => self.merge_into(existing, child),
                _ => {
                    self.get_mut(child).parent = Some(target);
                    self.get_mut(target).children.insert(segment, child);
                }
            }
        }

        let name = self.get(source).name.clone();
        if let Some(parent) = self.get(source).parent {
            let parent = self.get_mut(parent);
            if parent.children.get(&name) == Some(&source) {
                parent.children.remove(&name);
            }
        }
        let source = self.get_mut(source);
        source.parent = None;
        source.detached = true;
    }
}
