//! Bottom-up traversal tolerant of shared dependencies and cycles.
//!
//! The walk uses an explicit frame stack instead of recursion. A node reached
//! through several distinct paths is visited once per path so visitors can
//! aggregate path-sensitive facts (e.g. which routes use a type). A node that
//! is already active on the current path is a cycle: it is not descended
//! again, and its previous result (if any) stands in for it.

use std::collections::BTreeMap;

use super::node::TypeId;
use super::TypeGraph;

/// One step of the path from the root to the node being visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    /// Node at this step.
    pub node: TypeId,
    /// Member key on the parent; empty for the root.
    pub key: String,
}

#[derive(Debug)]
struct Frame<T> {
    node: TypeId,
    next: usize,
    deps: BTreeMap<TypeId, T>,
}

impl<T> Frame<T> {
    fn new(node: TypeId) -> Self {
        Self {
            node,
            next: 0,
            deps: BTreeMap::new(),
        }
    }
}

impl TypeGraph {
    /// Visit every path bottom-up and return the root's result.
    ///
    /// The visitor receives the path from the root to the current node, the
    /// result previously computed for this node (`None` on first encounter)
    /// and the results of its direct dependencies on the current path.
    pub fn visit<T, F>(&self, visitor: F) -> T
    where
        T: Clone,
        F: FnMut(&[PathStep], Option<&T>, &BTreeMap<TypeId, T>) -> T,
    {
        let (root, _) = self.walk(visitor);
        root
    }

    /// Like [`TypeGraph::visit`] but return the last result of every reached node.
    pub fn collect<T, F>(&self, visitor: F) -> BTreeMap<TypeId, T>
    where
        T: Clone,
        F: FnMut(&[PathStep], Option<&T>, &BTreeMap<TypeId, T>) -> T,
    {
        let (_, results) = self.walk(visitor);
        results
    }

    fn walk<T, F>(&self, mut visitor: F) -> (T, BTreeMap<TypeId, T>)
    where
        T: Clone,
        F: FnMut(&[PathStep], Option<&T>, &BTreeMap<TypeId, T>) -> T,
    {
        let root = self.root();
        let mut results: BTreeMap<TypeId, T> = BTreeMap::new();
        let mut active = vec![false; self.len()];
        let mut path = vec![PathStep {
            node: root,
            key: String::new(),
        }];
        let mut root_frame = Frame::new(root);
        let mut frames: Vec<Frame<T>> = Vec::new();
        active[root.index()] = true;

        loop {
            let frame = frames.last_mut().unwrap_or(&mut root_frame);
            let members = &self.node(frame.node).members;
            if let Some(member) = members.get(frame.next) {
                frame.next += 1;
                let child = self.resolve(member.ty);
                if active[child.index()] {
                    if let Some(prior) = results.get(&child) {
                        frame.deps.insert(child, prior.clone());
                    }
                    continue;
                }
                active[child.index()] = true;
                path.push(PathStep {
                    node: child,
                    key: member.key.clone(),
                });
                frames.push(Frame::new(child));
                continue;
            }

            // Every member of the top frame is done.
            let Some(done) = frames.pop() else {
                let result = visitor(&path, results.get(&root), &root_frame.deps);
                results.insert(root, result.clone());
                return (result, results);
            };
            let result = visitor(&path, results.get(&done.node), &done.deps);
            active[done.node.index()] = false;
            path.pop();
            frames
                .last_mut()
                .unwrap_or(&mut root_frame)
                .deps
                .insert(done.node, result.clone());
            results.insert(done.node, result);
        }
    }
}
