//! Maximal reuse: unify structurally identical nodes.
//!
//! Two nodes are identical when kind signature, ordered member keys, member
//! optionality and list depth, and (post-merge) dependency ids all match.
//! Titles, descriptions and numeric ranges never block a merge.

use std::collections::HashMap;

use tracing::{debug, trace};

use super::node::{NodeState, TypeId};
use super::TypeGraph;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StructuralKey {
    kind: String,
    members: Vec<(String, bool, u8, TypeId)>,
}

impl TypeGraph {
    /// Merge duplicates until a pass finds none. Returns the number of merges.
    ///
    /// Nodes are allocated bottom-up, so a single pass normally reaches the
    /// fixed point; the loop only matters for graphs with deferred references.
    pub fn build_maximal_reuse_graph(&mut self) -> usize {
        let mut total = 0;
        let mut passes = 0;
        loop {
            let merged = self.reuse_pass();
            passes += 1;
            total += merged;
            if merged == 0 {
                break;
            }
        }
        debug!(merged = total, passes, "Maximal reuse reached a fixed point.");
        total
    }

    fn reuse_pass(&mut self) -> usize {
        let mut seen: HashMap<StructuralKey, TypeId> = HashMap::new();
        let mut merged = 0;
        for index in 0..self.nodes.len() {
            let id = TypeId(index as u32);
            let node = self.node(id);
            if !node.is_live() || node.pinned {
                continue;
            }
            let key = self.structural_key(id);
            match seen.get(&key) {
                Some(&survivor) => {
                    self.merge(survivor, id);
                    merged += 1;
                }
                None => {
                    seen.insert(key, id);
                }
            }
        }
        merged
    }

    fn structural_key(&self, id: TypeId) -> StructuralKey {
        let node = self.node(id);
        StructuralKey {
            kind: node.kind.signature(),
            members: node
                .members
                .iter()
                .map(|m| (m.key.clone(), m.required, m.list, self.resolve(m.ty)))
                .collect(),
        }
    }

    /// Absorb `duplicate` into `survivor` and mark it dead.
    fn merge(&mut self, survivor: TypeId, duplicate: TypeId) {
        let dependents = std::mem::take(&mut self.node_mut(duplicate).dependents);
        for (key, parent) in dependents {
            for member in &mut self.node_mut(parent).members {
                if member.ty == duplicate && member.key == key {
                    member.ty = survivor;
                }
            }
            self.node_mut(survivor).dependents.push((key, parent));
        }

        let members = std::mem::take(&mut self.node_mut(duplicate).members);
        for member in &members {
            self.node_mut(member.ty)
                .dependents
                .retain(|(key, parent)| !(*parent == duplicate && *key == member.key));
        }

        let titles = std::mem::take(&mut self.node_mut(duplicate).titles);
        let description = self.node_mut(duplicate).description.take();
        let target = self.node_mut(survivor);
        for title in titles {
            target.add_title(title);
        }
        target.absorb_description(description);
        for (kept, absorbed) in target.members.iter_mut().zip(members) {
            kept.absorb(absorbed);
        }

        self.node_mut(duplicate).state = NodeState::Dead {
            merged_into: survivor,
        };
        trace!(survivor = %survivor, duplicate = %duplicate, "Merged duplicate node.");
    }
}
