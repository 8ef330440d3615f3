//! Hierarchical namespaces for declarations.
//!
//! - `tree`: namespace arena, `parse`/`ensure`, LCA `join`, placement index
//! - `route`: per-route heuristic and route overrides (`for_route`)
//! - `assign`: folding route candidates into one namespace per declaration
//! - `reduce`: two-phase collapsing of sparse branches

mod assign;
mod reduce;
mod route;
mod tree;

pub use assign::route_usage;
pub use tree::{Namespace, NamespaceId, NamespaceTree};
