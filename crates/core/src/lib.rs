//! Type graph and namespace planner for ESI client generation.
//!
//! The pipeline is:
//! 1. Load: override tables ([`Overrides`]) and the parsed API description ([`ApiSpec`])
//! 2. Build: per-operation schemas -> maximal-reuse [`TypeGraph`]
//! 3. Place: every declaration -> a [`NamespaceTree`] bucket, then reduce sparse branches
//! 4. Name: one display name per declaration via the [`TypeNamer`]
//!
//! The finished [`TypePlan`] is what a declaration emitter consumes.
//!
//! ## Module Structure
//!
//! - `spec`: input fact base (operations and schema descriptors)
//! - `overrides`: static route/type/name override tables
//! - `config`: `typegen.toml` settings
//! - `graph`: node arena, builder, reuse pass and traversal
//! - `namespace`: namespace tree, route heuristics, assignment and reduction
//! - `naming`: the type namer
//! - `words`: identifier tokenizing and casing helpers
//! - `plan`: end-to-end pipeline and the serializable report

pub mod config;
pub mod error;
pub mod graph;
pub mod namespace;
pub mod naming;
pub mod overrides;
pub mod plan;
pub mod spec;
pub mod words;

pub use config::{NamespaceSettings, TypegenConfig};
pub use error::{NamingConflict, Result, TypegenError};
pub use graph::{ExportableType, GraphBuilder, Member, PathStep, TypeGraph, TypeId, TypeKind};
pub use namespace::{Namespace, NamespaceId, NamespaceTree};
pub use naming::TypeNamer;
pub use overrides::Overrides;
pub use plan::{PlanReport, TypePlan};
pub use spec::ApiSpec;
