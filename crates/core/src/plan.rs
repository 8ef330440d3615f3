//! End-to-end planning and the serializable plan report.
//!
//! [`TypePlan::build`] runs the whole pipeline (build, assign, reduce, name);
//! [`TypePlan::report`] flattens the result into the JSON document handed to
//! the declaration emitter.

use serde::Serialize;

use tracing::info;

use crate::config::NamespaceSettings;
use crate::error::Result;
use crate::graph::{build_graph, ExportableType, Member, TypeGraph, TypeId, TypeKind};
use crate::namespace::NamespaceTree;
use crate::naming::TypeNamer;
use crate::overrides::Overrides;
use crate::spec::{ApiSpec, EnumValue};

/// Finished graph and namespace tree.
#[derive(Debug, Clone)]
pub struct TypePlan {
    /// Named, deduplicated type graph.
    pub graph: TypeGraph,
    /// Reduced namespace tree with every declaration placed.
    pub tree: NamespaceTree,
}

/// Whole plan, ready to serialize.
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    /// Attached namespaces, depth first.
    pub namespaces: Vec<NamespaceReport>,
    /// Routes in document order.
    pub routes: Vec<RouteReport>,
}

/// One attached namespace.
#[derive(Debug, Clone, Serialize)]
pub struct NamespaceReport {
    /// Full dotted path; empty for the root.
    pub path: String,
    /// Declarations placed here, in placement order.
    pub declarations: Vec<DeclarationReport>,
    /// Placement, collapse and conflict trace.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub log: Vec<String>,
}

/// One named declaration.
#[derive(Debug, Clone, Serialize)]
pub struct DeclarationReport {
    /// Display name.
    pub name: String,
    /// Kind label, e.g. `interface`.
    pub kind: String,
    /// Whether the name came from an override or a proper title.
    pub explicit: bool,
    /// Every candidate title.
    pub titles: Vec<String>,
    /// Type-level description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Properties, or the element of an array or alias.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<MemberReport>,
    /// Enum variant keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<String>>,
    /// Explicit enum values, parallel to `variants`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<EnumValue>>,
}

/// One member edge, with its target rendered as a type label.
#[derive(Debug, Clone, Serialize)]
pub struct MemberReport {
    /// Member key.
    pub key: String,
    /// Primitive label, `object`, or a qualified declaration name.
    #[serde(rename = "type")]
    pub ty: String,
    /// Whether the member must be present.
    pub required: bool,
    /// Array depth over `type`.
    #[serde(skip_serializing_if = "is_zero")]
    pub list: u8,
    /// Member-level description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Inclusive lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Inclusive upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Members of an inline object literal.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<MemberReport>,
}

/// One route and its parameter/response members.
#[derive(Debug, Clone, Serialize)]
pub struct RouteReport {
    /// Operation id.
    pub id: String,
    /// Parameters then responses, keyed by name and status code.
    pub members: Vec<MemberReport>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(value: &u8) -> bool {
    *value == 0
}

impl TypePlan {
    /// Build, place, reduce and name.
    pub fn build(
        spec: &ApiSpec,
        overrides: &Overrides,
        settings: &NamespaceSettings,
    ) -> Result<Self> {
        let mut graph = build_graph(spec)?;
        let mut tree = NamespaceTree::new();
        let placed = tree.assign(&graph, spec, overrides, settings);
        let collapsed = tree.reduce(
            &graph,
            overrides.collapse_list(),
            settings.min_types,
            settings.min_siblings,
        );
        let named = TypeNamer::new(overrides).name_all(&mut graph, &mut tree)?;
        info!(
            routes = spec.operations.len(),
            declarations = placed,
            collapsed,
            named,
            "Type plan ready."
        );
        Ok(Self { graph, tree })
    }

    /// First live declaration carrying `title`.
    pub fn find_by_title(&self, title: &str) -> Option<&ExportableType> {
        self.graph
            .declarations()
            .find(|node| node.titles.iter().any(|t| t == title))
    }

    /// `namespace.Name` for a declaration, or `Name` when it sits in the root.
    pub fn qualified_name(&self, id: TypeId) -> Option<String> {
        let name = self.graph.node(id).name()?;
        let namespace = self.tree.full_name(self.tree.namespace_of(id)?);
        Some(if namespace.is_empty() {
            name.to_string()
        } else {
            format!("{namespace}.{name}")
        })
    }

    /// Flatten the plan for serialization.
    pub fn report(&self) -> PlanReport {
        let namespaces = self
            .tree
            .iter()
            .map(|ns| NamespaceReport {
                path: self.tree.full_name(ns.id),
                declarations: ns
                    .members
                    .iter()
                    .map(|id| self.declaration(self.graph.node(*id)))
                    .collect(),
                log: ns.log.clone(),
            })
            .collect();
        let routes = self
            .graph
            .node(self.graph.root())
            .members
            .iter()
            .filter(|member| self.graph.node(member.ty).pinned)
            .map(|member| RouteReport {
                id: member.key.clone(),
                members: self.members(self.graph.node(member.ty)),
            })
            .collect();
        PlanReport { namespaces, routes }
    }

    fn declaration(&self, node: &ExportableType) -> DeclarationReport {
        let (variants, values) = match &node.kind {
            TypeKind::Enum(body) => (Some(body.variants.clone()), body.values.clone()),
            _ => (None, None),
        };
        DeclarationReport {
            name: node.name().map_or_else(|| node.label(), str::to_string),
            kind: node.kind.label().to_string(),
            explicit: node.resolved_name.as_ref().is_some_and(|r| r.explicit),
            titles: node.titles.clone(),
            description: node.description.clone(),
            members: self.members(node),
            variants,
            values,
        }
    }

    fn members(&self, node: &ExportableType) -> Vec<MemberReport> {
        node.members.iter().map(|member| self.member(member)).collect()
    }

    fn member(&self, member: &Member) -> MemberReport {
        let target = self.target(member.ty);
        let node = self.graph.node(target);
        let inline = matches!(node.kind, TypeKind::ObjectLiteral) && !node.pinned;
        MemberReport {
            key: member.key.clone(),
            ty: self.type_label(target),
            required: member.required,
            list: member.list,
            description: member.description.clone(),
            minimum: member.range.and_then(|range| range.minimum),
            maximum: member.range.and_then(|range| range.maximum),
            members: if inline { self.members(node) } else { Vec::new() },
        }
    }

    /// Follow merge redirects and reference nodes to the type a member means.
    fn target(&self, id: TypeId) -> TypeId {
        let mut id = self.graph.resolve(id);
        while let TypeKind::Reference(_) = self.graph.node(id).kind {
            match self.graph.node(id).members.first() {
                Some(target) => id = self.graph.resolve(target.ty),
                None => break,
            }
        }
        id
    }

    fn type_label(&self, id: TypeId) -> String {
        let node = self.graph.node(id);
        match &node.kind {
            TypeKind::Primitive(primitive) => primitive.to_string(),
            TypeKind::ObjectLiteral => "object".to_string(),
            TypeKind::Reference(name) => format!("unresolved:{name}"),
            _ => self.qualified_name(id).unwrap_or_else(|| node.label()),
        }
    }
}
