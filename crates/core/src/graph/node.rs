//! Exportable type nodes.
//!
//! A node is one reusable schema shape. Nodes live in the [`TypeGraph`](super::TypeGraph)
//! arena and reference each other by [`TypeId`]; `dependents` are back-edges kept
//! for lookup only.

use std::fmt;

use crate::spec::EnumValue;

/// Stable arena index of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Position in the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Primitive JSON types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// `string`
    String,
    /// `integer`
    Integer,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
}

impl PrimitiveType {
    /// Parse a schema `type` keyword.
    pub fn from_schema_type(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            _ => None,
        }
    }

    /// Schema keyword for this type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }
}

/// A primitive plus its format hint; interned once per graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Primitive {
    /// JSON type.
    pub ty: PrimitiveType,
    /// `format` keyword, e.g. `int32` or `date-time`.
    pub format: Option<String>,
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.format {
            Some(format) => write!(f, "{}:{format}", self.ty.as_str()),
            None => f.write_str(self.ty.as_str()),
        }
    }
}

/// Enum variants plus optional explicit values.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumBody {
    /// Variant keys, in document order.
    pub variants: Vec<String>,
    /// Parallel literal values; `None` when the variants are the values.
    pub values: Option<Vec<EnumValue>>,
}

/// Node kind.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// Shared scalar node (never named or placed).
    Primitive(Primitive),
    /// Named enumeration.
    Enum(EnumBody),
    /// Back-reference to a definition that was still being built (cycles).
    Reference(String),
    /// Named wrapper around another type.
    Alias,
    /// Named array; its single member is the element.
    Array,
    /// Anonymous inline object (top-level bodies, routes, the root).
    ObjectLiteral,
    /// Reusable object shape.
    Interface,
    /// Object shape thrown as an error.
    Class,
}

impl TypeKind {
    /// Short label for logs and reports.
    pub fn label(&self) -> &'static str {
        match self {
            TypeKind::Primitive(_) => "primitive",
            TypeKind::Enum(_) => "enum",
            TypeKind::Reference(_) => "reference",
            TypeKind::Alias => "alias",
            TypeKind::Array => "array",
            TypeKind::ObjectLiteral => "object-literal",
            TypeKind::Interface => "interface",
            TypeKind::Class => "class",
        }
    }

    /// Kinds that get a name and a namespace.
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            TypeKind::Enum(_) | TypeKind::Alias | TypeKind::Array | TypeKind::Interface | TypeKind::Class
        )
    }

    /// Kinds that count towards a namespace's declared-type total.
    pub fn counts_as_declared(&self) -> bool {
        matches!(self, TypeKind::Enum(_) | TypeKind::Interface | TypeKind::Class)
    }

    /// Kind part of the structural key.
    pub(crate) fn signature(&self) -> String {
        match self {
            TypeKind::Primitive(p) => format!("primitive:{p}"),
            TypeKind::Enum(body) => {
                let values = body.values.as_ref().map_or_else(
                    || "-".to_string(),
                    |values| {
                        values
                            .iter()
                            .map(EnumValue::literal)
                            .collect::<Vec<_>>()
                            .join("|")
                    },
                );
                format!("enum:{}:{values}", body.variants.join("|"))
            }
            TypeKind::Reference(target) => format!("reference:{target}"),
            other => other.label().to_string(),
        }
    }
}

/// Numeric bounds carried for the emitter; never part of the structural key.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumericRange {
    /// Inclusive lower bound.
    pub minimum: Option<f64>,
    /// Inclusive upper bound.
    pub maximum: Option<f64>,
}

/// One outgoing edge of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    /// Property name, parameter name, status code, `element` or `target`.
    pub key: String,
    /// Target node.
    pub ty: TypeId,
    /// Whether the member must be present.
    pub required: bool,
    /// Array nesting applied on top of `ty` (arrays of primitives allocate no node).
    pub list: u8,
    /// Member-level description from the schema.
    pub description: Option<String>,
    /// Numeric bounds of the member's schema.
    pub range: Option<NumericRange>,
}

impl Member {
    /// A required member with no description.
    pub fn new(key: impl Into<String>, ty: TypeId) -> Self {
        Self {
            key: key.into(),
            ty,
            required: true,
            list: 0,
            description: None,
            range: None,
        }
    }

    /// Take the richer description and any missing range from a duplicate.
    pub(crate) fn absorb(&mut self, other: Member) {
        absorb_description(&mut self.description, other.description);
        if self.range.is_none() {
            self.range = other.range;
        }
    }
}

/// A final display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    /// PascalCase display name.
    pub name: String,
    /// Explicit names are sticky.
    pub explicit: bool,
}

/// Lifecycle of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Built and live.
    Built,
    /// Absorbed by another node; never reachable again.
    Dead {
        /// The surviving node.
        merged_into: TypeId,
    },
}

/// One reusable, nameable schema shape.
#[derive(Debug, Clone)]
pub struct ExportableType {
    /// Arena index of this node.
    pub id: TypeId,
    /// What the node is.
    pub kind: TypeKind,
    /// Candidate names, in the order they were proposed.
    pub titles: Vec<String>,
    /// Outgoing edges, in declaration order.
    pub members: Vec<Member>,
    /// `(key, parent)` back-edges.
    pub dependents: Vec<(String, TypeId)>,
    /// Richest description seen for this shape.
    pub description: Option<String>,
    /// Set by the namer.
    pub resolved_name: Option<ResolvedName>,
    /// Built or merged away.
    pub state: NodeState,
    /// Root and route nodes: never merged, named or placed.
    pub pinned: bool,
}

impl ExportableType {
    pub(crate) fn new(id: TypeId, kind: TypeKind) -> Self {
        Self {
            id,
            kind,
            titles: Vec::new(),
            members: Vec::new(),
            dependents: Vec::new(),
            description: None,
            resolved_name: None,
            state: NodeState::Built,
            pinned: false,
        }
    }

    /// Not merged into another node.
    pub fn is_live(&self) -> bool {
        self.state == NodeState::Built
    }

    /// Live, unpinned declaration.
    pub fn is_declaration(&self) -> bool {
        self.is_live() && !self.pinned && self.kind.is_declaration()
    }

    /// Resolved display name, if the namer has run.
    pub fn name(&self) -> Option<&str> {
        self.resolved_name.as_ref().map(|resolved| resolved.name.as_str())
    }

    /// First candidate title, used in logs before names exist.
    pub fn label(&self) -> String {
        self.titles
            .first()
            .cloned()
            .unwrap_or_else(|| self.id.to_string())
    }

    /// Add a candidate title unless already present.
    pub fn add_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        if !self.titles.contains(&title) {
            self.titles.push(title);
        }
    }

    pub(crate) fn absorb_description(&mut self, other: Option<String>) {
        absorb_description(&mut self.description, other);
    }
}

/// Keep whichever description says more.
fn absorb_description(current: &mut Option<String>, other: Option<String>) {
    let Some(other) = other else {
        return;
    };
    let richer = current
        .as_ref()
        .is_none_or(|existing| other.trim().len() > existing.trim().len());
    if richer {
        *current = Some(other);
    }
}
