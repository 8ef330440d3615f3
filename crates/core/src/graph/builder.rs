//! Bottom-up construction of the type graph from the API description.
//!
//! Dependencies are always built before the node that uses them, so node ids
//! are a valid bottom-up order for the reuse pass.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use super::node::{EnumBody, Member, NumericRange, Primitive, PrimitiveType, TypeId, TypeKind};
use super::TypeGraph;
use crate::error::{Result, TypegenError};
use crate::spec::{ApiSpec, EnumValue, Operation, ParamLocation, Schema};

/// Key under which a root member holds a shared definition.
pub const DEFINITION_KEY_PREFIX: &str = "#/definitions/";

/// Resolved target of a schema: a node plus the array nesting applied on top
/// of it when the element is a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaShape {
    /// Node the schema resolved to.
    pub ty: TypeId,
    /// Array depth over a primitive `ty`; zero otherwise.
    pub list: u8,
}

impl SchemaShape {
    fn node(ty: TypeId) -> Self {
        Self { ty, list: 0 }
    }
}

/// How an object schema was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Inline top-level parameter body.
    TopLevel,
    Nested,
    /// Body of an error response.
    ErrorBody,
}

/// Builds a [`TypeGraph`] from an [`ApiSpec`].
#[derive(Debug)]
pub struct GraphBuilder<'a> {
    spec: &'a ApiSpec,
    graph: TypeGraph,
    definitions: HashMap<String, SchemaShape>,
    in_progress: HashSet<String>,
    pending_refs: Vec<(TypeId, String)>,
}

impl<'a> GraphBuilder<'a> {
    /// Builder over `spec` with an empty graph.
    pub fn new(spec: &'a ApiSpec) -> Self {
        Self {
            spec,
            graph: TypeGraph::new(),
            definitions: HashMap::new(),
            in_progress: HashSet::new(),
            pending_refs: Vec::new(),
        }
    }

    /// Build every route and definition, then unify duplicates.
    pub fn build(mut self) -> Result<TypeGraph> {
        let spec = self.spec;
        let mut seen = HashSet::new();
        for op in &spec.operations {
            if op.id.trim().is_empty() {
                return Err(TypegenError::malformed(&op.path, "operation without id"));
            }
            if !seen.insert(op.id.as_str()) {
                return Err(TypegenError::DuplicateOperation(op.id.clone()));
            }
            let route = self.add_route(op)?;
            let root = self.graph.root();
            self.graph.add_member(root, Member::new(op.id.clone(), route));
        }

        // Unreferenced definitions stay reachable under their own root keys.
        for name in spec.definitions.keys() {
            let shape = self.definition(name)?;
            let root = self.graph.root();
            self.graph
                .add_member(root, Member::new(format!("{DEFINITION_KEY_PREFIX}{name}"), shape.ty));
        }

        self.patch_references()?;

        let built = self.graph.len();
        let merged = self.graph.build_maximal_reuse_graph();
        debug!(
            operations = self.spec.operations.len(),
            definitions = self.spec.definitions.len(),
            nodes = built,
            merged,
            "Type graph built."
        );
        Ok(self.graph)
    }

    /// Build a schema and return its shape.
    ///
    /// `is_top_level` marks an inline parameter body: objects reached that way
    /// become anonymous object literals instead of reusable interfaces.
    pub fn process_definition(
        &mut self,
        schema: &Schema,
        title: &str,
        is_top_level: bool,
    ) -> Result<SchemaShape> {
        let placement = if is_top_level {
            Placement::TopLevel
        } else {
            Placement::Nested
        };
        self.process(schema, title, placement)
    }

    /// Finish building and return the graph without running the reuse pass.
    pub fn into_graph(mut self) -> Result<TypeGraph> {
        self.patch_references()?;
        Ok(self.graph)
    }

    fn add_route(&mut self, op: &Operation) -> Result<TypeId> {
        let mut members = Vec::new();

        for param in &op.parameters {
            let title = format!("{}_{}", op.id, param.name);
            let Some(schema) = &param.schema else {
                return Err(TypegenError::malformed(&title, "parameter without schema"));
            };
            let placement = if param.location == ParamLocation::Body {
                Placement::TopLevel
            } else {
                Placement::Nested
            };
            let shape = self.process(schema, schema.title.as_deref().unwrap_or(&title), placement)?;
            members.push(Member {
                key: param.name.clone(),
                ty: shape.ty,
                required: param.required,
                list: shape.list,
                description: param.description.clone(),
                range: range_of(schema),
            });
        }

        for (status, response) in &op.responses {
            let Some(schema) = &response.schema else {
                continue;
            };
            let title = if status == "200" {
                format!("{}_ok", op.id)
            } else {
                format!("{}_{status}", op.id)
            };
            let placement = if status.parse::<u16>().is_ok_and(|code| code >= 400) {
                Placement::ErrorBody
            } else {
                Placement::Nested
            };
            let shape = self.process(schema, schema.title.as_deref().unwrap_or(&title), placement)?;
            members.push(Member {
                key: status.clone(),
                ty: shape.ty,
                required: true,
                list: shape.list,
                description: response.description.clone(),
                range: None,
            });
        }

        let route = self.graph.alloc(TypeKind::ObjectLiteral, Some(&op.id));
        let node = self.graph.node_mut(route);
        node.pinned = true;
        node.description.clone_from(&op.description);
        for member in members {
            self.graph.add_member(route, member);
        }
        trace!(route = %op.id, id = %route, "Route node built.");
        Ok(route)
    }

    fn process(&mut self, schema: &Schema, title: &str, placement: Placement) -> Result<SchemaShape> {
        if let Some(name) = schema.ref_name() {
            let name = name.to_string();
            return self.reference(&name, title);
        }

        if let Some(values) = &schema.enum_values {
            return self.enumeration(schema, values, title);
        }

        match schema.schema_type.as_deref() {
            Some("array") => self.array(schema, title),
            Some("object") => self.object(schema, title, placement),
            Some(other) => {
                let Some(ty) = PrimitiveType::from_schema_type(other) else {
                    return Err(TypegenError::malformed(title, format!("unknown type '{other}'")));
                };
                Ok(SchemaShape::node(self.graph.intern_primitive(Primitive {
                    ty,
                    format: schema.format.clone(),
                })))
            }
            None if schema.properties.is_some() => self.object(schema, title, placement),
            None => Err(TypegenError::malformed(
                title,
                "schema has neither type, $ref, enum nor properties",
            )),
        }
    }

    fn reference(&mut self, name: &str, title: &str) -> Result<SchemaShape> {
        if !self.spec.definitions.contains_key(name) {
            return Err(TypegenError::malformed(
                title,
                format!("dangling reference to '{name}'"),
            ));
        }
        if self.in_progress.contains(name) {
            let id = self
                .graph
                .alloc(TypeKind::Reference(name.to_string()), Some(name));
            self.pending_refs.push((id, name.to_string()));
            trace!(definition = name, id = %id, "Recursive reference deferred.");
            return Ok(SchemaShape::node(id));
        }
        self.definition(name)
    }

    fn definition(&mut self, name: &str) -> Result<SchemaShape> {
        if let Some(shape) = self.definitions.get(name) {
            return Ok(*shape);
        }
        let spec = self.spec;
        let Some(schema) = spec.definitions.get(name) else {
            return Err(TypegenError::malformed(name, "unknown definition"));
        };
        self.in_progress.insert(name.to_string());
        let title = schema.title.as_deref().unwrap_or(name);
        let shape = self.process(schema, title, Placement::Nested)?;
        self.in_progress.remove(name);

        // Named primitives and primitive lists become aliases.
        let is_primitive = matches!(self.graph.node(shape.ty).kind, TypeKind::Primitive(_));
        let shape = if is_primitive {
            let alias = self.graph.alloc(TypeKind::Alias, Some(title));
            self.graph
                .node_mut(alias)
                .absorb_description(schema.description.clone());
            let mut member = Member::new("", shape.ty);
            member.list = shape.list;
            member.range = range_of(schema);
            self.graph.add_member(alias, member);
            SchemaShape::node(alias)
        } else {
            shape
        };
        // A definition that only points at another one shares its node.
        if schema.ref_name().is_some()
            && !matches!(self.graph.node(shape.ty).kind, TypeKind::Reference(_))
        {
            self.graph.node_mut(shape.ty).add_title(title);
        }
        self.definitions.insert(name.to_string(), shape);
        Ok(shape)
    }

    fn enumeration(&mut self, schema: &Schema, values: &[EnumValue], title: &str) -> Result<SchemaShape> {
        if values.is_empty() {
            return Err(TypegenError::malformed(title, "enum without values"));
        }
        let all_strings = values.iter().all(|v| matches!(v, EnumValue::String(_)));
        let body = if all_strings {
            EnumBody {
                variants: values.iter().map(EnumValue::literal).collect(),
                values: None,
            }
        } else {
            EnumBody {
                variants: values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| enum_value_to_key(v, i))
                    .collect(),
                values: Some(values.to_vec()),
            }
        };
        let id = self.graph.alloc(TypeKind::Enum(body), Some(title));
        self.graph
            .node_mut(id)
            .absorb_description(schema.description.clone());
        Ok(SchemaShape::node(id))
    }

    fn array(&mut self, schema: &Schema, title: &str) -> Result<SchemaShape> {
        let Some(items) = &schema.items else {
            return Err(TypegenError::malformed(title, "array without items"));
        };
        let element_title = format!("{title}_element");
        let element = self.process(
            items,
            items.title.as_deref().unwrap_or(&element_title),
            Placement::Nested,
        )?;
        if matches!(self.graph.node(element.ty).kind, TypeKind::Primitive(_)) {
            return Ok(SchemaShape {
                ty: element.ty,
                list: element.list.saturating_add(1),
            });
        }
        let id = self.graph.alloc(TypeKind::Array, Some(title));
        self.graph
            .node_mut(id)
            .absorb_description(schema.description.clone());
        let mut member = Member::new("element", element.ty);
        member.list = element.list;
        member.range = range_of(items);
        self.graph.add_member(id, member);
        Ok(SchemaShape::node(id))
    }

    fn object(&mut self, schema: &Schema, title: &str, placement: Placement) -> Result<SchemaShape> {
        let mut members = Vec::new();
        if let Some(properties) = &schema.properties {
            for (key, property) in properties {
                let derived = format!("{title}_{key}");
                let shape = self.process(
                    property,
                    property.title.as_deref().unwrap_or(&derived),
                    Placement::Nested,
                )?;
                members.push(Member {
                    key: key.clone(),
                    ty: shape.ty,
                    required: schema.required.contains(key),
                    list: shape.list,
                    description: property.description.clone(),
                    range: range_of(property),
                });
            }
        }

        let kind = match placement {
            Placement::TopLevel => TypeKind::ObjectLiteral,
            Placement::Nested => TypeKind::Interface,
            Placement::ErrorBody => TypeKind::Class,
        };
        let id = self.graph.alloc(kind, Some(title));
        self.graph
            .node_mut(id)
            .absorb_description(schema.description.clone());
        for member in members {
            self.graph.add_member(id, member);
        }
        Ok(SchemaShape::node(id))
    }

    /// Point every deferred reference at its finished definition.
    fn patch_references(&mut self) -> Result<()> {
        for (id, name) in std::mem::take(&mut self.pending_refs) {
            let Some(shape) = self.definitions.get(&name).copied() else {
                return Err(TypegenError::malformed(&name, "reference never resolved"));
            };
            let mut member = Member::new("target", shape.ty);
            member.list = shape.list;
            self.graph.add_member(id, member);
        }
        Ok(())
    }
}

/// Build the graph for a whole description.
pub fn build_graph(spec: &ApiSpec) -> Result<TypeGraph> {
    GraphBuilder::new(spec).build()
}

fn range_of(schema: &Schema) -> Option<NumericRange> {
    (schema.minimum.is_some() || schema.maximum.is_some()).then_some(NumericRange {
        minimum: schema.minimum,
        maximum: schema.maximum,
    })
}

/// Generate a variant key for a non-string enum value.
fn enum_value_to_key(v: &EnumValue, index: usize) -> String {
    match v {
        EnumValue::String(s) => s.clone(),
        EnumValue::Integer(n) => format!("VALUE_{n}"),
        EnumValue::Float(_) => format!("VALUE_{index}"),
        EnumValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        EnumValue::Null => "NULL".to_string(),
    }
}
