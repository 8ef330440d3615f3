//! Input fact base: the parsed API description.
//!
//! Ingestion of the raw ESI swagger document happens upstream; this module
//! only deserializes its normalized form. Everything here is read-only once
//! loaded.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Result, TypegenError};

/// Root API description.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiSpec {
    /// Operations in document order.
    pub operations: Vec<Operation>,
    /// Shared named schemas, addressed by `$ref`.
    #[serde(default)]
    pub definitions: BTreeMap<String, Schema>,
}

/// One API operation (route).
#[derive(Debug, Clone, Deserialize)]
pub struct Operation {
    /// Route identifier, e.g. `get_alliances_alliance_id_icons`.
    pub id: String,
    /// HTTP method, lower-case.
    pub method: String,
    /// URL path template.
    pub path: String,
    /// Logical grouping tag, e.g. `Alliance`.
    pub tag: String,
    /// Free-text summary.
    pub description: Option<String>,
    /// Path, query, header and body parameters.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Responses keyed by status code.
    #[serde(default)]
    pub responses: BTreeMap<String, Response>,
}

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamLocation {
    /// URL path segment.
    Path,
    /// Query string.
    Query,
    /// Request header.
    Header,
    /// Request body.
    Body,
    /// Form field.
    FormData,
}

/// A route parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    /// Parameter name; the member key on the route node.
    pub name: String,
    /// `in` keyword.
    #[serde(rename = "in")]
    pub location: ParamLocation,
    /// Whether callers must supply it.
    #[serde(default)]
    pub required: bool,
    /// Free-text description.
    pub description: Option<String>,
    /// Value schema; required by the builder.
    pub schema: Option<Schema>,
}

/// A response definition.
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    /// Free-text description.
    pub description: Option<String>,
    /// Body schema; responses without one add no member.
    pub schema: Option<Schema>,
}

/// Schema descriptor (JSON-Schema subset used by ESI).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// `string`, `integer`, `number`, `boolean`, `array` or `object`.
    #[serde(rename = "type")]
    pub schema_type: Option<String>,

    /// Format hint (e.g. int32, date-time).
    pub format: Option<String>,

    /// Reference to a shared definition.
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,

    /// Candidate name supplied by the document.
    pub title: Option<String>,

    /// Free-text description.
    pub description: Option<String>,

    /// Item schema for array types.
    pub items: Option<Box<Schema>>,

    /// Properties for object types, in name order.
    pub properties: Option<BTreeMap<String, Schema>>,

    /// Required property names for object types.
    #[serde(default)]
    pub required: Vec<String>,

    /// Enum values.
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<EnumValue>>,

    /// Minimum value for numbers.
    pub minimum: Option<f64>,

    /// Maximum value for numbers.
    pub maximum: Option<f64>,
}

/// Enum value can be string, integer, float, boolean, or null.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum EnumValue {
    /// String literal.
    String(String),
    /// Integer literal.
    Integer(i64),
    /// Non-integer number.
    Float(f64),
    /// Boolean literal.
    Bool(bool),
    /// `null`.
    Null,
}

impl EnumValue {
    /// Canonical text used for variant keys and structural comparison.
    pub fn literal(&self) -> String {
        match self {
            EnumValue::String(s) => s.clone(),
            EnumValue::Integer(n) => n.to_string(),
            EnumValue::Float(f) => f.to_string(),
            EnumValue::Bool(b) => b.to_string(),
            EnumValue::Null => "null".to_string(),
        }
    }
}

impl ApiSpec {
    /// Parse a description from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| TypegenError::Input(format!("invalid JSON: {e}")))
    }

    /// Load a JSON or YAML description from disk (format picked by extension).
    pub fn load(path: &Path) -> Result<Self> {
        esi_typegen_common::load_document(path, "API description").map_err(TypegenError::Input)
    }

    /// Find an operation by identifier.
    pub fn operation(&self, id: &str) -> Option<&Operation> {
        self.operations.iter().find(|op| op.id == id)
    }
}

impl Schema {
    /// Definition name targeted by `$ref`, if any.
    pub fn ref_name(&self) -> Option<&str> {
        self.ref_path.as_deref().map(|path| {
            path.strip_prefix("#/definitions/")
                .or_else(|| path.strip_prefix("#/components/schemas/"))
                .unwrap_or(path)
        })
    }
}
