//! Static override tables.
//!
//! Two JSON documents drive every explicit decision the planner makes:
//!
//! - namespaces: `{ "explicit": { "routes": {id: path}, "types": {title: path} }, "collapse": [path] }`
//! - names: `{ title: name }`
//!
//! Defaults ship embedded in the binary; files passed through config or the
//! CLI replace the matching table. Tables are read-only after loading and are
//! handed to the components that need them.

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::OnceLock;

use tracing::debug;

use crate::error::{Result, TypegenError};

const BUILTIN_NAMESPACES: &str = include_str!("../resources/namespaces.json");
const BUILTIN_NAMES: &str = include_str!("../resources/names.json");

static BUILTIN: OnceLock<std::result::Result<Overrides, String>> = OnceLock::new();

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct NamespaceTable {
    #[serde(default)]
    explicit: ExplicitTable,
    #[serde(default)]
    collapse: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExplicitTable {
    #[serde(default)]
    routes: BTreeMap<String, String>,
    #[serde(default)]
    types: BTreeMap<String, String>,
}

/// Route, type and collapse overrides plus the title -> name table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    routes: BTreeMap<String, String>,
    types: BTreeMap<String, String>,
    collapse: BTreeSet<String>,
    names: BTreeMap<String, String>,
}

impl Overrides {
    /// Tables with no entries at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse both tables from JSON text.
    pub fn from_json(namespaces: &str, names: &str) -> Result<Self> {
        let table: NamespaceTable = serde_json::from_str(namespaces).map_err(|e| {
            TypegenError::OverrideLoadFailure {
                table: "namespace".to_string(),
                reason: e.to_string(),
            }
        })?;
        let names: BTreeMap<String, String> =
            serde_json::from_str(names).map_err(|e| TypegenError::OverrideLoadFailure {
                table: "name".to_string(),
                reason: e.to_string(),
            })?;

        let overrides = Self {
            routes: normalize_paths(table.explicit.routes, "route")?,
            types: normalize_paths(table.explicit.types, "type")?,
            collapse: table
                .collapse
                .iter()
                .map(|path| normalize_path(path, "collapse"))
                .collect::<Result<_>>()?,
            names,
        };
        if let Some((title, _)) = overrides.names.iter().find(|(_, name)| name.trim().is_empty()) {
            return Err(TypegenError::OverrideLoadFailure {
                table: "name".to_string(),
                reason: format!("empty name for title '{title}'"),
            });
        }
        Ok(overrides)
    }

    /// Load the tables, reading each given file in place of its built-in default.
    pub fn load(namespaces: Option<&Path>, names: Option<&Path>) -> Result<Self> {
        if namespaces.is_none() && names.is_none() {
            return Self::builtin().cloned();
        }
        let namespaces_json = match namespaces {
            Some(path) => read_table(path, "namespace")?,
            None => BUILTIN_NAMESPACES.to_string(),
        };
        let names_json = match names {
            Some(path) => read_table(path, "name")?,
            None => BUILTIN_NAMES.to_string(),
        };
        let overrides = Self::from_json(&namespaces_json, &names_json)?;
        debug!(
            routes = overrides.routes.len(),
            types = overrides.types.len(),
            collapse = overrides.collapse.len(),
            names = overrides.names.len(),
            "Override tables loaded."
        );
        Ok(overrides)
    }

    /// The embedded default tables, parsed once per process.
    pub fn builtin() -> Result<&'static Self> {
        BUILTIN
            .get_or_init(|| {
                Self::from_json(BUILTIN_NAMESPACES, BUILTIN_NAMES).map_err(|e| e.to_string())
            })
            .as_ref()
            .map_err(|reason| TypegenError::OverrideLoadFailure {
                table: "built-in".to_string(),
                reason: reason.clone(),
            })
    }

    /// Namespace path forced for an operation id.
    pub fn route_namespace(&self, operation_id: &str) -> Option<&str> {
        self.routes.get(operation_id).map(String::as_str)
    }

    /// Namespace path forced for a type title.
    pub fn type_namespace(&self, title: &str) -> Option<&str> {
        self.types.get(title).map(String::as_str)
    }

    /// Display name forced for a type title.
    pub fn type_name(&self, title: &str) -> Option<&str> {
        self.names.get(title).map(String::as_str)
    }

    /// Full dotted names that are always collapsed into their parent.
    pub fn collapse_list(&self) -> &BTreeSet<String> {
        &self.collapse
    }

    /// Add a route -> namespace entry.
    pub fn with_route_namespace(mut self, operation_id: &str, path: &str) -> Self {
        self.routes
            .insert(operation_id.to_string(), path.to_ascii_lowercase());
        self
    }

    /// Add a title -> namespace entry.
    pub fn with_type_namespace(mut self, title: &str, path: &str) -> Self {
        self.types.insert(title.to_string(), path.to_ascii_lowercase());
        self
    }

    /// Add a title -> name entry.
    pub fn with_type_name(mut self, title: &str, name: &str) -> Self {
        self.names.insert(title.to_string(), name.to_string());
        self
    }

    /// Add a namespace to the collapse list.
    pub fn with_collapse(mut self, path: &str) -> Self {
        self.collapse.insert(path.to_ascii_lowercase());
        self
    }
}

fn read_table(path: &Path, table: &str) -> Result<String> {
    esi_typegen_common::read_text(path, &format!("{table} overrides")).map_err(|reason| {
        TypegenError::OverrideLoadFailure {
            table: table.to_string(),
            reason,
        }
    })
}

fn normalize_paths(
    entries: BTreeMap<String, String>,
    table: &str,
) -> Result<BTreeMap<String, String>> {
    entries
        .into_iter()
        .map(|(key, path)| Ok((key, normalize_path(&path, table)?)))
        .collect()
}

/// Lower-case a dotted path and reject empty segments.
fn normalize_path(path: &str, table: &str) -> Result<String> {
    let path = path.trim().to_ascii_lowercase();
    if path.is_empty() || path.split('.').any(|segment| segment.trim().is_empty()) {
        return Err(TypegenError::OverrideLoadFailure {
            table: table.to_string(),
            reason: format!("invalid namespace path '{path}'"),
        });
    }
    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_tables_parse() {
        let overrides = Overrides::builtin().unwrap();
        assert_eq!(overrides.route_namespace("get_status"), Some("esi.status"));
        assert_eq!(overrides.type_name("get_status_ok"), Some("ServerStatus"));
        assert!(overrides.collapse_list().contains("esi.character.fitting"));
    }

    #[test]
    fn test_from_json_normalizes_paths() {
        let overrides = Overrides::from_json(
            r#"{ "explicit": { "routes": { "get_foo": "ESI.Custom.Path" } }, "collapse": ["Esi.Rare"] }"#,
            "{}",
        )
        .unwrap();
        assert_eq!(overrides.route_namespace("get_foo"), Some("esi.custom.path"));
        assert!(overrides.collapse_list().contains("esi.rare"));
        assert_eq!(overrides.type_namespace("get_foo"), None);
    }

    #[test]
    fn test_malformed_json_fails() {
        let err = Overrides::from_json("{ not json", "{}").unwrap_err();
        assert!(matches!(err, TypegenError::OverrideLoadFailure { ref table, .. } if table == "namespace"));

        let err = Overrides::from_json("{}", "[1, 2]").unwrap_err();
        assert!(matches!(err, TypegenError::OverrideLoadFailure { ref table, .. } if table == "name"));
    }

    #[test]
    fn test_invalid_entries_fail() {
        assert!(Overrides::from_json(r#"{ "collapse": ["esi..x"] }"#, "{}").is_err());
        assert!(Overrides::from_json(r#"{ "unknown": 1 }"#, "{}").is_err());
        assert!(Overrides::from_json("{}", r#"{ "foo": " " }"#).is_err());
    }

    #[test]
    fn test_load_replaces_one_table() {
        let dir = TempDir::new().unwrap();
        let names = dir.path().join("names.json");
        fs::write(&names, r#"{ "get_foo_ok": "Foo" }"#).unwrap();

        let overrides = Overrides::load(None, Some(&names)).unwrap();
        assert_eq!(overrides.type_name("get_foo_ok"), Some("Foo"));
        assert_eq!(overrides.type_name("get_status_ok"), None);
        // Namespace table still comes from the built-in default.
        assert_eq!(overrides.route_namespace("get_status"), Some("esi.status"));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = Overrides::load(Some(&dir.path().join("missing.json")), None).unwrap_err();
        assert!(matches!(err, TypegenError::OverrideLoadFailure { .. }));
    }
}
