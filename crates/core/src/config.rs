//! `typegen.toml` settings.
//!
//! ```toml
//! [overrides]
//! namespaces = "overrides/namespaces.json"
//! names = "overrides/names.json"
//!
//! [namespace]
//! root = "esi"
//! min_types = 3
//! min_siblings = 1
//! entities = ["character", "corporation"]
//! ```
//!
//! Every field is optional. Relative paths resolve against the config file's
//! directory.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Result, TypegenError};
use crate::overrides::Overrides;

/// Default config filename looked up next to the input.
pub const CONFIG_FILENAME: &str = "typegen.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypegenConfig {
    /// `[overrides]` table.
    pub overrides: OverrideSources,
    /// `[namespace]` table.
    pub namespace: NamespaceSettings,
}

/// Override table files; unset entries use the built-in tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverrideSources {
    /// Namespace override table (routes, types, collapse list).
    pub namespaces: Option<PathBuf>,
    /// Title -> name table.
    pub names: Option<PathBuf>,
}

/// Route heuristics and reduction thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamespaceSettings {
    /// First segment of every heuristic namespace.
    pub root: String,
    /// Declared types a leaf namespace needs to survive reduction.
    pub min_types: usize,
    /// Children a sparse namespace may keep before it stops folding them in.
    pub min_siblings: usize,
    /// Entities whose `<entity>_id` parameter inserts an intermediate segment.
    pub entities: Vec<String>,
}

impl Default for NamespaceSettings {
    fn default() -> Self {
        Self {
            root: "esi".to_string(),
            min_types: 3,
            min_siblings: 1,
            entities: vec!["character".to_string(), "corporation".to_string()],
        }
    }
}

impl TypegenConfig {
    /// Parse a config from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(|e| TypegenError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file and resolve its relative paths.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = esi_typegen_common::read_text(path, "config").map_err(TypegenError::Config)?;
        let mut config = Self::from_toml(&contents)
            .map_err(|e| TypegenError::Config(format!("{}: {e}", path.display())))?;
        if let Some(base) = path.parent() {
            config.overrides.resolve_relative(base);
        }
        Ok(config)
    }

    /// Load the override tables this config points at.
    pub fn load_overrides(&self) -> Result<Overrides> {
        Overrides::load(
            self.overrides.namespaces.as_deref(),
            self.overrides.names.as_deref(),
        )
    }

    fn validate(&self) -> Result<()> {
        let settings = &self.namespace;
        let root = settings.root.trim();
        if root.is_empty() || root.split('.').any(|segment| segment.trim().is_empty()) {
            return Err(TypegenError::Config(format!(
                "namespace.root '{}' is not a dotted path",
                settings.root
            )));
        }
        if settings.min_types == 0 {
            return Err(TypegenError::Config("namespace.min_types must be at least 1".to_string()));
        }
        if let Some(entity) = settings.entities.iter().find(|e| e.trim().is_empty()) {
            return Err(TypegenError::Config(format!("namespace.entities has an empty entry '{entity}'")));
        }
        Ok(())
    }
}

impl OverrideSources {
    fn resolve_relative(&mut self, base: &Path) {
        for path in [&mut self.namespaces, &mut self.names].into_iter().flatten() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = TypegenConfig::from_toml("").unwrap();
        assert_eq!(config, TypegenConfig::default());
        assert_eq!(config.namespace.root, "esi");
        assert_eq!(config.namespace.min_types, 3);
        assert_eq!(config.namespace.min_siblings, 1);
        assert_eq!(config.namespace.entities, vec!["character", "corporation"]);
    }

    #[test]
    fn test_partial_namespace_table() {
        let config = TypegenConfig::from_toml("[namespace]\nmin_types = 5\n").unwrap();
        assert_eq!(config.namespace.min_types, 5);
        assert_eq!(config.namespace.root, "esi");
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = TypegenConfig::from_toml("[namespace]\nmax_depth = 2\n").unwrap_err();
        assert!(matches!(err, TypegenError::Config(_)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(TypegenConfig::from_toml("[namespace]\nroot = \"\"\n").is_err());
        assert!(TypegenConfig::from_toml("[namespace]\nmin_types = 0\n").is_err());
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            "[overrides]\nnames = \"tables/names.json\"\nnamespaces = \"/abs/namespaces.json\"\n",
        )
        .unwrap();

        let config = TypegenConfig::load(&path).unwrap();
        assert_eq!(
            config.overrides.names,
            Some(dir.path().join("tables/names.json"))
        );
        assert_eq!(
            config.overrides.namespaces,
            Some(PathBuf::from("/abs/namespaces.json"))
        );
    }

    #[test]
    fn test_load_overrides_reads_configured_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("names.json"), r#"{ "get_foo_ok": "Foo" }"#).unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "[overrides]\nnames = \"names.json\"\n").unwrap();

        let overrides = TypegenConfig::load(&path).unwrap().load_overrides().unwrap();
        assert_eq!(overrides.type_name("get_foo_ok"), Some("Foo"));
    }
}
