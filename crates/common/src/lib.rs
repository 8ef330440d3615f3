//! Shared helpers for the esi-typegen crates
//!
//! This crate contains the ambient plumbing used by both the planner library
//! and the `esi-typegen` binary: tracing setup and document loading.

use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Environment variable controlling the log filter.
pub const LOG_ENV: &str = "ESI_TYPEGEN_LOG";

/// Tracing targets owned by this workspace.
const CRATE_TARGETS: &[&str] = &["esi_typegen_common", "esi_typegen_core", "esi_typegen_cli"];

/// Supported on-disk document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `.json` (also the fallback for unknown extensions)
    Json,
    /// `.yaml` / `.yml`
    Yaml,
}

impl DocumentFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

/// Initialize the global tracing subscriber.
///
/// `ESI_TYPEGEN_LOG` controls the level: "trace", "debug", "info", "warn", "error"
/// or a full filter spec like "esi_typegen_core=trace". `verbose` raises the
/// default level to debug when the variable is unset.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = match std::env::var(LOG_ENV) {
        Ok(level) if is_plain_level(&level) => crate_filter(&level),
        Ok(spec) => spec,
        Err(_) => crate_filter(default_level),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn crate_filter(level: &str) -> String {
    CRATE_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}

/// Read a text file, naming it in the error message.
pub fn read_text(path: &Path, what: &str) -> Result<String, String> {
    fs::read_to_string(path)
        .map_err(|err| format!("Failed to read {what} {}: {err}", path.display()))
}

/// Write a text file, creating parent directories as needed.
pub fn write_text(path: &Path, contents: &str) -> Result<(), String> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|err| format!("Failed to create directory {}: {err}", parent.display()))?;
    }
    fs::write(path, contents).map_err(|err| format!("Failed to write {}: {err}", path.display()))
}

/// Parse a JSON or YAML document.
pub fn parse_document<T: DeserializeOwned>(
    contents: &str,
    format: DocumentFormat,
) -> Result<T, String> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str(contents).map_err(|err| format!("invalid JSON: {err}"))
        }
        DocumentFormat::Yaml => {
            serde_yaml::from_str(contents).map_err(|err| format!("invalid YAML: {err}"))
        }
    }
}

/// Read and parse a document, picking the format from the file extension.
pub fn load_document<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T, String> {
    let contents = read_text(path, what)?;
    parse_document(&contents, DocumentFormat::from_path(path))
        .map_err(|err| format!("Failed to parse {what} {}: {err}", path.display()))
}
