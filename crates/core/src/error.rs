//! Error types for the planner.
//!
//! Fatal conditions are [`TypegenError`] variants and stop the run. Disagreeing
//! explicit assertions are [`NamingConflict`]s: they are resolved by a fixed
//! tie-break, written to the owning namespace's trace log and never abort.

use std::fmt;

use crate::graph::TypeId;

/// All fatal errors raised while planning.
#[derive(thiserror::Error, Debug)]
pub enum TypegenError {
    /// A schema lacks structural fields the builder requires.
    #[error("Malformed schema at '{title}': {reason}")]
    MalformedSchema {
        /// Title of the schema being built.
        title: String,
        /// What is missing or invalid.
        reason: String,
    },

    /// Two operations share one identifier.
    #[error("Duplicate operation id '{0}'. Each operation must have a unique identifier.")]
    DuplicateOperation(String),

    /// An override table is missing or not valid JSON.
    #[error("Failed to load {table} overrides: {reason}")]
    OverrideLoadFailure {
        /// `namespaces` or `names`.
        table: String,
        /// Read or parse failure.
        reason: String,
    },

    /// A live declaration reached the namer with no candidate title.
    #[error("Type {0} reached the namer without any candidate title")]
    UnresolvedName(TypeId),

    /// The configuration file is unreadable or invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The API description could not be read or parsed.
    #[error("Failed to load API description: {0}")]
    Input(String),
}

impl TypegenError {
    pub(crate) fn malformed(title: &str, reason: impl Into<String>) -> Self {
        Self::MalformedSchema {
            title: title.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, TypegenError>;

/// Two explicit assertions disagree for one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingConflict {
    /// The type (or title) the assertions are about.
    pub subject: String,
    /// Every distinct explicit claim, in the order they were seen.
    pub claims: Vec<String>,
    /// The value that was kept.
    pub resolution: String,
}

impl fmt::Display for NamingConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "conflict: {} has explicit claims [{}], resolved as '{}'",
            self.subject,
            self.claims.join(", "),
            self.resolution
        )
    }
}
