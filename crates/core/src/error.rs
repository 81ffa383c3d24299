//! Error type shared by every stage of the generator.

use std::fmt;

use thiserror::Error;

/// Fatal generation errors. Any of these aborts the run; no partial output is produced.
#[derive(Debug, Error)]
pub enum Error {
    /// The API description is not valid JSON.
    #[error("failed to parse API description as JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The API description is not valid YAML.
    #[error("failed to parse API description as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A reference names a schema key that was never registered.
    #[error("unresolved schema reference '{key}'")]
    UnresolvedSchema {
        /// The missing key
        key: String,
    },

    /// A generic declaration was instantiated with the wrong number of arguments.
    #[error("generic schema '{key}' expects {expected} argument(s), found {found}")]
    GenericArity {
        /// Declaration key
        key: String,
        /// Number of declared generic parameters
        expected: usize,
        /// Number of arguments supplied
        found: usize,
    },

    /// A base-type chain loops back onto itself.
    #[error("inheritance cycle detected through schema '{key}'")]
    InheritanceCycle {
        /// A schema on the cycle
        key: String,
    },

    /// Two operations map onto the same method of the same client.
    #[error("duplicate operation '{name}' in client '{client}'")]
    DuplicateOperation {
        /// Client class name
        client: String,
        /// Method name
        name: String,
    },

    /// An operation declares the same parameter twice.
    #[error("duplicate parameter '{name}' in operation '{operation}'")]
    DuplicateParameter {
        /// Logical operation name
        operation: String,
        /// Parameter name
        name: String,
    },
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A non-fatal condition surfaced alongside the generated source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Logical name of the operation the warning concerns, if any.
    pub operation: Option<String>,
    /// Human-readable description.
    pub message: String,
}

impl Warning {
    pub(crate) fn new(operation: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.map(str::to_string),
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.operation {
            Some(op) => write!(f, "{op}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}
