//! Tool errors and results

use blender_mcp_core::HostError;
use thiserror::Error;

/// Why a tool call did not succeed
///
/// The `Display` form of each variant is the exact message returned to the
/// client.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Input failed shape or constraint checks; the handler never ran
    #[error("Error: {0}")]
    Validation(String),

    /// A named object or material is missing
    #[error("Error: {kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    /// A precondition on existing state was not met
    #[error("Error: {0}")]
    Rejected(String),

    /// The host integration cannot be reached at all
    #[error("Error: bpy module not found. Tool must run in Blender environment.")]
    HostUnavailable,

    /// The host accepted the call but the operation failed
    #[error("Error [{label}]: {message}")]
    Operation { label: &'static str, message: String },

    /// Raw host failure, resolved with [`ToolError::with_label`]
    #[error("Error: {0}")]
    Host(#[from] HostError),
}

impl ToolError {
    /// Shorthand for a missing object
    pub fn object_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "Object",
            name: name.into(),
        }
    }

    /// Resolve a raw host failure into the class it is reported as
    ///
    /// `label` is the operation label of the tool that failed, e.g. "Render Scene".
    pub fn with_label(self, label: &'static str) -> Self {
        let Self::Host(error) = self else {
            return self;
        };

        match error {
            HostError::Unavailable => Self::HostUnavailable,
            HostError::ObjectNotFound(name) => Self::object_not_found(name),
            HostError::MaterialNotFound(name) => Self::NotFound {
                kind: "Material",
                name,
            },
            e @ (HostError::MaterialExists(_) | HostError::NotACamera { .. }) => {
                Self::Rejected(e.to_string())
            }
            e => Self::Operation {
                label,
                message: e.to_string(),
            },
        }
    }
}

/// Result of one tool invocation
#[derive(Debug)]
pub enum ToolOutcome {
    Success(String),
    Failure(ToolError),
}

impl ToolOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The human-readable message sent back to the client
    pub fn into_message(self) -> String {
        match self {
            Self::Success(message) => message,
            Self::Failure(error) => error.to_string(),
        }
    }
}

impl From<Result<String, ToolError>> for ToolOutcome {
    fn from(result: Result<String, ToolError>) -> Self {
        match result {
            Ok(message) => Self::Success(message),
            Err(error) => Self::Failure(error),
        }
    }
}
