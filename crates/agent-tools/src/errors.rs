use thiserror::Error;

use crate::value::ValueKind;

/// Why a node stopped a validated copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    /// The node's kind has no JSON form
    NotSerializable,
    /// The node sits deeper than [`MAX_COPY_DEPTH`](crate::value::MAX_COPY_DEPTH)
    TooDeep,
}

fn describe_failure(failure: &ValidationFailure, kind: &ValueKind) -> String {
    match failure {
        ValidationFailure::NotSerializable => format!("{} values are not JSON serializable", kind),
        ValidationFailure::TooDeep => format!(
            "nesting exceeds {} levels",
            crate::value::MAX_COPY_DEPTH
        ),
    }
}

/// A value could not be copied into JSON because of a node at `path`
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Unable to serialize {path}: {}", describe_failure(.failure, .kind))]
pub struct JsonValidationError {
    /// Dotted/bracketed location of the offending node, e.g. `root.a.b[2]`
    pub path: String,
    /// What was found at that location
    pub kind: ValueKind,
    pub failure: ValidationFailure,
}

/// A generic deep copy failed
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Unable to deep copy value: {0}")]
pub struct DeepCopyError(pub String);

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContentError {
    #[error("Unknown ContentBlockData type")]
    UnknownContentBlock,

    #[error("Unknown ToolResultContentData type")]
    UnknownToolResultContent,

    #[error("Unknown SystemContentBlockData type")]
    UnknownSystemContentBlock,

    #[error("Invalid {kind} source")]
    InvalidSource { kind: &'static str },

    #[error("Invalid {kind} data: {message}")]
    InvalidData { kind: &'static str, message: String },

    #[error(transparent)]
    Validation(#[from] JsonValidationError),
}

impl ContentError {
    pub(crate) fn invalid_data<E: std::fmt::Display>(kind: &'static str, err: E) -> Self {
        ContentError::InvalidData {
            kind,
            message: err.to_string(),
        }
    }
}

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Invalid tool name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Invalid description for tool '{0}': description must be a non-empty string")]
    InvalidDescription(String),

    #[error("Tool with name '{0}' already registered")]
    DuplicateName(String),

    #[error("Tool with name '{0}' not found")]
    NotFound(String),
}

pub type ContentResult<T> = Result<T, ContentError>;
pub type RegistryResult<T> = Result<T, RegistryError>;
