use std::path::PathBuf;

use rdv_types::ModelError;

/// Blocking issues that caused a mutation to be rejected.
///
/// The messages keep the order in which the validation engine reported them.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{}", .messages.join("; "))]
pub struct ValidationFailure {
    pub messages: Vec<String>,
}

impl ValidationFailure {
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }

    /// A failure with a single message, e.g. for a missing target entity.
    pub fn single(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
        }
    }
}

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// A mutation would leave the document with blocking issues.
    #[error("validation failed: {0}")]
    Validation(ValidationFailure),

    /// I/O error reading or writing the seed document.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The seed document is not valid JSON.
    #[error("seed document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// An entity in the seed document could not be built.
    #[error("malformed entity: {0}")]
    Model(#[from] ModelError),

    /// The document does not have the expected top-level shape.
    #[error("malformed seed document: {0}")]
    Malformed(String),
}

impl RepositoryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The blocking messages, if this is a validation failure.
    pub fn validation_messages(&self) -> Option<&[String]> {
        match self {
            Self::Validation(failure) => Some(&failure.messages),
            _ => None,
        }
    }
}

impl From<ValidationFailure> for RepositoryError {
    fn from(failure: ValidationFailure) -> Self {
        Self::Validation(failure)
    }
}

/// Result alias for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
