use thiserror::Error;

use crate::kind::EntityKind;

/// Errors produced while building entities from JSON.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("{kind} entry is missing required field `{field}`")]
    MissingField { kind: EntityKind, field: &'static str },

    #[error("{kind} entry has invalid field `{field}`: expected {expected}")]
    InvalidField {
        kind: EntityKind,
        field: &'static str,
        expected: &'static str,
    },

    #[error("{kind} entry is not a JSON object")]
    NotAnObject { kind: EntityKind },
}
