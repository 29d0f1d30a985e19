use serde_json::{Map, Value};

use crate::error::ModelError;
use crate::kind::EntityKind;
use crate::location::GeoPoint;

/// Typed field access over one JSON object of a known entity kind.
pub(crate) struct Fields<'a> {
    kind: EntityKind,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub(crate) fn of(kind: EntityKind, value: &'a Value) -> Result<Self, ModelError> {
        let map = value.as_object().ok_or(ModelError::NotAnObject { kind })?;
        Ok(Self { kind, map })
    }

    fn required(&self, field: &'static str) -> Result<&'a Value, ModelError> {
        self.map.get(field).ok_or(ModelError::MissingField {
            kind: self.kind,
            field,
        })
    }

    fn invalid(&self, field: &'static str, expected: &'static str) -> ModelError {
        ModelError::InvalidField {
            kind: self.kind,
            field,
            expected,
        }
    }

    /// The entity id. Unlike other fields, an id must be a string.
    pub(crate) fn id(&self) -> Result<String, ModelError> {
        self.required("id")?
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| self.invalid("id", "a string"))
    }

    /// A required field as text. Non-string values keep their JSON rendering.
    pub(crate) fn string(&self, field: &'static str) -> Result<String, ModelError> {
        self.required(field).map(text)
    }

    pub(crate) fn string_or_default(&self, field: &'static str) -> String {
        self.map.get(field).map(text).unwrap_or_default()
    }

    /// A required integer field; a value of any other type reads as 0.
    pub(crate) fn integer(&self, field: &'static str) -> Result<i64, ModelError> {
        Ok(self.required(field)?.as_i64().unwrap_or(0))
    }

    /// The `type` tag, defaulting to the entity's own name.
    pub(crate) fn type_tag(&self) -> String {
        match self.map.get("type") {
            Some(Value::String(s)) => s.clone(),
            _ => self.kind.type_name().to_owned(),
        }
    }

    /// Anything that is not a GeoJSON point counts as no location.
    pub(crate) fn location(&self) -> Option<GeoPoint> {
        let value = self.map.get("location")?;
        serde_json::from_value(value.clone()).ok()
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
