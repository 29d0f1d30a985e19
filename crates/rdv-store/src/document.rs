use std::fs;
use std::io::Write;
use std::path::Path;

use rdv_types::EntityKind;
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{RepositoryError, RepositoryResult};

/// The parsed seed document.
///
/// Holds the raw JSON object so that unknown keys and key order survive a
/// read-modify-write cycle. Collections absent from the file read as empty.
#[derive(Clone, Debug, PartialEq)]
pub struct SeedDocument {
    root: Map<String, Value>,
}

impl SeedDocument {
    /// Wrap a JSON value, checking the top-level shape.
    pub fn from_value(value: Value) -> RepositoryResult<Self> {
        let Value::Object(root) = value else {
            return Err(RepositoryError::Malformed(
                "top-level value must be an object".into(),
            ));
        };
        for kind in EntityKind::ALL {
            match root.get(kind.collection()) {
                None | Some(Value::Array(_)) => {}
                Some(_) => {
                    return Err(RepositoryError::Malformed(format!(
                        "`{}` must be an array",
                        kind.collection()
                    )))
                }
            }
        }
        Ok(Self { root })
    }

    pub fn parse(text: &str) -> RepositoryResult<Self> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Read the document fresh from disk.
    pub fn read(path: &Path) -> RepositoryResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| RepositoryError::io(path, e))?;
        Self::parse(&text)
    }

    /// Overwrite `path` with this document.
    ///
    /// The text goes to a temporary file in the same directory which is then
    /// renamed over the seed, so readers never observe a partial document.
    pub fn write(&self, path: &Path) -> RepositoryResult<()> {
        let text = self.to_pretty_string()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| RepositoryError::io(dir, e))?;
        tmp.write_all(text.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| RepositoryError::io(tmp.path(), e))?;
        tmp.persist(path)
            .map_err(|e| RepositoryError::io(path, e.error))?;
        debug!(path = %path.display(), bytes = text.len(), "seed document written");
        Ok(())
    }

    /// Two-space indented JSON followed by a newline.
    pub fn to_pretty_string(&self) -> RepositoryResult<String> {
        let mut text = serde_json::to_string_pretty(&self.root)?;
        text.push('\n');
        Ok(text)
    }

    /// Entries of one collection, empty when the key is absent.
    pub fn entries(&self, kind: EntityKind) -> &[Value] {
        self.root
            .get(kind.collection())
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Mutable entries of one collection, creating the key when absent.
    pub fn entries_mut(&mut self, kind: EntityKind) -> RepositoryResult<&mut Vec<Value>> {
        self.root
            .entry(kind.collection())
            .or_insert_with(|| Value::Array(Vec::new()))
            .as_array_mut()
            .ok_or_else(|| {
                RepositoryError::Malformed(format!("`{}` must be an array", kind.collection()))
            })
    }

    pub fn get(&self, kind: EntityKind, id: &str) -> Option<&Value> {
        self.entries(kind).iter().find(|entry| entry_id(entry) == Some(id))
    }

    pub fn get_mut(&mut self, kind: EntityKind, id: &str) -> RepositoryResult<Option<&mut Value>> {
        Ok(self
            .entries_mut(kind)?
            .iter_mut()
            .find(|entry| entry_id(entry) == Some(id)))
    }

    pub fn contains(&self, kind: EntityKind, id: &str) -> bool {
        self.get(kind, id).is_some()
    }
}

/// The `id` of an entry when it is a string.
pub(crate) fn entry_id(entry: &Value) -> Option<&str> {
    entry.get("id").and_then(Value::as_str)
}

/// A string field of an entry.
pub(crate) fn str_field<'a>(entry: &'a Value, field: &str) -> Option<&'a str> {
    entry.get(field).and_then(Value::as_str)
}
