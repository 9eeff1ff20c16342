//! Typed field access over raw JSON records.
//!
//! Every read is strict: a field holding the wrong JSON type is a validation
//! error, never coerced. Absent fields and `null` read as "not set".

use serde_json::{Map, Value};

use super::{Table, TagBag};
use crate::error::{EnrichError, Result};

pub(crate) struct RecordReader<'a> {
    table: Table,
    object: &'a Map<String, Value>,
    id: Option<i64>,
}

impl<'a> RecordReader<'a> {
    pub fn new(table: Table, value: &'a Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| EnrichError::validation(table, None, "record is not a JSON object"))?;
        let id = object.get("id").and_then(Value::as_i64);
        Ok(Self { table, object, id })
    }

    /// The record identifier, which every table requires.
    pub fn id(&self) -> Result<i64> {
        match (self.id, self.object.get("id")) {
            (Some(id), _) => Ok(id),
            (None, None) | (None, Some(Value::Null)) => Err(self.invalid("missing id")),
            (None, Some(other)) => Err(self.invalid(format!("id is not an integer: {}", other))),
        }
    }

    pub fn optional_i64(&self, field: &str) -> Result<Option<i64>> {
        match self.object.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| self.invalid(format!("{} is not an integer: {}", field, value))),
        }
    }

    pub fn optional_str(&self, field: &str) -> Result<Option<String>> {
        match self.object.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.invalid(format!("{} is not a string: {}", field, other))),
        }
    }

    /// Read a string-to-string tag mapping.
    pub fn tags(&self, field: &str) -> Result<TagBag> {
        let object = match self.object.get(field) {
            None | Some(Value::Null) => return Ok(TagBag::new()),
            Some(Value::Object(object)) => object,
            Some(other) => {
                return Err(self.invalid(format!("{} is not an object: {}", field, other)))
            }
        };

        let mut tags = TagBag::new();
        for (key, value) in object {
            match value {
                Value::String(s) => {
                    tags.insert(key.clone(), s.clone());
                }
                other => {
                    return Err(
                        self.invalid(format!("tag {:?} has a non-string value: {}", key, other))
                    )
                }
            }
        }
        Ok(tags)
    }

    fn invalid(&self, reason: impl Into<String>) -> EnrichError {
        EnrichError::validation(self.table, self.id, reason)
    }
}
