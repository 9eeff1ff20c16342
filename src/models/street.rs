//! Housenumber and street records used by the street pass.

use serde_json::Value;

use super::{RecordReader, Table};
use crate::error::Result;

/// A housenumber entry with its raw `addr:street` value
#[derive(Debug, Clone, PartialEq)]
pub struct AddressRecord {
    pub id: i64,

    /// Containing area or way
    pub parent_id: Option<i64>,

    pub street: Option<String>,

    /// Resolved street (linestring id)
    pub street_id: Option<i64>,
}

impl AddressRecord {
    pub fn new(id: i64, parent_id: i64, street: &str) -> Self {
        Self {
            id,
            parent_id: Some(parent_id),
            street: Some(street.to_string()),
            street_id: None,
        }
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let reader = RecordReader::new(Table::Housenumber, value)?;
        Ok(Self {
            id: reader.id()?,
            parent_id: reader.optional_i64("parent_id")?,
            street: reader.optional_str("street")?,
            street_id: reader.optional_i64("street_id")?,
        })
    }

    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "parent_id": self.parent_id,
            "street": self.street,
            "street_id": self.street_id,
        })
    }
}

/// A street linestring, possibly merged into another one
#[derive(Debug, Clone, PartialEq)]
pub struct StreetRecord {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: Option<String>,

    /// Set when this street was consolidated into another linestring
    pub merged_into: Option<i64>,
}

impl StreetRecord {
    pub fn new(id: i64, parent_id: i64, name: &str) -> Self {
        Self {
            id,
            parent_id: Some(parent_id),
            name: Some(name.to_string()),
            merged_into: None,
        }
    }

    pub fn merged_into(mut self, target: i64) -> Self {
        self.merged_into = Some(target);
        self
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let reader = RecordReader::new(Table::Linestring, value)?;
        Ok(Self {
            id: reader.id()?,
            parent_id: reader.optional_i64("parent_id")?,
            name: reader.optional_str("name")?,
            merged_into: reader.optional_i64("merged_into")?,
        })
    }

    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "parent_id": self.parent_id,
            "name": self.name,
            "merged_into": self.merged_into,
        })
    }
}
