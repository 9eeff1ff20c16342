//! Place records (points, lines, polygons) and the tables that hold them.

use serde_json::Value;
use std::collections::BTreeMap;

use super::RecordReader;
use crate::error::Result;

/// Raw OSM tags of a record, ordered by key.
pub type TagBag = BTreeMap<String, String>;

/// Store table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Point,
    Linestring,
    Polygon,
    Housenumber,
}

impl Table {
    pub fn all() -> &'static [Table] {
        &[
            Table::Point,
            Table::Linestring,
            Table::Polygon,
            Table::Housenumber,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Point => "osm_point",
            Table::Linestring => "osm_linestring",
            Table::Polygon => "osm_polygon",
            Table::Housenumber => "osm_housenumber",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Table {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Table::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown table: {}", s))
    }
}

/// Geometry kind of a place record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceKind {
    Point,
    Line,
    Polygon,
}

impl PlaceKind {
    /// All place kinds, in the order the name pass visits them.
    pub fn all() -> &'static [PlaceKind] {
        &[PlaceKind::Point, PlaceKind::Line, PlaceKind::Polygon]
    }

    pub fn table(&self) -> Table {
        match self {
            PlaceKind::Point => Table::Point,
            PlaceKind::Line => Table::Linestring,
            PlaceKind::Polygon => Table::Polygon,
        }
    }
}

impl std::fmt::Display for PlaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaceKind::Point => write!(f, "point"),
            PlaceKind::Line => write!(f, "line"),
            PlaceKind::Polygon => write!(f, "polygon"),
        }
    }
}

/// A named map feature as seen by the name pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceRecord {
    pub kind: PlaceKind,
    pub id: i64,

    /// Current display name; empty when the import left it unset
    pub name: String,

    /// All OSM tags of the feature
    pub all_tags: TagBag,

    /// `;`-delimited alternative names
    pub alternative_names: String,
}

impl PlaceRecord {
    pub fn new(kind: PlaceKind, id: i64) -> Self {
        Self {
            kind,
            id,
            name: String::new(),
            all_tags: TagBag::new(),
            alternative_names: String::new(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.all_tags.insert(key.to_string(), value.to_string());
        self
    }

    /// Decode a stored record, rejecting malformed fields.
    pub fn from_json(kind: PlaceKind, value: &Value) -> Result<Self> {
        let reader = RecordReader::new(kind.table(), value)?;
        Ok(Self {
            kind,
            id: reader.id()?,
            name: reader.optional_str("name")?.unwrap_or_default(),
            all_tags: reader.tags("all_tags")?,
            alternative_names: reader.optional_str("alternative_names")?.unwrap_or_default(),
        })
    }

    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "all_tags": self.all_tags,
            "alternative_names": self.alternative_names,
        })
    }

    /// Iterate over `name:<lang>` tags as `(lang, value)` pairs, in key order.
    pub fn language_names(&self) -> impl Iterator<Item = (&str, &str)> {
        self.all_tags.iter().filter_map(|(key, value)| {
            key.strip_prefix("name:")
                .filter(|lang| !lang.is_empty())
                .map(|lang| (lang, value.as_str()))
        })
    }
}
