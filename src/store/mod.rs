//! Record store the enrichment passes read from and write back to.
//!
//! Records travel as raw JSON objects; decoding into typed records (and the
//! validation that comes with it) happens in [`crate::models`].

mod memory;
mod sled_store;

pub use memory::MemoryStore;
pub use sled_store::SledStore;

use serde_json::{Map, Value};

use crate::error::Result;
use crate::models::{AddressRecord, PlaceKind, PlaceRecord, StreetRecord, Table};

pub trait RecordStore {
    /// Read every record of a table.
    fn scan(&self, table: Table) -> Result<Vec<Value>>;

    /// Overwrite the named fields of one record, leaving its other fields untouched.
    fn update(&mut self, table: Table, id: i64, fields: Map<String, Value>) -> Result<()>;

    fn insert(&mut self, table: Table, record: Value) -> Result<()>;

    /// Make previous updates durable.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn places(&self, kind: PlaceKind) -> Result<Vec<PlaceRecord>> {
        self.scan(kind.table())?
            .iter()
            .map(|value| PlaceRecord::from_json(kind, value))
            .collect()
    }

    fn housenumbers(&self) -> Result<Vec<AddressRecord>> {
        self.scan(Table::Housenumber)?
            .iter()
            .map(AddressRecord::from_json)
            .collect()
    }

    fn streets(&self) -> Result<Vec<StreetRecord>> {
        self.scan(Table::Linestring)?
            .iter()
            .map(StreetRecord::from_json)
            .collect()
    }
}

/// Copy `fields` over the matching keys of a stored object.
fn merge_fields(record: &mut Value, fields: Map<String, Value>) {
    if let Value::Object(object) = record {
        for (key, value) in fields {
            object.insert(key, value);
        }
    }
}
