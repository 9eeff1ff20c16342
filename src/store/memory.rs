use hashbrown::HashMap;
use serde_json::{Map, Value};

use super::{merge_fields, RecordStore};
use crate::error::{EnrichError, Result};
use crate::models::{RecordReader, Table};

/// In-memory store keeping each table in insertion order.
///
/// Records are kept exactly as inserted. Beyond the id, malformed fields are
/// accepted so validation still happens on read.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    tables: HashMap<Table, Vec<Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a record by id.
    pub fn get(&self, table: Table, id: i64) -> Option<&Value> {
        self.tables
            .get(&table)?
            .iter()
            .find(|record| record["id"].as_i64() == Some(id))
    }
}

impl RecordStore for MemoryStore {
    fn scan(&self, table: Table) -> Result<Vec<Value>> {
        Ok(self.tables.get(&table).cloned().unwrap_or_default())
    }

    fn update(&mut self, table: Table, id: i64, fields: Map<String, Value>) -> Result<()> {
        let record = self
            .tables
            .get_mut(&table)
            .and_then(|records| {
                records
                    .iter_mut()
                    .find(|record| record["id"].as_i64() == Some(id))
            })
            .ok_or(EnrichError::MissingRecord { table, id })?;

        merge_fields(record, fields);
        Ok(())
    }

    /// Append a record. Only the id is checked; other fields are validated on read.
    fn insert(&mut self, table: Table, record: Value) -> Result<()> {
        RecordReader::new(table, &record)?.id()?;
        self.tables.entry(table).or_default().push(record);
        Ok(())
    }
}
