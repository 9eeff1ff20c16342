use serde_json::{Map, Value};
use sled::{Db, Tree};
use std::path::Path;
use tempfile::{Builder, TempDir};
use tracing::{debug, info};

use super::{merge_fields, RecordStore};
use crate::error::{EnrichError, Result};
use crate::models::{RecordReader, Table};

/// On-disk store backed by sled.
///
/// Each table is a sled tree keyed by the order-preserving encoding of the
/// record id, holding the record as a JSON document.
pub struct SledStore {
    db: Db,
    // Keeps a scratch directory alive for as long as the store.
    _temp_dir: Option<TempDir>,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening record store at {}", path.display());
        Ok(Self {
            db: sled::open(path)?,
            _temp_dir: None,
        })
    }

    /// Open a store in a fresh temporary directory, removed on drop.
    pub fn temporary() -> Result<Self> {
        let temp_dir = Builder::new().prefix("placenames-").tempdir()?;
        let db = sled::open(temp_dir.path())?;
        Ok(Self {
            db,
            _temp_dir: Some(temp_dir),
        })
    }

    /// Look up a record by id.
    pub fn get(&self, table: Table, id: i64) -> Result<Option<Value>> {
        self.tree(table)?
            .get(record_key(id))?
            .map(|bytes| serde_json::from_slice(&bytes).map_err(EnrichError::from))
            .transpose()
    }

    fn tree(&self, table: Table) -> Result<Tree> {
        Ok(self.db.open_tree(table.as_str())?)
    }
}

/// Big-endian id with the sign bit flipped, so keys sort like the ids
/// themselves (imposm stores relations under negative ids).
fn record_key(id: i64) -> [u8; 8] {
    ((id as u64) ^ (1 << 63)).to_be_bytes()
}

impl RecordStore for SledStore {
    fn scan(&self, table: Table) -> Result<Vec<Value>> {
        let tree = self.tree(table)?;
        let mut records = Vec::with_capacity(tree.len());
        for entry in tree.iter() {
            let (_, bytes) = entry?;
            records.push(serde_json::from_slice(&bytes)?);
        }
        debug!("Scanned {} records from {}", records.len(), table);
        Ok(records)
    }

    fn update(&mut self, table: Table, id: i64, fields: Map<String, Value>) -> Result<()> {
        let tree = self.tree(table)?;
        let key = record_key(id);
        let bytes = tree
            .get(key)?
            .ok_or(EnrichError::MissingRecord { table, id })?;

        let mut record: Value = serde_json::from_slice(&bytes)?;
        merge_fields(&mut record, fields);
        tree.insert(key, serde_json::to_vec(&record)?)?;
        Ok(())
    }

    /// Insert or replace a record. Records without a valid id cannot be keyed and are rejected.
    fn insert(&mut self, table: Table, record: Value) -> Result<()> {
        let id = RecordReader::new(table, &record)?.id()?;
        self.tree(table)?
            .insert(record_key(id), serde_json::to_vec(&record)?)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let bytes = self.db.flush()?;
        debug!("Flushed {} bytes to disk", bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_and_update() {
        let mut store = SledStore::temporary().unwrap();
        store
            .insert(
                Table::Polygon,
                json!({"id": 3, "name": "Lake\t\tZurich", "all_tags": {}}),
            )
            .unwrap();

        let mut fields = Map::new();
        fields.insert("name".into(), json!("Lake Zurich"));
        store.update(Table::Polygon, 3, fields).unwrap();
        store.flush().unwrap();

        let record = store.get(Table::Polygon, 3).unwrap().unwrap();
        assert_eq!(record["name"], "Lake Zurich");
        assert!(record["all_tags"].is_object());
    }

    #[test]
    fn test_scan_is_ordered_by_id() {
        let mut store = SledStore::temporary().unwrap();
        for id in [5, -3, 1, i64::MIN, 3] {
            store.insert(Table::Point, json!({ "id": id })).unwrap();
        }
        let ids: Vec<_> = store
            .scan(Table::Point)
            .unwrap()
            .iter()
            .map(|r| r["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![i64::MIN, -3, 1, 3, 5]);
        assert_eq!(store.get(Table::Point, -3).unwrap().unwrap()["id"], -3);
    }

    #[test]
    fn test_insert_without_id_rejected() {
        let mut store = SledStore::temporary().unwrap();
        let err = store.insert(Table::Point, json!({"name": "x"})).unwrap_err();
        assert!(matches!(err, EnrichError::Validation { .. }));
    }

    #[test]
    fn test_tables_are_separate() {
        let mut store = SledStore::temporary().unwrap();
        store.insert(Table::Point, json!({"id": 1})).unwrap();
        assert!(store.get(Table::Polygon, 1).unwrap().is_none());
        assert!(store.scan(Table::Housenumber).unwrap().is_empty());
    }
}
