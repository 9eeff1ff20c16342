//! Lookup table of street linestrings by parent and name.

use hashbrown::HashMap;
use tracing::info;

use crate::models::StreetRecord;

pub struct StreetIndex {
    /// parent_id -> name -> street ids, ascending
    by_parent: HashMap<i64, HashMap<String, Vec<i64>>>,
    /// Merge target of every known street, indexed or not
    merged_into: HashMap<i64, Option<i64>>,
    indexed: usize,
}

impl StreetIndex {
    /// Build the index. Streets without a parent or with an empty name can
    /// never match a housenumber and are only kept as merge targets.
    pub fn build(streets: &[StreetRecord]) -> Self {
        let mut by_parent: HashMap<i64, HashMap<String, Vec<i64>>> = HashMap::new();
        let mut merged_into = HashMap::with_capacity(streets.len());
        let mut indexed = 0;

        for street in streets {
            merged_into.insert(street.id, street.merged_into);

            let (Some(parent_id), Some(name)) = (street.parent_id, street.name.as_deref()) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }

            by_parent
                .entry(parent_id)
                .or_default()
                .entry(name.to_string())
                .or_default()
                .push(street.id);
            indexed += 1;
        }

        for ids in by_parent.values_mut().flat_map(|names| names.values_mut()) {
            ids.sort_unstable();
            ids.dedup();
        }

        info!(
            "Street index built with {} of {} linestrings under {} parents",
            indexed,
            streets.len(),
            by_parent.len()
        );

        Self {
            by_parent,
            merged_into,
            indexed,
        }
    }

    /// Street ids with exactly this parent and name, lowest id first.
    pub fn candidates(&self, parent_id: i64, name: &str) -> &[i64] {
        self.by_parent
            .get(&parent_id)
            .and_then(|names| names.get(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Where a street was merged into, if it is known and merged.
    pub fn merge_target(&self, street_id: i64) -> Option<i64> {
        self.merged_into.get(&street_id).copied().flatten()
    }

    /// Number of streets that can be matched
    pub fn len(&self) -> usize {
        self.indexed
    }

    pub fn is_empty(&self) -> bool {
        self.indexed == 0
    }
}
