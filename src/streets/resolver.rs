//! Street pass: sets `street_id` on housenumbers.

use hashbrown::HashSet;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::StreetIndex;
use crate::config::{MergeResolution, StreetConfig};
use crate::error::Result;
use crate::models::Table;
use crate::store::RecordStore;

/// A matched street
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreetResolution {
    /// Street to store on the housenumber, after following merges
    pub street_id: i64,
    /// Street whose parent and name matched
    pub matched_id: i64,
    /// Number of streets that matched equally well
    pub candidates: usize,
}

impl StreetResolution {
    pub fn is_redirected(&self) -> bool {
        self.street_id != self.matched_id
    }

    pub fn is_ambiguous(&self) -> bool {
        self.candidates > 1
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreetPassReport {
    pub addresses: usize,
    /// Housenumbers without street name or parent
    pub skipped: usize,
    pub matched: usize,
    pub unmatched: usize,
    /// Matches stored as a merge target instead of the matched street
    pub redirected: usize,
    pub ambiguous: usize,
}

#[derive(Default)]
pub struct StreetResolver {
    config: StreetConfig,
}

impl StreetResolver {
    pub fn new(config: StreetConfig) -> Self {
        Self { config }
    }

    /// Find the street for a housenumber under `parent_id` named `street`.
    ///
    /// Names compare exactly. When several streets match, the lowest id wins.
    pub fn resolve(
        &self,
        index: &StreetIndex,
        parent_id: i64,
        street: &str,
    ) -> Option<StreetResolution> {
        let candidates = index.candidates(parent_id, street);
        let matched_id = *candidates.first()?;

        Some(StreetResolution {
            street_id: self.follow_merges(index, matched_id),
            matched_id,
            candidates: candidates.len(),
        })
    }

    /// Map a street to the one it was merged into.
    pub fn follow_merges(&self, index: &StreetIndex, street_id: i64) -> i64 {
        match self.config.merge_resolution {
            MergeResolution::SingleHop => index.merge_target(street_id).unwrap_or(street_id),
            MergeResolution::FollowChain => {
                let mut visited = HashSet::new();
                visited.insert(street_id);

                let mut current = street_id;
                while let Some(next) = index.merge_target(current) {
                    if !visited.insert(next) {
                        warn!(
                            "Street merge cycle starting at {}: {} merges back into {}",
                            street_id, current, next
                        );
                        break;
                    }
                    current = next;
                }
                current
            }
        }
    }

    /// Resolve and write back `street_id` for every housenumber in the store.
    /// Housenumbers without a match are left untouched.
    ///
    /// Street names are read from `osm_linestring.name` as stored, so run the
    /// name pass first for streets named only through `name:<lang>` tags.
    pub fn run<S: RecordStore>(&self, store: &mut S) -> Result<StreetPassReport> {
        info!(
            "Setting street ids by matching street name ({:?})",
            self.config.merge_resolution
        );

        let streets = store.streets()?;
        let index = StreetIndex::build(&streets);
        if index.is_empty() {
            warn!("No named street linestrings with a parent; no housenumber can match");
        }
        let addresses = store.housenumbers()?;
        info!(
            "Matching {} housenumbers against {} streets",
            addresses.len(),
            index.len()
        );

        let mut report = StreetPassReport::default();
        for address in &addresses {
            report.addresses += 1;

            let (Some(parent_id), Some(street)) = (address.parent_id, address.street.as_deref())
            else {
                report.skipped += 1;
                continue;
            };

            let Some(resolution) = self.resolve(&index, parent_id, street) else {
                report.unmatched += 1;
                continue;
            };

            if resolution.is_ambiguous() {
                warn!(
                    "Housenumber {}: {} streets named {:?} under parent {}, using {}",
                    address.id, resolution.candidates, street, parent_id, resolution.matched_id
                );
                report.ambiguous += 1;
            }
            if resolution.is_redirected() {
                debug!(
                    "Housenumber {}: street {} merged into {}",
                    address.id, resolution.matched_id, resolution.street_id
                );
                report.redirected += 1;
            }
            report.matched += 1;

            let mut fields = Map::new();
            fields.insert("street_id".to_string(), Value::from(resolution.street_id));
            store.update(Table::Housenumber, address.id, fields)?;
        }

        store.flush()?;
        info!(
            "Street pass: {} housenumbers, {} matched ({} via merges, {} ambiguous), {} unmatched, {} skipped",
            report.addresses,
            report.matched,
            report.redirected,
            report.ambiguous,
            report.unmatched,
            report.skipped
        );
        Ok(report)
    }
}
