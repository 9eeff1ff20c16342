//! Name pass: picks the display name of every place and gathers its
//! alternative names.

use hashbrown::HashSet;
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::normalize_whitespace;
use crate::config::NameConfig;
use crate::error::Result;
use crate::models::{PlaceKind, PlaceRecord};
use crate::store::RecordStore;

/// Separator of the stored `alternative_names` string
pub const ALTERNATIVE_NAMES_DELIMITER: &str = ";";

/// Outcome of resolving one place
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNames {
    pub name: String,
    pub alternative_names: Vec<String>,
}

impl ResolvedNames {
    /// Alternative names in their stored form.
    pub fn joined_alternatives(&self) -> String {
        self.alternative_names.join(ALTERNATIVE_NAMES_DELIMITER)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NamePassReport {
    pub records: usize,
    /// Records whose display name changed
    pub renamed: usize,
    pub with_alternatives: usize,
}

impl NamePassReport {
    fn add(&mut self, other: NamePassReport) {
        self.records += other.records;
        self.renamed += other.renamed;
        self.with_alternatives += other.with_alternatives;
    }
}

pub struct NameResolver {
    config: NameConfig,
}

impl NameResolver {
    pub fn new(config: NameConfig) -> Self {
        Self { config }
    }

    pub fn resolve(&self, place: &PlaceRecord) -> ResolvedNames {
        let name = self.select_name(place);
        let alternative_names = self.collect_alternative_names(place, &name);
        ResolvedNames {
            name,
            alternative_names,
        }
    }

    /// Pick the display name: the imported name if it is kept, else the first
    /// `name:<lang>` in priority order, else the imported name.
    pub fn select_name(&self, place: &PlaceRecord) -> String {
        let existing = normalize_whitespace(&place.name);
        if self.config.prefer_existing_name && !existing.is_empty() {
            return existing;
        }

        self.config
            .priority_languages
            .iter()
            .filter_map(|lang| place.all_tags.get(&format!("name:{}", lang)))
            .map(|value| normalize_whitespace(value))
            .find(|value| !value.is_empty())
            .unwrap_or(existing)
    }

    /// Every `name:<lang>` value plus the configured alternative-name tags,
    /// normalized, without `name` and without duplicates, in first-seen order.
    pub fn collect_alternative_names(&self, place: &PlaceRecord, name: &str) -> Vec<String> {
        let language_values = place.language_names().map(|(_, value)| value);
        let extra_values = self
            .config
            .alternative_name_keys
            .iter()
            .filter_map(|key| place.all_tags.get(key))
            .map(String::as_str);

        let mut seen = HashSet::new();
        let mut alternatives = Vec::new();

        for raw in language_values.chain(extra_values) {
            for part in raw.split(ALTERNATIVE_NAMES_DELIMITER) {
                let candidate = normalize_whitespace(part);
                if candidate.is_empty() || candidate == name {
                    continue;
                }
                if seen.insert(candidate.clone()) {
                    alternatives.push(candidate);
                }
            }
        }

        alternatives
    }

    /// Resolve and write back names for every point, line and polygon in the store.
    pub fn run<S: RecordStore>(&self, store: &mut S) -> Result<NamePassReport> {
        info!(
            "Setting names (priority: {})",
            self.config.priority_languages.join(", ")
        );

        let mut report = NamePassReport::default();
        for kind in PlaceKind::all() {
            let kind_report = self.run_kind(store, *kind)?;
            info!(
                "  {}: {} records, {} renamed, {} with alternative names",
                kind, kind_report.records, kind_report.renamed, kind_report.with_alternatives
            );
            report.add(kind_report);
        }

        store.flush()?;
        info!("Name pass finished for {} records", report.records);
        Ok(report)
    }

    fn run_kind<S: RecordStore>(&self, store: &mut S, kind: PlaceKind) -> Result<NamePassReport> {
        let places = store.places(kind)?;
        let mut report = NamePassReport::default();

        for place in &places {
            let resolved = self.resolve(place);
            let alternative_names = resolved.joined_alternatives();

            if resolved.name != place.name {
                debug!(
                    "{} {}: name {:?} -> {:?}",
                    kind, place.id, place.name, resolved.name
                );
                report.renamed += 1;
            }
            if !alternative_names.is_empty() {
                report.with_alternatives += 1;
            }
            report.records += 1;

            let mut fields = Map::new();
            fields.insert("name".to_string(), Value::String(resolved.name));
            fields.insert(
                "alternative_names".to_string(),
                Value::String(alternative_names),
            );
            store.update(kind.table(), place.id, fields)?;
        }

        Ok(report)
    }
}

impl Default for NameResolver {
    fn default() -> Self {
        Self::new(NameConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EnrichError;
    use crate::models::Table;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn alternatives(resolved: &ResolvedNames) -> Vec<&str> {
        resolved
            .alternative_names
            .iter()
            .map(String::as_str)
            .collect()
    }

    #[test]
    fn test_name_from_single_language_tag() {
        let resolver = NameResolver::default();
        let polygon = PlaceRecord::new(PlaceKind::Polygon, 1).with_tag("name:en", "Zurich");
        let line = PlaceRecord::new(PlaceKind::Line, 1).with_tag("name:de", "Rhein");

        assert_eq!(resolver.select_name(&polygon), "Zurich");
        assert_eq!(resolver.select_name(&line), "Rhein");
    }

    #[test]
    fn test_name_follows_priority() {
        let resolver = NameResolver::default();
        let lake = PlaceRecord::new(PlaceKind::Polygon, 2)
            .with_tag("name:fr", "Lac Leman")
            .with_tag("name:de", "Genfersee")
            .with_tag("name:en", "Lake Geneva");
        let river = PlaceRecord::new(PlaceKind::Line, 2)
            .with_tag("name:es", "Rin")
            .with_tag("name:it", "Reno")
            .with_tag("name:de", "Rhein");

        assert_eq!(resolver.select_name(&lake), "Lake Geneva");
        assert_eq!(resolver.select_name(&river), "Rhein");
    }

    #[test]
    fn test_priority_is_configurable() {
        let resolver = NameResolver::new(NameConfig {
            priority_languages: vec!["de".to_string(), "en".to_string()],
            ..NameConfig::default()
        });
        let lake = PlaceRecord::new(PlaceKind::Polygon, 2)
            .with_tag("name:en", "Lake Geneva")
            .with_tag("name:de", "Genfersee");

        assert_eq!(resolver.select_name(&lake), "Genfersee");
    }

    #[test]
    fn test_unprioritized_language_is_not_selected() {
        let resolver = NameResolver::default();
        let place = PlaceRecord::new(PlaceKind::Point, 1).with_tag("name:it", "Cervino");

        let resolved = resolver.resolve(&place);
        assert_eq!(resolved.name, "");
        assert_eq!(alternatives(&resolved), vec!["Cervino"]);
    }

    #[test]
    fn test_blank_priority_tag_skipped() {
        let resolver = NameResolver::default();
        let place = PlaceRecord::new(PlaceKind::Point, 1)
            .with_tag("name:en", " \t ")
            .with_tag("name:fr", "Cervin");

        assert_eq!(resolver.select_name(&place), "Cervin");
    }

    #[test]
    fn test_existing_name_kept() {
        let resolver = NameResolver::default();
        let place = PlaceRecord::new(PlaceKind::Point, 3)
            .with_name("Matterhorn")
            .with_tag("name:fr", "Cervin")
            .with_tag("name:it", "Cervino")
            .with_tag("alt_name", "Cervino");

        let resolved = resolver.resolve(&place);
        assert_eq!(resolved.name, "Matterhorn");
        assert_eq!(alternatives(&resolved), vec!["Cervin", "Cervino"]);
    }

    #[test]
    fn test_existing_name_replaced_when_not_preferred() {
        let resolver = NameResolver::new(NameConfig {
            prefer_existing_name: false,
            ..NameConfig::default()
        });
        let place = PlaceRecord::new(PlaceKind::Point, 3)
            .with_name("Matterhorn")
            .with_tag("name:fr", "Cervin");

        assert_eq!(resolver.select_name(&place), "Cervin");
    }

    #[test]
    fn test_existing_name_used_when_no_priority_tag() {
        let resolver = NameResolver::new(NameConfig {
            prefer_existing_name: false,
            ..NameConfig::default()
        });
        let place = PlaceRecord::new(PlaceKind::Point, 3)
            .with_name("Matterhorn")
            .with_tag("name:it", "Cervino");

        assert_eq!(resolver.select_name(&place), "Matterhorn");
    }

    #[test]
    fn test_alternatives_exclude_name() {
        let resolver = NameResolver::default();
        let place = PlaceRecord::new(PlaceKind::Point, 2)
            .with_name("Matterhorn")
            .with_tag("name:de", "Matterhorn")
            .with_tag("name:fr", "Cervin")
            .with_tag("name:it", "Cervino");

        let resolved = resolver.resolve(&place);
        assert!(!resolved.alternative_names.contains(&"Matterhorn".to_string()));
        assert_eq!(resolved.joined_alternatives(), "Cervin;Cervino");
    }

    #[test]
    fn test_alternatives_set_for_unnamed_place() {
        let resolver = NameResolver::default();
        let place = PlaceRecord::new(PlaceKind::Point, 1)
            .with_tag("name:de", "Matterhorn")
            .with_tag("name:fr", "Cervin")
            .with_tag("name:it", "Cervino");

        let resolved = resolver.resolve(&place);
        assert_eq!(resolved.name, "Cervin");
        assert_eq!(alternatives(&resolved), vec!["Matterhorn", "Cervino"]);
    }

    #[test]
    fn test_alternatives_empty_for_name_only() {
        let resolver = NameResolver::default();
        let place = PlaceRecord::new(PlaceKind::Point, 4).with_name("Matterhorn");

        let resolved = resolver.resolve(&place);
        assert_eq!(resolved.name, "Matterhorn");
        assert_eq!(resolved.joined_alternatives(), "");
    }

    #[test]
    fn test_nothing_to_resolve() {
        let resolved = NameResolver::default().resolve(&PlaceRecord::new(PlaceKind::Line, 9));
        assert_eq!(resolved.name, "");
        assert!(resolved.alternative_names.is_empty());
    }

    #[test]
    fn test_tabs_removed_from_name() {
        let resolver = NameResolver::default();
        let place = PlaceRecord::new(PlaceKind::Polygon, 3).with_name("Lake\t\tZurich");
        assert_eq!(resolver.select_name(&place), "Lake Zurich");
    }

    #[test]
    fn test_tabs_removed_from_alternatives() {
        let resolver = NameResolver::default();
        let place = PlaceRecord::new(PlaceKind::Polygon, 4)
            .with_name("Bodensee")
            .with_tag("name:en", "Lake         Constance")
            .with_tag("name:fr", "Lac\tde\tConstance");

        let joined = resolver.resolve(&place).joined_alternatives();
        assert_eq!(joined, "Lake Constance;Lac de Constance");
        assert!(!joined.contains('\t'));
        assert!(!joined.contains("  "));
    }

    #[test]
    fn test_normalized_duplicates_collapse() {
        let resolver = NameResolver::default();
        let place = PlaceRecord::new(PlaceKind::Polygon, 5)
            .with_name("Bodensee")
            .with_tag("name:de", "Bodensee\t")
            .with_tag("name:en", "Lake Constance")
            .with_tag("alt_name", "Lake  Constance");

        assert_eq!(alternatives(&resolver.resolve(&place)), vec!["Lake Constance"]);
    }

    #[test]
    fn test_delimited_alt_name_split() {
        let resolver = NameResolver::default();
        let place = PlaceRecord::new(PlaceKind::Point, 6)
            .with_name("Zürich")
            .with_tag("alt_name", "Zueri; Zürich ;Turicum");

        assert_eq!(resolver.resolve(&place).joined_alternatives(), "Zueri;Turicum");
    }

    #[test]
    fn test_extra_alternative_keys() {
        let resolver = NameResolver::new(NameConfig {
            alternative_name_keys: vec!["alt_name".to_string(), "old_name".to_string()],
            ..NameConfig::default()
        });
        let place = PlaceRecord::new(PlaceKind::Point, 7)
            .with_name("Chemnitz")
            .with_tag("old_name", "Karl-Marx-Stadt");

        assert_eq!(alternatives(&resolver.resolve(&place)), vec!["Karl-Marx-Stadt"]);
    }

    #[test]
    fn test_run_writes_back_all_kinds() {
        let mut store = MemoryStore::new();
        store
            .insert(
                Table::Polygon,
                json!({"id": 1, "name": "", "all_tags": {"name:en": "Zurich"}}),
            )
            .unwrap();
        store
            .insert(
                Table::Linestring,
                json!({"id": 1, "name": "", "all_tags": {"name:de": "Rhein"}, "parent_id": 5}),
            )
            .unwrap();
        store
            .insert(Table::Point, json!({"id": 4, "name": "Matterhorn"}))
            .unwrap();

        let report = NameResolver::default().run(&mut store).unwrap();

        assert_eq!(report.records, 3);
        assert_eq!(report.renamed, 2);
        assert_eq!(report.with_alternatives, 0);
        assert_eq!(store.get(Table::Polygon, 1).unwrap()["name"], "Zurich");

        let line = store.get(Table::Linestring, 1).unwrap();
        assert_eq!(line["name"], "Rhein");
        assert_eq!(line["parent_id"], 5);
        assert_eq!(store.get(Table::Point, 4).unwrap()["alternative_names"], "");
    }

    #[test]
    fn test_run_rejects_non_string_tag() {
        let mut store = MemoryStore::new();
        store
            .insert(
                Table::Point,
                json!({"id": 1, "name": "", "all_tags": {"name:en": ["Zurich"]}}),
            )
            .unwrap();

        let err = NameResolver::default().run(&mut store).unwrap_err();
        assert!(matches!(err, EnrichError::Validation { table: Table::Point, .. }));
        assert_eq!(store.get(Table::Point, 1).unwrap()["name"], "");
    }
}
