//! Building dataset grouped by topographic feature id.
//!
//! The store is replaced wholesale on every fetch. Views derived from it are
//! pure functions and never touch the stored set.

use epcmap_core::models::{AttributeFilters, BuildingRecord, RenderedFeature, SearchPolygon};
use epcmap_geo::feature_within_polygon;
use std::collections::BTreeMap;

/// Buildings keyed by feature id, iterated in ascending id order.
///
/// Every building listed under a key has that key as its feature id. A key
/// with no buildings is a rendered feature without EPC data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopographicGrouping {
    features: BTreeMap<String, Vec<BuildingRecord>>,
}

impl TopographicGrouping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a feature with no buildings, keeping any existing entry
    pub fn insert_empty(&mut self, feature_id: impl Into<String>) {
        self.features.entry(feature_id.into()).or_default();
    }

    fn push(&mut self, building: BuildingRecord) {
        self.features.entry(building.feature_id().to_string()).or_default().push(building);
    }

    pub fn get(&self, feature_id: &str) -> Option<&[BuildingRecord]> {
        self.features.get(feature_id).map(Vec::as_slice)
    }

    pub fn contains(&self, feature_id: &str) -> bool {
        self.features.contains_key(feature_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[BuildingRecord])> {
        self.features.iter().map(|(id, buildings)| (id.as_str(), buildings.as_slice()))
    }

    pub fn feature_ids(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Number of buildings across all features
    pub fn building_count(&self) -> usize {
        self.features.values().map(Vec::len).sum()
    }
}

/// Group buildings by feature id, preserving input order within a feature
pub fn group_by_feature<'a>(
    buildings: impl IntoIterator<Item = &'a BuildingRecord>,
) -> TopographicGrouping {
    let mut grouping = TopographicGrouping::new();
    for building in buildings {
        grouping.push(building.clone());
    }
    grouping
}

/// Buildings passing every active attribute filter, in input order.
///
/// With no active filter the result is every input building, same order.
pub fn filter_by_attributes<'a>(
    buildings: &'a [BuildingRecord],
    filters: &AttributeFilters,
) -> Vec<&'a BuildingRecord> {
    if !filters.is_active() {
        return buildings.iter().collect();
    }
    buildings.iter().filter(|building| filters.matches(building)).collect()
}

/// Restrict a grouping to the features currently rendered.
///
/// A feature rendered as several fragments is inside `polygon` (when given)
/// only if every fragment is. Rendered features missing from `grouping` are
/// kept with no buildings when `include_unmatched` is set, so they still
/// receive a default colour.
pub fn filter_within_viewport_and_polygon(
    grouping: &TopographicGrouping,
    rendered: &[RenderedFeature],
    polygon: Option<&SearchPolygon>,
    include_unmatched: bool,
) -> TopographicGrouping {
    let mut inside: BTreeMap<&str, bool> = BTreeMap::new();
    for feature in rendered {
        let within = polygon.map_or(true, |polygon| feature_within_polygon(feature, polygon));
        *inside.entry(feature.id.as_str()).or_insert(true) &= within;
    }

    let mut visible = TopographicGrouping::new();
    for (feature_id, _) in inside.into_iter().filter(|(_, within)| *within) {
        match grouping.get(feature_id) {
            Some(buildings) => {
                visible.features.insert(feature_id.to_string(), buildings.to_vec());
            }
            None if include_unmatched => visible.insert_empty(feature_id),
            None => {}
        }
    }
    visible
}

/// Authoritative building set for the current area
#[derive(Debug, Clone, Default)]
pub struct BuildingStore {
    buildings: Vec<BuildingRecord>,
    grouping: TopographicGrouping,
    generation: u64,
}

impl BuildingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole dataset
    pub fn set_buildings(&mut self, buildings: Vec<BuildingRecord>) {
        self.grouping = group_by_feature(&buildings);
        self.buildings = buildings;
        self.generation += 1;
        tracing::debug!(
            generation = self.generation,
            buildings = self.buildings.len(),
            features = self.grouping.len(),
            "building set replaced"
        );
    }

    pub fn buildings(&self) -> &[BuildingRecord] {
        &self.buildings
    }

    pub fn grouping(&self) -> &TopographicGrouping {
        &self.grouping
    }

    /// Incremented on every replacement
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    pub fn building(&self, uprn: &str) -> Option<&BuildingRecord> {
        self.buildings.iter().find(|b| b.uprn == uprn)
    }

    /// Buildings of one feature; empty for unknown ids
    pub fn buildings_for(&self, feature_id: &str) -> &[BuildingRecord] {
        self.grouping.get(feature_id).unwrap_or(&[])
    }

    /// Grouping of the buildings passing the attribute filters
    pub fn filtered(&self, filters: &AttributeFilters) -> TopographicGrouping {
        if !filters.is_active() {
            return self.grouping.clone();
        }
        group_by_feature(filter_by_attributes(&self.buildings, filters))
    }
}
