//! Attribute filters applied to the building set.
//!
//! Keys combine with AND, values within a key combine with OR. A key with no
//! accepted values places no constraint on the set.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::BuildingRecord;

/// Building attribute a filter can constrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKey {
    Postcode,
    EpcRating,
    BuiltForm,
    YearOfAssessment,
    ConstructionAgeBand,
    WallConstruction,
    WallInsulation,
    FloorConstruction,
    FloorInsulation,
    RoofConstruction,
    RoofInsulationLocation,
    RoofInsulationThickness,
    WindowGlazing,
    Flagged,
}

/// (key, name) pairs used for parsing and display
const KEY_NAMES: [(FilterKey, &str); 14] = [
    (FilterKey::Postcode, "postcode"),
    (FilterKey::EpcRating, "epc_rating"),
    (FilterKey::BuiltForm, "built_form"),
    (FilterKey::YearOfAssessment, "year_of_assessment"),
    (FilterKey::ConstructionAgeBand, "construction_age_band"),
    (FilterKey::WallConstruction, "wall_construction"),
    (FilterKey::WallInsulation, "wall_insulation"),
    (FilterKey::FloorConstruction, "floor_construction"),
    (FilterKey::FloorInsulation, "floor_insulation"),
    (FilterKey::RoofConstruction, "roof_construction"),
    (FilterKey::RoofInsulationLocation, "roof_insulation_location"),
    (FilterKey::RoofInsulationThickness, "roof_insulation_thickness"),
    (FilterKey::WindowGlazing, "window_glazing"),
    (FilterKey::Flagged, "flagged"),
];

impl FilterKey {
    pub fn all() -> impl Iterator<Item = FilterKey> {
        KEY_NAMES.iter().map(|(key, _)| *key)
    }

    pub fn name(self) -> &'static str {
        KEY_NAMES.iter().find(|(key, _)| *key == self).map(|(_, name)| *name).unwrap_or("unknown")
    }

    /// Parse a key name; accepts `-` or `_` as separator, any case
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_lowercase().replace('-', "_");
        KEY_NAMES.iter().find(|(_, n)| *n == normalized).map(|(key, _)| *key)
    }

    /// The value a building holds for this key, as a filterable label
    pub fn value_of(self, building: &BuildingRecord) -> Option<String> {
        let attrs = &building.attributes;
        match self {
            FilterKey::Postcode => Some(building.postcode.clone()).filter(|p| !p.is_empty()),
            FilterKey::EpcRating => Some(
                building.epc.map(|r| r.label().to_string()).unwrap_or_else(|| "none".to_string()),
            ),
            FilterKey::BuiltForm => attrs.built_form.clone(),
            FilterKey::YearOfAssessment => building.year_of_assessment().map(|y| y.to_string()),
            FilterKey::ConstructionAgeBand => attrs.construction_age_band.clone(),
            FilterKey::WallConstruction => attrs.wall_construction.clone(),
            FilterKey::WallInsulation => attrs.wall_insulation.clone(),
            FilterKey::FloorConstruction => attrs.floor_construction.clone(),
            FilterKey::FloorInsulation => attrs.floor_insulation.clone(),
            FilterKey::RoofConstruction => attrs.roof_construction.clone(),
            FilterKey::RoofInsulationLocation => attrs.roof_insulation_location.clone(),
            FilterKey::RoofInsulationThickness => attrs.roof_insulation_thickness.clone(),
            FilterKey::WindowGlazing => attrs.window_glazing.clone(),
            FilterKey::Flagged => Some(building.is_flagged().to_string()),
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepted values per filter key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeFilters {
    accepted: BTreeMap<FilterKey, BTreeSet<String>>,
}

impl AttributeFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept an additional value for a key
    pub fn accept(mut self, key: FilterKey, value: impl Into<String>) -> Self {
        self.accepted.entry(key).or_default().insert(value.into());
        self
    }

    /// Replace the accepted values for a key; an empty set removes the constraint
    pub fn set(&mut self, key: FilterKey, values: impl IntoIterator<Item = impl Into<String>>) {
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            self.accepted.remove(&key);
        } else {
            self.accepted.insert(key, values);
        }
    }

    pub fn clear(&mut self) {
        self.accepted.clear();
    }

    /// True if any key carries at least one accepted value
    pub fn is_active(&self) -> bool {
        self.accepted.values().any(|values| !values.is_empty())
    }

    pub fn accepted(&self, key: FilterKey) -> Option<&BTreeSet<String>> {
        self.accepted.get(&key).filter(|values| !values.is_empty())
    }

    /// Check a building against every active key
    pub fn matches(&self, building: &BuildingRecord) -> bool {
        self.accepted.iter().filter(|(_, values)| !values.is_empty()).all(|(key, values)| {
            key.value_of(building).map(|value| values.contains(&value)).unwrap_or(false)
        })
    }
}

/// Candidate values per filter key for the current area
pub type FilterSummary = BTreeMap<FilterKey, Vec<String>>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EpcRating, LngLat};

    fn building(postcode: &str, epc: Option<EpcRating>, built_form: Option<&str>) -> BuildingRecord {
        BuildingRecord {
            uprn: "1".to_string(),
            parent_toid: "osgb1".to_string(),
            toid: None,
            address: String::new(),
            epc,
            postcode: postcode.to_string(),
            attributes: crate::models::BuildingAttributes {
                built_form: built_form.map(str::to_string),
                ..Default::default()
            },
            location: LngLat::new(0.0, 0.0),
            flag: Default::default(),
            assessed_on: None,
        }
    }

    #[test]
    fn test_empty_filters_match_everything() {
        let filters = AttributeFilters::new();
        assert!(!filters.is_active());
        assert!(filters.matches(&building("PO30 1AA", None, None)));
    }

    #[test]
    fn test_values_within_key_are_or() {
        let filters = AttributeFilters::new()
            .accept(FilterKey::EpcRating, "A")
            .accept(FilterKey::EpcRating, "none");
        assert!(filters.matches(&building("", Some(EpcRating::A), None)));
        assert!(filters.matches(&building("", None, None)));
        assert!(!filters.matches(&building("", Some(EpcRating::C), None)));
    }

    #[test]
    fn test_keys_are_and() {
        let filters = AttributeFilters::new()
            .accept(FilterKey::Postcode, "PO30 1AA")
            .accept(FilterKey::BuiltForm, "Detached");
        assert!(filters.matches(&building("PO30 1AA", None, Some("Detached"))));
        assert!(!filters.matches(&building("PO30 1AA", None, Some("Mid-Terrace"))));
        assert!(!filters.matches(&building("PO30 1AA", None, None)));
    }

    #[test]
    fn test_set_empty_removes_constraint() {
        let mut filters = AttributeFilters::new().accept(FilterKey::Postcode, "PO30 1AA");
        filters.set(FilterKey::Postcode, Vec::<String>::new());
        assert!(!filters.is_active());
    }

    #[test]
    fn test_key_names() {
        assert_eq!(FilterKey::from_name("built-form"), Some(FilterKey::BuiltForm));
        assert_eq!(FilterKey::from_name("EPC_RATING"), Some(FilterKey::EpcRating));
        assert_eq!(FilterKey::from_name("colour"), None);
        for key in FilterKey::all() {
            assert_eq!(FilterKey::from_name(key.name()), Some(key));
        }
    }
}
