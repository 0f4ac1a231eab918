use epcmap_core::models::{BuildingRecord, FilterKey, FilterSummary};
use std::collections::BTreeSet;

/// Candidate values for every filter key present in the building set.
///
/// Values are de-duplicated and sorted; keys no building carries a value for
/// are omitted.
pub fn summarise_filters(buildings: &[BuildingRecord]) -> FilterSummary {
    let mut summary = FilterSummary::new();
    for key in FilterKey::all() {
        let values: BTreeSet<String> =
            buildings.iter().filter_map(|building| key.value_of(building)).collect();
        if !values.is_empty() {
            summary.insert(key, values.into_iter().collect());
        }
    }
    summary
}
