//! Property tests for the building grouping store

use epcmap_core::models::{AttributeFilters, BuildingRecord, EpcRating, FilterKey, LngLat};
use epcmap_store::{filter_by_attributes, group_by_feature, BuildingStore};
use proptest::prelude::*;

fn arb_rating() -> impl Strategy<Value = Option<EpcRating>> {
    prop_oneof![Just(None), (0usize..7).prop_map(|i| Some(EpcRating::ALL[i]))]
}

prop_compose! {
    fn arb_building()(
        uprn in 0u32..10_000,
        parent in 0u32..8,
        own_toid in prop::option::of(0u32..8),
        epc in arb_rating(),
        postcode in prop::sample::select(vec!["PO30 1AA", "PO30 2BB", "PO31 7XY"]),
    ) -> BuildingRecord {
        BuildingRecord {
            uprn: uprn.to_string(),
            parent_toid: format!("osgb{}", parent),
            toid: own_toid.map(|t| format!("osgb{}", t)),
            address: String::new(),
            epc,
            postcode: postcode.to_string(),
            attributes: Default::default(),
            location: LngLat::new(-1.3, 50.7),
            flag: Default::default(),
            assessed_on: None,
        }
    }
}

proptest! {
    #[test]
    fn empty_filters_are_identity(buildings in prop::collection::vec(arb_building(), 0..40)) {
        let filtered = filter_by_attributes(&buildings, &AttributeFilters::new());
        prop_assert_eq!(filtered.len(), buildings.len());
        for (kept, original) in filtered.iter().zip(buildings.iter()) {
            prop_assert!(std::ptr::eq(*kept, original));
        }
    }

    #[test]
    fn every_grouped_building_carries_its_key(
        buildings in prop::collection::vec(arb_building(), 0..40),
    ) {
        let grouping = group_by_feature(&buildings);
        for (feature_id, members) in grouping.iter() {
            for building in members {
                prop_assert_eq!(building.feature_id(), feature_id);
            }
        }
        prop_assert_eq!(grouping.building_count(), buildings.len());
    }

    #[test]
    fn grouping_keys_are_ascending(buildings in prop::collection::vec(arb_building(), 0..40)) {
        let grouping = group_by_feature(&buildings);
        let ids: Vec<&str> = grouping.feature_ids().collect();
        let mut sorted = ids.clone();
        sorted.sort();
        prop_assert_eq!(ids, sorted);
    }

    #[test]
    fn filtered_buildings_all_match(
        buildings in prop::collection::vec(arb_building(), 0..40),
        postcode in prop::sample::select(vec!["PO30 1AA", "PO31 7XY"]),
    ) {
        let filters = AttributeFilters::new().accept(FilterKey::Postcode, postcode);
        let mut store = BuildingStore::new();
        store.set_buildings(buildings.clone());
        let filtered = store.filtered(&filters);
        for (_, members) in filtered.iter() {
            for building in members {
                prop_assert_eq!(building.postcode.as_str(), postcode);
            }
        }
        let expected = buildings.iter().filter(|b| b.postcode == postcode).count();
        prop_assert_eq!(filtered.building_count(), expected);
    }
}
