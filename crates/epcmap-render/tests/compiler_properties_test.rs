//! Property tests for paint compilation and rating aggregation

use epcmap_core::models::{BuildingRecord, EpcRating, LngLat};
use epcmap_render::{compile, mean_rating, DisplayMode, Palette};
use epcmap_store::group_by_feature;
use proptest::prelude::*;

fn arb_rating() -> impl Strategy<Value = Option<EpcRating>> {
    prop_oneof![Just(None), (0usize..7).prop_map(|i| Some(EpcRating::ALL[i]))]
}

fn arb_mode() -> impl Strategy<Value = DisplayMode> {
    prop_oneof![Just(DisplayMode::Standard), Just(DisplayMode::ColourBlind)]
}

prop_compose! {
    fn arb_building()(
        uprn in 0u32..10_000,
        feature in 0u32..12,
        epc in arb_rating(),
    ) -> BuildingRecord {
        BuildingRecord {
            uprn: uprn.to_string(),
            parent_toid: format!("osgb{:02}", feature),
            toid: None,
            address: String::new(),
            epc,
            postcode: String::new(),
            attributes: Default::default(),
            location: LngLat::new(-1.3, 50.7),
            flag: Default::default(),
            assessed_on: None,
        }
    }
}

proptest! {
    #[test]
    fn every_expression_ends_with_fallback(
        buildings in prop::collection::vec(arb_building(), 0..40),
        mode in arb_mode(),
    ) {
        let palette = Palette::new(mode);
        let compiled = compile(&group_by_feature(&buildings), &palette);
        for layer in compiled.layers() {
            let value = layer.expression.to_value();
            let items = value.as_array().unwrap();
            prop_assert_eq!(items[0].as_str(), Some("match"));
            prop_assert_eq!(items.len(), 3 + 2 * layer.expression.entries().len());
            let last = items.last().unwrap().as_str().unwrap();
            prop_assert!(!last.is_empty());
            prop_assert_eq!(last, layer.expression.fallback());
        }
        prop_assert_eq!(compiled.single.expression.fallback(), palette.default_colour());
        prop_assert_eq!(compiled.multi.expression.fallback(), palette.default_pattern());
    }

    #[test]
    fn features_are_routed_by_cardinality(
        buildings in prop::collection::vec(arb_building(), 1..40),
    ) {
        let palette = Palette::default();
        let grouping = group_by_feature(&buildings);
        let compiled = compile(&grouping, &palette);

        for (feature_id, dwellings) in grouping.iter() {
            let single = compiled.single.filter.allows(feature_id);
            let multi = compiled.multi.filter.allows(feature_id);
            prop_assert!(single != multi);
            if dwellings.len() == 1 {
                let expected = match dwellings[0].epc {
                    Some(rating) => palette.colour_for(Some(rating)).to_string(),
                    None => palette.default_pattern(),
                };
                prop_assert!(single);
                prop_assert_eq!(compiled.single.expression.resolve(feature_id), expected.as_str());
            } else {
                let ratings: Vec<EpcRating> = dwellings.iter().filter_map(|b| b.epc).collect();
                let expected = palette.pattern_for(&ratings);
                prop_assert!(multi);
                prop_assert_eq!(compiled.multi.expression.resolve(feature_id), expected.as_str());
            }
        }
    }

    #[test]
    fn filter_ids_match_expression_labels(
        buildings in prop::collection::vec(arb_building(), 0..40),
    ) {
        let compiled = compile(&group_by_feature(&buildings), &Palette::default());
        for layer in compiled.layers() {
            let labels: Vec<&str> =
                layer.expression.entries().iter().map(|(id, _)| id.as_str()).collect();
            let ids: Vec<&str> = layer.filter.ids.iter().map(String::as_str).collect();
            prop_assert_eq!(&labels, &ids);
            let mut sorted = labels.clone();
            sorted.sort();
            prop_assert_eq!(labels, sorted);
        }
    }

    #[test]
    fn mean_rating_stays_within_inputs(
        ratings in prop::collection::vec((0usize..7).prop_map(|i| EpcRating::ALL[i]), 1..20),
    ) {
        let mean = mean_rating(&ratings).unwrap();
        let best = ratings.iter().map(|r| r.weight()).min().unwrap();
        let worst = ratings.iter().map(|r| r.weight()).max().unwrap();
        prop_assert!(mean.weight() >= best);
        prop_assert!(mean.weight() <= worst);
    }
}
