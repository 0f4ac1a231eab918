//! Building source and layer definitions.

use epcmap_core::models::{
    FeatureFilter, LayerKind, LayerSpec, SourceSpec, FEATURE_ID_PROPERTY,
};
use serde_json::json;

pub const BUILDING_SOURCE: &str = "buildings";
pub const BUILDING_SOURCE_LAYER: &str = "TopographicArea_2";
pub const BUILDING_TILES_URL: &str =
    "https://api.os.uk/maps/vector/v1/vts?srs=3857";

/// Unfiltered footprints of every building in the source
pub const FOOTPRINT_LAYER: &str = "OS/TopographicArea_2/Building/1";

pub const SINGLE_DWELLING_LAYER: &str = "OS/TopographicArea_2/Building/1_3D-Single-Dwelling";
pub const MULTI_DWELLING_LAYER: &str = "OS/TopographicArea_2/Building/1_3D-Multi-Dwelling";
pub const HIGHLIGHT_LAYER: &str = "OS/TopographicArea_2/Building/1_3D-Highlighted";

pub const COLOUR_PROPERTY: &str = "fill-extrusion-color";
pub const PATTERN_PROPERTY: &str = "fill-extrusion-pattern";

/// Layers holding building features that can be clicked and painted
pub const BUILDING_LAYERS: [&str; 2] = [SINGLE_DWELLING_LAYER, MULTI_DWELLING_LAYER];

pub fn building_source(tiles_url: &str) -> SourceSpec {
    SourceSpec {
        id: BUILDING_SOURCE.to_string(),
        definition: json!({ "type": "vector", "url": tiles_url }),
    }
}

fn extrusion_layer(id: &str, min_zoom: f64, paint: serde_json::Value) -> LayerSpec {
    LayerSpec {
        id: id.to_string(),
        kind: LayerKind::FillExtrusion,
        source: BUILDING_SOURCE.to_string(),
        source_layer: Some(BUILDING_SOURCE_LAYER.to_string()),
        min_zoom: Some(min_zoom),
        // Nothing is drawn until the first compiled filter arrives
        filter: (id != FOOTPRINT_LAYER).then(|| FeatureFilter::none(FEATURE_ID_PROPERTY).to_value()),
        paint: match paint {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        },
    }
}

/// Footprint, single-dwelling, multi-dwelling and highlight layers, bottom to top
pub fn building_layers(min_zoom: f64, default_colour: &str, default_pattern: &str) -> Vec<LayerSpec> {
    let height = json!(["get", "RelHMax"]);
    vec![
        extrusion_layer(
            FOOTPRINT_LAYER,
            min_zoom,
            json!({
                COLOUR_PROPERTY: default_colour,
                "fill-extrusion-height": height,
                "fill-extrusion-opacity": 0.4,
            }),
        ),
        extrusion_layer(
            SINGLE_DWELLING_LAYER,
            min_zoom,
            json!({
                COLOUR_PROPERTY: default_colour,
                "fill-extrusion-height": height,
                "fill-extrusion-opacity": 1.0,
            }),
        ),
        extrusion_layer(
            MULTI_DWELLING_LAYER,
            min_zoom,
            json!({
                PATTERN_PROPERTY: default_pattern,
                "fill-extrusion-height": height,
                "fill-extrusion-opacity": 1.0,
            }),
        ),
        extrusion_layer(
            HIGHLIGHT_LAYER,
            min_zoom,
            json!({
                COLOUR_PROPERTY: "#3670b3",
                "fill-extrusion-height": height,
                "fill-extrusion-opacity": 0.8,
            }),
        ),
    ]
}
