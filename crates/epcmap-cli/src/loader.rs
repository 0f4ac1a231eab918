//! Fixture loading for the paint command

use anyhow::{bail, Context, Result};
use epcmap_core::models::{AttributeFilters, FilterKey, LngLat, SearchPolygon, FEATURE_ID_PROPERTY};
use epcmap_geo::IndexedFootprint;
use epcmap_render::layers::BUILDING_SOURCE_LAYER;
use geojson::{Feature, GeoJson};
use std::fs;
use std::path::Path;

fn read_geojson(path: &Path) -> Result<GeoJson> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    content.parse::<GeoJson>().with_context(|| format!("Failed to parse GeoJSON in {}", path.display()))
}

fn ring(positions: &[Vec<f64>]) -> Vec<LngLat> {
    positions
        .iter()
        .filter_map(|p| Some(LngLat::new(*p.first()?, *p.get(1)?)))
        .collect()
}

/// Exterior rings of a polygonal geometry
fn exterior_rings(value: &geojson::Value) -> Vec<Vec<LngLat>> {
    match value {
        geojson::Value::Polygon(rings) => rings.first().map(|r| ring(r)).into_iter().collect(),
        geojson::Value::MultiPolygon(polygons) => {
            polygons.iter().filter_map(|rings| rings.first()).map(|r| ring(r)).collect()
        }
        _ => Vec::new(),
    }
}

fn feature_id(feature: &Feature) -> Option<String> {
    if let Some(toid) = feature.property(FEATURE_ID_PROPERTY) {
        return match toid {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        };
    }
    match &feature.id {
        Some(geojson::feature::Id::String(s)) => Some(s.clone()),
        Some(geojson::feature::Id::Number(n)) => Some(n.to_string()),
        None => None,
    }
}

/// Building footprints keyed by topographic id
pub fn load_footprints(path: &Path) -> Result<Vec<IndexedFootprint>> {
    let features = match read_geojson(path)? {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => bail!("Footprints must be GeoJSON features with a TOID property"),
    };

    let mut footprints = Vec::new();
    for feature in &features {
        let Some(id) = feature_id(feature) else {
            tracing::warn!("footprint without TOID skipped");
            continue;
        };
        let rings = feature.geometry.as_ref().map(|g| exterior_rings(&g.value)).unwrap_or_default();
        if rings.is_empty() {
            tracing::warn!(toid = %id, "footprint without polygon geometry skipped");
        }
        for ring in rings {
            footprints.push(IndexedFootprint::new(id.clone(), BUILDING_SOURCE_LAYER, ring));
        }
    }
    Ok(footprints)
}

/// Search area from the first polygon in a GeoJSON document
pub fn load_polygon(path: &Path) -> Result<SearchPolygon> {
    let geometries: Vec<geojson::Value> = match read_geojson(path)? {
        GeoJson::Geometry(geometry) => vec![geometry.value],
        GeoJson::Feature(feature) => feature.geometry.map(|g| g.value).into_iter().collect(),
        GeoJson::FeatureCollection(fc) => {
            fc.features.into_iter().filter_map(|f| f.geometry.map(|g| g.value)).collect()
        }
    };
    let ring = geometries
        .iter()
        .flat_map(exterior_rings)
        .next()
        .with_context(|| format!("No polygon found in {}", path.display()))?;
    Ok(SearchPolygon::new(ring)?)
}

/// Parse `key=value` pairs into attribute filters
pub fn parse_filters(pairs: &[String]) -> Result<AttributeFilters> {
    let mut filters = AttributeFilters::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Invalid filter '{}': expected key=value", pair);
        };
        let Some(key) = FilterKey::from_name(key) else {
            let known: Vec<&str> = FilterKey::all().map(FilterKey::name).collect();
            bail!("Unknown filter key '{}'. Known keys: {}", key, known.join(", "));
        };
        // A blank value leaves the key unconstrained
        if !value.trim().is_empty() {
            filters = filters.accept(key, value.trim());
        }
    }
    Ok(filters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_footprints() {
        let file = write(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"TOID":"osgb1"},
                 "geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}},
                {"type":"Feature","id":"osgb2","properties":{},
                 "geometry":{"type":"MultiPolygon","coordinates":[[[[2,2],[3,2],[3,3],[2,2]]],[[[4,4],[5,4],[5,5],[4,4]]]]}},
                {"type":"Feature","properties":{},
                 "geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}}
            ]}"#,
        );
        let footprints = load_footprints(file.path()).unwrap();
        let ids: Vec<&str> = footprints.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["osgb1", "osgb2", "osgb2"]);
        assert_eq!(footprints[0].footprint.len(), 4);
        assert_eq!(footprints[0].layer, BUILDING_SOURCE_LAYER);
    }

    #[test]
    fn test_load_polygon() {
        let file = write(r#"{"type":"Polygon","coordinates":[[[0,0],[2,0],[2,2],[0,2],[0,0]]]}"#);
        let polygon = load_polygon(file.path()).unwrap();
        assert_eq!(polygon.ring().len(), 5);

        let empty = write(r#"{"type":"FeatureCollection","features":[]}"#);
        assert!(load_polygon(empty.path()).is_err());
    }

    #[test]
    fn test_parse_filters() {
        let filters = parse_filters(&[
            "epc-rating=A".to_string(),
            "epc_rating=B".to_string(),
            "postcode=PO30 1AA".to_string(),
        ])
        .unwrap();
        assert_eq!(filters.accepted(FilterKey::EpcRating).unwrap().len(), 2);
        assert!(filters.accepted(FilterKey::Postcode).unwrap().contains("PO30 1AA"));

        assert!(parse_filters(&["colour=red".to_string()]).is_err());
        assert!(parse_filters(&["postcode".to_string()]).is_err());
        assert!(!parse_filters(&["postcode= ".to_string()]).unwrap().is_active());
    }
}
