//! Map instance configuration, render-layer descriptions and engine events.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{GeoBounds, LngLat, PixelPoint};

/// Camera position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraOptions {
    pub center: LngLat,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
}

impl Default for CameraOptions {
    fn default() -> Self {
        // Isle of Wight
        Self { center: LngLat::new(-1.2982, 50.6908), zoom: 15.0, pitch: 0.0, bearing: 0.0 }
    }
}

/// Everything needed to create a map instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub camera: CameraOptions,

    /// Style URI; `None` when no style could be resolved
    pub style: Option<String>,

    /// Zoom level below which building layers are hidden
    pub min_building_zoom: f64,
}

/// Data source attached to the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub id: String,
    /// Renderer source definition (vector tiles, GeoJSON, ...)
    pub definition: Value,
}

/// Kind of render layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerKind {
    Fill,
    FillExtrusion,
    Line,
    Symbol,
}

/// Render layer attached to a source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub id: String,
    pub kind: LayerKind,
    pub source: String,
    #[serde(default)]
    pub source_layer: Option<String>,
    #[serde(default)]
    pub min_zoom: Option<f64>,
    /// Initial filter expression
    #[serde(default)]
    pub filter: Option<Value>,
    /// Initial paint properties
    #[serde(default)]
    pub paint: serde_json::Map<String, Value>,
}

/// RGBA image registered with the map for use as a fill pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePattern {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA, `width * height * 4` bytes
    pub pixels: Vec<u8>,
}

/// A feature as currently drawn by the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFeature {
    pub id: String,
    pub layer: String,
    /// Footprint exterior ring
    pub footprint: Vec<LngLat>,
}

impl RenderedFeature {
    /// Bounding box of the footprint; `None` for an empty footprint
    pub fn bounds(&self) -> Option<GeoBounds> {
        let first = self.footprint.first()?;
        Some(self.footprint.iter().skip(1).fold(GeoBounds::new(*first, *first), |acc, p| {
            acc.union(&GeoBounds::new(*p, *p))
        }))
    }
}

/// Events re-emitted from the map engine to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Camera finished moving (pan, zoom, rotate)
    MoveEnd { bounds: GeoBounds, zoom: f64 },
    /// Click on the map; `feature_id` is the topmost building feature, if any
    Click { point: PixelPoint, position: LngLat, feature_id: Option<String> },
    /// Pointer entered a building feature
    Hover { feature_id: String },
    /// Pointer left all building features
    HoverEnd,
}
