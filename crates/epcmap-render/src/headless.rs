//! In-process map engine.
//!
//! Serves building footprints from an R-tree under a Web-Mercator camera with
//! a fixed viewport size. Pitch and bearing are stored but do not affect the
//! projection. Every filter and paint update is recorded so callers can
//! inspect what a real renderer would have been told to draw.

use std::collections::{BTreeMap, HashMap};
use std::f64::consts::PI;

use epcmap_core::error::{EpcMapError, Result};
use epcmap_core::models::{
    CameraOptions, GeoBounds, ImagePattern, LayerSpec, LngLat, MapConfig, MapEvent, PixelBounds,
    PixelPoint, RenderedFeature, SearchPolygon, SourceSpec,
};
use epcmap_core::ports::MapEngine;
use epcmap_geo::{point_in_polygon, FootprintIndex, IndexedFootprint};
use serde_json::Value;

/// Width of the whole world in pixels at zoom 0
const TILE_SIZE: f64 = 512.0;
const MAX_ZOOM: f64 = 22.0;
const MAX_LATITUDE: f64 = 85.051_128_78;

/// Margin kept around fitted bounds, in pixels
const FIT_PADDING: f64 = 20.0;

fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom)
}

/// Web-Mercator world coordinates in [0, 1)
fn mercator(position: LngLat) -> (f64, f64) {
    let lat = position.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (position.lng + 180.0) / 360.0;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0;
    (x, y)
}

fn inverse_mercator(x: f64, y: f64) -> LngLat {
    let lng = x * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees();
    LngLat::new(lng, lat)
}

/// Ids listed by an `["in", ["get", prop], ["literal", [ids]]]` filter
fn filter_ids(filter: &Value) -> Option<Vec<&str>> {
    let ids = filter.get(2)?.get(1)?.as_array()?;
    Some(ids.iter().filter_map(Value::as_str).collect())
}

struct Instance {
    camera: CameraOptions,
    sources: BTreeMap<String, SourceSpec>,
    layers: Vec<LayerSpec>,
    filters: HashMap<String, Value>,
    paint: HashMap<(String, String), Value>,
    images: BTreeMap<String, ImagePattern>,
}

pub struct HeadlessMapEngine {
    width: f64,
    height: f64,
    footprints: FootprintIndex,
    instance: Option<Instance>,
    paint_updates: usize,
    filter_updates: usize,
}

impl HeadlessMapEngine {
    /// Engine with a viewport of `width` x `height` pixels
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            footprints: FootprintIndex::new(),
            instance: None,
            paint_updates: 0,
            filter_updates: 0,
        }
    }

    pub fn with_footprints(mut self, footprints: Vec<IndexedFootprint>) -> Self {
        self.footprints = FootprintIndex::from_footprints(footprints);
        self
    }

    /// Move the camera and return the resulting move-end event
    pub fn jump_to(&mut self, center: LngLat, zoom: f64) -> Option<MapEvent> {
        let instance = self.instance.as_mut()?;
        instance.camera.center = center;
        instance.camera.zoom = zoom.clamp(0.0, MAX_ZOOM);
        let zoom = instance.camera.zoom;
        Some(MapEvent::MoveEnd { bounds: self.viewport_bounds()?, zoom })
    }

    /// Click at a position, reporting the topmost feature of `layers` under it
    pub fn click_at(&self, position: LngLat, layers: &[&str]) -> Option<MapEvent> {
        let point = self.project(position)?;
        let probe = GeoBounds::new(position, position);
        let feature_id = layers.iter().rev().find_map(|layer| {
            self.rendered_in(&probe, layer)
                .into_iter()
                .find(|f| {
                    SearchPolygon::new(f.footprint.clone())
                        .map(|ring| point_in_polygon(position, &ring))
                        .unwrap_or(false)
                })
                .map(|f| f.id)
        });
        Some(MapEvent::Click { point, position, feature_id })
    }

    pub fn unproject(&self, point: PixelPoint) -> Option<LngLat> {
        let camera = self.instance.as_ref()?.camera;
        let size = world_size(camera.zoom);
        let (cx, cy) = mercator(camera.center);
        let x = cx + (point.x - self.width / 2.0) / size;
        let y = cy + (point.y - self.height / 2.0) / size;
        Some(inverse_mercator(x, y))
    }

    pub fn layer_ids(&self) -> Vec<&str> {
        self.instance
            .as_ref()
            .map(|i| i.layers.iter().map(|l| l.id.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn filter(&self, layer_id: &str) -> Option<&Value> {
        self.instance.as_ref()?.filters.get(layer_id)
    }

    pub fn paint(&self, layer_id: &str, property: &str) -> Option<&Value> {
        self.instance.as_ref()?.paint.get(&(layer_id.to_string(), property.to_string()))
    }

    pub fn image_count(&self) -> usize {
        self.instance.as_ref().map(|i| i.images.len()).unwrap_or(0)
    }

    pub fn has_image(&self, name: &str) -> bool {
        self.instance.as_ref().map(|i| i.images.contains_key(name)).unwrap_or(false)
    }

    /// Paint updates applied since construction
    pub fn paint_updates(&self) -> usize {
        self.paint_updates
    }

    /// Filter updates applied since construction
    pub fn filter_updates(&self) -> usize {
        self.filter_updates
    }

    fn instance_mut(&mut self) -> Result<&mut Instance> {
        self.instance.as_mut().ok_or(EpcMapError::MapNotReady)
    }

    fn layer(&self, layer_id: &str) -> Option<&LayerSpec> {
        self.instance.as_ref()?.layers.iter().find(|l| l.id == layer_id)
    }

    /// Features drawn in one layer within a geographic box
    fn rendered_in(&self, bounds: &GeoBounds, layer_id: &str) -> Vec<RenderedFeature> {
        let (Some(instance), Some(layer)) = (self.instance.as_ref(), self.layer(layer_id)) else {
            return Vec::new();
        };
        if layer.min_zoom.is_some_and(|min| instance.camera.zoom < min) {
            return Vec::new();
        }
        let allowed = instance.filters.get(layer_id).and_then(filter_ids);
        self.footprints
            .query_bounds(bounds)
            .into_iter()
            .filter(|f| layer.source_layer.as_deref().map_or(true, |sl| sl == f.layer))
            .filter(|f| allowed.as_ref().map_or(true, |ids| ids.contains(&f.id.as_str())))
            .map(|f| RenderedFeature {
                id: f.id.clone(),
                layer: layer_id.to_string(),
                footprint: f.footprint.clone(),
            })
            .collect()
    }

    fn area_bounds(&self, area: &PixelBounds) -> Option<GeoBounds> {
        let top_left = self.unproject(area.min)?;
        let bottom_right = self.unproject(area.max)?;
        Some(GeoBounds::new(
            LngLat::new(top_left.lng, bottom_right.lat),
            LngLat::new(bottom_right.lng, top_left.lat),
        ))
    }
}

impl MapEngine for HeadlessMapEngine {
    fn create(&mut self, config: &MapConfig) -> Result<()> {
        if config.style.is_none() {
            return Err(EpcMapError::StyleUnavailable { style: String::new() });
        }
        self.instance = Some(Instance {
            camera: config.camera,
            sources: BTreeMap::new(),
            layers: Vec::new(),
            filters: HashMap::new(),
            paint: HashMap::new(),
            images: BTreeMap::new(),
        });
        Ok(())
    }

    fn remove(&mut self) {
        self.instance = None;
    }

    fn is_created(&self) -> bool {
        self.instance.is_some()
    }

    fn add_source(&mut self, source: &SourceSpec) -> Result<()> {
        self.instance_mut()?.sources.insert(source.id.clone(), source.clone());
        Ok(())
    }

    fn add_layer(&mut self, layer: &LayerSpec) -> Result<()> {
        let instance = self.instance_mut()?;
        if !instance.sources.contains_key(&layer.source) {
            return Err(EpcMapError::DataSource {
                reason: format!("layer {} references unknown source {}", layer.id, layer.source),
            });
        }
        if let Some(filter) = &layer.filter {
            instance.filters.insert(layer.id.clone(), filter.clone());
        }
        for (property, value) in &layer.paint {
            instance.paint.insert((layer.id.clone(), property.clone()), value.clone());
        }
        instance.layers.retain(|l| l.id != layer.id);
        instance.layers.push(layer.clone());
        Ok(())
    }

    fn add_image(&mut self, name: &str, image: &ImagePattern) -> Result<()> {
        self.instance_mut()?.images.insert(name.to_string(), image.clone());
        Ok(())
    }

    fn set_filter(&mut self, layer_id: &str, filter: &Value) -> Result<()> {
        self.instance_mut()?.filters.insert(layer_id.to_string(), filter.clone());
        self.filter_updates += 1;
        Ok(())
    }

    fn set_paint_property(&mut self, layer_id: &str, property: &str, value: &Value) -> Result<()> {
        self.instance_mut()?
            .paint
            .insert((layer_id.to_string(), property.to_string()), value.clone());
        self.paint_updates += 1;
        Ok(())
    }

    fn camera(&self) -> Option<CameraOptions> {
        self.instance.as_ref().map(|i| i.camera)
    }

    fn viewport_bounds(&self) -> Option<GeoBounds> {
        let south_west = self.unproject(PixelPoint::new(0.0, self.height))?;
        let north_east = self.unproject(PixelPoint::new(self.width, 0.0))?;
        Some(GeoBounds::new(south_west, north_east))
    }

    fn fit_bounds(&mut self, bounds: &GeoBounds) -> Result<()> {
        let (x0, y1) = mercator(bounds.south_west);
        let (x1, y0) = mercator(bounds.north_east);
        let (dx, dy) = ((x1 - x0).abs() * TILE_SIZE, (y1 - y0).abs() * TILE_SIZE);
        let zoom = [(self.width - 2.0 * FIT_PADDING) / dx, (self.height - 2.0 * FIT_PADDING) / dy]
            .into_iter()
            .filter(|ratio| ratio.is_finite())
            .map(f64::log2)
            .fold(MAX_ZOOM, f64::min)
            .clamp(0.0, MAX_ZOOM);
        let center = inverse_mercator((x0 + x1) / 2.0, (y0 + y1) / 2.0);

        let camera = &mut self.instance_mut()?.camera;
        camera.center = center;
        camera.zoom = zoom;
        Ok(())
    }

    fn query_rendered_features(
        &self,
        area: Option<&PixelBounds>,
        layers: &[&str],
    ) -> Vec<RenderedFeature> {
        let bounds = match area {
            Some(area) => self.area_bounds(area),
            None => self.viewport_bounds(),
        };
        let Some(bounds) = bounds else {
            return Vec::new();
        };
        layers.iter().flat_map(|layer| self.rendered_in(&bounds, layer)).collect()
    }

    fn project(&self, position: LngLat) -> Option<PixelPoint> {
        let camera = self.instance.as_ref()?.camera;
        let size = world_size(camera.zoom);
        let (cx, cy) = mercator(camera.center);
        let (x, y) = mercator(position);
        Some(PixelPoint::new(
            (x - cx) * size + self.width / 2.0,
            (y - cy) * size + self.height / 2.0,
        ))
    }
}
