//! Map session: owns the engine instance and its lifecycle.
//!
//! Two one-shot signals are published per map instance. "Created" fires once
//! the style has loaded and the building source and layers are attached;
//! "loaded" fires once the pattern images are registered. Both are `watch`
//! channels, so a subscriber arriving after the fact sees the resolved value
//! immediately.

use epcmap_core::error::{EpcMapError, Result};
use epcmap_core::models::{
    CameraOptions, FeatureFilter, GeoBounds, ImagePattern, LayerSpec, LngLat, MapConfig, MapEvent,
    PixelBounds, PixelPoint, RenderedFeature, SourceSpec, FEATURE_ID_PROPERTY,
    MIN_MATCH_EXPRESSION_LEN,
};
use epcmap_core::ports::{FeatureQuery, MapEngine, Projection};
use serde_json::Value;
use tokio::sync::{broadcast, watch};

use crate::layers::{building_layers, building_source, BUILDING_TILES_URL, HIGHLIGHT_LAYER};
use crate::palette::{DisplayMode, Palette};
use crate::pattern::pattern_images;

const EVENT_CAPACITY: usize = 64;

/// Subscriber side of a one-shot lifecycle signal
#[derive(Debug, Clone)]
pub struct LifecycleSignal {
    rx: watch::Receiver<bool>,
}

impl LifecycleSignal {
    pub fn is_resolved(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until the signal fires.
    ///
    /// Returns `MapNotReady` if the session is dropped before firing.
    pub async fn resolved(&mut self) -> Result<()> {
        self.rx.wait_for(|fired| *fired).await.map(|_| ()).map_err(|_| EpcMapError::MapNotReady)
    }
}

pub struct MapSession<E: MapEngine> {
    engine: E,
    created: watch::Sender<bool>,
    loaded: watch::Sender<bool>,
    events: broadcast::Sender<MapEvent>,
    min_building_zoom: f64,
}

impl<E: MapEngine> MapSession<E> {
    pub fn new(engine: E) -> Self {
        let (created, _) = watch::channel(false);
        let (loaded, _) = watch::channel(false);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { engine, created, loaded, events, min_building_zoom: 0.0 }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Create the map instance.
    ///
    /// An unresolved style or an engine failure is logged and leaves the
    /// session without a map.
    pub fn setup(&mut self, config: &MapConfig) {
        if self.engine.is_created() {
            tracing::warn!("map already created, ignoring setup");
            return;
        }
        let Some(style) = config.style.as_deref() else {
            tracing::warn!("no map style available, map not created");
            return;
        };
        match self.engine.create(config) {
            Ok(()) => {
                self.min_building_zoom = config.min_building_zoom;
                tracing::info!(
                    style,
                    lng = config.camera.center.lng,
                    lat = config.camera.center.lat,
                    zoom = config.camera.zoom,
                    "map created"
                );
            }
            Err(e) => tracing::warn!(error = %e, style, "map creation failed"),
        }
    }

    /// Style finished loading: attach the building source and layers, then
    /// fire "created". Later calls for the same instance do nothing.
    pub fn notify_style_loaded(&mut self, palette: &Palette) {
        if !self.engine.is_created() || *self.created.borrow() {
            return;
        }
        self.add_source(&building_source(BUILDING_TILES_URL));
        for layer in building_layers(
            self.min_building_zoom,
            palette.default_colour(),
            &palette.default_pattern(),
        ) {
            self.add_layer(&layer);
        }
        self.created.send_replace(true);
        tracing::info!("map style loaded");
    }

    /// Map fully loaded: register the pattern images for both display modes,
    /// then fire "loaded". Later calls for the same instance do nothing.
    pub fn notify_loaded(&mut self) {
        if !*self.created.borrow() || *self.loaded.borrow() {
            return;
        }
        for mode in [DisplayMode::Standard, DisplayMode::ColourBlind] {
            for (name, image) in pattern_images(&Palette::new(mode)) {
                self.add_image(&name, &image);
            }
        }
        self.loaded.send_replace(true);
        tracing::info!("map loaded");
    }

    pub fn on_created(&self) -> LifecycleSignal {
        LifecycleSignal { rx: self.created.subscribe() }
    }

    pub fn on_loaded(&self) -> LifecycleSignal {
        LifecycleSignal { rx: self.loaded.subscribe() }
    }

    pub fn is_created(&self) -> bool {
        *self.created.borrow()
    }

    pub fn is_loaded(&self) -> bool {
        *self.loaded.borrow()
    }

    /// Tear down the map instance; safe to call with no instance
    pub fn destroy(&mut self) {
        if !self.engine.is_created() {
            return;
        }
        self.engine.remove();
        self.created.send_replace(false);
        self.loaded.send_replace(false);
        tracing::info!("map destroyed");
    }

    pub fn add_source(&mut self, source: &SourceSpec) {
        if let Err(e) = self.engine.add_source(source) {
            tracing::warn!(error = %e, source = %source.id, "failed to add source");
        }
    }

    pub fn add_layer(&mut self, layer: &LayerSpec) {
        if let Err(e) = self.engine.add_layer(layer) {
            tracing::warn!(error = %e, layer = %layer.id, "failed to add layer");
        }
    }

    pub fn add_image(&mut self, name: &str, image: &ImagePattern) {
        if let Err(e) = self.engine.add_image(name, image) {
            tracing::warn!(error = %e, image = name, "failed to add image");
        }
    }

    pub fn filter_layer(&mut self, layer_id: &str, filter: &Value) {
        if let Err(e) = self.engine.set_filter(layer_id, filter) {
            tracing::warn!(error = %e, layer = layer_id, "failed to set layer filter");
        }
    }

    /// Apply a paint expression.
    ///
    /// Anything that is not an array of at least `MIN_MATCH_EXPRESSION_LEN`
    /// elements is not ready yet and is dropped.
    pub fn set_layer_paint(&mut self, layer_id: &str, property: &str, value: &Value) {
        let len = value.as_array().map(Vec::len).unwrap_or(0);
        if len < MIN_MATCH_EXPRESSION_LEN {
            tracing::debug!(layer = layer_id, len, "paint expression too short, ignored");
            return;
        }
        if let Err(e) = self.engine.set_paint_property(layer_id, property, value) {
            tracing::warn!(error = %e, layer = layer_id, property, "failed to set paint");
        }
    }

    /// Point the highlight layer at one feature, or at nothing
    pub fn highlight(&mut self, feature_id: Option<&str>) {
        let filter = match feature_id {
            Some(id) => FeatureFilter::single(FEATURE_ID_PROPERTY, id),
            None => FeatureFilter::none(FEATURE_ID_PROPERTY),
        };
        self.filter_layer(HIGHLIGHT_LAYER, &filter.to_value());
    }

    pub fn camera(&self) -> Option<CameraOptions> {
        self.engine.camera()
    }

    pub fn viewport_bounds(&self) -> Option<GeoBounds> {
        self.engine.viewport_bounds()
    }

    pub fn fit_bounds(&mut self, bounds: &GeoBounds) -> Result<()> {
        if !self.engine.is_created() {
            return Err(EpcMapError::MapNotReady);
        }
        self.engine.fit_bounds(bounds)
    }

    /// Re-emit an engine event to every subscriber
    pub fn emit(&self, event: MapEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MapEvent> {
        self.events.subscribe()
    }
}

impl<E: MapEngine> Projection for MapSession<E> {
    fn project(&self, position: LngLat) -> Option<PixelPoint> {
        self.engine.project(position)
    }
}

impl<E: MapEngine> FeatureQuery for MapSession<E> {
    fn rendered_features(
        &self,
        area: Option<&PixelBounds>,
        layers: &[&str],
    ) -> Vec<RenderedFeature> {
        self.engine.query_rendered_features(area, layers)
    }
}

impl<E: MapEngine> Drop for MapSession<E> {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessMapEngine;
    use crate::layers::{SINGLE_DWELLING_LAYER, COLOUR_PROPERTY};
    use serde_json::json;

    fn config() -> MapConfig {
        MapConfig {
            camera: CameraOptions::default(),
            style: Some("https://example.test/style.json".to_string()),
            min_building_zoom: 14.0,
        }
    }

    fn ready_session() -> MapSession<HeadlessMapEngine> {
        let mut session = MapSession::new(HeadlessMapEngine::new(800.0, 600.0));
        session.setup(&config());
        session.notify_style_loaded(&Palette::default());
        session.notify_loaded();
        session
    }

    #[test]
    fn test_setup_without_style_is_noop() {
        let mut session = MapSession::new(HeadlessMapEngine::new(800.0, 600.0));
        session.setup(&MapConfig { style: None, ..config() });
        assert!(!session.engine().is_created());

        session.notify_style_loaded(&Palette::default());
        assert!(!session.is_created());
    }

    #[test]
    fn test_style_load_attaches_layers_and_images() {
        let session = ready_session();
        assert!(session.is_created());
        assert!(session.is_loaded());
        assert_eq!(session.engine().layer_ids().len(), 4);
        assert_eq!(session.engine().image_count(), 16);
    }

    #[test]
    fn test_short_paint_is_ignored() {
        let mut session = ready_session();
        let before = session.engine().paint_updates();

        session.set_layer_paint(SINGLE_DWELLING_LAYER, COLOUR_PROPERTY, &json!(["match", ["get", "TOID"], "#fff"]));
        session.set_layer_paint(SINGLE_DWELLING_LAYER, COLOUR_PROPERTY, &json!("#fff"));
        assert_eq!(session.engine().paint_updates(), before);

        let value = json!(["match", ["get", "TOID"], "F1", "#008054", "#a6a6a6"]);
        session.set_layer_paint(SINGLE_DWELLING_LAYER, COLOUR_PROPERTY, &value);
        assert_eq!(session.engine().paint_updates(), before + 1);
        assert_eq!(session.engine().paint(SINGLE_DWELLING_LAYER, COLOUR_PROPERTY), Some(&value));
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut session = ready_session();
        session.destroy();
        session.destroy();
        assert!(!session.is_created());
        assert!(!session.engine().is_created());
    }

    #[tokio::test]
    async fn test_lifecycle_replays_to_late_subscribers() {
        let session = ready_session();
        let mut created = session.on_created();
        let mut loaded = session.on_loaded();
        assert!(created.is_resolved());
        created.resolved().await.unwrap();
        loaded.resolved().await.unwrap();
    }

    #[tokio::test]
    async fn test_lifecycle_resolves_for_early_subscribers() {
        let mut session = MapSession::new(HeadlessMapEngine::new(800.0, 600.0));
        let mut created = session.on_created();
        assert!(!created.is_resolved());

        session.setup(&config());
        session.notify_style_loaded(&Palette::default());
        created.resolved().await.unwrap();
    }

    #[tokio::test]
    async fn test_events_are_reemitted() {
        let session = ready_session();
        let mut rx = session.subscribe();
        session.emit(MapEvent::HoverEnd);
        assert_eq!(rx.recv().await.unwrap(), MapEvent::HoverEnd);
    }
}
