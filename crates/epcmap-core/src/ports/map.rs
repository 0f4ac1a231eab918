use serde_json::Value;

use crate::error::Result;
use crate::models::{
    CameraOptions, GeoBounds, ImagePattern, LayerSpec, LngLat, MapConfig, PixelBounds, PixelPoint,
    RenderedFeature, SourceSpec,
};

/// Port for the map-rendering engine.
///
/// Implementations wrap a concrete renderer. Calls are side-effecting and made
/// from a single thread; none of them interpret the data they are handed.
pub trait MapEngine {
    /// Create the map instance with the given camera and style
    fn create(&mut self, config: &MapConfig) -> Result<()>;

    /// Tear down the map instance
    fn remove(&mut self);

    fn is_created(&self) -> bool;

    fn add_source(&mut self, source: &SourceSpec) -> Result<()>;

    fn add_layer(&mut self, layer: &LayerSpec) -> Result<()>;

    fn add_image(&mut self, name: &str, image: &ImagePattern) -> Result<()>;

    /// Replace a layer's filter expression
    fn set_filter(&mut self, layer_id: &str, filter: &Value) -> Result<()>;

    /// Replace one paint property of a layer
    fn set_paint_property(&mut self, layer_id: &str, property: &str, value: &Value) -> Result<()>;

    fn camera(&self) -> Option<CameraOptions>;

    /// Geographic extent currently visible
    fn viewport_bounds(&self) -> Option<GeoBounds>;

    /// Move the camera so that `bounds` fills the viewport
    fn fit_bounds(&mut self, bounds: &GeoBounds) -> Result<()>;

    /// Features currently drawn in the given layers, optionally restricted
    /// to a screen-space area
    fn query_rendered_features(
        &self,
        area: Option<&PixelBounds>,
        layers: &[&str],
    ) -> Vec<RenderedFeature>;

    /// Geographic to screen projection under the current camera
    fn project(&self, position: LngLat) -> Option<PixelPoint>;
}

/// Geographic to screen projection
pub trait Projection {
    fn project(&self, position: LngLat) -> Option<PixelPoint>;
}

/// Lookup of rendered feature geometry
pub trait FeatureQuery {
    fn rendered_features(&self, area: Option<&PixelBounds>, layers: &[&str])
        -> Vec<RenderedFeature>;
}
