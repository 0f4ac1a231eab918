//! Selection and search-area state.
//!
//! The engine tracks one selected feature and one drawn search polygon. The
//! polygon's geographic and screen-space boxes are always derived together,
//! and the screen-space box must be refreshed after every camera change.

use epcmap_core::error::{EpcMapError, Result};
use epcmap_core::models::{GeoBounds, LngLat, PixelBounds, SearchPolygon};
use epcmap_core::ports::{FeatureQuery, Projection};

use crate::spatial::{pixel_bounds, point_in_polygon, polygon_bounds};

/// Active search area with its derived boxes
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialFilterState {
    pub polygon: SearchPolygon,
    pub bounds: GeoBounds,
    /// `None` until a projection is available
    pub pixel_bounds: Option<PixelBounds>,
}

#[derive(Debug, Clone, Default)]
pub struct SpatialQueryEngine {
    selected_feature: Option<String>,
    filter: Option<SpatialFilterState>,
}

impl SpatialQueryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a feature; an empty id clears the selection
    pub fn set_selected_feature(&mut self, feature_id: &str) {
        self.selected_feature =
            if feature_id.is_empty() { None } else { Some(feature_id.to_string()) };
    }

    pub fn selected_feature(&self) -> Option<&str> {
        self.selected_feature.as_deref()
    }

    /// Set or clear the search polygon.
    ///
    /// A polygon marks the spatial filter active and derives both boxes from
    /// it; `None` marks it inactive and drops the derived boxes.
    pub fn set_filter_polygon<P: Projection + ?Sized>(
        &mut self,
        polygon: Option<SearchPolygon>,
        projection: &P,
    ) {
        self.filter = polygon.and_then(|polygon| {
            let bounds = polygon_bounds(&polygon)?;
            let pixel_bounds = pixel_bounds(&bounds, projection);
            tracing::debug!(?bounds, ?pixel_bounds, "search polygon set");
            Some(SpatialFilterState { polygon, bounds, pixel_bounds })
        });
    }

    /// Recompute the screen-space box after the camera moved
    pub fn refresh_pixel_bounds<P: Projection + ?Sized>(&mut self, projection: &P) {
        if let Some(filter) = self.filter.as_mut() {
            filter.pixel_bounds = pixel_bounds(&filter.bounds, projection);
        }
    }

    pub fn is_filter_active(&self) -> bool {
        self.filter.is_some()
    }

    pub fn filter(&self) -> Option<&SpatialFilterState> {
        self.filter.as_ref()
    }

    pub fn filter_polygon(&self) -> Option<&SearchPolygon> {
        self.filter.as_ref().map(|f| &f.polygon)
    }

    pub fn pixel_bounds(&self) -> Option<PixelBounds> {
        self.filter.as_ref().and_then(|f| f.pixel_bounds)
    }

    /// Whether a position lies in the search area; always true with no area
    pub fn contains(&self, position: LngLat) -> bool {
        self.filter.as_ref().map(|f| point_in_polygon(position, &f.polygon)).unwrap_or(true)
    }

    /// Combined geographic box of every rendered feature with the given id.
    ///
    /// Fails with `FeatureNotFound` when nothing matching is rendered, for
    /// instance when the feature is outside the viewport.
    pub fn feature_bounding_box<Q: FeatureQuery + ?Sized>(
        &self,
        feature_id: &str,
        query: &Q,
        layers: &[&str],
    ) -> Result<GeoBounds> {
        query
            .rendered_features(None, layers)
            .iter()
            .filter(|feature| feature.id == feature_id)
            .filter_map(|feature| feature.bounds())
            .reduce(|acc, bounds| acc.union(&bounds))
            .ok_or_else(|| EpcMapError::FeatureNotFound { feature_id: feature_id.to_string() })
    }
}
